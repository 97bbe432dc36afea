//! Options → Nuitka command line
//!
//! Token order is fixed so that the same options always render the same,
//! diffable command.

use crate::builder::data_dirs::resolve_data_dirs;
use crate::builder::lists::{non_empty, split_list};
use crate::errors::Result;
use crate::models::{CommandLine, DEFAULT_CHILD_GRACE_TIME_MS, PackageOptions};

/// Guidance shown instead of a command while required fields are empty
pub const PLACEHOLDER_TEXT: &str =
    "1. Select Python interpreter and main file\n2. Configure options to update command";

/// Launcher names that run Nuitka directly instead of through `python -m`
const LAUNCHER_NAMES: &[&str] = &["nuitka", "nuitka.cmd", "nuitka.bat", "nuitka.exe"];

/// Builds the full command line for the given options
pub fn build(options: &PackageOptions) -> Result<CommandLine> {
    options.check_buildable()?;

    let python = options.python.trim();
    let main_file = options.main_file.trim();

    let mut cmd = CommandLine::new(python);
    if !is_launcher_script(python) {
        cmd.arg("-m").arg("nuitka");
    }

    push_common(&mut cmd, options);

    if let Some(icon) = non_empty(&options.icon) {
        cmd.arg(format!("--windows-icon-from-ico={}", icon));
    }
    if let Some(output_dir) = non_empty(&options.output_dir) {
        cmd.arg(format!("--output-dir={}", output_dir));
    }

    for plugin in options.plugins.iter().filter_map(|p| non_empty(p)) {
        cmd.arg(format!("--enable-plugin={}", plugin));
    }

    push_advanced(&mut cmd, options);
    push_includes(&mut cmd, options, main_file);

    for flag in &options.python_flags {
        cmd.arg(flag.token());
    }

    if options.common.onefile {
        push_onefile(&mut cmd, options);
    }

    if let Some(dlls) = non_empty(&options.exclude_dlls) {
        cmd.arg(format!("--noinclude-dlls={}", dlls));
    }

    push_metadata(&mut cmd, options);

    if let Some(env) = non_empty(&options.force_env) {
        cmd.arg(format!("--force-runtime-environment-variable={}", env));
    }

    push_debug(&mut cmd, options);

    cmd.arg(main_file);
    Ok(cmd)
}

/// Rendered command, or the placeholder guidance when it cannot be built
pub fn preview(options: &PackageOptions) -> String {
    match build(options) {
        Ok(cmd) => cmd.to_string(),
        Err(_) => PLACEHOLDER_TEXT.to_string(),
    }
}

/// True when the interpreter path points at a Nuitka launcher
pub fn is_launcher_script(python: &str) -> bool {
    // Windows-style separators are honoured on every platform
    let file_name = python
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(python)
        .to_ascii_lowercase();
    LAUNCHER_NAMES.iter().any(|name| *name == file_name)
}

fn push_flag(cmd: &mut CommandLine, enabled: bool, flag: &str) {
    if enabled {
        cmd.arg(flag);
    }
}

fn push_common(cmd: &mut CommandLine, options: &PackageOptions) {
    let common = &options.common;
    push_flag(cmd, common.onefile, "--onefile");
    push_flag(cmd, common.standalone, "--standalone");
    push_flag(cmd, common.windows_disable_console, "--windows-disable-console");
    push_flag(cmd, common.remove_output, "--remove-output");
    push_flag(cmd, common.include_qt, "--include-qt-plugins=sensible,styles");
    push_flag(cmd, common.show_progress, "--show-progress");
    push_flag(cmd, common.show_memory, "--show-memory");
}

fn push_advanced(cmd: &mut CommandLine, options: &PackageOptions) {
    let advanced = &options.advanced;
    push_flag(cmd, advanced.follow_imports, "--follow-imports");
    push_flag(cmd, advanced.follow_stdlib, "--follow-stdlib");
    push_flag(cmd, advanced.module, "--module");
    push_flag(cmd, advanced.lto, "--lto");
    push_flag(cmd, advanced.disable_ccache, "--disable-ccache");
    push_flag(cmd, advanced.assume_yes, "--assume-yes");
    push_flag(cmd, advanced.windows_uac_admin, "--windows-uac-admin");
    push_flag(cmd, advanced.windows_uac_uiaccess, "--windows-uac-uiaccess");
}

fn push_list(cmd: &mut CommandLine, field: &str, flag: &str) {
    for entry in split_list(field) {
        cmd.arg(format!("{}={}", flag, entry));
    }
}

fn push_includes(cmd: &mut CommandLine, options: &PackageOptions, main_file: &str) {
    let include = &options.include;
    push_list(cmd, &include.packages, "--include-package");
    push_list(cmd, &include.package_data, "--include-package-data");
    push_list(cmd, &include.modules, "--include-module");
    push_list(cmd, &include.data_files, "--include-data-files");

    for mapping in resolve_data_dirs(&include.data_dirs, main_file) {
        cmd.arg(mapping.token());
    }

    push_list(cmd, &include.exclude_data_files, "--noinclude-data-files");
    if options.common.onefile {
        push_list(
            cmd,
            &include.onefile_external_data,
            "--include-onefile-external-data",
        );
    }
    push_list(cmd, &include.raw_dirs, "--include-raw-dir");
}

fn push_onefile(cmd: &mut CommandLine, options: &PackageOptions) {
    let onefile = &options.onefile;
    if let Some(spec) = non_empty(&onefile.tempdir_spec) {
        cmd.arg(format!("--onefile-tempdir-spec={}", spec));
    }
    if onefile.child_grace_time_ms != DEFAULT_CHILD_GRACE_TIME_MS {
        cmd.arg(format!(
            "--onefile-child-grace-time={}",
            onefile.child_grace_time_ms
        ));
    }
    push_flag(cmd, onefile.no_compression, "--onefile-no-compression");
    push_flag(cmd, onefile.as_archive, "--onefile-as-archive");
}

fn push_metadata(cmd: &mut CommandLine, options: &PackageOptions) {
    let metadata = &options.metadata;
    let fields = [
        (&metadata.company_name, "--company-name"),
        (&metadata.product_name, "--product-name"),
        (&metadata.file_version, "--file-version"),
        (&metadata.product_version, "--product-version"),
        (&metadata.file_description, "--file-description"),
        (&metadata.copyright, "--copyright"),
    ];
    for (value, flag) in fields {
        if let Some(value) = non_empty(value) {
            cmd.arg(format!("{}={}", flag, value));
        }
    }
}

fn push_debug(cmd: &mut CommandLine, options: &PackageOptions) {
    let debug = &options.debug;
    push_flag(cmd, debug.debug, "--debug");
    push_flag(cmd, debug.unstripped, "--unstripped");
    push_flag(cmd, debug.trace_execution, "--trace-execution");
    push_flag(cmd, debug.warn_implicit_exceptions, "--warn-implicit-exceptions");
    push_flag(cmd, debug.warn_unusual_code, "--warn-unusual-code");
    push_flag(cmd, debug.deployment, "--deployment");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{ForgeError, RequiredField};
    use crate::models::PythonFlag;

    fn base_options() -> PackageOptions {
        PackageOptions::new("/opt/py/bin/python", "/work/app/main.py")
    }

    #[test]
    fn test_minimal_command() {
        let cmd = build(&base_options()).unwrap();
        assert_eq!(
            cmd.tokens(),
            ["/opt/py/bin/python", "-m", "nuitka", "/work/app/main.py"]
        );
    }

    #[test]
    fn test_missing_interpreter_yields_placeholder() {
        let options = PackageOptions::new("", "/work/app/main.py");
        assert!(matches!(
            build(&options),
            Err(ForgeError::MissingRequiredField(RequiredField::Interpreter))
        ));
        assert_eq!(preview(&options), PLACEHOLDER_TEXT);
    }

    #[test]
    fn test_launcher_script_base() {
        let options = PackageOptions::new(r"C:\venv\Scripts\nuitka.cmd", "main.py");
        let cmd = build(&options).unwrap();
        assert_eq!(cmd.tokens(), [r"C:\venv\Scripts\nuitka.cmd", "main.py"]);

        assert!(is_launcher_script("/venv/bin/nuitka"));
        assert!(is_launcher_script("NUITKA.EXE"));
        assert!(!is_launcher_script("/venv/bin/python3"));
        assert!(!is_launcher_script("/opt/nuitka/bin/python"));
    }

    #[test]
    fn test_onefile_options_gated() {
        let mut options = base_options();
        options.onefile.tempdir_spec = "{TEMP}/app".to_string();
        options.onefile.child_grace_time_ms = 8000;
        options.onefile.no_compression = true;
        options.include.onefile_external_data = "large/*".to_string();

        let cmd = build(&options).unwrap();
        assert!(!cmd.tokens().iter().any(|t| t.starts_with("--onefile")));
        assert!(!cmd.contains("--include-onefile-external-data=large/*"));

        options.common.onefile = true;
        let cmd = build(&options).unwrap();
        assert!(cmd.contains("--onefile"));
        assert!(cmd.contains("--onefile-tempdir-spec={TEMP}/app"));
        assert!(cmd.contains("--onefile-child-grace-time=8000"));
        assert!(cmd.contains("--onefile-no-compression"));
        assert!(cmd.contains("--include-onefile-external-data=large/*"));
    }

    #[test]
    fn test_default_grace_time_not_emitted() {
        let mut options = base_options();
        options.common.onefile = true;
        let cmd = build(&options).unwrap();
        assert!(
            !cmd.tokens()
                .iter()
                .any(|t| t.starts_with("--onefile-child-grace-time"))
        );
    }

    #[test]
    fn test_python_flags_keep_insertion_order() {
        let mut options = base_options();
        options.add_python_flag(PythonFlag::Unbuffered);
        options.add_python_flag(PythonFlag::NoSite);

        let cmd = build(&options).unwrap();
        let unbuffered = cmd.position("--python-flag=unbuffered").unwrap();
        let no_site = cmd.position("--python-flag=no_site").unwrap();
        assert!(unbuffered < no_site);
    }

    #[test]
    fn test_exclude_dlls_is_single_token() {
        let mut options = base_options();
        options.exclude_dlls = " libfoo.*,libbar.* ".to_string();
        let cmd = build(&options).unwrap();
        assert!(cmd.contains("--noinclude-dlls=libfoo.*,libbar.*"));
    }
}
