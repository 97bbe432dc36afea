//! Packaging options snapshot
//!
//! `PackageOptions` is the single record the command builder reads. Front ends
//! (CLI flags, options file, TUI) assemble one and hand it over by reference;
//! nothing in the core reads interface state directly.

use serde::{Deserialize, Serialize};

use crate::errors::{ForgeError, RequiredField, Result};

/// Default for `--onefile-child-grace-time`, which is not emitted when unchanged
pub const DEFAULT_CHILD_GRACE_TIME_MS: u32 = 5000;
pub const MIN_CHILD_GRACE_TIME_MS: u32 = 1000;
pub const MAX_CHILD_GRACE_TIME_MS: u32 = 30000;

/// Interpreter runtime flags passed through as `--python-flag=<name>`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum PythonFlag {
    /// Disable site module import
    NoSite,
    /// Suppress warning messages
    NoWarnings,
    /// Disable assert statements
    NoAsserts,
    /// Remove docstrings
    NoDocstrings,
    /// Unbuffered output
    Unbuffered,
    /// Use static hash values
    StaticHashes,
}

impl PythonFlag {
    pub fn name(&self) -> &'static str {
        match self {
            PythonFlag::NoSite => "no_site",
            PythonFlag::NoWarnings => "no_warnings",
            PythonFlag::NoAsserts => "no_asserts",
            PythonFlag::NoDocstrings => "no_docstrings",
            PythonFlag::Unbuffered => "unbuffered",
            PythonFlag::StaticHashes => "static_hashes",
        }
    }

    pub fn token(&self) -> String {
        format!("--python-flag={}", self.name())
    }
}

/// Switches emitted right after the base invocation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommonOptions {
    pub onefile: bool,
    pub standalone: bool,
    pub windows_disable_console: bool,
    pub remove_output: bool,
    pub include_qt: bool,
    pub show_progress: bool,
    pub show_memory: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvancedOptions {
    pub follow_imports: bool,
    pub follow_stdlib: bool,
    pub module: bool,
    pub lto: bool,
    pub disable_ccache: bool,
    pub assume_yes: bool,
    pub windows_uac_admin: bool,
    pub windows_uac_uiaccess: bool,
}

/// Comma-separated include/exclude fields, kept as the user typed them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IncludeOptions {
    pub packages: String,
    pub package_data: String,
    pub modules: String,
    pub data_files: String,
    /// `source=destination` entries; destination defaults to the source basename
    pub data_dirs: String,
    pub exclude_data_files: String,
    /// Only honoured in onefile mode
    pub onefile_external_data: String,
    pub raw_dirs: String,
}

/// Options that only apply when `common.onefile` is enabled
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OnefileOptions {
    pub tempdir_spec: String,
    pub child_grace_time_ms: u32,
    pub no_compression: bool,
    pub as_archive: bool,
}

impl Default for OnefileOptions {
    fn default() -> Self {
        Self {
            tempdir_spec: String::new(),
            child_grace_time_ms: DEFAULT_CHILD_GRACE_TIME_MS,
            no_compression: false,
            as_archive: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataOptions {
    pub company_name: String,
    pub product_name: String,
    pub file_version: String,
    pub product_version: String,
    pub file_description: String,
    pub copyright: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugOptions {
    pub debug: bool,
    pub unstripped: bool,
    pub trace_execution: bool,
    pub warn_implicit_exceptions: bool,
    pub warn_unusual_code: bool,
    pub deployment: bool,
}

/// Complete snapshot of user-selected packaging options
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageOptions {
    /// Interpreter path, or the path of a Nuitka launcher script
    pub python: String,
    /// Entry script, emitted as the last token
    pub main_file: String,
    pub icon: String,
    pub output_dir: String,
    /// Plugin names in the order they were selected
    pub plugins: Vec<String>,
    /// Runtime flags in the order they were added; never contains duplicates
    pub python_flags: Vec<PythonFlag>,
    pub exclude_dlls: String,
    /// `VAR=value` forced into the runtime environment
    pub force_env: String,
    pub common: CommonOptions,
    pub advanced: AdvancedOptions,
    pub include: IncludeOptions,
    pub onefile: OnefileOptions,
    pub metadata: MetadataOptions,
    pub debug: DebugOptions,
}

impl PackageOptions {
    pub fn new(python: impl Into<String>, main_file: impl Into<String>) -> Self {
        Self {
            python: python.into(),
            main_file: main_file.into(),
            ..Self::default()
        }
    }

    /// Appends a runtime flag unless it is already present
    pub fn add_python_flag(&mut self, flag: PythonFlag) -> bool {
        if self.python_flags.contains(&flag) {
            return false;
        }
        self.python_flags.push(flag);
        true
    }

    pub fn remove_python_flag(&mut self, flag: PythonFlag) -> bool {
        let before = self.python_flags.len();
        self.python_flags.retain(|f| *f != flag);
        self.python_flags.len() != before
    }

    /// Selects a plugin, keeping selection order and ignoring repeats
    pub fn select_plugin(&mut self, plugin: &str) -> bool {
        let plugin = plugin.trim();
        if plugin.is_empty() || self.plugins.iter().any(|p| p == plugin) {
            return false;
        }
        self.plugins.push(plugin.to_string());
        true
    }

    /// Checks the fields needed to produce any command at all
    pub fn check_buildable(&self) -> Result<()> {
        if self.python.trim().is_empty() {
            return Err(ForgeError::MissingRequiredField(RequiredField::Interpreter));
        }
        if self.main_file.trim().is_empty() {
            return Err(ForgeError::MissingRequiredField(RequiredField::EntryFile));
        }
        Ok(())
    }

    /// Checks the fields needed before a packaging run is started
    pub fn ready_to_run(&self) -> Result<()> {
        self.check_buildable()?;
        if self.output_dir.trim().is_empty() {
            return Err(ForgeError::MissingRequiredField(RequiredField::OutputDir));
        }
        Ok(())
    }

    /// Clamps the grace time into its accepted range and drops repeated flags
    pub fn normalized(mut self) -> Self {
        self.onefile.child_grace_time_ms = self
            .onefile
            .child_grace_time_ms
            .clamp(MIN_CHILD_GRACE_TIME_MS, MAX_CHILD_GRACE_TIME_MS);
        let mut seen = Vec::with_capacity(self.python_flags.len());
        for flag in self.python_flags {
            if !seen.contains(&flag) {
                seen.push(flag);
            }
        }
        self.python_flags = seen;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_python_flags_are_unique() {
        let mut options = PackageOptions::default();
        assert!(options.add_python_flag(PythonFlag::NoSite));
        assert!(options.add_python_flag(PythonFlag::Unbuffered));
        assert!(!options.add_python_flag(PythonFlag::NoSite));
        assert_eq!(
            options.python_flags,
            vec![PythonFlag::NoSite, PythonFlag::Unbuffered]
        );

        assert!(options.remove_python_flag(PythonFlag::NoSite));
        assert!(!options.remove_python_flag(PythonFlag::NoSite));
        assert_eq!(options.python_flags, vec![PythonFlag::Unbuffered]);
    }

    #[test]
    fn test_required_fields() {
        let options = PackageOptions::default();
        assert!(matches!(
            options.check_buildable(),
            Err(ForgeError::MissingRequiredField(RequiredField::Interpreter))
        ));

        let options = PackageOptions::new("/usr/bin/python3", "  ");
        assert!(matches!(
            options.check_buildable(),
            Err(ForgeError::MissingRequiredField(RequiredField::EntryFile))
        ));

        let options = PackageOptions::new("/usr/bin/python3", "app.py");
        assert!(options.check_buildable().is_ok());
        assert!(matches!(
            options.ready_to_run(),
            Err(ForgeError::MissingRequiredField(RequiredField::OutputDir))
        ));
    }

    #[test]
    fn test_normalized_clamps_and_dedups() {
        let mut options = PackageOptions::new("python", "app.py");
        options.onefile.child_grace_time_ms = 50;
        options.python_flags = vec![PythonFlag::NoAsserts, PythonFlag::NoAsserts];

        let options = options.normalized();
        assert_eq!(options.onefile.child_grace_time_ms, MIN_CHILD_GRACE_TIME_MS);
        assert_eq!(options.python_flags, vec![PythonFlag::NoAsserts]);
    }

    #[test]
    fn test_plugin_selection_order() {
        let mut options = PackageOptions::default();
        assert!(options.select_plugin("numpy"));
        assert!(options.select_plugin("pyside6"));
        assert!(!options.select_plugin("numpy"));
        assert!(!options.select_plugin(" "));
        assert_eq!(options.plugins, vec!["numpy", "pyside6"]);
    }
}
