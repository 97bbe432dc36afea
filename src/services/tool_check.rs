//! Advisory Nuitka presence check
//!
//! The verdict is only used to warn before a run. A wrong answer must never
//! block a run, so every failure here degrades to `NotFound`.

use regex::Regex;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::LazyLock;
use std::time::Duration;
use tokio::process::Command;

/// Upper bound for each probe subprocess
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

pub const MISSING_TOOL_MESSAGE: &str =
    "Nuitka not detected in selected Python environment.\nInstall with: pip install nuitka";

static VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+\.\d+(?:\.\d+)*)").expect("valid version regex"));

const SCRIPT_NAMES: &[&str] = &["nuitka", "nuitka.exe", "nuitka.cmd", "nuitka-script.py"];

/// Package manager front ends queried for installed-package metadata, in order
const PACKAGE_MANAGERS: &[&str] = &["uv", "pip"];

/// How Nuitka was detected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetectionMethod {
    /// The interpreter path itself names Nuitka
    InterpreterPath,
    /// `python -m nuitka --version` succeeded
    VersionQuery,
    /// A launcher exists next to the interpreter
    ScriptsDir(PathBuf),
    /// `python -m <manager> show nuitka` listed the package
    PackageMetadata(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolStatus {
    Found {
        method: DetectionMethod,
        version: Option<String>,
    },
    NotFound,
}

impl ToolStatus {
    pub fn is_found(&self) -> bool {
        matches!(self, ToolStatus::Found { .. })
    }

    pub fn describe(&self) -> String {
        match self {
            ToolStatus::Found { method, version } => {
                let via = match method {
                    DetectionMethod::InterpreterPath => "interpreter path".to_string(),
                    DetectionMethod::VersionQuery => "version query".to_string(),
                    DetectionMethod::ScriptsDir(path) => format!("launcher {}", path.display()),
                    DetectionMethod::PackageMetadata(manager) => format!("{} metadata", manager),
                };
                match version {
                    Some(version) => format!("✓ Nuitka {} installed (detected via {})", version, via),
                    None => format!("✓ Nuitka installed (detected via {})", via),
                }
            }
            ToolStatus::NotFound => format!("⚠️ {}", MISSING_TOOL_MESSAGE),
        }
    }
}

/// Probes the interpreter's environment for Nuitka
pub async fn probe_nuitka(python: &str) -> ToolStatus {
    let python = python.trim();
    if python.is_empty() {
        return ToolStatus::NotFound;
    }

    if python.to_lowercase().contains("nuitka") {
        return ToolStatus::Found {
            method: DetectionMethod::InterpreterPath,
            version: None,
        };
    }

    let interpreter = resolve_interpreter(python);
    log::debug!("Probing Nuitka with interpreter {}", interpreter.display());

    if let Some(stdout) = run_probe(&interpreter, &["-m", "nuitka", "--version"]).await {
        return ToolStatus::Found {
            method: DetectionMethod::VersionQuery,
            version: parse_version(&stdout),
        };
    }

    if let Some(launcher) = find_scripts_launcher(&interpreter) {
        return ToolStatus::Found {
            method: DetectionMethod::ScriptsDir(launcher),
            version: None,
        };
    }

    for &manager in PACKAGE_MANAGERS {
        if let Some(stdout) = run_probe(&interpreter, &["-m", manager, "show", "nuitka"]).await {
            if stdout.contains("Name: nuitka") {
                return ToolStatus::Found {
                    method: DetectionMethod::PackageMetadata(manager),
                    version: parse_show_version(&stdout),
                };
            }
        }
    }

    ToolStatus::NotFound
}

/// Resolves a bare interpreter name (e.g. `python3`) through `PATH`
pub fn resolve_interpreter(python: &str) -> PathBuf {
    let path = Path::new(python);
    if path.components().count() > 1 || path.is_absolute() {
        return path.to_path_buf();
    }
    which::which(python).unwrap_or_else(|_| path.to_path_buf())
}

/// First of `python3`, `python` found on `PATH`
pub fn find_system_python() -> Option<PathBuf> {
    ["python3", "python"]
        .iter()
        .find_map(|name| which::which(name).ok())
}

/// First dotted version number in the output of `--version`
pub fn parse_version(output: &str) -> Option<String> {
    let first_line = output.lines().find(|line| !line.trim().is_empty())?;
    VERSION_RE
        .captures(first_line)
        .map(|caps| caps[1].to_string())
}

fn parse_show_version(output: &str) -> Option<String> {
    output
        .lines()
        .find_map(|line| line.strip_prefix("Version:"))
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Looks for a launcher in the virtual environment's scripts directory
pub fn find_scripts_launcher(interpreter: &Path) -> Option<PathBuf> {
    let env_base = interpreter.parent()?.parent()?;
    let scripts_dir = env_base.join(if cfg!(windows) { "Scripts" } else { "bin" });
    SCRIPT_NAMES
        .iter()
        .map(|name| scripts_dir.join(name))
        .find(|candidate| candidate.exists())
}

/// Runs one probe; returns stdout only for a zero exit within the timeout
async fn run_probe(interpreter: &Path, args: &[&str]) -> Option<String> {
    let mut cmd = Command::new(interpreter);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    #[cfg(windows)]
    cmd.creation_flags(0x0800_0000); // CREATE_NO_WINDOW

    match tokio::time::timeout(PROBE_TIMEOUT, cmd.output()).await {
        Ok(Ok(output)) if output.status.success() => {
            Some(String::from_utf8_lossy(&output.stdout).into_owned())
        }
        Ok(Ok(output)) => {
            log::debug!("Probe {:?} exited with {}", args, output.status);
            None
        }
        Ok(Err(e)) => {
            log::debug!("Probe {:?} failed to run: {}", args, e);
            None
        }
        Err(_) => {
            log::debug!("Probe {:?} timed out", args);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_parse_version() {
        assert_eq!(
            parse_version("2.4.8\nCommercial: None\nPython: 3.12.1"),
            Some("2.4.8".to_string())
        );
        assert_eq!(parse_version("\nNuitka v1.9\n"), Some("1.9".to_string()));
        assert_eq!(parse_version("Nuitka-2.5rc1"), Some("2.5".to_string()));
        assert_eq!(parse_version("no version here"), None);
    }

    #[test]
    fn test_parse_show_version() {
        let output = "Name: nuitka\nVersion: 2.1.3\nSummary: Python compiler\n";
        assert_eq!(parse_show_version(output), Some("2.1.3".to_string()));
    }

    #[test]
    fn test_scripts_launcher_lookup() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let scripts = temp_dir
            .path()
            .join(if cfg!(windows) { "Scripts" } else { "bin" });
        fs::create_dir_all(&scripts).unwrap();
        let interpreter = scripts.join("python");

        assert!(find_scripts_launcher(&interpreter).is_none());

        fs::write(scripts.join("nuitka"), "#!/bin/sh\n").unwrap();
        assert_eq!(
            find_scripts_launcher(&interpreter),
            Some(scripts.join("nuitka"))
        );
    }

    #[tokio::test]
    async fn test_interpreter_path_shortcut() {
        let status = probe_nuitka("/venv/Scripts/nuitka.cmd").await;
        assert_eq!(
            status,
            ToolStatus::Found {
                method: DetectionMethod::InterpreterPath,
                version: None
            }
        );
    }

    #[tokio::test]
    async fn test_missing_interpreter_is_not_found() {
        let status = probe_nuitka("/definitely/not/a/python").await;
        assert_eq!(status, ToolStatus::NotFound);
        assert!(status.describe().contains("pip install nuitka"));
    }
}
