//! Logging utilities and initialization for nuitka-forge

use anyhow::Result;
use chrono::{DateTime, Local};
use env_logger::{Builder, Target};
use log::LevelFilter;
use std::io::Write;
use std::path::PathBuf;

/// Maps `-q` / `-v` counts to a level filter
pub fn level_for(quiet: bool, verbose: u8) -> LevelFilter {
    match (quiet, verbose) {
        (true, _) => LevelFilter::Error,
        (false, 0) => LevelFilter::Info,
        (false, 1) => LevelFilter::Debug,
        (false, _) => LevelFilter::Trace,
    }
}

/// Flags win; without any, the configured level name applies
pub fn resolve_level(quiet: bool, verbose: u8, configured: &str) -> LevelFilter {
    if quiet || verbose > 0 {
        return level_for(quiet, verbose);
    }
    configured.parse().unwrap_or(LevelFilter::Info)
}

/// Initialize logging for the CLI and TUI front ends
pub fn init_cli_logging(level: LevelFilter, tui_mode: bool, json: bool) -> Result<()> {
    if tui_mode {
        // File logging only for TUI mode to avoid terminal interference
        init_file_logger(level)?;
    } else if json {
        init_json_logger(level)?;
    } else {
        Builder::from_default_env()
            .target(Target::Stderr)
            .filter_level(level)
            .format_timestamp_secs()
            .format_module_path(false)
            .init();
    }

    // Initialize panic logging
    log_panics::init();

    log::debug!("nuitka-forge logging initialized with level: {:?}", level);
    Ok(())
}

/// `<data dir>/nuitka-forge/logs`
pub fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(crate::APP_NAME)
        .join("logs")
}

/// Initialize file-based logging for TUI mode
fn init_file_logger(level: LevelFilter) -> Result<()> {
    use std::fs::OpenOptions;

    let log_dir = log_dir();
    std::fs::create_dir_all(&log_dir)?;

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("nuitka-forge.log"))?;

    Builder::from_default_env()
        .target(Target::Pipe(Box::new(file)))
        .filter_level(level)
        .format_timestamp_secs()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] {}: {}",
                buf.timestamp(),
                record.level(),
                record.module_path().unwrap_or("unknown"),
                record.args()
            )
        })
        .init();

    Ok(())
}

/// Initialize JSON lines logging on stderr
fn init_json_logger(level: LevelFilter) -> Result<()> {
    use chrono::Utc;

    Builder::from_default_env()
        .target(Target::Stderr)
        .filter_level(level)
        .format(|buf, record| {
            let json = serde_json::json!({
                "timestamp": Utc::now().to_rfc3339(),
                "level": record.level().to_string(),
                "module": record.module_path().unwrap_or("unknown"),
                "message": record.args().to_string(),
                "target": record.target(),
            });
            writeln!(buf, "{}", json)
        })
        .init();

    Ok(())
}

/// Prefixes a log-view line with a local `[HH:MM:SS]` timestamp
pub fn timestamped(message: &str) -> String {
    stamp_at(Local::now(), message)
}

fn stamp_at(at: DateTime<Local>, message: &str) -> String {
    format!("[{}] {}", at.format("%H:%M:%S"), message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_log_level_selection() {
        assert_eq!(level_for(true, 0), LevelFilter::Error);
        assert_eq!(level_for(true, 3), LevelFilter::Error);
        assert_eq!(level_for(false, 0), LevelFilter::Info);
        assert_eq!(level_for(false, 1), LevelFilter::Debug);
        assert_eq!(level_for(false, 2), LevelFilter::Trace);
    }

    #[test]
    fn test_configured_level_applies_without_flags() {
        assert_eq!(resolve_level(false, 0, "warn"), LevelFilter::Warn);
        assert_eq!(resolve_level(false, 0, "bogus"), LevelFilter::Info);
        assert_eq!(resolve_level(false, 1, "warn"), LevelFilter::Debug);
        assert_eq!(resolve_level(true, 0, "trace"), LevelFilter::Error);
    }

    #[test]
    fn test_timestamp_format() {
        let at = Local.with_ymd_and_hms(2024, 5, 1, 9, 7, 3).unwrap();
        assert_eq!(stamp_at(at, "Log cleared"), "[09:07:03] Log cleared");
    }

    #[test]
    fn test_log_dir_is_app_scoped() {
        let dir = log_dir();
        assert!(dir.ends_with("nuitka-forge/logs"));
    }
}
