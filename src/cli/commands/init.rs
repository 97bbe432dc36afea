//! Init command implementation

use crate::cli::ForgeContext;
use crate::config::{DEFAULT_OPTIONS_FILE, write_template};
use crate::services::find_system_python;
use anyhow::Result;
use std::path::PathBuf;

pub fn execute_init_command(ctx: &ForgeContext, path: Option<PathBuf>, force: bool) -> Result<()> {
    let path = path.unwrap_or_else(|| PathBuf::from(DEFAULT_OPTIONS_FILE));

    let mut options = ctx.options.clone();
    if options.python.trim().is_empty() {
        if let Some(python) = find_system_python() {
            log::info!("🐍 Using {} as interpreter", python.display());
            options.python = python.display().to_string();
        }
    }

    write_template(&path, &options, force)?;
    println!("📝 Created {}", path.display());
    if options.main_file.is_empty() {
        println!("   Set main_file before running `nuitka-forge run`");
    }
    Ok(())
}
