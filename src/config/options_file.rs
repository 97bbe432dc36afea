//! Per-project options file (`nuitka-forge.toml`)

use std::path::{Path, PathBuf};

use crate::errors::{ForgeError, Result};
use crate::models::PackageOptions;

/// File looked up in the working directory when `--options` is not given
pub const DEFAULT_OPTIONS_FILE: &str = "nuitka-forge.toml";

pub fn load_options(path: &Path) -> Result<PackageOptions> {
    let content = std::fs::read_to_string(path)?;
    let options: PackageOptions = toml::from_str(&content)
        .map_err(|e| ForgeError::Config(format!("{}: {}", path.display(), e)))?;
    Ok(options.normalized())
}

/// Loads the explicit file, or the default one if present, else empty options
pub fn load_options_or_default(explicit: Option<&Path>) -> Result<(PackageOptions, Option<PathBuf>)> {
    if let Some(path) = explicit {
        return Ok((load_options(path)?, Some(path.to_path_buf())));
    }

    let default_path = PathBuf::from(DEFAULT_OPTIONS_FILE);
    if default_path.exists() {
        let options = load_options(&default_path)?;
        Ok((options, Some(default_path)))
    } else {
        Ok((PackageOptions::default(), None))
    }
}

pub fn save_options(path: &Path, options: &PackageOptions) -> Result<()> {
    let content = toml::to_string_pretty(options)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Writes a starter options file; refuses to clobber unless `force` is set
pub fn write_template(path: &Path, options: &PackageOptions, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(ForgeError::Config(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }
    save_options(path, options)?;
    log::info!("📝 Wrote options file {}", path.display());
    Ok(())
}
