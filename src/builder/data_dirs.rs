//! Resolution of `--include-data-dir` entries
//!
//! Entries are `source=destination`. Relative sources are anchored at the
//! directory holding the entry script; entries whose source does not exist are
//! dropped with a warning instead of failing the whole build.

use std::path::{Component, Path, PathBuf};

use crate::builder::lists::split_list;

/// A data directory entry that passed resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataDirMapping {
    pub source: PathBuf,
    pub destination: String,
}

impl DataDirMapping {
    pub fn token(&self) -> String {
        format!(
            "--include-data-dir={}={}",
            self.source.display(),
            self.destination
        )
    }
}

/// Resolves every entry of the comma-separated field, skipping missing sources
pub fn resolve_data_dirs(field: &str, main_file: &str) -> Vec<DataDirMapping> {
    let base_dir = Path::new(main_file)
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();

    split_list(field)
        .into_iter()
        .filter_map(|entry| resolve_entry(entry, &base_dir))
        .collect()
}

fn resolve_entry(entry: &str, base_dir: &Path) -> Option<DataDirMapping> {
    let (source, destination) = match entry.split_once('=') {
        Some((source, destination)) => (source.trim(), destination.trim().to_string()),
        None => (entry, default_destination(entry)),
    };

    if source.is_empty() {
        log::warn!("Ignoring data directory entry without a source: {}", entry);
        return None;
    }

    let source_path = Path::new(source);
    let resolved = if source_path.is_absolute() {
        normalize(source_path)
    } else {
        normalize(&base_dir.join(source_path))
    };

    if !resolved.exists() {
        log::warn!("Resource path does not exist: {}", resolved.display());
        return None;
    }

    log::info!(
        "Added include directory: {} -> {}",
        resolved.display(),
        destination
    );
    log::debug!("Original input: {}", entry);

    Some(DataDirMapping {
        source: resolved,
        destination,
    })
}

/// Last path segment of the source, ignoring trailing separators
fn default_destination(source: &str) -> String {
    Path::new(source)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| source.trim_end_matches(['/', '\\']).to_string())
}

/// Drops `.` segments so `./assets` resolves to `<base>/assets`
fn normalize(path: &Path) -> PathBuf {
    path.components()
        .filter(|component| !matches!(component, Component::CurDir))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn project_with_assets() -> (TempDir, String) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        fs::create_dir_all(temp_dir.path().join("assets")).unwrap();
        fs::create_dir_all(temp_dir.path().join("data/icons")).unwrap();
        let main_file = temp_dir.path().join("app.py");
        fs::write(&main_file, "print('hi')\n").unwrap();
        (temp_dir, main_file.to_string_lossy().into_owned())
    }

    #[test]
    fn test_destination_defaults_to_basename() {
        let (temp_dir, main_file) = project_with_assets();

        let mappings = resolve_data_dirs("assets", &main_file);
        assert_eq!(mappings.len(), 1);
        assert_eq!(mappings[0].destination, "assets");
        assert_eq!(mappings[0].source, temp_dir.path().join("assets"));
    }

    #[test]
    fn test_explicit_destination_and_dot_prefix() {
        let (temp_dir, main_file) = project_with_assets();

        let mappings = resolve_data_dirs("./data/icons=share/icons", &main_file);
        assert_eq!(mappings.len(), 1);
        assert_eq!(mappings[0].source, temp_dir.path().join("data").join("icons"));
        assert_eq!(mappings[0].destination, "share/icons");
    }

    #[test]
    fn test_missing_entries_are_skipped() {
        let (_temp_dir, main_file) = project_with_assets();

        let mappings = resolve_data_dirs("missing, assets, /definitely/not/here", &main_file);
        assert_eq!(mappings.len(), 1);
        assert_eq!(mappings[0].destination, "assets");
    }

    #[test]
    fn test_absolute_source_is_kept() {
        let (temp_dir, main_file) = project_with_assets();
        let absolute = temp_dir.path().join("assets");
        let field = format!("{}=bundle", absolute.display());

        let mappings = resolve_data_dirs(&field, &main_file);
        assert_eq!(mappings.len(), 1);
        assert_eq!(mappings[0].source, absolute);
        assert_eq!(
            mappings[0].token(),
            format!("--include-data-dir={}=bundle", absolute.display())
        );
    }

    #[test]
    fn test_default_destination_with_trailing_slash() {
        assert_eq!(default_destination("assets/"), "assets");
        assert_eq!(default_destination("./res/images"), "images");
    }
}
