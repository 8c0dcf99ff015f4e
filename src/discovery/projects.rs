use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use tracing::warn;

use crate::discovery::is_symlink;
use crate::error::{HistoryError, Result};
use crate::models::ProjectInfo;
use crate::session::load_index_if_present;
use crate::utils::paths::{PROJECTS_DIR, decode_path, is_encoded_path};

/// Discover all project directories in `<root>/projects/`
///
/// Only directories whose names are encoded paths count as projects. The original project path is
/// read from the project's `sessions-index.json` when one is readable, otherwise it is decoded
/// from the directory name (lossy).
///
/// Returns an empty Vec if the projects directory doesn't exist (not an error). Results are sorted
/// by encoded name.
///
/// # Errors
///
/// Returns an error if the projects directory exists but cannot be listed. Symlinked project
/// directories are skipped with a warning.
pub fn discover_projects(store_root: &Path) -> Result<Vec<ProjectInfo>> {
    let projects_dir = store_root.join(PROJECTS_DIR);

    let entries = match fs::read_dir(&projects_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(HistoryError::io(&projects_dir, e)),
    };

    let mut projects = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| HistoryError::io(&projects_dir, e))?;
        let path = entry.path();

        if !path.is_dir() {
            continue;
        }

        let encoded_name = entry.file_name().to_string_lossy().into_owned();
        if !is_encoded_path(&encoded_name) {
            continue;
        }

        if is_symlink(&path) {
            warn!(project = %encoded_name, "Skipping project directory (symlink not allowed)");
            continue;
        }

        let indexed_path = load_index_if_present(&path)
            .and_then(|index| index.project_path().map(|p| p.to_string()));
        let path_from_index = indexed_path.is_some();
        let project_path = match indexed_path {
            Some(p) => p.into(),
            None => decode_path(&encoded_name),
        };

        projects.push(ProjectInfo {
            encoded_name,
            project_path,
            project_dir: path,
            path_from_index,
        });
    }

    projects.sort_by(|a, b| a.encoded_name.cmp(&b.encoded_name));
    Ok(projects)
}
