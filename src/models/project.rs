use std::path::PathBuf;

use serde::Serialize;

/// A project directory under `projects/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInfo {
    /// Directory name, the encoded form of the original path.
    pub encoded_name: String,
    /// Original project path: exact when read from the index, a lossy guess otherwise.
    pub project_path: PathBuf,
    pub project_dir: PathBuf,
    pub path_from_index: bool,
}
