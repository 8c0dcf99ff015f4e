use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{HistoryError, Result};
use crate::utils::paths::{JSONL_EXTENSION, is_encoded_path, looks_like_uuid};

/// Session files directly inside a project directory, keyed by session id.
///
/// A `<name>.jsonl` file is a session when `<name>` is UUID-shaped and not an encoded path.
/// A missing project directory yields an empty map; other I/O failures propagate.
pub fn list_session_files(project_dir: &Path) -> Result<BTreeMap<String, PathBuf>> {
    let entries = match fs::read_dir(project_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
        Err(e) => return Err(HistoryError::io(project_dir, e)),
    };

    let mut sessions = BTreeMap::new();
    for entry in entries {
        let entry = entry.map_err(|e| HistoryError::io(project_dir, e))?;
        let file_type = entry.file_type().map_err(|e| HistoryError::io(entry.path(), e))?;
        if file_type.is_dir() {
            continue;
        }

        let name = entry.file_name().to_string_lossy().into_owned();
        let Some(session_id) = name.strip_suffix(JSONL_EXTENSION) else {
            continue;
        };
        if !is_encoded_path(session_id) && looks_like_uuid(session_id) {
            sessions.insert(session_id.to_string(), entry.path());
        }
    }

    Ok(sessions)
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_only_uuid_named_jsonl_files_are_sessions() {
        let project = TempDir::new().unwrap();
        for name in [
            "679761ba-80c0-4cd3-a586-cc6a1fc56308.jsonl",
            "not-a-uuid.jsonl",
            "sessions-index.json",
            "679761ba-80c0-4cd3-a586-cc6a1fc56309.txt",
        ] {
            fs::write(project.path().join(name), b"").unwrap();
        }
        fs::create_dir(project.path().join("679761ba-80c0-4cd3-a586-cc6a1fc56308")).unwrap();

        let sessions = list_session_files(project.path()).unwrap();
        let ids: Vec<&str> = sessions.keys().map(|k| k.as_str()).collect();
        assert_eq!(ids, vec!["679761ba-80c0-4cd3-a586-cc6a1fc56308"]);
        assert_eq!(
            sessions["679761ba-80c0-4cd3-a586-cc6a1fc56308"],
            project.path().join("679761ba-80c0-4cd3-a586-cc6a1fc56308.jsonl")
        );
    }

    #[test]
    fn test_encoded_looking_names_are_not_sessions() {
        let project = TempDir::new().unwrap();
        // 36 chars with hyphens in UUID positions, but starts with '-'
        fs::write(project.path().join("-79761ba-80c0-4cd3-a586-cc6a1fc56308.jsonl"), b"").unwrap();

        assert!(list_session_files(project.path()).unwrap().is_empty());
    }

    #[test]
    fn test_missing_project_dir_is_empty() {
        let project = TempDir::new().unwrap();
        let sessions = list_session_files(&project.path().join("absent")).unwrap();
        assert!(sessions.is_empty());
    }
}
