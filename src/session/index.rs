use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use tracing::{debug, warn};

use crate::config::IndexTrust;
use crate::error::{HistoryError, Result};
use crate::models::{SessionIndex, SessionIndexEntry};
use crate::utils::paths::session_index_file_in;

/// Read and parse a `sessions-index.json` file.
pub fn read_session_index(path: &Path) -> Result<SessionIndex> {
    let data = fs::read_to_string(path).map_err(|e| HistoryError::io(path, e))?;
    serde_json::from_str(&data).map_err(|source| HistoryError::MalformedRecord {
        path: path.to_path_buf(),
        line: 1,
        source,
    })
}

/// Load a project's index, treating absence or any read/parse failure as "no index".
pub fn load_index_if_present(project_dir: &Path) -> Option<SessionIndex> {
    let path = session_index_file_in(project_dir);
    match read_session_index(&path) {
        Ok(index) => Some(index),
        Err(HistoryError::Io { source, .. }) if source.kind() == ErrorKind::NotFound => None,
        Err(e) => {
            warn!(error = %e, "Ignoring unreadable session index");
            None
        }
    }
}

/// The index record to use for a session file, if the index may stand in for a scan.
pub(crate) fn usable_record<'a>(
    index: Option<&'a SessionIndex>,
    session_id: &str,
    session_file: &Path,
    trust: IndexTrust,
) -> Option<&'a SessionIndexEntry> {
    let record = index?.get(session_id)?;
    match trust {
        IndexTrust::Blind => Some(record),
        IndexTrust::CheckMtime => {
            if is_stale(record, session_file) {
                debug!(session = session_id, "Index record older than session file, rescanning");
                None
            } else {
                Some(record)
            }
        }
    }
}

/// A record is stale when the file was written after the record's `modified` time.
/// Records without a usable `modified` are treated as stale.
fn is_stale(record: &SessionIndexEntry, session_file: &Path) -> bool {
    let Some(indexed) = record.modified_at() else {
        return true;
    };
    match fs::metadata(session_file).and_then(|m| m.modified()) {
        Ok(mtime) => chrono::DateTime::<chrono::Utc>::from(mtime) > indexed,
        Err(_) => false,
    }
}
