use std::cmp::Ordering;
use std::path::Path;

use tracing::{debug, warn};

use crate::config::IndexTrust;
use crate::discovery::list_session_files;
use crate::error::{HistoryError, ResourceKind, Result};
use crate::models::{Session, SessionIndex};
use crate::parsers::MalformedPolicy;
use crate::session::index::{load_index_if_present, usable_record};
use crate::session::metadata::{scan_session, summarize_session};
use crate::utils::paths::session_file_in;

/// How sessions are resolved: malformed-line handling for scans, and index trust.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResolveOptions {
    pub malformed: MalformedPolicy,
    pub index_trust: IndexTrust,
}

/// Summary for one session file: the index record when usable, a full scan otherwise.
///
/// The returned id is always `session_id`, whatever the file's records say.
pub fn resolve_session(
    session_file: &Path,
    session_id: &str,
    index: Option<&SessionIndex>,
    options: ResolveOptions,
) -> Result<Session> {
    if let Some(record) = usable_record(index, session_id, session_file, options.index_trust) {
        return Ok(record.to_session(session_file.to_path_buf()));
    }

    let mut session = summarize_session(session_file, options.malformed)?;
    session.id = session_id.to_string();
    Ok(session)
}

/// All sessions of a project, newest first.
///
/// Best effort: a file that can't be read is skipped with a warning, and scanned sessions without
/// any user or assistant entry are left out. Sessions served from the index are kept as-is.
/// Ties on modified time (including missing times, which sort last) are broken by id.
pub fn list_sessions(project_dir: &Path, options: ResolveOptions) -> Result<Vec<Session>> {
    let index = load_index_if_present(project_dir);
    let files = list_session_files(project_dir)?;

    let mut sessions = Vec::with_capacity(files.len());
    for (session_id, path) in files {
        if let Some(record) =
            usable_record(index.as_ref(), &session_id, &path, options.index_trust)
        {
            sessions.push(record.to_session(path));
            continue;
        }

        match scan_session(&path, options.malformed) {
            Ok((mut session, true)) => {
                session.id = session_id;
                sessions.push(session);
            }
            Ok((_, false)) => {
                debug!(session = %session_id, "Skipping session without conversation");
            }
            Err(e) => warn!(session = %session_id, error = %e, "Skipping unreadable session"),
        }
    }

    sessions.sort_by(newest_first);
    Ok(sessions)
}

/// Summary of one named session. Unlike [`list_sessions`], failures are returned.
pub fn find_session(
    project_dir: &Path,
    session_id: &str,
    options: ResolveOptions,
) -> Result<Session> {
    let path = session_file_in(project_dir, session_id);
    if !path.is_file() {
        return Err(HistoryError::not_found(ResourceKind::Session, session_id));
    }
    let index = load_index_if_present(project_dir);
    resolve_session(&path, session_id, index.as_ref(), options)
}

fn newest_first(a: &Session, b: &Session) -> Ordering {
    match (a.modified, b.modified) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| a.id.cmp(&b.id))
}
