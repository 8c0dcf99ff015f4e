use std::path::Path;

use crate::discovery::{AgentListing, list_session_files};
use crate::error::{HistoryError, ResourceKind, Result};

/// Expand a session id prefix to the one session file it names.
///
/// Matching is case-sensitive on file names only, so empty or malformed sessions still resolve.
pub fn resolve_session_prefix(project_dir: &Path, prefix: &str) -> Result<String> {
    let files = list_session_files(project_dir)?;
    resolve_prefix(ResourceKind::Session, prefix, files.keys().map(String::as_str))
}

/// Expand an agent id prefix against every agent discovered for a session.
pub fn resolve_agent_prefix(listing: &AgentListing, prefix: &str) -> Result<String> {
    let ids = listing.agents().iter().map(|a| a.agent_id.as_str());
    resolve_prefix(ResourceKind::Agent, prefix, ids)
}

/// An exact match always wins; otherwise exactly one id may start with `prefix`.
pub(crate) fn resolve_prefix<'a>(
    kind: ResourceKind,
    prefix: &str,
    ids: impl Iterator<Item = &'a str>,
) -> Result<String> {
    if prefix.is_empty() {
        return Err(HistoryError::not_found(kind, prefix));
    }

    let mut candidates: Vec<&str> = Vec::new();
    for id in ids {
        if id == prefix {
            return Ok(id.to_string());
        }
        if id.starts_with(prefix) && !candidates.contains(&id) {
            candidates.push(id);
        }
    }

    match candidates.as_slice() {
        [] => Err(HistoryError::not_found(kind, prefix)),
        [only] => Ok(only.to_string()),
        _ => {
            candidates.sort_unstable();
            Err(HistoryError::AmbiguousPrefix {
                kind,
                prefix: prefix.to_string(),
                candidates: candidates.into_iter().map(String::from).collect(),
            })
        }
    }
}
