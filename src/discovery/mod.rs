//! Locating projects, sessions and agent files on disk.
//!
//! Listing functions treat a missing directory as empty. Individual entries that cannot be
//! used (symlinks, non-matching names) are skipped, while failures to list an existing
//! directory are returned to the caller.

pub mod agents;
pub mod projects;
pub mod sessions;

use std::fs;
use std::path::Path;

pub use agents::{AgentListing, DiscoveredAgent, discover_agents};
pub use projects::discover_projects;
pub use sessions::list_session_files;

pub(crate) fn is_symlink(path: &Path) -> bool {
    fs::symlink_metadata(path).map(|m| m.file_type().is_symlink()).unwrap_or(false)
}
