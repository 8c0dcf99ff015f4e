//! Reconstruction of a session's agent hierarchy.
//!
//! The root node stands for the session itself; every agent file found by
//! [`discover_agents`](crate::discovery::discover_agents) becomes one node below it.

pub mod builder;

use std::path::{Path, PathBuf};

pub use builder::{build_agent_tree, build_session_tree};

use crate::discovery::discover_agents;
use crate::error::{HistoryError, ResourceKind, Result};

const AGENT_TYPE_PREFIXES: &[(&str, &str)] =
    &[("aprompt_suggestion-", "prompt_suggestion"), ("aexplore-", "explore")];

/// Agent type encoded in an agent id prefix, or `""` when the id carries none.
pub fn agent_type(agent_id: &str) -> &'static str {
    AGENT_TYPE_PREFIXES
        .iter()
        .find(|(prefix, _)| agent_id.starts_with(prefix))
        .map_or("", |(_, kind)| kind)
}

/// Locate an agent's file anywhere under a session directory.
pub fn find_agent_file(session_dir: &Path, agent_id: &str) -> Result<PathBuf> {
    discover_agents(session_dir)?
        .get(agent_id)
        .map(|agent| agent.path.clone())
        .ok_or_else(|| HistoryError::not_found(ResourceKind::Agent, agent_id))
}
