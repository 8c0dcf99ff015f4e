use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{HistoryError, Result};
use crate::utils::paths::{AGENT_FILE_PREFIX, SUBAGENTS_DIR, agent_id_from_file_name};

/// One `agent-<id>.jsonl` file found under a session's `subagents` tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredAgent {
    pub agent_id: String,
    pub path: PathBuf,
    /// Owning agent, or `None` when the file sits directly under the session's `subagents` dir.
    pub parent_id: Option<String>,
    /// 1 for first-level agents, 2 for their spawns, and so on.
    pub depth: usize,
}

/// Every agent file reachable from a session, in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgentListing {
    agents: Vec<DiscoveredAgent>,
}

impl AgentListing {
    pub fn agents(&self) -> &[DiscoveredAgent] {
        &self.agents
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn get(&self, agent_id: &str) -> Option<&DiscoveredAgent> {
        self.agents.iter().find(|a| a.agent_id == agent_id)
    }

    /// Flat id → file map. If an id appears twice, the first occurrence wins.
    pub fn paths(&self) -> HashMap<String, PathBuf> {
        let mut map = HashMap::with_capacity(self.agents.len());
        for agent in &self.agents {
            map.entry(agent.agent_id.clone()).or_insert_with(|| agent.path.clone());
        }
        map
    }

    pub fn children_of<'a>(
        &'a self,
        parent_id: Option<&'a str>,
    ) -> impl Iterator<Item = &'a DiscoveredAgent> + 'a {
        self.agents.iter().filter(move |a| a.parent_id.as_deref() == parent_id)
    }

    pub fn into_agents(self) -> Vec<DiscoveredAgent> {
        self.agents
    }
}

impl From<Vec<DiscoveredAgent>> for AgentListing {
    fn from(agents: Vec<DiscoveredAgent>) -> Self {
        Self { agents }
    }
}

struct PendingDir {
    dir: PathBuf,
    owner: Option<String>,
    depth: usize,
}

/// Find every agent file under `session_dir/subagents`, at any nesting depth.
///
/// A directory `<X>` inside a `subagents` dir that itself holds a `subagents` dir contributes the
/// agents spawned by the agent named by `<X>` (with any `agent-` prefix removed). Traversal uses an
/// explicit work stack, so depth is bounded only by the file system. Entries are visited in name
/// order, which makes the listing deterministic.
///
/// A missing `subagents` dir yields an empty listing. Symlinks are never followed. A directory
/// that disappears mid-walk is skipped; any other I/O failure is returned.
pub fn discover_agents(session_dir: &Path) -> Result<AgentListing> {
    let mut agents = Vec::new();
    let mut stack =
        vec![PendingDir { dir: session_dir.join(SUBAGENTS_DIR), owner: None, depth: 1 }];

    while let Some(PendingDir { dir, owner, depth }) = stack.pop() {
        let Some(names) = sorted_entries(&dir)? else {
            continue;
        };

        let mut nested = Vec::new();
        for (name, path, file_type) in names {
            if file_type.is_symlink() {
                warn!(path = %path.display(), "Skipping symlink in subagents tree");
                continue;
            }

            if file_type.is_file() {
                if let Some(agent_id) = agent_id_from_file_name(&name) {
                    agents.push(DiscoveredAgent {
                        agent_id: agent_id.to_string(),
                        path,
                        parent_id: owner.clone(),
                        depth,
                    });
                }
            } else if file_type.is_dir() {
                let child_subagents = path.join(SUBAGENTS_DIR);
                if child_subagents.is_dir() {
                    let owner_id = name.strip_prefix(AGENT_FILE_PREFIX).unwrap_or(&name);
                    nested.push(PendingDir {
                        dir: child_subagents,
                        owner: Some(owner_id.to_string()),
                        depth: depth + 1,
                    });
                }
            }
        }

        // Reversed so the lowest name is popped first.
        stack.extend(nested.into_iter().rev());
    }

    debug!(session_dir = %session_dir.display(), count = agents.len(), "Discovered agent files");
    Ok(AgentListing { agents })
}

/// Directory entries sorted by name, or `None` if the directory does not exist.
fn sorted_entries(dir: &Path) -> Result<Option<Vec<(String, PathBuf, fs::FileType)>>> {
    let read = match fs::read_dir(dir) {
        Ok(read) => read,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(HistoryError::io(dir, e)),
    };

    let mut entries = Vec::new();
    for entry in read {
        let entry = entry.map_err(|e| HistoryError::io(dir, e))?;
        let file_type = match entry.file_type() {
            Ok(file_type) => file_type,
            Err(e) if e.kind() == ErrorKind::NotFound => continue,
            Err(e) => return Err(HistoryError::io(entry.path(), e)),
        };
        entries.push((entry.file_name().to_string_lossy().into_owned(), entry.path(), file_type));
    }
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(Some(entries))
}
