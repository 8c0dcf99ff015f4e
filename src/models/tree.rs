use std::path::PathBuf;

use serde::Serialize;

/// A node in a session's agent hierarchy.
///
/// The root stands for the session itself: its `agent_id` is empty and it carries the
/// `session_id`. Every other node is an agent file; its children are the agents it spawned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentTreeNode {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub agent_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub session_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub agent_type: String,
    pub entry_count: usize,
    pub file_path: PathBuf,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<AgentTreeNode>,
}

impl AgentTreeNode {
    pub fn root(session_id: impl Into<String>, file_path: PathBuf, entry_count: usize) -> Self {
        Self {
            agent_id: String::new(),
            session_id: session_id.into(),
            agent_type: String::new(),
            entry_count,
            file_path,
            children: Vec::new(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.agent_id.is_empty()
    }

    /// Number of nodes below this one, at any depth.
    pub fn descendant_count(&self) -> usize {
        let mut count = 0;
        let mut stack: Vec<&AgentTreeNode> = self.children.iter().collect();
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children.iter());
        }
        count
    }

    /// Depth-first search for an agent by id.
    pub fn find(&self, agent_id: &str) -> Option<&AgentTreeNode> {
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if node.agent_id == agent_id {
                return Some(node);
            }
            stack.extend(node.children.iter());
        }
        None
    }

    /// Sort children by agent id at every level, for stable rendering.
    pub fn sort_children_by_id(&mut self) {
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            node.children.sort_by(|a, b| a.agent_id.cmp(&b.agent_id));
            stack.extend(node.children.iter_mut());
        }
    }
}
