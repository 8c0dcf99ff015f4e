use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A session or agent file that satisfied an agent search.
///
/// The top-level session file is reported with an empty `agent_id`. `matched_tools` holds every
/// tool the file used inside the time window, lowercased; `matched_files` holds only the paths
/// that matched the explored-file glob. Both are sorted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentMatch {
    pub agent_id: String,
    pub session_id: String,
    #[serde(rename = "jsonlPath")]
    pub file_path: PathBuf,
    pub entry_count: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub matched_files: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub matched_tools: Vec<String>,
    pub created: Option<DateTime<Utc>>,
    pub modified: Option<DateTime<Utc>>,
}

impl AgentMatch {
    pub fn is_main_session(&self) -> bool {
        self.agent_id.is_empty()
    }
}
