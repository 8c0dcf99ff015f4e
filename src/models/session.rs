use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a [`Session`] summary came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionSource {
    Index,
    Scan,
}

/// Summary of one top-level conversation.
///
/// `created` and `modified` are `None` when the file has no entries or the timestamps
/// don't parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(rename = "sessionId")]
    pub id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub project_path: String,
    #[serde(rename = "fullPath")]
    pub file_path: PathBuf,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub first_prompt: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub summary: String,
    pub message_count: usize,
    pub created: Option<DateTime<Utc>>,
    pub modified: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub git_branch: String,
    pub is_sidechain: bool,
    pub source: SessionSource,
}

/// One record of `sessions-index.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionIndexEntry {
    pub session_id: String,
    #[serde(default)]
    pub full_path: String,
    #[serde(default)]
    pub project_path: String,
    #[serde(default)]
    pub first_prompt: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub message_count: usize,
    #[serde(default)]
    pub created: String,
    #[serde(default)]
    pub modified: String,
    #[serde(default)]
    pub git_branch: String,
    #[serde(default)]
    pub is_sidechain: bool,
}

impl SessionIndexEntry {
    pub fn modified_at(&self) -> Option<DateTime<Utc>> {
        parse_instant(&self.modified)
    }

    /// Convert to a [`Session`]; `fallback_path` is used when the record has no `fullPath`.
    pub fn to_session(&self, fallback_path: PathBuf) -> Session {
        let file_path =
            if self.full_path.is_empty() { fallback_path } else { PathBuf::from(&self.full_path) };

        Session {
            id: self.session_id.clone(),
            project_path: self.project_path.clone(),
            file_path,
            first_prompt: self.first_prompt.clone(),
            summary: self.summary.clone(),
            message_count: self.message_count,
            created: parse_instant(&self.created),
            modified: parse_instant(&self.modified),
            git_branch: self.git_branch.clone(),
            is_sidechain: self.is_sidechain,
            source: SessionSource::Index,
        }
    }
}

/// Contents of a project's `sessions-index.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionIndex {
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub entries: Vec<SessionIndexEntry>,
}

impl SessionIndex {
    pub fn get(&self, session_id: &str) -> Option<&SessionIndexEntry> {
        self.entries.iter().find(|e| e.session_id == session_id)
    }

    /// Original project path, taken from the first record that carries one.
    pub fn project_path(&self) -> Option<&str> {
        self.entries.iter().map(|e| e.project_path.as_str()).find(|p| !p.is_empty())
    }
}

fn parse_instant(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value).ok().map(|ts| ts.with_timezone(&Utc))
}
