//! Shared test utilities for integration tests
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Value, json};
use tempfile::TempDir;

pub const SESSION_A: &str = "679761ba-80c0-4cd3-a586-cc6a1fc56308";
pub const SESSION_B: &str = "cd2e9388-3108-40e5-b41b-79497cbb58b4";
pub const PROJECT_PATH: &str = "/work/app";
pub const PROJECT_NAME: &str = "-work-app";

/// Builder for a fake home directory holding a `.claude` store
pub struct ClaudeDirBuilder {
    home: TempDir,
}

impl ClaudeDirBuilder {
    /// Create a new builder with an empty `.claude` directory
    pub fn new() -> Self {
        let home = TempDir::new().expect("Failed to create temp dir");
        fs::create_dir(home.path().join(".claude")).expect("Failed to create .claude dir");
        Self { home }
    }

    /// Directory to use as `HOME`
    pub fn home(&self) -> &Path {
        self.home.path()
    }

    /// Store root (`<home>/.claude`)
    pub fn path(&self) -> PathBuf {
        self.home.path().join(".claude")
    }

    pub fn project_dir(&self, encoded_name: &str) -> PathBuf {
        self.path().join("projects").join(encoded_name)
    }

    /// Add an empty project directory
    pub fn with_project(self, encoded_name: &str) -> Self {
        fs::create_dir_all(self.project_dir(encoded_name)).expect("Failed to create project dir");
        self
    }

    /// Add a top-level session file. Entries are stamped with `session_id`.
    pub fn with_session(
        self,
        encoded_name: &str,
        session_id: &str,
        entries: &[EntryBuilder],
    ) -> Self {
        let path = self.project_dir(encoded_name).join(format!("{}.jsonl", session_id));
        write_entries(&path, &stamped(entries, session_id));
        self
    }

    /// Add an agent file. `chain` lists the owning agents from the outermost down, ending with
    /// the agent itself, e.g. `["a1", "b1"]` writes `subagents/agent-a1/subagents/agent-b1.jsonl`.
    pub fn with_agent(
        self,
        encoded_name: &str,
        session_id: &str,
        chain: &[&str],
        entries: &[EntryBuilder],
    ) -> Self {
        let path = agent_path(&self.project_dir(encoded_name).join(session_id), chain);
        write_entries(&path, &stamped(entries, session_id));
        self
    }

    /// Write `sessions-index.json` for a project
    pub fn with_index(self, encoded_name: &str, index: Value) -> Self {
        let dir = self.project_dir(encoded_name);
        fs::create_dir_all(&dir).expect("Failed to create project dir");
        fs::write(dir.join("sessions-index.json"), index.to_string())
            .expect("Failed to write index");
        self
    }

    /// Write an arbitrary file relative to a project directory
    pub fn with_raw_file(self, encoded_name: &str, relative: &str, content: &str) -> Self {
        let path = self.project_dir(encoded_name).join(relative);
        fs::create_dir_all(path.parent().expect("file has a parent"))
            .expect("Failed to create parent dir");
        fs::write(path, content).expect("Failed to write file");
        self
    }

    /// Build and return the temp home directory (consumes self)
    pub fn build(self) -> TempDir {
        self.home
    }
}

impl Default for ClaudeDirBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Location of an agent file under a session directory for an ownership chain.
pub fn agent_path(session_dir: &Path, chain: &[&str]) -> PathBuf {
    let (agent, owners) = chain.split_last().expect("chain names at least the agent");
    let mut dir = session_dir.join("subagents");
    for owner in owners {
        dir = dir.join(format!("agent-{}", owner)).join("subagents");
    }
    dir.join(format!("agent-{}.jsonl", agent))
}

fn stamped(entries: &[EntryBuilder], session_id: &str) -> Vec<EntryBuilder> {
    entries.iter().cloned().map(|e| e.session_id(session_id)).collect()
}

pub fn write_entries(path: &Path, entries: &[EntryBuilder]) {
    fs::create_dir_all(path.parent().expect("file has a parent")).expect("Failed to create dir");
    let content = entries.iter().map(|e| e.to_json()).collect::<Vec<_>>().join("\n");
    fs::write(path, content).expect("Failed to write entries");
}

/// Builder for JSONL conversation records
#[derive(Clone)]
pub struct EntryBuilder {
    entry_type: String,
    uuid: String,
    session_id: String,
    agent_id: Option<String>,
    timestamp: String,
    text: Option<String>,
    tools: Vec<(String, Value)>,
    is_sidechain: bool,
}

impl EntryBuilder {
    pub fn of_type(entry_type: &str) -> Self {
        Self {
            entry_type: entry_type.to_string(),
            uuid: uuid::Uuid::new_v4().to_string(),
            session_id: SESSION_A.to_string(),
            agent_id: None,
            timestamp: "2026-01-15T10:00:00Z".to_string(),
            text: None,
            tools: Vec::new(),
            is_sidechain: false,
        }
    }

    pub fn user() -> Self {
        Self::of_type("user")
    }

    pub fn assistant() -> Self {
        Self::of_type("assistant")
    }

    pub fn system() -> Self {
        Self::of_type("system")
    }

    pub fn text(mut self, text: &str) -> Self {
        self.text = Some(text.to_string());
        self
    }

    /// Add a tool_use block with the given input
    pub fn tool(mut self, name: &str, input: Value) -> Self {
        self.tools.push((name.to_string(), input));
        self
    }

    pub fn timestamp(mut self, timestamp: &str) -> Self {
        self.timestamp = timestamp.to_string();
        self
    }

    pub fn session_id(mut self, session_id: &str) -> Self {
        self.session_id = session_id.to_string();
        self
    }

    pub fn uuid(mut self, uuid: &str) -> Self {
        self.uuid = uuid.to_string();
        self
    }

    pub fn agent_id(mut self, agent_id: &str) -> Self {
        self.agent_id = Some(agent_id.to_string());
        self
    }

    pub fn sidechain(mut self) -> Self {
        self.is_sidechain = true;
        self
    }

    pub fn to_value(&self) -> Value {
        let mut record = json!({
            "type": self.entry_type,
            "uuid": self.uuid,
            "sessionId": self.session_id,
            "timestamp": self.timestamp,
            "isSidechain": self.is_sidechain,
        });

        if let Some(agent_id) = &self.agent_id {
            record["agentId"] = json!(agent_id);
        }

        if self.text.is_some() || !self.tools.is_empty() {
            let mut blocks = Vec::new();
            if let Some(text) = &self.text {
                blocks.push(json!({"type": "text", "text": text}));
            }
            for (i, (name, input)) in self.tools.iter().enumerate() {
                blocks.push(json!({
                    "type": "tool_use",
                    "id": format!("toolu_{}", i),
                    "name": name,
                    "input": input,
                }));
            }
            record["message"] = json!({"role": self.entry_type, "content": blocks});
        }

        record
    }

    pub fn to_json(&self) -> String {
        self.to_value().to_string()
    }
}

/// `count` user entries one minute apart, starting at 10:00.
pub fn user_entries(count: usize) -> Vec<EntryBuilder> {
    (0..count)
        .map(|i| {
            EntryBuilder::user()
                .text(&format!("message {}", i))
                .timestamp(&format!("2026-01-15T{:02}:{:02}:00Z", 10 + i / 60, i % 60))
        })
        .collect()
}

/// A store with one project holding two sessions; session A has a two-level agent tree.
pub fn realistic_claude_dir() -> ClaudeDirBuilder {
    ClaudeDirBuilder::new()
        .with_session(
            PROJECT_NAME,
            SESSION_A,
            &[
                EntryBuilder::system().timestamp("2026-01-15T09:59:00Z"),
                EntryBuilder::user().text("Refactor the parser").timestamp("2026-01-15T10:00:00Z"),
                EntryBuilder::assistant()
                    .text("Running tests")
                    .tool("Bash", json!({"command": "cargo test"}))
                    .timestamp("2026-01-15T10:01:00Z"),
                EntryBuilder::user().text("Thanks").timestamp("2026-01-15T10:02:00Z"),
            ],
        )
        .with_agent(
            PROJECT_NAME,
            SESSION_A,
            &["a1"],
            &[
                EntryBuilder::user().agent_id("a1").text("Explore the parser").sidechain(),
                EntryBuilder::assistant()
                    .agent_id("a1")
                    .tool("Read", json!({"file_path": "/work/app/src/parser.rs"}))
                    .sidechain(),
            ],
        )
        .with_agent(
            PROJECT_NAME,
            SESSION_A,
            &["a1", "b1"],
            &[EntryBuilder::user().agent_id("b1").text("Nested task").sidechain()],
        )
        .with_agent(
            PROJECT_NAME,
            SESSION_A,
            &["aexplore-c2"],
            &[EntryBuilder::user().agent_id("aexplore-c2").text("Look around").sidechain()],
        )
        .with_session(
            PROJECT_NAME,
            SESSION_B,
            &[
                EntryBuilder::user().text("Older session").timestamp("2026-01-14T08:00:00Z"),
                EntryBuilder::assistant().text("Hello").timestamp("2026-01-14T08:01:00Z"),
            ],
        )
}
