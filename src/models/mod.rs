//! Data models for Claude Code session stores.
//!
//! - [`ConversationEntry`] - One JSONL record from a session or agent file
//! - [`Session`] - Summary of a top-level conversation, from the index or a full scan
//! - [`SessionIndex`] - Contents of a project's optional `sessions-index.json`
//! - [`AgentTreeNode`] - Reconstructed agent hierarchy of a session
//! - [`ProjectInfo`] - Discovered project directory
//! - [`AgentMatch`] - A session or agent file found by an agent search
//!
//! Lenient field decoding (nullable fields, numeric timestamps) lives in
//! `parsers::deserializers`.

pub mod agent_match;
pub mod entry;
pub mod project;
pub mod session;
pub mod tree;

pub use agent_match::AgentMatch;
pub use entry::{ConversationEntry, EntryType, MessageContent, ToolUse};
pub use project::ProjectInfo;
pub use session::{Session, SessionIndex, SessionIndexEntry, SessionSource};
pub use tree::AgentTreeNode;
