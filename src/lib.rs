//! Claude History - Read-only access to Claude Code's on-disk session store
//!
//! Claude Code records every conversation under `~/.claude/projects/` as JSONL files. Sessions
//! that spawn sub-agents get a `subagents` directory, and agents can spawn agents of their own to
//! any depth. This library:
//!
//! - Maps project paths to their encoded storage directories
//! - Streams entries from session and agent files, with an early-stop scan mode
//! - Summarizes sessions, preferring the per-project `sessions-index.json` cache
//! - Discovers agent files at any nesting depth and rebuilds the agent hierarchy
//! - Filters entries by time window, type, agent and tool usage
//! - Finds the sessions and agents that touched given files or used given tools
//!
//! Nothing here ever writes to the store.
//!
//! # Example
//!
//! ```no_run
//! use claude_history::{HistoryStore, StoreConfig};
//!
//! let store = HistoryStore::new(StoreConfig::resolve(None)?);
//! let project_dir = store.project_dir("/Users/alice/code/app")?;
//! for session in store.list_sessions(&project_dir)? {
//!     println!("{} ({} messages)", session.id, session.message_count);
//! }
//! # Ok::<(), claude_history::HistoryError>(())
//! ```

pub mod cli;
pub mod config;
pub mod discovery;
pub mod error;
pub mod filters;
pub mod models;
pub mod output;
pub mod parsers;
pub mod session;
pub mod store;
pub mod tree;
pub mod utils;

// Re-export commonly used types
pub use config::{IndexTrust, StoreConfig};
pub use error::{HistoryError, ResourceKind, Result};
pub use filters::{FilterOptions, apply_filters};
pub use models::{AgentMatch, AgentTreeNode, ConversationEntry, EntryType, Session};
pub use parsers::{MalformedPolicy, ScanControl, ScanOutcome, read_entries, scan_entries};
pub use store::{HistoryStore, QueryScope};
pub use utils::paths::{decode_path, encode_path, format_path_with_tilde};
