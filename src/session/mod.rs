//! Session summaries, the optional `sessions-index.json` cache, and id lookup.
//!
//! A session is summarized from its index record when one exists, and by streaming its file
//! otherwise. Bulk listing absorbs per-file failures; lookups of a named session do not.

pub mod index;
pub mod listing;
pub mod metadata;
pub mod resolve;

pub use index::{load_index_if_present, read_session_index};
pub use listing::{ResolveOptions, find_session, list_sessions, resolve_session};
pub use metadata::{MAX_PROMPT_CHARS, has_conversation, summarize_session, truncate_prompt};
pub use resolve::{resolve_agent_prefix, resolve_session_prefix};
