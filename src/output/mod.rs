//! Text, JSON and Graphviz renderings of store data.
//!
//! Renderers write to any [`io::Write`] and never sort or filter beyond what their docs say, with
//! one exception: tree renderers show children ordered by agent id.

pub mod agents;
pub mod entries;
pub mod listing;
pub mod tree;

use std::io::{self, Write};

use clap::ValueEnum;
use serde::Serialize;

pub use agents::{write_agent_matches, write_resolved_path};
pub use entries::{write_entries, write_entry_list, write_entry_summary};
pub use listing::{write_projects, write_sessions};
pub use tree::{write_tree, write_tree_ascii, write_tree_dot};

/// Output format selected with `--format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// One line per item (a bare path for `resolve`)
    List,
    /// Pretty-printed JSON
    Json,
    /// Counts by type and time range (entries only)
    Summary,
    /// Indented tree (trees only)
    Ascii,
    /// Graphviz digraph (trees only)
    Dot,
}

/// Pretty JSON followed by a newline.
pub fn write_json<W: Write, T: Serialize + ?Sized>(w: &mut W, value: &T) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *w, value)?;
    writeln!(w)
}

/// Cut `text` to `limit` characters, marking the cut with `...`. A limit of 0 disables the cut.
pub(crate) fn clip(text: &str, limit: usize) -> String {
    if limit == 0 {
        return text.to_string();
    }
    match text.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
