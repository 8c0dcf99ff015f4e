use std::io::{self, Write};
use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use super::{Format, write_json};
use crate::models::AgentMatch;

const MAIN_SESSION_LIST: &str = "(main session)";
const MAIN_SESSION_JSON: &str = "(main)";

#[derive(Serialize)]
struct AgentMatchesJson<'a> {
    agents: &'a [AgentMatch],
}

/// Search results as a counted block per file, or `{"agents": [...]}` in JSON.
///
/// The top-level session file is labelled `(main session)` in the list and `(main)` in JSON.
pub fn write_agent_matches<W: Write>(
    w: &mut W,
    matches: &[AgentMatch],
    format: Format,
) -> io::Result<()> {
    if format == Format::Json {
        let labelled: Vec<AgentMatch> = matches
            .iter()
            .cloned()
            .map(|mut found| {
                if found.is_main_session() {
                    found.agent_id = MAIN_SESSION_JSON.to_string();
                }
                found
            })
            .collect();
        return write_json(w, &AgentMatchesJson { agents: &labelled });
    }

    writeln!(w, "Found {} matching agents:", matches.len())?;
    writeln!(w)?;
    for found in matches {
        let agent =
            if found.is_main_session() { MAIN_SESSION_LIST } else { found.agent_id.as_str() };
        writeln!(w, "Agent: {}", agent)?;
        writeln!(w, "  Session: {}", found.session_id)?;
        writeln!(w, "  Path: {}", found.file_path.display())?;
        writeln!(w, "  Entries: {}", found.entry_count)?;
        if !found.matched_files.is_empty() {
            writeln!(w, "  Files: {}", found.matched_files.join(", "))?;
        }
        if !found.matched_tools.is_empty() {
            let tools: Vec<String> = found.matched_tools.iter().map(|t| capitalize(t)).collect();
            writeln!(w, "  Tools: {}", tools.join(", "))?;
        }
        writeln!(w, "  Created: {}", instant(found.created))?;
        writeln!(w)?;
    }
    Ok(())
}

#[derive(Serialize)]
struct ResolvedPath<'a> {
    path: &'a Path,
    exists: bool,
}

/// A resolved store path: the bare path, or `{"path", "exists"}` in JSON.
pub fn write_resolved_path<W: Write>(w: &mut W, path: &Path, format: Format) -> io::Result<()> {
    if format == Format::Json {
        return write_json(w, &ResolvedPath { path, exists: path.exists() });
    }
    writeln!(w, "{}", path.display())
}

fn instant(ts: Option<DateTime<Utc>>) -> String {
    ts.map(|ts| ts.to_rfc3339_opts(SecondsFormat::Secs, true)).unwrap_or_else(|| "-".to_string())
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
