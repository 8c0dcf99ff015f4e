use std::io::{self, Write};

use chrono::SecondsFormat;

use super::{Format, clip, write_json};
use crate::filters::count_by_type;
use crate::models::ConversationEntry;

/// Render entries; `limit` caps the text shown per entry in list form (0 = no cap).
pub fn write_entries<W: Write>(
    w: &mut W,
    entries: &[ConversationEntry],
    format: Format,
    limit: usize,
) -> io::Result<()> {
    match format {
        Format::Json => write_json(w, entries),
        Format::Summary => write_entry_summary(w, entries),
        _ => write_entry_list(w, entries, limit),
    }
}

/// `[HH:MM:SS] type: text` per entry, with tool calls noted when there is no text.
pub fn write_entry_list<W: Write>(
    w: &mut W,
    entries: &[ConversationEntry],
    limit: usize,
) -> io::Result<()> {
    for entry in entries {
        let time = entry
            .parsed_timestamp()
            .map(|ts| ts.format("%H:%M:%S").to_string())
            .unwrap_or_else(|| "--:--:--".to_string());

        let mut text = entry.text_content();
        if text.is_empty() {
            let tools: Vec<String> = entry.tool_uses().into_iter().map(|t| t.name).collect();
            if !tools.is_empty() {
                text = format!("[tools: {}]", tools.join(", "));
            }
        }
        let text = clip(&text, limit).replace('\n', " ");

        write!(w, "[{}] {}", time, entry.entry_type)?;
        if !entry.agent_id.is_empty() {
            write!(w, " ({})", entry.agent_id)?;
        }
        writeln!(w, ": {}", text)?;
    }
    Ok(())
}

/// Total count, first-to-last time range, and a per-type breakdown sorted by type name.
pub fn write_entry_summary<W: Write>(w: &mut W, entries: &[ConversationEntry]) -> io::Result<()> {
    let (Some(first), Some(last)) = (entries.first(), entries.last()) else {
        return writeln!(w, "No entries");
    };

    let stamp = |entry: &ConversationEntry| {
        entry
            .parsed_timestamp()
            .map(|ts| ts.to_rfc3339_opts(SecondsFormat::Secs, true))
            .unwrap_or_else(|| "unknown".to_string())
    };

    writeln!(w, "Total entries: {}", entries.len())?;
    writeln!(w, "Time range: {} to {}", stamp(first), stamp(last))?;
    writeln!(w)?;
    writeln!(w, "Breakdown by type:")?;
    for (entry_type, count) in count_by_type(entries) {
        writeln!(w, "  {}: {}", entry_type, count)?;
    }
    Ok(())
}
