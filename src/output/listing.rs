use std::io::{self, Write};

use super::{Format, clip, write_json};
use crate::models::{ProjectInfo, Session};
use crate::utils::format_path_with_tilde;

const PROMPT_PREVIEW_CHARS: usize = 50;

/// One line per session: id, modified time, message count and a prompt preview.
pub fn write_sessions<W: Write>(w: &mut W, sessions: &[Session], format: Format) -> io::Result<()> {
    if format == Format::Json {
        return write_json(w, sessions);
    }

    for session in sessions {
        let modified = session
            .modified
            .map(|ts| ts.to_rfc3339_opts(chrono::SecondsFormat::Secs, true))
            .unwrap_or_else(|| "-".to_string());
        let prompt = clip(&session.first_prompt.replace('\n', " "), PROMPT_PREVIEW_CHARS);
        writeln!(w, "{}  {}  {} msgs  {}", session.id, modified, session.message_count, prompt)?;
    }
    Ok(())
}

/// Encoded name followed by the original project path.
pub fn write_projects<W: Write>(
    w: &mut W,
    projects: &[ProjectInfo],
    format: Format,
) -> io::Result<()> {
    if format == Format::Json {
        return write_json(w, projects);
    }

    for project in projects {
        writeln!(w, "{}", project.encoded_name)?;
        writeln!(w, "  Path: {}", format_path_with_tilde(&project.project_path))?;
    }
    Ok(())
}
