use std::path::Path;

use crate::error::Result;
use crate::models::{ConversationEntry, EntryType, Session, SessionSource};
use crate::parsers::{MalformedPolicy, ScanControl, scan_entries};

/// Longest first prompt kept in a summary, in characters.
pub const MAX_PROMPT_CHARS: usize = 200;
const ELLIPSIS: &str = "...";

/// Summarize a session file in a single streaming pass.
///
/// `created`, the sidechain flag and the session id come from the first entry, `modified` from
/// the last one, and the prompt from the first `user` entry. Every entry counts toward
/// `message_count`, whatever its type. An empty file gives a zero-count summary with no
/// timestamps. If the first entry has no session id, the file stem is used.
pub fn summarize_session(path: &Path, policy: MalformedPolicy) -> Result<Session> {
    scan_session(path, policy).map(|(session, _)| session)
}

/// Summary plus whether any `user` or `assistant` entry was seen, from the same pass.
pub(crate) fn scan_session(path: &Path, policy: MalformedPolicy) -> Result<(Session, bool)> {
    let mut first: Option<ConversationEntry> = None;
    let mut modified = None;
    let mut first_prompt: Option<String> = None;
    let mut conversation = false;

    let outcome = scan_entries(path, policy, |entry| {
        if first_prompt.is_none() && entry.entry_type == EntryType::User {
            first_prompt = Some(truncate_prompt(&entry.text_content()));
        }
        conversation |= entry.is_conversation();
        modified = entry.parsed_timestamp();
        if first.is_none() {
            first = Some(entry);
        }
        ScanControl::Continue
    })?;

    let mut session = Session {
        id: String::new(),
        project_path: String::new(),
        file_path: path.to_path_buf(),
        first_prompt: first_prompt.unwrap_or_default(),
        summary: String::new(),
        message_count: outcome.visited(),
        created: None,
        modified: None,
        git_branch: String::new(),
        is_sidechain: false,
        source: SessionSource::Scan,
    };

    if let Some(first) = first {
        session.id = first.session_id.clone();
        session.is_sidechain = first.is_sidechain;
        session.created = first.parsed_timestamp();
        session.modified = modified;
    }
    if session.id.is_empty()
        && let Some(stem) = path.file_stem()
    {
        session.id = stem.to_string_lossy().into_owned();
    }

    Ok((session, conversation))
}

/// True if the file holds at least one `user` or `assistant` entry.
///
/// Stops reading at the first such entry.
pub fn has_conversation(path: &Path, policy: MalformedPolicy) -> Result<bool> {
    let outcome = scan_entries(path, policy, |entry| {
        if entry.is_conversation() { ScanControl::Stop } else { ScanControl::Continue }
    })?;
    Ok(outcome.was_stopped())
}

/// Cut `text` to [`MAX_PROMPT_CHARS`] characters, marking the cut with `...`.
pub fn truncate_prompt(text: &str) -> String {
    match text.char_indices().nth(MAX_PROMPT_CHARS) {
        Some((cut, _)) => format!("{}{}", &text[..cut], ELLIPSIS),
        None => text.to_string(),
    }
}
