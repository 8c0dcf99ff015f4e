use std::collections::HashMap;

use regex::Regex;

use super::options::FilterOptions;
use crate::error::Result;
use crate::models::{ConversationEntry, EntryType, ToolUse};

/// [`FilterOptions`] prepared for repeated matching: tool names lowercased, pattern compiled.
#[derive(Debug)]
pub struct EntryFilter<'a> {
    options: &'a FilterOptions,
    tools: Vec<String>,
    pattern: Option<Regex>,
}

impl<'a> EntryFilter<'a> {
    /// # Errors
    ///
    /// Returns [`HistoryError::InvalidPattern`](crate::error::HistoryError::InvalidPattern) if
    /// the tool-input pattern is not a valid regex.
    pub fn new(options: &'a FilterOptions) -> Result<Self> {
        let pattern = if options.tool_pattern.is_empty() {
            None
        } else {
            Some(Regex::new(&options.tool_pattern)?)
        };
        let tools = options.tools.iter().map(|t| t.to_lowercase()).collect();
        Ok(Self { options, tools, pattern })
    }

    /// True when the entry satisfies every active constraint.
    pub fn matches(&self, entry: &ConversationEntry) -> bool {
        let opts = self.options;

        if !opts.types.is_empty() && !opts.types.contains(&entry.entry_type) {
            return false;
        }

        if !opts.agent_id.is_empty() && entry.agent_id != opts.agent_id {
            return false;
        }

        if opts.has_time_window() {
            let Some(ts) = entry.parsed_timestamp() else {
                return false;
            };
            if opts.start.is_some_and(|start| ts < start) || opts.end.is_some_and(|end| ts > end) {
                return false;
            }
        }

        if self.tools.is_empty() && self.pattern.is_none() {
            return true;
        }

        let tool_uses = entry.tool_uses();
        if !self.tools.is_empty()
            && !tool_uses.iter().any(|tool| self.tools.contains(&tool.name.to_lowercase()))
        {
            return false;
        }
        if let Some(pattern) = &self.pattern
            && !tool_uses.iter().any(|tool| tool_input_matches(pattern, tool))
        {
            return false;
        }

        true
    }
}

/// True when `pattern` finds a match in the tool's serialized input.
///
/// A tool use without input has nothing to search and never matches.
pub(crate) fn tool_input_matches(pattern: &Regex, tool: &ToolUse) -> bool {
    !tool.input.is_null() && pattern.is_match(&tool.serialized_input())
}

/// Keep the entries that satisfy every active constraint, in their original order.
///
/// Both time bounds are inclusive. When a time bound is set, entries whose timestamp doesn't
/// parse are dropped; otherwise timestamps are not looked at.
pub fn apply_filters(
    entries: Vec<ConversationEntry>,
    options: &FilterOptions,
) -> Result<Vec<ConversationEntry>> {
    if options.is_empty() {
        return Ok(entries);
    }

    let filter = EntryFilter::new(options)?;
    Ok(entries.into_iter().filter(|entry| filter.matches(entry)).collect())
}

/// Number of entries per type, sorted by type name.
pub fn count_by_type(entries: &[ConversationEntry]) -> Vec<(EntryType, usize)> {
    let mut counts: HashMap<&EntryType, usize> = HashMap::new();
    for entry in entries {
        *counts.entry(&entry.entry_type).or_insert(0) += 1;
    }

    let mut counts: Vec<(EntryType, usize)> =
        counts.into_iter().map(|(kind, n)| (kind.clone(), n)).collect();
    counts.sort_by(|a, b| a.0.as_str().cmp(b.0.as_str()));
    counts
}
