use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use regex::Regex;
use tracing::{debug, warn};

use super::apply::tool_input_matches;
use super::explored::{ExploredPattern, is_file_tool, touched_file};
use crate::discovery::{discover_agents, list_session_files};
use crate::error::Result;
use crate::models::AgentMatch;
use crate::parsers::{MalformedPolicy, ScanControl, scan_entries};
use crate::utils::paths::session_dir_in;

/// Criteria for finding the session and agent files of a project. Every set criterion must hold.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgentSearch {
    /// Glob over files touched by file tools (Read, Write, Edit, ...).
    pub explored: Option<String>,
    /// Tool names, compared case-insensitively; any one of them must have been used.
    pub tools: Vec<String>,
    /// Regex matched against each tool invocation's serialized input.
    pub tool_pattern: String,
    /// Inclusive lower time bound.
    pub start: Option<DateTime<Utc>>,
    /// Inclusive upper time bound.
    pub end: Option<DateTime<Utc>>,
    /// Restrict the search to one session (full id).
    pub session_id: Option<String>,
}

impl AgentSearch {
    pub fn has_time_window(&self) -> bool {
        self.start.is_some() || self.end.is_some()
    }
}

/// [`AgentSearch`] with its glob and regex compiled.
#[derive(Debug)]
pub struct AgentMatcher<'a> {
    search: &'a AgentSearch,
    explored: Option<ExploredPattern>,
    tools: Vec<String>,
    pattern: Option<Regex>,
}

struct Candidate {
    session_id: String,
    agent_id: String,
    path: PathBuf,
}

impl<'a> AgentMatcher<'a> {
    /// # Errors
    ///
    /// Fails with `InvalidGlob` or `InvalidPattern` when the explored glob or the tool-input
    /// regex doesn't compile.
    pub fn new(search: &'a AgentSearch) -> Result<Self> {
        let explored = search.explored.as_deref().map(ExploredPattern::new).transpose()?;
        let pattern = if search.tool_pattern.is_empty() {
            None
        } else {
            Some(Regex::new(&search.tool_pattern)?)
        };
        let tools = search.tools.iter().map(|t| t.to_lowercase()).collect();
        Ok(Self { search, explored, tools, pattern })
    }

    fn in_window(&self, ts: Option<DateTime<Utc>>) -> bool {
        if !self.search.has_time_window() {
            return true;
        }
        let Some(ts) = ts else {
            return false;
        };
        !self.search.start.is_some_and(|start| ts < start)
            && !self.search.end.is_some_and(|end| ts > end)
    }

    /// Check one file in a single streaming pass.
    ///
    /// Every entry counts toward `entry_count` and the created/modified span. Only entries inside
    /// the time window contribute tools and files, and at least one must fall inside it.
    pub fn check_file(
        &self,
        session_id: &str,
        agent_id: &str,
        path: &Path,
        policy: MalformedPolicy,
    ) -> Result<Option<AgentMatch>> {
        let mut created: Option<DateTime<Utc>> = None;
        let mut modified: Option<DateTime<Utc>> = None;
        let mut in_window = false;
        let mut files = BTreeSet::new();
        let mut tools = BTreeSet::new();
        let mut input_hit = false;

        let outcome = scan_entries(path, policy, |entry| {
            let ts = entry.parsed_timestamp();
            if let Some(ts) = ts {
                created = Some(created.map_or(ts, |c| c.min(ts)));
                modified = Some(modified.map_or(ts, |m| m.max(ts)));
            }
            if !self.in_window(ts) {
                return ScanControl::Continue;
            }
            in_window = true;

            for tool in entry.tool_uses() {
                let name = tool.name.to_lowercase();
                if let Some(explored) = &self.explored
                    && is_file_tool(&name)
                    && let Some(file) = touched_file(&tool)
                    && explored.matches(file)
                {
                    files.insert(file.to_string());
                }
                if let Some(pattern) = &self.pattern
                    && tool_input_matches(pattern, &tool)
                {
                    input_hit = true;
                }
                tools.insert(name);
            }
            ScanControl::Continue
        })?;

        if outcome.visited() == 0 || !in_window {
            return Ok(None);
        }
        if self.explored.is_some() && files.is_empty() {
            return Ok(None);
        }
        if !self.tools.is_empty() && !self.tools.iter().any(|t| tools.contains(t)) {
            return Ok(None);
        }
        if self.pattern.is_some() && !input_hit {
            return Ok(None);
        }

        Ok(Some(AgentMatch {
            agent_id: agent_id.to_string(),
            session_id: session_id.to_string(),
            file_path: path.to_path_buf(),
            entry_count: outcome.visited(),
            matched_files: files.into_iter().collect(),
            matched_tools: tools.into_iter().collect(),
            created,
            modified,
        }))
    }
}

/// Search every session file of a project and every agent nested under it.
///
/// Files are checked in parallel. A file that can't be read, or a session whose `subagents`
/// tree can't be listed, is skipped with a warning. An unknown `session_id` gives no matches.
/// Results are ordered by last activity, newest first, then by session and agent id.
pub fn find_agents(
    project_dir: &Path,
    search: &AgentSearch,
    policy: MalformedPolicy,
) -> Result<Vec<AgentMatch>> {
    let matcher = AgentMatcher::new(search)?;
    let mut sessions = list_session_files(project_dir)?;
    if let Some(wanted) = &search.session_id {
        sessions.retain(|session_id, _| session_id == wanted);
    }

    let mut candidates = Vec::new();
    for (session_id, path) in sessions {
        match discover_agents(&session_dir_in(project_dir, &session_id)) {
            Ok(listing) => {
                candidates.extend(listing.into_agents().into_iter().map(|agent| Candidate {
                    session_id: session_id.clone(),
                    agent_id: agent.agent_id,
                    path: agent.path,
                }));
            }
            Err(e) => warn!(session = %session_id, error = %e, "Skipping unlistable subagents"),
        }
        candidates.push(Candidate { session_id, agent_id: String::new(), path });
    }

    let mut matches: Vec<AgentMatch> = candidates
        .par_iter()
        .filter_map(|c| match matcher.check_file(&c.session_id, &c.agent_id, &c.path, policy) {
            Ok(found) => found,
            Err(e) => {
                warn!(path = %c.path.display(), error = %e, "Skipping unreadable file");
                None
            }
        })
        .collect();

    matches.sort_by(newest_first);
    debug!(candidates = candidates.len(), matched = matches.len(), "Searched agent files");
    Ok(matches)
}

fn newest_first(a: &AgentMatch, b: &AgentMatch) -> Ordering {
    match (a.modified, b.modified) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| a.session_id.cmp(&b.session_id))
    .then_with(|| a.agent_id.cmp(&b.agent_id))
}
