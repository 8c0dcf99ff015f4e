//! Read-only access to one Claude store root.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::StoreConfig;
use crate::discovery::{AgentListing, discover_agents, discover_projects, list_session_files};
use crate::error::{HistoryError, ResourceKind, Result};
use crate::filters::{AgentSearch, FilterOptions, apply_filters, find_agents};
use crate::models::{AgentMatch, AgentTreeNode, ConversationEntry, ProjectInfo, Session};
use crate::parsers::read_entries;
use crate::session::resolve::resolve_prefix;
use crate::session::{
    ResolveOptions, find_session, list_sessions, resolve_agent_prefix, resolve_session_prefix,
};
use crate::tree::build_session_tree;
use crate::utils::paths::{StorePaths, session_dir_in, session_file_in};

/// Entry point for listing, querying and tree building against a store root.
///
/// Every operation reads from disk afresh; nothing is cached between calls.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    config: StoreConfig,
    paths: StorePaths,
}

impl HistoryStore {
    pub fn new(config: StoreConfig) -> Self {
        let paths = StorePaths::new(config.root.clone());
        Self { config, paths }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn paths(&self) -> &StorePaths {
        &self.paths
    }

    fn resolve_options(&self) -> ResolveOptions {
        ResolveOptions { malformed: self.config.malformed, index_trust: self.config.index_trust }
    }

    pub fn list_projects(&self) -> Result<Vec<ProjectInfo>> {
        discover_projects(self.paths.root())
    }

    /// Storage directory for a project path, which must exist.
    pub fn project_dir(&self, project_path: &str) -> Result<PathBuf> {
        let dir = self.paths.project_dir(project_path)?;
        require_dir(dir, project_path)
    }

    /// Storage directory for an encoded project name, which must exist.
    pub fn project_dir_by_name(&self, encoded_name: &str) -> Result<PathBuf> {
        let dir = self.paths.project_dir_by_name(encoded_name);
        require_dir(dir, encoded_name)
    }

    pub fn list_sessions(&self, project_dir: &Path) -> Result<Vec<Session>> {
        list_sessions(project_dir, self.resolve_options())
    }

    pub fn find_session(&self, project_dir: &Path, session_id: &str) -> Result<Session> {
        find_session(project_dir, session_id, self.resolve_options())
    }

    pub fn resolve_session_id(&self, project_dir: &Path, prefix: &str) -> Result<String> {
        resolve_session_prefix(project_dir, prefix)
    }

    pub fn agents(&self, project_dir: &Path, session_id: &str) -> Result<AgentListing> {
        discover_agents(&session_dir_in(project_dir, session_id))
    }

    pub fn resolve_agent_id(
        &self,
        project_dir: &Path,
        session_id: &str,
        prefix: &str,
    ) -> Result<String> {
        resolve_agent_prefix(&self.agents(project_dir, session_id)?, prefix)
    }

    /// Every entry of a session's top-level file, in file order.
    pub fn session_entries(
        &self,
        project_dir: &Path,
        session_id: &str,
    ) -> Result<Vec<ConversationEntry>> {
        let path = session_file_in(project_dir, session_id);
        if !path.is_file() {
            return Err(HistoryError::not_found(ResourceKind::Session, session_id));
        }
        read_entries(&path, self.config.malformed)
    }

    /// Session file for a session id or unique prefix, searched across every project.
    ///
    /// An exact id wins wherever it is; otherwise the prefix must name one session in the
    /// whole store.
    pub fn locate_session(&self, prefix: &str) -> Result<PathBuf> {
        let mut files = Vec::new();
        for project in self.list_projects()? {
            match list_session_files(&project.project_dir) {
                Ok(sessions) => files.extend(sessions),
                Err(e) => warn!(
                    project = %project.encoded_name,
                    error = %e,
                    "Skipping unreadable project"
                ),
            }
        }

        let session_id =
            resolve_prefix(ResourceKind::Session, prefix, files.iter().map(|(id, _)| id.as_str()))?;
        files
            .into_iter()
            .find_map(|(id, path)| (id == session_id).then_some(path))
            .ok_or_else(|| HistoryError::not_found(ResourceKind::Session, prefix))
    }

    /// File of one agent, wherever it sits in the session's `subagents` tree.
    pub fn agent_file(
        &self,
        project_dir: &Path,
        session_id: &str,
        agent_id: &str,
    ) -> Result<PathBuf> {
        let listing = self.agents(project_dir, session_id)?;
        listing
            .get(agent_id)
            .map(|agent| agent.path.clone())
            .ok_or_else(|| HistoryError::not_found(ResourceKind::Agent, agent_id))
    }

    /// Every entry of one agent's file.
    pub fn agent_entries(
        &self,
        project_dir: &Path,
        session_id: &str,
        agent_id: &str,
    ) -> Result<Vec<ConversationEntry>> {
        let path = self.agent_file(project_dir, session_id, agent_id)?;
        read_entries(&path, self.config.malformed)
    }

    /// Session entries followed by each agent's entries, in discovery order.
    ///
    /// The session file itself must be readable; an unreadable agent file is skipped with a
    /// warning.
    pub fn read_session_with_agents(
        &self,
        project_dir: &Path,
        session_id: &str,
    ) -> Result<Vec<ConversationEntry>> {
        let mut entries = self.session_entries(project_dir, session_id)?;
        for agent in self.agents(project_dir, session_id)?.agents() {
            match read_entries(&agent.path, self.config.malformed) {
                Ok(agent_entries) => entries.extend(agent_entries),
                Err(e) => warn!(agent = %agent.agent_id, error = %e, "Skipping unreadable agent"),
            }
        }
        Ok(entries)
    }

    /// Filtered entries for a query scope.
    ///
    /// Without a session, every listed session of the project is read; sessions that fail to
    /// read are skipped with a warning.
    pub fn query(
        &self,
        project_dir: &Path,
        scope: &QueryScope,
        filters: &FilterOptions,
    ) -> Result<Vec<ConversationEntry>> {
        let entries = match scope {
            QueryScope::Agent { session_id, agent_id } => {
                self.agent_entries(project_dir, session_id, agent_id)?
            }
            QueryScope::Session { session_id, include_agents: true } => {
                self.read_session_with_agents(project_dir, session_id)?
            }
            QueryScope::Session { session_id, include_agents: false } => {
                self.session_entries(project_dir, session_id)?
            }
            QueryScope::Project { include_agents } => {
                let mut all = Vec::new();
                for session in self.list_sessions(project_dir)? {
                    let read = if *include_agents {
                        self.read_session_with_agents(project_dir, &session.id)
                    } else {
                        self.session_entries(project_dir, &session.id)
                    };
                    match read {
                        Ok(entries) => all.extend(entries),
                        Err(e) => {
                            warn!(session = %session.id, error = %e, "Skipping unreadable session")
                        }
                    }
                }
                all
            }
        };

        let total = entries.len();
        let filtered = apply_filters(entries, filters)?;
        debug!(total, matched = filtered.len(), "Applied entry filters");
        Ok(filtered)
    }

    pub fn build_tree(&self, project_dir: &Path, session_id: &str) -> Result<AgentTreeNode> {
        build_session_tree(project_dir, session_id, self.config.malformed)
    }

    /// Session and agent files of a project that satisfy `search`.
    pub fn find_agents(&self, project_dir: &Path, search: &AgentSearch) -> Result<Vec<AgentMatch>> {
        find_agents(project_dir, search, self.config.malformed)
    }
}

/// Which files a query reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryScope {
    /// Every session in the project.
    Project { include_agents: bool },
    Session { session_id: String, include_agents: bool },
    Agent { session_id: String, agent_id: String },
}

fn require_dir(dir: PathBuf, requested: &str) -> Result<PathBuf> {
    if dir.is_dir() {
        Ok(dir)
    } else {
        Err(HistoryError::not_found(ResourceKind::Project, requested))
    }
}
