use std::path::PathBuf;

use crate::error::Result;
use crate::parsers::MalformedPolicy;
use crate::utils::get_claude_dir;

/// How far a `sessions-index.json` record is trusted over the session file it describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndexTrust {
    /// Any index record for the session id wins.
    #[default]
    Blind,
    /// Ignore the record when the session file was modified after the record's `modified` time.
    CheckMtime,
}

/// Settings shared by every store operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub root: PathBuf,
    pub malformed: MalformedPolicy,
    pub index_trust: IndexTrust,
}

impl StoreConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            malformed: MalformedPolicy::default(),
            index_trust: IndexTrust::default(),
        }
    }

    /// Use `root_override` when given, otherwise `~/.claude`.
    pub fn resolve(root_override: Option<PathBuf>) -> Result<Self> {
        let root = match root_override {
            Some(root) => root,
            None => get_claude_dir()?,
        };
        Ok(Self::new(root))
    }

    pub fn with_malformed_policy(mut self, policy: MalformedPolicy) -> Self {
        self.malformed = policy;
        self
    }

    pub fn with_index_trust(mut self, trust: IndexTrust) -> Self {
        self.index_trust = trust;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StoreConfig::new("/store");
        assert_eq!(config.root, PathBuf::from("/store"));
        assert_eq!(config.malformed, MalformedPolicy::Skip);
        assert_eq!(config.index_trust, IndexTrust::Blind);
    }

    #[test]
    fn test_resolve_prefers_override() {
        let config = StoreConfig::resolve(Some(PathBuf::from("/custom")))
            .unwrap()
            .with_malformed_policy(MalformedPolicy::Strict)
            .with_index_trust(IndexTrust::CheckMtime);
        assert_eq!(config.root, PathBuf::from("/custom"));
        assert_eq!(config.malformed, MalformedPolicy::Strict);
        assert_eq!(config.index_trust, IndexTrust::CheckMtime);
    }
}
