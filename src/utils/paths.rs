use std::borrow::Cow;
use std::env;
use std::path::{Path, PathBuf};

use crate::error::{HistoryError, Result};

pub const PROJECTS_DIR: &str = "projects";
pub const SUBAGENTS_DIR: &str = "subagents";
pub const AGENT_FILE_PREFIX: &str = "agent-";
pub const JSONL_EXTENSION: &str = ".jsonl";
pub const SESSION_INDEX_FILENAME: &str = "sessions-index.json";

const ENCODED_FILLER: char = '-';

/// Encodes a file system path into Claude's project directory name.
///
/// Path separators, drive-letter colons and dots all become `-`, so the mapping is lossy.
///
/// # Examples
///
/// ```
/// use claude_history::encode_path;
///
/// assert_eq!(encode_path("/Users/foo/my.app"), "-Users-foo-my-app");
/// assert_eq!(encode_path(r"C:\Users\foo"), "C--Users-foo");
/// ```
pub fn encode_path(path: &str) -> String {
    path.chars()
        .map(|c| match c {
            ':' | '\\' | '/' | '.' => ENCODED_FILLER,
            other => other,
        })
        .collect()
}

/// Best-effort reverse of [`encode_path`].
///
/// Every `-` is read as a separator, so paths that contained dashes or dots come back wrong.
/// The project's session index holds the exact path when one is needed.
///
/// # Examples
///
/// ```
/// use std::path::PathBuf;
/// use claude_history::decode_path;
///
/// assert_eq!(decode_path("-Users-foo-bar"), PathBuf::from("/Users/foo/bar"));
/// ```
pub fn decode_path(encoded: &str) -> PathBuf {
    let bytes = encoded.as_bytes();
    if bytes.len() >= 3 && bytes[0].is_ascii_alphabetic() && bytes[1] == b'-' && bytes[2] == b'-' {
        let drive = &encoded[..1];
        let rest = encoded[3..].replace(ENCODED_FILLER, "\\");
        return PathBuf::from(format!("{}:\\{}", drive, rest));
    }

    match encoded.strip_prefix(ENCODED_FILLER) {
        Some(rest) => PathBuf::from(format!("/{}", rest.replace(ENCODED_FILLER, "/"))),
        None => PathBuf::from(encoded.replace(ENCODED_FILLER, "/")),
    }
}

/// True for names shaped like an encoded path: a leading `-` (Unix) or a drive letter
/// followed by `--` (Windows).
pub fn is_encoded_path(name: &str) -> bool {
    let bytes = name.as_bytes();
    match bytes.first() {
        None => false,
        Some(b'-') => true,
        Some(first) => {
            bytes.len() >= 3 && first.is_ascii_alphabetic() && bytes[1] == b'-' && bytes[2] == b'-'
        }
    }
}

/// Structural UUID check: 36 characters with hyphens at 8, 13, 18 and 23.
/// Segment contents are not validated.
pub fn looks_like_uuid(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() == 36 && [8, 13, 18, 23].iter().all(|&i| bytes[i] == b'-')
}

/// Agent id for a file named `agent-<id>.jsonl`.
pub fn agent_id_from_file_name(name: &str) -> Option<&str> {
    name.strip_prefix(AGENT_FILE_PREFIX)?.strip_suffix(JSONL_EXTENSION)
}

pub fn session_file_in(project_dir: &Path, session_id: &str) -> PathBuf {
    project_dir.join(format!("{}{}", session_id, JSONL_EXTENSION))
}

pub fn session_dir_in(project_dir: &Path, session_id: &str) -> PathBuf {
    project_dir.join(session_id)
}

pub fn session_index_file_in(project_dir: &Path) -> PathBuf {
    project_dir.join(SESSION_INDEX_FILENAME)
}

/// Maps logical project / session / agent identifiers to locations inside a store root.
///
/// Pure path arithmetic: nothing here touches the file system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorePaths {
    root: PathBuf,
}

impl StorePaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn projects_dir(&self) -> PathBuf {
        self.root.join(PROJECTS_DIR)
    }

    /// Storage directory for an already-encoded project name.
    pub fn project_dir_by_name(&self, encoded_name: &str) -> PathBuf {
        self.projects_dir().join(encoded_name)
    }

    /// Storage directory for a project path; relative paths resolve against the working directory.
    pub fn project_dir(&self, project_path: &str) -> Result<PathBuf> {
        let absolute = absolutize(project_path)?;
        Ok(self.project_dir_by_name(&encode_path(&absolute)))
    }

    pub fn session_file(&self, project_path: &str, session_id: &str) -> Result<PathBuf> {
        Ok(session_file_in(&self.project_dir(project_path)?, session_id))
    }

    pub fn subagents_dir(&self, project_path: &str, session_id: &str) -> Result<PathBuf> {
        Ok(session_dir_in(&self.project_dir(project_path)?, session_id).join(SUBAGENTS_DIR))
    }

    /// Location of a first-level agent file.
    pub fn agent_file(
        &self,
        project_path: &str,
        session_id: &str,
        agent_id: &str,
    ) -> Result<PathBuf> {
        Ok(self
            .subagents_dir(project_path, session_id)?
            .join(format!("{}{}{}", AGENT_FILE_PREFIX, agent_id, JSONL_EXTENSION)))
    }

    pub fn session_index_file(&self, project_path: &str) -> Result<PathBuf> {
        Ok(session_index_file_in(&self.project_dir(project_path)?))
    }
}

/// Paths starting with `/` count as absolute on every platform so that encodings agree.
fn absolutize(project_path: &str) -> Result<Cow<'_, str>> {
    if project_path.starts_with('/') || Path::new(project_path).is_absolute() {
        return Ok(Cow::Borrowed(project_path));
    }

    let cwd = env::current_dir().map_err(|e| HistoryError::io(project_path, e))?;
    let joined = if project_path.is_empty() || project_path == "." {
        cwd
    } else {
        cwd.join(project_path)
    };
    Ok(Cow::Owned(joined.to_string_lossy().into_owned()))
}

/// Formats a path with ~ substitution for the home directory
pub fn format_path_with_tilde(path: &Path) -> String {
    format_path_with_tilde_internal(path, None)
}

pub(crate) fn format_path_with_tilde_internal(path: &Path, home_override: Option<&str>) -> String {
    let home_from_env = env::var("HOME").ok();
    let home = home_override.or(home_from_env.as_deref());

    let path_str = path.to_string_lossy();
    if let Some(home) = home
        && !home.is_empty()
        && path_str.starts_with(home)
    {
        return path_str.replacen(home, "~", 1);
    }
    path_str.into_owned()
}
