use std::env;
use std::path::PathBuf;

use crate::error::{HistoryError, Result};

/// Environment variable that relocates the store root.
pub const CLAUDE_CONFIG_DIR_ENV: &str = "CLAUDE_CONFIG_DIR";

/// Get the Claude directory path (~/.claude)
///
/// `HOME` wins over the platform lookup so tests and sandboxes can redirect it.
pub fn get_claude_dir() -> Result<PathBuf> {
    let home =
        env::var_os("HOME").filter(|h| !h.is_empty()).map(PathBuf::from).or_else(dirs::home_dir);
    claude_dir_from_home(home)
}

pub(crate) fn claude_dir_from_home(home: Option<PathBuf>) -> Result<PathBuf> {
    home.map(|h| h.join(".claude")).ok_or(HistoryError::HomeDirUnavailable)
}
