use glob::{MatchOptions, Pattern};

use crate::error::Result;
use crate::models::ToolUse;

/// Tools whose input names a file, compared lowercased.
const FILE_TOOLS: &[&str] = &["read", "write", "edit", "multiedit", "notebookedit", "glob", "grep"];

/// Input fields that may hold the file a tool touched, in lookup order.
const PATH_FIELDS: &[&str] =
    &["file_path", "notebook_path", "path", "filePath", "file", "filename"];

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Glob over the files touched by file tools.
///
/// `*` and `?` stay within one path component and `**` spans directories. A pattern may match
/// the whole path or any tail of it that starts at a component boundary, so `*.rs` matches
/// `/repo/src/main.rs` by its file name and `src/**/*.rs` matches it by `src/main.rs`.
/// Backslashes in recorded paths are read as separators.
#[derive(Debug, Clone)]
pub struct ExploredPattern {
    pattern: Pattern,
}

impl ExploredPattern {
    /// # Errors
    ///
    /// Returns [`HistoryError::InvalidGlob`](crate::error::HistoryError::InvalidGlob) for a
    /// malformed pattern, such as `**` fused to other characters.
    pub fn new(pattern: &str) -> Result<Self> {
        let pattern = Pattern::new(&pattern.replace('\\', "/"))?;
        Ok(Self { pattern })
    }

    pub fn as_str(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn matches(&self, path: &str) -> bool {
        let path = path.replace('\\', "/");
        if self.pattern.matches_with(&path, MATCH_OPTIONS) {
            return true;
        }
        path.match_indices('/')
            .map(|(i, _)| &path[i + 1..])
            .filter(|tail| !tail.is_empty())
            .any(|tail| self.pattern.matches_with(tail, MATCH_OPTIONS))
    }
}

pub fn is_file_tool(name: &str) -> bool {
    FILE_TOOLS.contains(&name.to_lowercase().as_str())
}

/// The file a tool invocation names, from the first string-valued path field of its input.
pub fn touched_file(tool: &ToolUse) -> Option<&str> {
    let input = tool.input.as_object()?;
    PATH_FIELDS.iter().find_map(|field| input.get(*field)?.as_str())
}
