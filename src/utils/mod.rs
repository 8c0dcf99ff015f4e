pub mod environment;
pub mod paths;

pub use environment::{CLAUDE_CONFIG_DIR_ENV, get_claude_dir};
pub use paths::{
    StorePaths, agent_id_from_file_name, decode_path, encode_path, format_path_with_tilde,
    is_encoded_path, looks_like_uuid, session_dir_in, session_file_in, session_index_file_in,
};
