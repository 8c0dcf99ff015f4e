//! Streaming JSONL reader for session and agent files
//!
//! # Error Handling Strategy
//!
//! Whether a malformed line aborts the read is chosen by the caller through
//! [`MalformedPolicy`]:
//!
//! - **Strict**: the first line that fails to decode ends the stream with
//!   [`HistoryError::MalformedRecord`](crate::error::HistoryError::MalformedRecord), carrying the
//!   file and line number. Materializing a file under this policy either yields every entry or
//!   fails as a whole.
//!
//! - **Skip**: bad lines are logged at debug level and counted, and reading continues. Bulk
//!   operations (session listing, tree building) use this mode.
//!
//! - **Early stop**: a scan callback can return [`ScanControl::Stop`]. The scan then reports
//!   [`ScanOutcome::Stopped`], never an error, and the file is closed before returning.
//!
//! I/O failures (open, read) are always propagated.

pub mod conversation;
pub mod deserializers;

pub use conversation::{
    EntryStream, MalformedPolicy, ScanControl, ScanOutcome, count_entries, read_entries,
    scan_entries,
};
