use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{HistoryError, Result};
use crate::models::ConversationEntry;

/// What to do with a line that isn't a decodable entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MalformedPolicy {
    /// Stop and report the first malformed line.
    Strict,
    /// Log the line and keep going.
    #[default]
    Skip,
}

/// Returned by a scan callback to continue or halt the scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanControl {
    Continue,
    Stop,
}

/// How a scan ended. A caller-requested halt is not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
    Completed { visited: usize },
    Stopped { visited: usize },
}

impl ScanOutcome {
    pub fn visited(&self) -> usize {
        match *self {
            ScanOutcome::Completed { visited } | ScanOutcome::Stopped { visited } => visited,
        }
    }

    pub fn was_stopped(&self) -> bool {
        matches!(self, ScanOutcome::Stopped { .. })
    }
}

/// Lazy, single-pass sequence of entries read from one JSONL file.
///
/// Lines are decoded from raw bytes, so a line that isn't valid UTF-8 is a malformed record like
/// any other. Blank lines are ignored. After the first error the stream is exhausted and the
/// file handle has been released.
pub struct EntryStream {
    path: PathBuf,
    reader: Option<BufReader<File>>,
    buf: Vec<u8>,
    line_num: usize,
    policy: MalformedPolicy,
    skipped: usize,
}

impl EntryStream {
    pub fn open(path: &Path, policy: MalformedPolicy) -> Result<Self> {
        let file = File::open(path).map_err(|e| HistoryError::io(path, e))?;
        Ok(Self {
            path: path.to_path_buf(),
            reader: Some(BufReader::new(file)),
            buf: Vec::new(),
            line_num: 0,
            policy,
            skipped: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Lines dropped so far under [`MalformedPolicy::Skip`].
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    fn fail(&mut self, err: HistoryError) -> Option<Result<ConversationEntry>> {
        self.reader = None;
        Some(Err(err))
    }
}

impl Iterator for EntryStream {
    type Item = Result<ConversationEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            let read = self.reader.as_mut()?.read_until(b'\n', &mut self.buf);
            match read {
                Ok(0) => {
                    self.reader = None;
                    return None;
                }
                Ok(_) => {}
                Err(e) => {
                    let err = HistoryError::io(&self.path, e);
                    return self.fail(err);
                }
            }
            self.line_num += 1;

            if self.buf.iter().all(u8::is_ascii_whitespace) {
                continue;
            }

            match serde_json::from_slice::<ConversationEntry>(&self.buf) {
                Ok(entry) => return Some(Ok(entry)),
                Err(source) => match self.policy {
                    MalformedPolicy::Strict => {
                        let err = HistoryError::MalformedRecord {
                            path: self.path.clone(),
                            line: self.line_num,
                            source,
                        };
                        return self.fail(err);
                    }
                    MalformedPolicy::Skip => {
                        debug!(
                            path = %self.path.display(),
                            line = self.line_num,
                            error = %source,
                            "Skipping malformed line"
                        );
                        self.skipped += 1;
                    }
                },
            }
        }
    }
}

/// Read every entry of a file, in file order.
///
/// Under [`MalformedPolicy::Strict`] this fails as a whole on the first bad line.
pub fn read_entries(path: &Path, policy: MalformedPolicy) -> Result<Vec<ConversationEntry>> {
    let mut stream = EntryStream::open(path, policy)?;
    let entries = stream.by_ref().collect::<Result<Vec<_>>>()?;
    if stream.skipped() > 0 {
        debug!(
            path = %path.display(),
            entries = entries.len(),
            skipped = stream.skipped(),
            "Read entries with skipped lines"
        );
    }
    Ok(entries)
}

/// Visit entries one at a time until the file ends or `visit` returns [`ScanControl::Stop`].
///
/// The file is closed before this returns, whichever way the scan ended.
pub fn scan_entries<F>(path: &Path, policy: MalformedPolicy, mut visit: F) -> Result<ScanOutcome>
where
    F: FnMut(ConversationEntry) -> ScanControl,
{
    let stream = EntryStream::open(path, policy)?;
    let mut visited = 0;

    for entry in stream {
        visited += 1;
        if visit(entry?) == ScanControl::Stop {
            return Ok(ScanOutcome::Stopped { visited });
        }
    }

    Ok(ScanOutcome::Completed { visited })
}

/// Number of entries in a file.
pub fn count_entries(path: &Path, policy: MalformedPolicy) -> Result<usize> {
    scan_entries(path, policy, |_| ScanControl::Continue).map(|outcome| outcome.visited())
}
