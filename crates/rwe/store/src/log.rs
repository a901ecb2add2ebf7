use crate::error::StoreError;
use rwe_types::IterationRecord;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Append-only JSON-lines run log, one [`IterationRecord`] per line.
#[derive(Clone, Debug)]
pub struct RunLog {
    path: PathBuf,
}

impl RunLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record and flush it to disk before returning.
    ///
    /// A torn final line left by an interrupted append is cut off first.
    pub fn append(&self, record: &IterationRecord) -> Result<(), StoreError> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');
        self.truncate_torn_tail()?;
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())?;
        file.flush()?;
        file.sync_data()?;
        Ok(())
    }

    fn truncate_torn_tail(&self) -> Result<(), StoreError> {
        if !self.path.is_file() {
            return Ok(());
        }
        let bytes = std::fs::read(&self.path)?;
        if bytes.last().map_or(true, |b| *b == b'\n') {
            return Ok(());
        }
        let keep = bytes.iter().rposition(|b| *b == b'\n').map_or(0, |i| i + 1);
        warn!(
            dropped = bytes.len() - keep,
            "truncating torn run-log tail before append"
        );
        let file = std::fs::OpenOptions::new().write(true).open(&self.path)?;
        file.set_len(keep as u64)?;
        Ok(())
    }

    /// All records in file order.
    ///
    /// A malformed final line without a trailing newline is a torn write and
    /// is skipped. Any other malformed line is an error.
    pub fn read_all(&self) -> Result<Vec<IterationRecord>, StoreError> {
        if !self.path.is_file() {
            return Ok(Vec::new());
        }
        let text = std::fs::read_to_string(&self.path)?;
        let torn = !text.is_empty() && !text.ends_with('\n');
        let lines: Vec<(usize, &str)> = text
            .lines()
            .enumerate()
            .filter(|(_, l)| !l.trim().is_empty())
            .collect();
        let mut records = Vec::with_capacity(lines.len());
        for (pos, (idx, line)) in lines.iter().enumerate() {
            match serde_json::from_str::<IterationRecord>(line) {
                Ok(r) => records.push(r),
                Err(e) if torn && pos + 1 == lines.len() => {
                    warn!(line = idx + 1, error = %e, "skipping torn final run-log line");
                }
                Err(e) => {
                    return Err(StoreError::CorruptRecord {
                        line: idx + 1,
                        reason: e.to_string(),
                    })
                }
            }
        }
        Ok(records)
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.read_all()?.is_empty())
    }

    pub fn last(&self) -> Result<Option<IterationRecord>, StoreError> {
        Ok(self.read_all()?.pop())
    }
}
