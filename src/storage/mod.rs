//! Persistence layer.
//!
//! The dedup store is a plain text file with one claimed order id per line.
//! It is loaded once at startup and appended to after every successful
//! claim. The file must exist: running without it could claim the same
//! order twice.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::types::{ClaimError, ClaimedSet};

/// File-backed set of already-claimed order ids.
#[derive(Debug)]
pub struct DedupStore {
    path: PathBuf,
    claimed: ClaimedSet,
}

impl DedupStore {
    /// Read every id from `path`. Blank lines (including a trailing one)
    /// and surrounding whitespace are ignored.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ClaimError> {
        let path = path.as_ref().to_path_buf();
        let contents = std::fs::read_to_string(&path).map_err(|e| storage_error(&path, e))?;

        let claimed: ClaimedSet = contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        info!(
            path = %path.display(),
            claimed = claimed.len(),
            "Dedup store loaded"
        );

        Ok(Self { path, claimed })
    }

    pub fn claimed(&self) -> &ClaimedSet {
        &self.claimed
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record `id` as claimed and flush it to disk before returning.
    ///
    /// Returns `Ok(false)` without touching the file when the id is already
    /// recorded.
    pub fn append(&mut self, id: &str) -> Result<bool, ClaimError> {
        if self.claimed.contains(id) {
            debug!(order_id = id, "Order already in dedup store");
            return Ok(false);
        }

        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| storage_error(&self.path, e))?;

        // Keep one id per line even if the file was edited by hand and lost
        // its final newline.
        let len = file.metadata().map_err(|e| storage_error(&self.path, e))?.len();
        let needs_separator = len > 0 && !ends_with_newline(&self.path)?;

        let mut line = String::with_capacity(id.len() + 2);
        if needs_separator {
            line.push('\n');
        }
        line.push_str(id);
        line.push('\n');

        file.write_all(line.as_bytes())
            .and_then(|_| file.sync_all())
            .map_err(|e| storage_error(&self.path, e))?;

        self.claimed.insert(id.to_string());
        info!(order_id = id, path = %self.path.display(), "Order recorded in dedup store");
        Ok(true)
    }
}

fn ends_with_newline(path: &Path) -> Result<bool, ClaimError> {
    let contents = std::fs::read(path).map_err(|e| storage_error(path, e))?;
    Ok(contents.last() == Some(&b'\n'))
}

fn storage_error(path: &Path, source: std::io::Error) -> ClaimError {
    ClaimError::Storage {
        path: path.display().to_string(),
        source,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
