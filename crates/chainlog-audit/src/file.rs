//! Line-oriented file implementation of `LogStore`.
//!
//! One JSON record per line (JSONL). An append opens the file in append
//! mode, writes the line, and calls `sync_data` before reporting success,
//! so a record the caller believes persisted survives a crash. Whole-line
//! writes through a single descriptor keep readers from observing torn
//! lines on the platforms this targets.
//!
//! `replace_all` (migration only) writes a sibling temp file and renames it
//! over the original, so readers see either the old store or the new one,
//! never a half-rewritten file.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use chainlog_contracts::{
    error::{ChainlogError, ChainlogResult},
    record::EventRecord,
};
use chainlog_core::traits::LogStore;

/// A JSONL file store.
pub struct FileLogStore {
    path: PathBuf,
}

impl FileLogStore {
    /// Create a store over `path`. The file is created lazily on first
    /// append; a missing file reads as an empty log.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, op: &str, e: std::io::Error) -> ChainlogError {
        ChainlogError::StoreIo {
            reason: format!("{op} '{}': {e}", self.path.display()),
        }
    }
}

impl LogStore for FileLogStore {
    fn append(&self, record: &EventRecord) -> ChainlogResult<()> {
        let line = serde_json::to_string(record).map_err(|e| ChainlogError::StoreIo {
            reason: format!("record serialization failed: {e}"),
        })?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.io_error("open for append", e))?;
        writeln!(file, "{line}").map_err(|e| self.io_error("append to", e))?;

        // Durable before success is reported.
        file.sync_data().map_err(|e| self.io_error("sync", e))?;
        Ok(())
    }

    fn read_all(&self) -> ChainlogResult<Vec<String>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path).map_err(|e| self.io_error("open", e))?;
        let mut lines = Vec::new();
        for line in BufReader::new(file).lines() {
            lines.push(line.map_err(|e| self.io_error("read", e))?);
        }
        Ok(lines)
    }

    fn read_tip(&self) -> ChainlogResult<Option<EventRecord>> {
        let lines = self.read_all()?;
        match lines.last() {
            None => Ok(None),
            Some(line) => serde_json::from_str(line)
                .map(Some)
                .map_err(|e| ChainlogError::Parse {
                    line: lines.len(),
                    reason: e.to_string(),
                }),
        }
    }

    fn replace_all(&self, lines: &[String]) -> ChainlogResult<()> {
        let mut tmp_name = self.path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);

        {
            let mut tmp = File::create(&tmp_path).map_err(|e| self.io_error("create temp for", e))?;
            for line in lines {
                writeln!(tmp, "{line}").map_err(|e| self.io_error("write temp for", e))?;
            }
            tmp.sync_data().map_err(|e| self.io_error("sync temp for", e))?;
        }

        std::fs::rename(&tmp_path, &self.path).map_err(|e| self.io_error("replace", e))?;
        Ok(())
    }
}
