//! In-memory implementation of `LogStore`.
//!
//! The reference store: a `Vec` of serialized lines behind a `Mutex`. Used
//! throughout the workspace's tests and useful as a staging buffer for
//! callers that persist elsewhere.

use std::sync::Mutex;

use chainlog_contracts::{
    error::{ChainlogError, ChainlogResult},
    record::EventRecord,
};
use chainlog_core::traits::LogStore;

/// An in-memory, append-only line store.
#[derive(Default)]
pub struct MemoryLogStore {
    lines: Mutex<Vec<String>>,
}

impl MemoryLogStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-seeded with raw lines.
    ///
    /// Lines are taken as-is — including legacy or malformed ones — which
    /// is exactly what migration and verification tests need.
    pub fn from_lines(lines: Vec<String>) -> Self {
        Self {
            lines: Mutex::new(lines),
        }
    }

    fn lock(&self) -> ChainlogResult<std::sync::MutexGuard<'_, Vec<String>>> {
        self.lines.lock().map_err(|e| ChainlogError::StoreIo {
            reason: format!("store lock poisoned: {e}"),
        })
    }
}

impl LogStore for MemoryLogStore {
    fn append(&self, record: &EventRecord) -> ChainlogResult<()> {
        let line = serde_json::to_string(record).map_err(|e| ChainlogError::StoreIo {
            reason: format!("record serialization failed: {e}"),
        })?;
        self.lock()?.push(line);
        Ok(())
    }

    fn read_all(&self) -> ChainlogResult<Vec<String>> {
        Ok(self.lock()?.clone())
    }

    fn read_tip(&self) -> ChainlogResult<Option<EventRecord>> {
        let lines = self.lock()?;
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
        *self.lock()? = lines.to_vec();
        Ok(())
    }
}
