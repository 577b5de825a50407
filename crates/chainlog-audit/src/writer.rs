//! The chain appender: single-writer append discipline.
//!
//! `prev_hash` depends on reading the current tip, so "read tip → build
//! record → append" must be one critical section. `ChainAppender` owns
//! that section: a `Mutex` around the chain cursor serializes concurrent
//! producers, and the cursor only advances after the store confirms the
//! append. There are no implicit retries — a failed append is returned to
//! the caller with the cursor untouched, because a blind retry could
//! duplicate `seq`.

use std::sync::Mutex;

use chrono::{SecondsFormat, Utc};
use tracing::debug;

use chainlog_contracts::{
    error::{ChainlogError, ChainlogResult},
    record::{EventDraft, EventRecord, GENESIS_HASH},
};
use chainlog_core::traits::LogStore;

use crate::builder::build_record;

/// The chain cursor: where the next record attaches.
struct Cursor {
    next_seq: u64,
    last_hash: String,
    last_timestamp: String,
}

/// Appends producer drafts to a `LogStore` as chained records.
///
/// # Thread safety
///
/// `append()` acquires an internal `Mutex`, so any number of producer
/// threads may share one appender per log. Running two appenders against
/// the same store concurrently breaks the single-writer discipline and is
/// not supported.
pub struct ChainAppender<S: LogStore> {
    store: S,
    cursor: Mutex<Cursor>,
}

impl<S: LogStore> ChainAppender<S> {
    /// Create an appender, seeding the cursor from the store's tip.
    ///
    /// An empty store starts at `seq == 1` with the genesis sentinel as
    /// `last_hash`.
    pub fn new(store: S) -> ChainlogResult<Self> {
        let cursor = match store.read_tip()? {
            Some(tip) => Cursor {
                next_seq: tip.seq + 1,
                last_hash: tip.own_hash.clone(),
                last_timestamp: tip.timestamp,
            },
            None => Cursor {
                next_seq: 1,
                last_hash: GENESIS_HASH.to_string(),
                last_timestamp: String::new(),
            },
        };

        Ok(Self {
            store,
            cursor: Mutex::new(cursor),
        })
    }

    /// Build and append one record, returning the sealed record.
    ///
    /// An encoding failure aborts before any I/O and leaves the store and
    /// cursor untouched. A store failure leaves the cursor untouched; the
    /// caller decides whether to retry.
    pub fn append(&self, draft: EventDraft) -> ChainlogResult<EventRecord> {
        let mut cursor = self.cursor.lock().map_err(|e| ChainlogError::StoreIo {
            reason: format!("append cursor lock poisoned: {e}"),
        })?;

        // Timestamps are monotonic-or-equal with seq: a clock step backwards
        // must not produce a record stamped earlier than its predecessor.
        let mut timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        if timestamp < cursor.last_timestamp {
            timestamp = cursor.last_timestamp.clone();
        }

        let record = build_record(draft, cursor.next_seq, timestamp, cursor.last_hash.clone())?;
        self.store.append(&record)?;

        cursor.next_seq += 1;
        cursor.last_hash = record.own_hash.clone();
        cursor.last_timestamp = record.timestamp.clone();

        debug!(
            seq = record.seq,
            action = %record.action,
            own_hash = %record.own_hash,
            "event appended"
        );

        Ok(record)
    }

    /// The hash of the most recently appended record, or the genesis
    /// sentinel for an empty log. This is the chain's current tip.
    pub fn tip_hash(&self) -> ChainlogResult<String> {
        let cursor = self.cursor.lock().map_err(|e| ChainlogError::StoreIo {
            reason: format!("append cursor lock poisoned: {e}"),
        })?;
        Ok(cursor.last_hash.clone())
    }

    /// Borrow the underlying store (read paths, verification).
    pub fn store(&self) -> &S {
        &self.store
    }
}
