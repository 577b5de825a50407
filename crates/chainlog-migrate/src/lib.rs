//! # chainlog-migrate
//!
//! One-time, idempotent upgrade of pre-chain stores into chained form.
//!
//! ## Overview
//!
//! Legacy stores predate the chaining scheme: their lines carry the full
//! event envelope but no `seq`, `prevHash`, or `ownHash`. Migration streams
//! the store in order, threading the running chain cursor through it:
//!
//! - already-chained lines pass through **byte-for-byte** and advance the
//!   cursor from their stored values — chained history is never rewritten;
//! - legacy lines are augmented with `seq`, the running `prev_hash`, and a
//!   freshly computed `own_hash`; every content field keeps its exact
//!   value (migration augments, never reinterprets);
//! - lines that cannot be parsed are kept verbatim, recorded as errors,
//!   and consume one seq slot without receiving a hash. The resulting
//!   store deliberately fails verification at that point — surfacing the
//!   corruption is the correct outcome, not silently repairing it.
//!
//! The store is rewritten (atomically, via `replace_all`) only when at
//! least one line was actually migrated, which is what makes a second run
//! a no-op: it finds only chained lines, reports `migrated == 0`, and
//! leaves the tip hash untouched.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use chainlog_audit::builder::record_hash;
use chainlog_contracts::{
    error::ChainlogResult,
    record::{EventRecord, LegacyRecord, GENESIS_HASH},
};
use chainlog_core::traits::LogStore;

/// The outcome of a migration pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MigrationReport {
    /// Number of legacy lines upgraded to chained form.
    pub migrated: usize,
    /// Per-line problems, in store order. A non-empty list means the
    /// store needs operator attention; migration of good lines still
    /// completed.
    pub errors: Vec<String>,
}

/// Upgrade every unchained line in `store` to chained form.
///
/// Idempotent: running it twice reports `migrated == 0` on the second run
/// and produces no further change. Per-line failures are collected and do
/// not halt migration of subsequent good lines; only a store read/rewrite
/// failure aborts.
pub fn migrate(store: &dyn LogStore) -> ChainlogResult<MigrationReport> {
    let lines = store.read_all()?;

    let mut out_lines: Vec<String> = Vec::with_capacity(lines.len());
    let mut migrated = 0usize;
    let mut errors: Vec<String> = Vec::new();
    let mut prev = GENESIS_HASH.to_string();
    let mut next_seq: u64 = 1;

    for (idx, line) in lines.iter().enumerate() {
        let line_no = idx + 1;

        let value: serde_json::Value = match serde_json::from_str(line) {
            Ok(v) => v,
            Err(e) => {
                warn!(line = line_no, %e, "unparseable line left unmigrated");
                errors.push(format!("line {line_no}: {e}"));
                out_lines.push(line.clone());
                // The slot is consumed so the verifier's sequence check
                // exposes the gap.
                next_seq += 1;
                continue;
            }
        };

        let chained = value.get("ownHash").is_some() && value.get("prevHash").is_some();
        if chained {
            match serde_json::from_value::<EventRecord>(value) {
                Ok(record) => {
                    prev = record.own_hash;
                    next_seq = record.seq + 1;
                }
                Err(e) => {
                    warn!(line = line_no, %e, "chained line does not parse as a record");
                    errors.push(format!("line {line_no}: chained record does not parse: {e}"));
                }
            }
            // Chained history passes through untouched.
            out_lines.push(line.clone());
            continue;
        }

        let legacy: LegacyRecord = match serde_json::from_value(value) {
            Ok(l) => l,
            Err(e) => {
                warn!(line = line_no, %e, "legacy line does not parse as a record");
                errors.push(format!("line {line_no}: {e}"));
                out_lines.push(line.clone());
                next_seq += 1;
                continue;
            }
        };

        // Sequential assignment, preserving a seq the legacy writer already
        // recorded.
        let seq = legacy.seq.unwrap_or(next_seq);

        let mut record = EventRecord {
            schema_version: legacy.schema_version,
            seq,
            timestamp: legacy.timestamp,
            action: legacy.action,
            actor: legacy.actor,
            subject_refs: legacy.subject_refs,
            payload: legacy.payload,
            context: legacy.context,
            prev_hash: prev.clone(),
            own_hash: String::new(),
        };

        record.own_hash = match record_hash(&record) {
            Ok(hash) => hash,
            Err(e) => {
                warn!(line = line_no, %e, "legacy line does not canonically encode");
                errors.push(format!("line {line_no}: {e}"));
                out_lines.push(line.clone());
                next_seq += 1;
                continue;
            }
        };

        debug!(line = line_no, seq = record.seq, own_hash = %record.own_hash, "record migrated");

        prev = record.own_hash.clone();
        next_seq = record.seq + 1;
        out_lines.push(serde_json::to_string(&record).map_err(|e| {
            chainlog_contracts::error::ChainlogError::StoreIo {
                reason: format!("record serialization failed: {e}"),
            }
        })?);
        migrated += 1;
    }

    if migrated > 0 {
        store.replace_all(&out_lines)?;
    }

    info!(migrated, errors = errors.len(), "migration complete");

    Ok(MigrationReport { migrated, errors })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use serde_json::json;

    use chainlog_audit::{ChainAppender, MemoryLogStore};
    use chainlog_contracts::record::{EventDraft, EventRecord, SubjectRefs, GENESIS_HASH};
    use chainlog_core::traits::LogStore;
    use chainlog_verify::verify;

    use super::migrate;

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn legacy_line(action: &str, timestamp: &str, detail: &str) -> String {
        json!({
            "schemaVersion": "1.0",
            "timestamp": timestamp,
            "action": action,
            "actor": "user:bob",
            "subjectRefs": { "receiptId": "rcpt-9", "exportId": null, "viewId": null },
            "payload": { "detail": detail, "count": 2 },
            "context": { "origin": "198.51.100.4", "userAgent": "legacy-client/1.2" }
        })
        .to_string()
    }

    // ── Migration ─────────────────────────────────────────────────────────────

    /// A legacy-only store migrates into a chain that verifies cleanly.
    #[test]
    fn legacy_store_migrates_to_a_valid_chain() {
        let store = MemoryLogStore::from_lines(vec![
            legacy_line("AUTH_FAILURE", "2026-08-01T08:00:00.000Z", "a"),
            legacy_line("EXPORT_CREATED", "2026-08-01T09:00:00.000Z", "b"),
            legacy_line("AUTH_FAILURE", "2026-08-01T10:00:00.000Z", "c"),
        ]);

        let report = migrate(&store).unwrap();
        assert_eq!(report.migrated, 3);
        assert!(report.errors.is_empty());

        let verified = verify(&store).unwrap();
        assert!(verified.valid, "migrated chain must verify: {:?}", verified.errors);
        assert_eq!(verified.line_count, 3);
    }

    /// Migration augments, never reinterprets: every content field keeps
    /// its original value.
    #[test]
    fn migration_preserves_content_fields() {
        let store = MemoryLogStore::from_lines(vec![legacy_line(
            "EXPORT_CREATED",
            "2026-08-01T09:30:00.000Z",
            "quarterly report",
        )]);

        migrate(&store).unwrap();

        let record: EventRecord =
            serde_json::from_str(&store.read_all().unwrap()[0]).unwrap();

        assert_eq!(record.seq, 1);
        assert_eq!(record.prev_hash, GENESIS_HASH);
        assert_eq!(record.timestamp, "2026-08-01T09:30:00.000Z");
        assert_eq!(record.action, "EXPORT_CREATED");
        assert_eq!(record.actor, "user:bob");
        assert_eq!(record.subject_refs.receipt_id.as_deref(), Some("rcpt-9"));
        assert_eq!(
            record.context.as_ref().and_then(|c| c.origin.as_deref()),
            Some("198.51.100.4")
        );
        let payload = serde_json::to_value(&record.payload).unwrap();
        assert_eq!(payload, json!({ "count": 2, "detail": "quarterly report" }));
    }

    /// A second run finds nothing to do and leaves the tip unchanged.
    #[test]
    fn migration_is_idempotent() {
        let store = MemoryLogStore::from_lines(vec![
            legacy_line("AUTH_FAILURE", "2026-08-01T08:00:00.000Z", "a"),
            legacy_line("AUTH_FAILURE", "2026-08-01T08:05:00.000Z", "b"),
        ]);

        let first = migrate(&store).unwrap();
        assert_eq!(first.migrated, 2);
        let lines_after_first = store.read_all().unwrap();
        let tip_after_first = verify(&store).unwrap().last_hash;

        let second = migrate(&store).unwrap();
        assert_eq!(second.migrated, 0, "second run must find nothing to migrate");
        assert!(second.errors.is_empty());
        assert_eq!(store.read_all().unwrap(), lines_after_first);
        assert_eq!(verify(&store).unwrap().last_hash, tip_after_first);
    }

    /// An already-chained prefix is passed through verbatim; migration
    /// attaches the legacy tail to its tip.
    #[test]
    fn chained_prefix_is_preserved_verbatim() {
        let store = MemoryLogStore::new();
        let chained_tip = {
            let appender = ChainAppender::new(&store).unwrap();
            appender
                .append(EventDraft {
                    action: "LOGIN_FAIL".to_string(),
                    actor: "user:alice".to_string(),
                    subject_refs: SubjectRefs::default(),
                    payload: serde_json::from_value(json!({ "detail": "x" })).unwrap(),
                    context: None,
                })
                .unwrap()
        };
        let chained_line = store.read_all().unwrap()[0].clone();

        let mut lines = store.read_all().unwrap();
        lines.push(legacy_line("EXPORT_CREATED", "2026-08-02T12:00:00.000Z", "tail"));
        let store = MemoryLogStore::from_lines(lines);

        let report = migrate(&store).unwrap();
        assert_eq!(report.migrated, 1);

        let after = store.read_all().unwrap();
        assert_eq!(after[0], chained_line, "chained history must not be rewritten");

        let tail: EventRecord = serde_json::from_str(&after[1]).unwrap();
        assert_eq!(tail.seq, 2);
        assert_eq!(tail.prev_hash, chained_tip.own_hash);

        assert!(verify(&store).unwrap().valid);
    }

    /// A fully chained store is untouched: no rewrite, no errors.
    #[test]
    fn chained_store_is_a_no_op() {
        let store = MemoryLogStore::new();
        {
            let appender = ChainAppender::new(&store).unwrap();
            for i in 0..3 {
                appender
                    .append(EventDraft {
                        action: "VIEW_OPENED".to_string(),
                        actor: "user:carol".to_string(),
                        subject_refs: SubjectRefs::default(),
                        payload: serde_json::from_value(json!({ "n": i })).unwrap(),
                        context: None,
                    })
                    .unwrap();
            }
        }
        let before = store.read_all().unwrap();

        let report = migrate(&store).unwrap();

        assert_eq!(report.migrated, 0);
        assert!(report.errors.is_empty());
        assert_eq!(store.read_all().unwrap(), before);
    }

    /// Unparseable lines are kept, reported, and leave a gap the verifier
    /// then exposes — corrupt input is surfaced, not repaired.
    #[test]
    fn unparseable_line_leaves_a_detectable_gap() {
        let store = MemoryLogStore::from_lines(vec![
            legacy_line("AUTH_FAILURE", "2026-08-01T08:00:00.000Z", "a"),
            "{corrupt beyond recognition".to_string(),
            legacy_line("AUTH_FAILURE", "2026-08-01T08:10:00.000Z", "c"),
        ]);

        let report = migrate(&store).unwrap();
        assert_eq!(report.migrated, 2);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].starts_with("line 2:"));

        // The corrupt line is still there, verbatim.
        let after = store.read_all().unwrap();
        assert_eq!(after[1], "{corrupt beyond recognition");

        // The third record took seq 3, linking past the dead slot.
        let third: EventRecord = serde_json::from_str(&after[2]).unwrap();
        assert_eq!(third.seq, 3);

        let verified = verify(&store).unwrap();
        assert!(!verified.valid);
        let messages: Vec<&str> = verified.errors.iter().map(|e| e.message.as_str()).collect();
        assert!(messages.iter().any(|m| m.starts_with("parse failure at line 2:")));
        assert!(messages.contains(&"sequence gap/duplicate at seq 3"));
    }
}
