//! # chainlog-audit
//!
//! Record construction, chained appends, and the reference `LogStore`
//! implementations for the CHAINLOG workspace.
//!
//! ## Overview
//!
//! Every appended event is sealed with a SHA-256 hash over its canonical
//! encoding, linked to its predecessor via `prev_hash`. Tampering with any
//! stored field — even a single payload byte — invalidates `own_hash` and
//! every subsequent `prev_hash`, which `chainlog-verify` detects.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use chainlog_audit::{ChainAppender, FileLogStore};
//!
//! let appender = ChainAppender::new(FileLogStore::new("events.jsonl"))?;
//! let record = appender.append(draft)?;
//! assert_eq!(appender.tip_hash()?, record.own_hash);
//! ```

pub mod builder;
pub mod file;
pub mod memory;
pub mod writer;

pub use builder::{build_record, record_hash};
pub use file::FileLogStore;
pub use memory::MemoryLogStore;
pub use writer::ChainAppender;

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use serde_json::json;

    use chainlog_contracts::{
        record::{EventDraft, EventRecord, RequestContext, SubjectRefs, GENESIS_HASH},
        value::CanonicalValue,
    };
    use chainlog_core::traits::LogStore;

    use super::{build_record, record_hash, ChainAppender, FileLogStore, MemoryLogStore};

    // ── Helpers ───────────────────────────────────────────────────────────────

    /// Build a draft with a distinguishable payload.
    fn make_draft(action: &str, detail: &str) -> EventDraft {
        EventDraft {
            action: action.to_string(),
            actor: "user:alice".to_string(),
            subject_refs: SubjectRefs {
                receipt_id: Some("rcpt-7".to_string()),
                export_id: None,
                view_id: None,
            },
            payload: serde_json::from_value(json!({ "detail": detail })).unwrap(),
            context: Some(RequestContext {
                origin: Some("203.0.113.7".to_string()),
                user_agent: Some("integration-test".to_string()),
            }),
        }
    }

    fn nan_draft() -> EventDraft {
        let mut payload = std::collections::BTreeMap::new();
        payload.insert("amount".to_string(), CanonicalValue::Float(f64::NAN));
        EventDraft {
            action: "EXPORT_CREATED".to_string(),
            actor: "service:exporter".to_string(),
            subject_refs: SubjectRefs::default(),
            payload: CanonicalValue::Object(payload),
            context: None,
        }
    }

    // ── Builder ───────────────────────────────────────────────────────────────

    /// A sealed record's own_hash matches an independent recomputation.
    #[test]
    fn build_record_seals_a_recomputable_hash() {
        let record = build_record(
            make_draft("AUTH_FAILURE", "wrong password"),
            1,
            "2026-08-06T10:00:00.000Z".to_string(),
            GENESIS_HASH.to_string(),
        )
        .unwrap();

        assert!(record.is_genesis());
        assert_eq!(record.own_hash.len(), 64);
        assert_eq!(
            record_hash(&record).unwrap(),
            record.own_hash,
            "recomputing over the sealed record must reproduce own_hash"
        );
    }

    /// Changing any field changes the hash.
    #[test]
    fn record_hash_commits_to_every_field() {
        let base = build_record(
            make_draft("AUTH_FAILURE", "wrong password"),
            1,
            "2026-08-06T10:00:00.000Z".to_string(),
            GENESIS_HASH.to_string(),
        )
        .unwrap();

        let mut tampered = base.clone();
        tampered.actor = "user:mallory".to_string();
        assert_ne!(record_hash(&tampered).unwrap(), base.own_hash);

        let mut tampered = base.clone();
        tampered.subject_refs.export_id = Some("exp-1".to_string());
        assert_ne!(record_hash(&tampered).unwrap(), base.own_hash);

        let mut tampered = base.clone();
        tampered.prev_hash = "ab".repeat(32);
        assert_ne!(record_hash(&tampered).unwrap(), base.own_hash);
    }

    /// An unencodable payload fails the build — before any I/O could happen.
    #[test]
    fn build_record_propagates_encoding_failure() {
        let err = build_record(
            nan_draft(),
            1,
            "2026-08-06T10:00:00.000Z".to_string(),
            GENESIS_HASH.to_string(),
        )
        .unwrap_err();

        assert_eq!(err.to_string(), "non-finite number at $.payload.amount");
    }

    // ── ChainAppender ─────────────────────────────────────────────────────────

    /// Sequential appends produce a correctly linked chain.
    #[test]
    fn appender_links_records_in_order() {
        let appender = ChainAppender::new(MemoryLogStore::new()).unwrap();

        let first = appender.append(make_draft("LOGIN_FAIL", "a")).unwrap();
        let second = appender.append(make_draft("EXPORT_CREATED", "b")).unwrap();
        let third = appender.append(make_draft("LOGIN_FAIL", "c")).unwrap();

        assert_eq!((first.seq, second.seq, third.seq), (1, 2, 3));
        assert_eq!(first.prev_hash, GENESIS_HASH);
        assert_eq!(second.prev_hash, first.own_hash);
        assert_eq!(third.prev_hash, second.own_hash);
        assert_eq!(appender.tip_hash().unwrap(), third.own_hash);
    }

    /// Timestamps never step backwards relative to seq order.
    #[test]
    fn appender_timestamps_are_monotonic_or_equal() {
        let appender = ChainAppender::new(MemoryLogStore::new()).unwrap();
        let mut previous = String::new();
        for i in 0..5 {
            let record = appender
                .append(make_draft("AUTH_FAILURE", &format!("attempt {i}")))
                .unwrap();
            assert!(
                record.timestamp >= previous,
                "timestamp at seq {} regressed",
                record.seq
            );
            previous = record.timestamp;
        }
    }

    /// An encoding failure aborts the append with the store untouched.
    #[test]
    fn appender_rejects_bad_payload_without_writing() {
        let appender = ChainAppender::new(MemoryLogStore::new()).unwrap();

        assert!(appender.append(nan_draft()).is_err());
        assert!(
            appender.store().read_all().unwrap().is_empty(),
            "a failed build must not reach the store"
        );

        // The cursor did not advance: the next good append is still seq 1.
        let record = appender.append(make_draft("LOGIN_FAIL", "ok")).unwrap();
        assert_eq!(record.seq, 1);
        assert!(record.is_genesis());
    }

    /// A new appender over a non-empty store resumes from the stored tip.
    #[test]
    fn appender_seeds_from_existing_tip() {
        let store = MemoryLogStore::new();
        let tip = {
            let appender = ChainAppender::new(&store).unwrap();
            appender.append(make_draft("LOGIN_FAIL", "a")).unwrap();
            appender.append(make_draft("LOGIN_FAIL", "b")).unwrap()
        };

        let resumed = ChainAppender::new(&store).unwrap();
        let next = resumed.append(make_draft("EXPORT_CREATED", "c")).unwrap();

        assert_eq!(next.seq, 3);
        assert_eq!(next.prev_hash, tip.own_hash);
    }

    // ── Stores ────────────────────────────────────────────────────────────────

    #[test]
    fn memory_store_round_trips_records() {
        let store = MemoryLogStore::new();
        assert!(store.read_tip().unwrap().is_none());

        let appender = ChainAppender::new(&store).unwrap();
        let record = appender.append(make_draft("VIEW_OPENED", "x")).unwrap();

        let tip = store.read_tip().unwrap().expect("tip must exist");
        assert_eq!(tip, record);
        assert_eq!(store.read_all().unwrap().len(), 1);

        store.replace_all(&[]).unwrap();
        assert!(store.read_tip().unwrap().is_none());
    }

    #[test]
    fn file_store_round_trips_records() {
        let path = std::env::temp_dir().join(format!("chainlog-test-{}.jsonl", uuid::Uuid::new_v4()));
        let store = FileLogStore::new(&path);

        // A missing file reads as an empty log.
        assert!(store.read_all().unwrap().is_empty());
        assert!(store.read_tip().unwrap().is_none());

        let appender = ChainAppender::new(&store).unwrap();
        appender.append(make_draft("LOGIN_FAIL", "a")).unwrap();
        let second = appender.append(make_draft("EXPORT_CREATED", "b")).unwrap();

        let lines = store.read_all().unwrap();
        assert_eq!(lines.len(), 2);
        let tip = store.read_tip().unwrap().expect("tip must exist");
        assert_eq!(tip, second);

        // Parsed-back line equals the record that was appended.
        let reparsed: EventRecord = serde_json::from_str(&lines[1]).unwrap();
        assert_eq!(reparsed, second);

        // Atomic rewrite: only the first line survives.
        store.replace_all(&lines[..1]).unwrap();
        assert_eq!(store.read_all().unwrap(), lines[..1].to_vec());

        let _ = std::fs::remove_file(&path);
    }

    /// `&S` also implements the store trait, so appenders can share a store
    /// with verification code.
    #[test]
    fn store_references_are_stores() {
        fn assert_store<S: LogStore>(_s: &S) {}
        let store = MemoryLogStore::new();
        assert_store(&&store);
    }
}
