//! The chain verifier.
//!
//! Replays a store in order, recomputes every record's hash, and
//! cross-checks the links. Verification is best-effort, never fail-fast:
//! every problem is recorded with its line or seq number and the scan
//! always reaches the end, so operators get the full diagnosis in one
//! pass. Nothing is ever repaired — an invalid chain stays invalid until
//! a human decides what to do with it.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use chainlog_audit::builder::record_hash;
use chainlog_contracts::{
    error::ChainlogResult,
    record::{EventRecord, GENESIS_HASH},
};
use chainlog_core::traits::LogStore;

/// One detected problem, located by its 1-based store line.
///
/// Messages carry the seq number too when the record parsed far enough to
/// have one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifyIssue {
    /// 1-based line number in the store.
    pub line: usize,
    /// Human-readable description of the problem.
    pub message: String,
}

/// The outcome of a full-chain verification pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifyReport {
    /// True only when `errors` is empty.
    pub valid: bool,
    /// Total stored lines scanned, parseable or not.
    pub line_count: usize,
    /// The tip hash reached by the scan — the last chained record's stored
    /// `own_hash`, or the genesis sentinel for an empty log. Meaningful
    /// even when the chain is invalid (the manifest cross-check uses it
    /// either way).
    pub last_hash: String,
    /// Timestamp of the last successfully parsed chained record.
    pub last_timestamp: Option<String>,
    /// Every detected problem, in store order.
    pub errors: Vec<VerifyIssue>,
}

fn push_issue(errors: &mut Vec<VerifyIssue>, line: usize, message: String) {
    warn!(line, %message, "chain verification issue");
    errors.push(VerifyIssue { line, message });
}

/// Verify the integrity of the full chain in `store`.
///
/// For every line, in stored order:
///
/// 1. a line that does not parse as a record is recorded and skipped;
/// 2. a record without chain fields is recorded as unmigrated legacy;
/// 3. the stored `own_hash` is checked against a recomputation over the
///    record's own fields (including its stored `prev_hash`);
/// 4. the stored `prev_hash` is checked against the previous record's
///    `own_hash` (the genesis sentinel at the start);
/// 5. `seq` is checked against the expected running counter;
/// 6. the expected link and counter advance from the *stored* values
///    regardless of earlier findings on this record, so one corrupt
///    record does not cascade into spurious errors downstream.
///
/// Only a store read failure aborts; everything else is reported.
pub fn verify(store: &dyn LogStore) -> ChainlogResult<VerifyReport> {
    let lines = store.read_all()?;

    let mut errors: Vec<VerifyIssue> = Vec::new();
    let mut expected_prev = GENESIS_HASH.to_string();
    let mut expected_seq: u64 = 1;
    let mut last_timestamp: Option<String> = None;

    for (idx, line) in lines.iter().enumerate() {
        let line_no = idx + 1;

        let value: serde_json::Value = match serde_json::from_str(line) {
            Ok(v) => v,
            Err(e) => {
                push_issue(&mut errors, line_no, format!("parse failure at line {line_no}: {e}"));
                continue;
            }
        };

        // Chained-ness is detected by field presence; see DESIGN.md for the
        // robustness caveat.
        if value.get("ownHash").is_none() || value.get("prevHash").is_none() {
            push_issue(
                &mut errors,
                line_no,
                format!("unchained legacy record at line {line_no}: migration required"),
            );
            continue;
        }

        let record: EventRecord = match serde_json::from_value(value) {
            Ok(r) => r,
            Err(e) => {
                push_issue(&mut errors, line_no, format!("parse failure at line {line_no}: {e}"));
                continue;
            }
        };

        match record_hash(&record) {
            Ok(recomputed) => {
                if recomputed != record.own_hash {
                    push_issue(
                        &mut errors,
                        line_no,
                        format!(
                            "hash mismatch at seq {}: stored={} recomputed={}",
                            record.seq, record.own_hash, recomputed
                        ),
                    );
                }
            }
            Err(e) => {
                push_issue(
                    &mut errors,
                    line_no,
                    format!(
                        "hash mismatch at seq {}: stored record does not canonically encode: {e}",
                        record.seq
                    ),
                );
            }
        }

        if record.prev_hash != expected_prev {
            push_issue(
                &mut errors,
                line_no,
                format!(
                    "chain break at seq {}: expected prevHash={} got={}",
                    record.seq, expected_prev, record.prev_hash
                ),
            );
        }

        if record.seq != expected_seq {
            push_issue(
                &mut errors,
                line_no,
                format!("sequence gap/duplicate at seq {}", record.seq),
            );
        }

        // Advance from the stored values regardless of findings above.
        expected_prev = record.own_hash.clone();
        expected_seq += 1;
        last_timestamp = Some(record.timestamp.clone());
    }

    let valid = errors.is_empty();
    if valid {
        info!(
            line_count = lines.len(),
            last_hash = %expected_prev,
            "chain verified"
        );
    } else {
        warn!(
            line_count = lines.len(),
            error_count = errors.len(),
            "chain verification failed"
        );
    }

    Ok(VerifyReport {
        valid,
        line_count: lines.len(),
        last_hash: expected_prev,
        last_timestamp,
        errors,
    })
}
