//! Event record envelope types.
//!
//! `EventRecord` is the unit of the hash chain — one appended line per
//! security-relevant action. `EventDraft` is the producer-supplied subset;
//! the chain appender fills in `seq`, `timestamp`, `prev_hash`, and
//! `own_hash`. `LegacyRecord` is the pre-chain envelope the migrator
//! understands.
//!
//! All envelope types serialize with camelCase keys because that is the
//! persisted line format. Nullable fields are always written as `null`,
//! never omitted — field presence is how legacy and chained records are
//! told apart, so chained records must carry every key.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::value::CanonicalValue;

/// The sentinel `prev_hash` of the first record in every log.
///
/// 64 hex zeros — a value that can never be the SHA-256 of real data,
/// making genesis detection unambiguous.
pub const GENESIS_HASH: &str =
    "0000000000000000000000000000000000000000000000000000000000000000";

/// Format version of the envelope, stamped into every new record.
pub const SCHEMA_VERSION: &str = "1.0";

/// Identifiers correlating an event to domain entities.
///
/// Absent references serialize as `null`, not omitted, so every chained
/// line carries the same key set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectRefs {
    /// Related receipt, if any.
    pub receipt_id: Option<String>,
    /// Related export, if any.
    pub export_id: Option<String>,
    /// Related view, if any.
    pub view_id: Option<String>,
}

impl SubjectRefs {
    /// Project into the canonical value model for hashing.
    pub fn to_canonical(&self) -> CanonicalValue {
        let mut fields = BTreeMap::new();
        fields.insert("receiptId".to_string(), opt_str(&self.receipt_id));
        fields.insert("exportId".to_string(), opt_str(&self.export_id));
        fields.insert("viewId".to_string(), opt_str(&self.view_id));
        CanonicalValue::Object(fields)
    }
}

/// Request metadata captured alongside an event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestContext {
    /// Origin address of the request that produced the event.
    pub origin: Option<String>,
    /// Client agent string, verbatim.
    pub user_agent: Option<String>,
}

impl RequestContext {
    /// Project into the canonical value model for hashing.
    pub fn to_canonical(&self) -> CanonicalValue {
        let mut fields = BTreeMap::new();
        fields.insert("origin".to_string(), opt_str(&self.origin));
        fields.insert("userAgent".to_string(), opt_str(&self.user_agent));
        CanonicalValue::Object(fields)
    }
}

fn opt_str(v: &Option<String>) -> CanonicalValue {
    match v {
        Some(s) => CanonicalValue::Str(s.clone()),
        None => CanonicalValue::Null,
    }
}

/// A single entry in the hash chain.
///
/// Each record commits to its predecessor via `prev_hash`. Modifying any
/// field — including payload internals — invalidates `own_hash` and every
/// subsequent `prev_hash`, which the verifier detects. Once appended a
/// record is immutable; the store is append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    /// Format version of this envelope.
    pub schema_version: String,

    /// Position in the chain. Strictly increasing from 1, no gaps, no reuse.
    pub seq: u64,

    /// ISO-8601 UTC timestamp. Kept as the literal string that was hashed —
    /// re-serialization must not be able to change its bytes.
    pub timestamp: String,

    /// The event kind, e.g. `AUTH_FAILURE` or `EXPORT_CREATED`.
    pub action: String,

    /// Who or what performed the action.
    pub actor: String,

    /// Correlation to domain entities. Nullable members, never omitted.
    pub subject_refs: SubjectRefs,

    /// Action-specific detail. Any canonical value.
    pub payload: CanonicalValue,

    /// Request metadata, or `null`.
    pub context: Option<RequestContext>,

    /// The predecessor's `own_hash`, or `GENESIS_HASH` for the first record.
    pub prev_hash: String,

    /// SHA-256 (hex) of the canonical encoding of every field above,
    /// `prev_hash` included, `own_hash` itself excluded.
    pub own_hash: String,
}

impl EventRecord {
    /// True iff this is the first record of a log: `seq == 1` and
    /// `prev_hash` is the genesis sentinel.
    pub fn is_genesis(&self) -> bool {
        self.seq == 1 && self.prev_hash == GENESIS_HASH
    }
}

/// What an event producer supplies. The chain appender derives the rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDraft {
    /// The event kind.
    pub action: String,
    /// Who or what performed the action.
    pub actor: String,
    /// Correlation to domain entities.
    pub subject_refs: SubjectRefs,
    /// Action-specific detail.
    pub payload: CanonicalValue,
    /// Request metadata, or `None`.
    pub context: Option<RequestContext>,
}

/// A stored record predating the chaining scheme.
///
/// Lacks `prev_hash`/`own_hash`; `seq` may or may not be present. The
/// migrator augments these into full `EventRecord`s without reinterpreting
/// any content field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyRecord {
    /// Format version of this envelope.
    pub schema_version: String,
    /// Position in the log, when the legacy writer recorded one.
    #[serde(default)]
    pub seq: Option<u64>,
    /// ISO-8601 UTC timestamp, preserved verbatim by migration.
    pub timestamp: String,
    /// The event kind.
    pub action: String,
    /// Who or what performed the action.
    pub actor: String,
    /// Correlation to domain entities.
    pub subject_refs: SubjectRefs,
    /// Action-specific detail.
    pub payload: CanonicalValue,
    /// Request metadata, or `null`.
    pub context: Option<RequestContext>,
}
