//! Record construction and hash derivation.
//!
//! A record's hash commits to every envelope field except `own_hash`
//! itself. The hash input is the canonical encoding of a JSON object
//! holding those fields; every contributing field is listed explicitly here
//! so nothing is accidentally omitted.
//!
//! Hash input layout (canonical object keys, byte order):
//!   action, actor, context, payload, prevHash, schemaVersion, seq,
//!   subjectRefs, timestamp

use std::collections::BTreeMap;

use chainlog_canonical::{digest, encode};
use chainlog_contracts::{
    error::EncodingError,
    record::{EventDraft, EventRecord, SCHEMA_VERSION},
    value::CanonicalValue,
};

/// Recompute the hash a record's content derives to.
///
/// Ignores the stored `own_hash` entirely — this is both how new records
/// are sealed and how the verifier cross-checks stored ones. Fails only if
/// some field no longer canonically encodes (e.g. a payload smuggling a
/// reserved key past an older writer).
pub fn record_hash(record: &EventRecord) -> Result<String, EncodingError> {
    let mut fields = BTreeMap::new();
    fields.insert(
        "schemaVersion".to_string(),
        CanonicalValue::Str(record.schema_version.clone()),
    );
    fields.insert("seq".to_string(), seq_value(record.seq)?);
    fields.insert(
        "timestamp".to_string(),
        CanonicalValue::Str(record.timestamp.clone()),
    );
    fields.insert("action".to_string(), CanonicalValue::Str(record.action.clone()));
    fields.insert("actor".to_string(), CanonicalValue::Str(record.actor.clone()));
    fields.insert("subjectRefs".to_string(), record.subject_refs.to_canonical());
    fields.insert("payload".to_string(), record.payload.clone());
    fields.insert(
        "context".to_string(),
        match &record.context {
            Some(context) => context.to_canonical(),
            None => CanonicalValue::Null,
        },
    );
    fields.insert(
        "prevHash".to_string(),
        CanonicalValue::Str(record.prev_hash.clone()),
    );

    let encoded = encode(&CanonicalValue::Object(fields))?;
    Ok(digest(&encoded))
}

fn seq_value(seq: u64) -> Result<CanonicalValue, EncodingError> {
    i64::try_from(seq)
        .map(CanonicalValue::Int)
        .map_err(|_| EncodingError::IntegerOverflow {
            path: "$.seq".to_string(),
            value: seq.to_string(),
        })
}

/// Assemble and seal a new record.
///
/// Populates `prev_hash`, computes `own_hash` over all other fields, and
/// returns the fully formed immutable record. An encoding failure aborts
/// here, before any I/O — the caller must not have touched the store yet.
pub fn build_record(
    draft: EventDraft,
    seq: u64,
    timestamp: String,
    prev_hash: String,
) -> Result<EventRecord, EncodingError> {
    let mut record = EventRecord {
        schema_version: SCHEMA_VERSION.to_string(),
        seq,
        timestamp,
        action: draft.action,
        actor: draft.actor,
        subject_refs: draft.subject_refs,
        payload: draft.payload,
        context: draft.context,
        prev_hash,
        own_hash: String::new(),
    };
    record.own_hash = record_hash(&record)?;
    Ok(record)
}
