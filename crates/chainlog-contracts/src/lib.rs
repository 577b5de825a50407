//! # chainlog-contracts
//!
//! Shared types and error taxonomy for the CHAINLOG workspace.
//!
//! All crates in the workspace import from here. No business logic lives in
//! this crate — only data definitions, small representation mappings, and
//! error types.

pub mod error;
pub mod record;
pub mod value;

pub use error::{ChainlogError, ChainlogResult, EncodingError};
pub use record::{
    EventDraft, EventRecord, LegacyRecord, RequestContext, SubjectRefs, GENESIS_HASH,
    SCHEMA_VERSION,
};
pub use value::CanonicalValue;
