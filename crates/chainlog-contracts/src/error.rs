//! Error types for the CHAINLOG crates.
//!
//! All fallible operations in the workspace return `ChainlogResult<T>`.
//! Canonical-encoding failures get their own type, `EncodingError`, because
//! they carry a path into the offending value and must abort an append
//! before any I/O happens. Chain-integrity findings (hash mismatch, broken
//! link, sequence gap) are deliberately *not* errors — the verifier
//! accumulates them as report entries and never aborts the scan.

use thiserror::Error;

/// A value could not be canonically encoded.
///
/// Every variant names the exact location of the offending value in
/// `$.a.b[2].c` notation so producers can find the bad field without
/// dumping the whole payload.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EncodingError {
    /// A number was NaN or infinite. Non-finite values have no canonical
    /// textual form and are never coerced.
    #[error("non-finite number at {path}")]
    NonFinite { path: String },

    /// An object used one of the reserved keys (`__proto__`, `constructor`,
    /// `prototype`), which are forbidden at any nesting level.
    #[error("forbidden key '{key}' at {path}")]
    ForbiddenKey { path: String, key: String },

    /// An integer fell outside the i64 range the canonical form supports.
    #[error("integer out of range at {path}: {value}")]
    IntegerOverflow { path: String, value: String },

    /// The value nests deeper than the encoder's recursion limit.
    #[error("nesting exceeds {limit} levels at {path}")]
    DepthExceeded { path: String, limit: usize },
}

/// The unified error type for the CHAINLOG workspace.
#[derive(Debug, Error)]
pub enum ChainlogError {
    /// A value failed strict canonical encoding. Fatal to the attempted
    /// operation; the offending append never reaches the store.
    #[error("encoding failed: {0}")]
    Encoding(#[from] EncodingError),

    /// A stored line could not be parsed as a well-formed record.
    #[error("malformed record at line {line}: {reason}")]
    Parse { line: usize, reason: String },

    /// The store could not durably complete an append, read, or rewrite.
    ///
    /// Propagated to the caller unchanged — the core never retries a write,
    /// since a duplicate append would corrupt `seq` contiguity.
    #[error("store I/O failure: {reason}")]
    StoreIo { reason: String },

    /// A configuration document (e.g. the manifest summary) is missing or
    /// malformed.
    #[error("configuration error: {reason}")]
    Config { reason: String },
}

/// Convenience alias used throughout the CHAINLOG crates.
pub type ChainlogResult<T> = Result<T, ChainlogError>;
