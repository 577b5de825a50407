//! # chainlog-canonical
//!
//! Deterministic canonical encoding and hashing for the CHAINLOG workspace.
//!
//! ## Overview
//!
//! Record hashes are only meaningful if the bytes being hashed are unique
//! per logical value: the same payload must produce the same bytes in every
//! process, on every platform, in every version. `encode` provides that
//! mapping — sorted object keys, one spelling per number, standard string
//! escaping — and fails loudly (with the path of the offending value) on
//! anything that has no canonical form. `digest` is the SHA-256 companion
//! producing the 64-char lowercase hex strings stored in records.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use chainlog_canonical::{digest, encode};
//!
//! let bytes = encode(&payload)?;
//! let hash = digest(&bytes);
//! ```

pub mod digest;
pub mod encode;

pub use digest::digest;
pub use encode::{encode, FORBIDDEN_KEYS, MAX_DEPTH};

// ── Tests ─────────────────────────────────────────────────────────────────────
