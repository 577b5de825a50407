//! # chainlog-verify
//!
//! Full-chain verification and manifest cross-checking for the CHAINLOG
//! workspace.
//!
//! ## Overview
//!
//! `verify` replays a store front to back, recomputing hashes and checking
//! links, and returns a structured report locating every problem it found.
//! `cross_check` compares that report against the operator-maintained
//! manifest summary to flag drift. Neither ever mutates the store.

pub mod manifest;
pub mod verifier;

pub use manifest::{cross_check, CrossCheckReport, Manifest};
pub use verifier::{verify, VerifyIssue, VerifyReport};

// ── Tests ─────────────────────────────────────────────────────────────────────
