//! Manifest cross-checking.
//!
//! Operators keep a human-readable summary document alongside the log: a
//! "last updated" timestamp and a short prefix of the expected tip hash.
//! `cross_check` compares that document against a verification report to
//! catch operational drift — a manifest nobody updated, or a log whose tip
//! no longer matches what the summary claims.
//!
//! Advisory only: the result never blocks verification.

use std::path::Path;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use chainlog_contracts::error::{ChainlogError, ChainlogResult};

use crate::verifier::VerifyReport;

/// The parsed manifest summary document.
///
/// ```toml
/// last_updated = "2026-08-06T10:00:00Z"
/// tip_prefix = "9f2c1ab407de"
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    /// When a human last refreshed the summary (ISO-8601).
    pub last_updated: String,
    /// Leading hex characters of the tip hash the summary records.
    pub tip_prefix: String,
}

impl Manifest {
    /// Parse `s` as a TOML manifest document.
    pub fn from_toml_str(s: &str) -> ChainlogResult<Self> {
        toml::from_str(s).map_err(|e| ChainlogError::Config {
            reason: format!("failed to parse manifest TOML: {e}"),
        })
    }

    /// Read the file at `path` and parse it as a TOML manifest document.
    pub fn from_file(path: &Path) -> ChainlogResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| ChainlogError::Config {
            reason: format!("failed to read manifest file '{}': {e}", path.display()),
        })?;
        Self::from_toml_str(&contents)
    }
}

/// The outcome of a manifest cross-check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossCheckReport {
    /// The verifier's tip hash starts with the manifest's recorded prefix.
    pub tip_prefix_found: bool,
    /// The manifest timestamp is strictly earlier than the last event's.
    pub manifest_stale: bool,
}

fn parse_timestamp(s: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(s).ok()
}

/// Compare a manifest summary against a verification report.
///
/// `tip_prefix_found` matches case-insensitively (hashes are stored
/// lowercase); an empty prefix never matches. `manifest_stale` requires
/// both timestamps to parse — an unparseable manifest timestamp is flagged
/// in the log and treated as not-stale, since this check is advisory.
pub fn cross_check(manifest: &Manifest, report: &VerifyReport) -> CrossCheckReport {
    let prefix = manifest.tip_prefix.trim().to_ascii_lowercase();
    let tip_prefix_found = !prefix.is_empty() && report.last_hash.starts_with(&prefix);

    let manifest_stale = match parse_timestamp(&manifest.last_updated) {
        None => {
            warn!(
                last_updated = %manifest.last_updated,
                "manifest timestamp does not parse; staleness not evaluated"
            );
            false
        }
        Some(manifest_ts) => match report.last_timestamp.as_deref().and_then(parse_timestamp) {
            Some(last_ts) => manifest_ts < last_ts,
            None => false,
        },
    };

    debug!(tip_prefix_found, manifest_stale, "manifest cross-check complete");

    CrossCheckReport {
        tip_prefix_found,
        manifest_stale,
    }
}
