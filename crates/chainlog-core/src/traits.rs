//! Core trait definitions for the CHAINLOG pipeline.
//!
//! `LogStore` is the boundary between the chain logic and the storage
//! medium. The design is medium-agnostic: a flat file, a database table, or
//! an object store all qualify as long as they provide ordered, durable,
//! append-capable storage. The appender, verifier, and migrator only ever
//! talk to this trait.

use chainlog_contracts::{error::ChainlogResult, record::EventRecord};

/// Ordered, durable, append-capable storage for one event log.
///
/// Implementations must guarantee:
///
/// - an append is durable before `append` reports success;
/// - reads observe a consistent prefix — no record is visible without its
///   predecessor also being visible;
/// - a reader never sees a partially written line (appends are exposed
///   atomically).
///
/// Records written through this trait are never modified or deleted by the
/// runtime; the single exception is `replace_all`, which exists solely for
/// the one-time legacy migration and must swap the full contents
/// atomically.
pub trait LogStore: Send + Sync {
    /// Append one record to the end of the log.
    ///
    /// Must not return success until the record is durable. A failed append
    /// is reported to the caller unchanged — implementations must not
    /// retry internally, since a duplicate append would corrupt `seq`
    /// contiguity.
    fn append(&self, record: &EventRecord) -> ChainlogResult<()>;

    /// Read every stored line in append order, raw and unparsed.
    ///
    /// The verifier and migrator parse lines themselves so that malformed
    /// entries can be diagnosed per line instead of failing the whole read.
    fn read_all(&self) -> ChainlogResult<Vec<String>>;

    /// Read the most recently appended record, or `None` for an empty log.
    fn read_tip(&self) -> ChainlogResult<Option<EventRecord>>;

    /// Atomically replace the full contents of the log.
    ///
    /// Migration-only. Everyday operation is append-only and never calls
    /// this.
    fn replace_all(&self, lines: &[String]) -> ChainlogResult<()>;
}

// Borrowing callers can hand `&S` to an appender while keeping the store
// for reads and verification.
impl<S: LogStore + ?Sized> LogStore for &S {
    fn append(&self, record: &EventRecord) -> ChainlogResult<()> {
        (**self).append(record)
    }

    fn read_all(&self) -> ChainlogResult<Vec<String>> {
        (**self).read_all()
    }

    fn read_tip(&self) -> ChainlogResult<Option<EventRecord>> {
        (**self).read_tip()
    }

    fn replace_all(&self, lines: &[String]) -> ChainlogResult<()> {
        (**self).replace_all(lines)
    }
}
