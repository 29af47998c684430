//! Core of tracedb: indexed records over a host ledger's key-value state.
//!
//! Records are written through the indexed store, which keeps one composite
//! index entry per primary entry. Reads go through range, attribute and
//! selector queries, pagination, and history replay.
#![warn(unreachable_pub)]

// public exports are one module level down
pub mod db;
pub mod error;
pub mod obs;
pub mod serialize;

// test
#[cfg(test)]
pub(crate) mod test_support;

///
/// Prelude
///
/// Domain vocabulary for record kinds and contract entry points.
///

pub mod prelude {
    pub use crate::{
        db::{
            Db,
            access::Capability,
            codec::{IndexDescriptor, Record, RecordError, Transferable, require_field},
            cursor::{Bookmark, PageQuery, PaginatedResult},
            history::HistoryEntry,
            ledger::{IdentityAttributes, LedgerState, Timestamp},
            query::Selector,
        },
        error::{ErrorClass, InternalError},
    };
}
