pub mod access;
pub mod codec;
pub mod cursor;
pub mod history;
pub mod ledger;
pub mod memory;
pub mod query;
pub mod store;

use crate::{
    db::{
        access::{AccessGate, Capability},
        cursor::Paginator,
        history::HistoryReader,
        ledger::{IdentityAttributes, LedgerState},
        query::QueryEngine,
        store::IndexedStore,
    },
    error::InternalError,
};

///
/// Db
///
/// Handle over one transaction context.
///
/// Entry points authorize through [`Db::authorize`] first, then borrow the
/// store for writes or the query, paging and history readers for reads.
///

pub struct Db<'a, S: ?Sized> {
    state: &'a mut S,
}

impl<'a, S: LedgerState + ?Sized> Db<'a, S> {
    pub const fn new(state: &'a mut S) -> Self {
        Self { state }
    }

    /// Check the caller against a capability and return its attributes.
    pub fn authorize(&self, capability: &Capability) -> Result<IdentityAttributes, InternalError> {
        AccessGate::authorize(&*self.state, capability)
    }

    pub fn store(&mut self) -> IndexedStore<'_, S> {
        IndexedStore::new(&mut *self.state)
    }

    #[must_use]
    pub const fn query(&self) -> QueryEngine<'_, S> {
        QueryEngine::new(&*self.state)
    }

    #[must_use]
    pub const fn paginator(&self) -> Paginator<'_, S> {
        Paginator::new(&*self.state)
    }

    #[must_use]
    pub const fn history(&self) -> HistoryReader<'_, S> {
        HistoryReader::new(&*self.state)
    }

    #[must_use]
    pub const fn state(&self) -> &S {
        &*self.state
    }
}
