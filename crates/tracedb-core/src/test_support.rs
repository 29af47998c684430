use crate::db::{
    codec::{IndexDescriptor, Record, RecordError, Transferable, is_composite, require_field},
    ledger::{
        HistoryIter, IdentityAttributes, LedgerError, LedgerState, QueryMetadata, StateScanIter,
        Timestamp,
    },
};
use serde::{Deserialize, Serialize};

pub(crate) fn ts(seconds: i64) -> Timestamp {
    Timestamp::new(seconds, 0)
}

pub(crate) fn admin() -> IdentityAttributes {
    IdentityAttributes::member("Brand-Org", Some("admin"))
}

///
/// Gadget
/// Minimal transferable record kind for core tests.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub(crate) struct Gadget {
    pub(crate) id: String,
    pub(crate) org: String,
    pub(crate) label: String,
    #[serde(default)]
    pub(crate) transferred_at: String,
}

impl Gadget {
    pub(crate) fn new(id: &str, org: &str, label: &str) -> Self {
        Self {
            id: id.to_string(),
            org: org.to_string(),
            label: label.to_string(),
            transferred_at: String::new(),
        }
    }
}

impl Record for Gadget {
    const KIND: &'static str = "gadget";
    const INDEX: IndexDescriptor = IndexDescriptor::new("gadgets-by-org", &["org", "id"]);

    fn primary_key(&self) -> &str {
        &self.id
    }

    fn index_values(&self) -> Vec<&str> {
        vec![self.org.as_str(), self.id.as_str()]
    }

    fn validate(&self) -> Result<(), RecordError> {
        require_field(Self::KIND, "org", &self.org)
    }

    fn tombstone(primary_key: &str) -> Self {
        Self {
            id: primary_key.to_string(),
            ..Self::default()
        }
    }
}

impl Transferable for Gadget {
    fn owner(&self) -> &str {
        &self.org
    }

    fn transfer_to(&mut self, new_owner: &str, transfer_date: &str) {
        self.org = new_owner.to_string();
        self.transferred_at = transfer_date.to_string();
    }
}

///
/// Widget
/// Second record kind sharing the key space with `Gadget`.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub(crate) struct Widget {
    pub(crate) id: String,
    pub(crate) maker: String,
}

impl Record for Widget {
    const KIND: &'static str = "widget";
    const INDEX: IndexDescriptor = IndexDescriptor::new("widgets-by-maker", &["maker", "id"]);

    fn primary_key(&self) -> &str {
        &self.id
    }

    fn index_values(&self) -> Vec<&str> {
        vec![self.maker.as_str(), self.id.as_str()]
    }

    fn tombstone(primary_key: &str) -> Self {
        Self {
            id: primary_key.to_string(),
            ..Self::default()
        }
    }
}

///
/// Fault
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Fault {
    Identity,
    Reads,
    Writes,
    IndexWrites,
}

///
/// FaultyLedger
/// Wraps a ledger and fails one class of calls.
///

pub(crate) struct FaultyLedger<L> {
    inner: L,
    fault: Fault,
}

impl<L> FaultyLedger<L> {
    pub(crate) const fn new(inner: L, fault: Fault) -> Self {
        Self { inner, fault }
    }

    pub(crate) const fn identity_unavailable(inner: L) -> Self {
        Self::new(inner, Fault::Identity)
    }

    pub(crate) fn into_inner(self) -> L {
        self.inner
    }

    fn unavailable(&self) -> LedgerError {
        LedgerError::Unavailable(format!("injected {:?} fault", self.fault))
    }

    fn reads_fail(&self) -> bool {
        self.fault == Fault::Reads
    }
}

impl<L: LedgerState> LedgerState for FaultyLedger<L> {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, LedgerError> {
        if self.reads_fail() {
            return Err(self.unavailable());
        }
        self.inner.get(key)
    }

    fn put(&mut self, key: &str, value: &[u8]) -> Result<(), LedgerError> {
        match self.fault {
            Fault::Writes => Err(self.unavailable()),
            Fault::IndexWrites if is_composite(key) => Err(self.unavailable()),
            _ => self.inner.put(key, value),
        }
    }

    fn delete(&mut self, key: &str) -> Result<(), LedgerError> {
        match self.fault {
            Fault::Writes => Err(self.unavailable()),
            Fault::IndexWrites if is_composite(key) => Err(self.unavailable()),
            _ => self.inner.delete(key),
        }
    }

    fn range_scan(&self, start: &str, end: &str) -> Result<StateScanIter<'_>, LedgerError> {
        if self.reads_fail() {
            return Err(self.unavailable());
        }
        self.inner.range_scan(start, end)
    }

    fn rich_query(&self, query: &str) -> Result<StateScanIter<'_>, LedgerError> {
        if self.reads_fail() {
            return Err(self.unavailable());
        }
        self.inner.rich_query(query)
    }

    fn rich_query_paginated(
        &self,
        query: &str,
        page_size: u32,
        bookmark: &str,
    ) -> Result<(StateScanIter<'_>, QueryMetadata), LedgerError> {
        if self.reads_fail() {
            return Err(self.unavailable());
        }
        self.inner.rich_query_paginated(query, page_size, bookmark)
    }

    fn history_for(&self, key: &str) -> Result<HistoryIter<'_>, LedgerError> {
        if self.reads_fail() {
            return Err(self.unavailable());
        }
        self.inner.history_for(key)
    }

    fn current_identity(&self) -> Result<IdentityAttributes, LedgerError> {
        if self.fault == Fault::Identity {
            return Err(LedgerError::Identity("injected identity fault".to_string()));
        }
        self.inner.current_identity()
    }
}
