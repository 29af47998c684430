//! Host ledger boundary.
//!
//! The ledger runtime (consensus, ordering, identity, transport) is an
//! external collaborator. This module defines the key-value surface the core
//! consumes from it; every other component talks to state through
//! [`LedgerState`] only.

use crate::error::{ErrorClass, ErrorOrigin, InternalError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error as ThisError;

/// Identity attribute naming the caller's organization.
pub const ORGANIZATION_ATTRIBUTE: &str = "organization";

/// Identity attribute naming the caller's role claim.
pub const ROLE_ATTRIBUTE: &str = "role";

///
/// LedgerError
///
/// Failures reported by the host ledger.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum LedgerError {
    #[error("ledger unavailable: {0}")]
    Unavailable(String),

    #[error("ledger rejected query: {0}")]
    InvalidQuery(String),

    #[error("ledger does not support {0}")]
    Unsupported(&'static str),

    #[error("caller identity unavailable: {0}")]
    Identity(String),
}

impl LedgerError {
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::Unavailable(_) => ErrorClass::StoreUnavailable,
            Self::InvalidQuery(_) | Self::Unsupported(_) => ErrorClass::MalformedQuery,
            Self::Identity(_) => ErrorClass::Unauthorized,
        }
    }
}

impl From<LedgerError> for InternalError {
    fn from(err: LedgerError) -> Self {
        Self::new(err.class(), ErrorOrigin::Ledger, err.to_string())
    }
}

///
/// Timestamp
///
/// Commit timestamp as issued by the host (seconds + nanos since epoch).
/// Never read from the local clock.
///

#[derive(
    Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
pub struct Timestamp {
    pub seconds: i64,
    pub nanos: u32,
}

impl Timestamp {
    #[must_use]
    pub const fn new(seconds: i64, nanos: u32) -> Self {
        Self { seconds, nanos }
    }
}

///
/// KeyValue
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct KeyValue {
    pub key: String,
    pub value: Vec<u8>,
}

///
/// KeyModification
///
/// One entry of a key's append-only change log.
/// `value` is empty for deletes unless the host retains the payload.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct KeyModification {
    pub tx_id: String,
    pub timestamp: Timestamp,
    pub value: Vec<u8>,
    pub is_delete: bool,
}

///
/// QueryMetadata
///
/// Host-issued metadata for one page of a paginated rich query.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct QueryMetadata {
    pub fetched_records_count: u32,
    pub bookmark: String,
}

///
/// HistoryOrder
///
/// Native order of [`LedgerState::history_for`].
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum HistoryOrder {
    #[default]
    CommitOrder,
    NewestFirst,
}

///
/// IdentityAttributes
///
/// Attribute claims carried by the invoking client's certificate.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct IdentityAttributes(BTreeMap<String, String>);

impl IdentityAttributes {
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Build a member identity with an optional role claim.
    #[must_use]
    pub fn member(organization: impl Into<String>, role: Option<&str>) -> Self {
        let mut attrs = Self::new().with(ORGANIZATION_ATTRIBUTE, organization);
        if let Some(role) = role {
            attrs = attrs.with(ROLE_ATTRIBUTE, role);
        }

        attrs
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    #[must_use]
    pub fn organization(&self) -> Option<&str> {
        self.get(ORGANIZATION_ATTRIBUTE)
    }

    #[must_use]
    pub fn role(&self) -> Option<&str> {
        self.get(ROLE_ATTRIBUTE)
    }
}

/// Boxed iterator over scan results.
pub type StateScanIter<'a> = Box<dyn Iterator<Item = Result<KeyValue, LedgerError>> + 'a>;

/// Boxed iterator over a key's change log.
pub type HistoryIter<'a> = Box<dyn Iterator<Item = Result<KeyModification, LedgerError>> + 'a>;

///
/// LedgerState
///
/// Key-value state exposed by the host inside one transaction context.
///
/// Writes are staged by the host and committed all-or-nothing when the
/// transaction completes; the core never compensates locally.
///

pub trait LedgerState {
    /// Gets a value by key.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, LedgerError>;

    /// Writes a key-value pair.
    fn put(&mut self, key: &str, value: &[u8]) -> Result<(), LedgerError>;

    /// Deletes a key.
    fn delete(&mut self, key: &str) -> Result<(), LedgerError>;

    /// Scans `[start, end)` in key order. An empty bound is open.
    fn range_scan(&self, start: &str, end: &str) -> Result<StateScanIter<'_>, LedgerError>;

    /// Evaluates a selector query string against primary entries.
    fn rich_query(&self, query: &str) -> Result<StateScanIter<'_>, LedgerError>;

    /// Evaluates one page of a selector query.
    fn rich_query_paginated(
        &self,
        query: &str,
        page_size: u32,
        bookmark: &str,
    ) -> Result<(StateScanIter<'_>, QueryMetadata), LedgerError>;

    /// Yields the change log for a key in [`Self::history_order`].
    fn history_for(&self, key: &str) -> Result<HistoryIter<'_>, LedgerError>;

    /// Returns the invoking client's identity attributes.
    fn current_identity(&self) -> Result<IdentityAttributes, LedgerError>;

    fn history_order(&self) -> HistoryOrder {
        HistoryOrder::CommitOrder
    }
}

// Allow `LedgerState` to be used behind a `Box` trait object.
impl<T: LedgerState + ?Sized> LedgerState for Box<T> {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, LedgerError> {
        (**self).get(key)
    }

    fn put(&mut self, key: &str, value: &[u8]) -> Result<(), LedgerError> {
        (**self).put(key, value)
    }

    fn delete(&mut self, key: &str) -> Result<(), LedgerError> {
        (**self).delete(key)
    }

    fn range_scan(&self, start: &str, end: &str) -> Result<StateScanIter<'_>, LedgerError> {
        (**self).range_scan(start, end)
    }

    fn rich_query(&self, query: &str) -> Result<StateScanIter<'_>, LedgerError> {
        (**self).rich_query(query)
    }

    fn rich_query_paginated(
        &self,
        query: &str,
        page_size: u32,
        bookmark: &str,
    ) -> Result<(StateScanIter<'_>, QueryMetadata), LedgerError> {
        (**self).rich_query_paginated(query, page_size, bookmark)
    }

    fn history_for(&self, key: &str) -> Result<HistoryIter<'_>, LedgerError> {
        (**self).history_for(key)
    }

    fn current_identity(&self) -> Result<IdentityAttributes, LedgerError> {
        (**self).current_identity()
    }

    fn history_order(&self) -> HistoryOrder {
        (**self).history_order()
    }
}
