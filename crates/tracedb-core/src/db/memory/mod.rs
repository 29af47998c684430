//! In-process reference host.
//!
//! `MemoryLedger` holds committed world state and per-key change logs.
//! All access happens through a `MemoryTx`, which stages writes and applies
//! them atomically on `commit`. A dropped or aborted transaction leaves the
//! ledger untouched.

mod selector;

#[cfg(test)]
mod tests;

use crate::db::{
    codec::is_composite,
    ledger::{
        HistoryIter, IdentityAttributes, KeyModification, KeyValue, LedgerError, LedgerState,
        QueryMetadata, StateScanIter, Timestamp,
    },
};
use serde_json::{Map, Value};
use std::{
    collections::BTreeMap,
    ops::Bound::{Excluded, Included, Unbounded},
};

///
/// MemoryLedger
///

#[derive(Clone, Debug, Default)]
pub struct MemoryLedger {
    world: BTreeMap<String, Vec<u8>>,
    history: BTreeMap<String, Vec<KeyModification>>,
}

impl MemoryLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a transaction context for one invocation.
    pub fn begin(
        &mut self,
        tx_id: impl Into<String>,
        timestamp: Timestamp,
        identity: IdentityAttributes,
    ) -> MemoryTx<'_> {
        MemoryTx {
            ledger: self,
            tx_id: tx_id.into(),
            timestamp,
            identity,
            writes: BTreeMap::new(),
        }
    }

    /// Committed value for a key.
    #[must_use]
    pub fn committed(&self, key: &str) -> Option<&[u8]> {
        self.world.get(key).map(Vec::as_slice)
    }

    /// Committed keys in order, composite keys included.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.world.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.world.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.world.is_empty()
    }

    // Write a committed value without a transaction (test seeding only).
    #[cfg(test)]
    pub(crate) fn insert_raw(&mut self, key: &str, value: &[u8]) {
        self.world.insert(key.to_string(), value.to_vec());
    }
}

///
/// MemoryTx
///
/// Staged writes overlay committed state, so reads inside the transaction
/// observe its own earlier writes.
///

pub struct MemoryTx<'a> {
    ledger: &'a mut MemoryLedger,
    tx_id: String,
    timestamp: Timestamp,
    identity: IdentityAttributes,
    writes: BTreeMap<String, Option<Vec<u8>>>,
}

impl MemoryTx<'_> {
    #[must_use]
    pub fn tx_id(&self) -> &str {
        &self.tx_id
    }

    /// Apply all staged writes and append one change-log entry per key.
    pub fn commit(self) {
        let Self {
            ledger,
            tx_id,
            timestamp,
            writes,
            ..
        } = self;

        log::debug!("memory ledger: commit {tx_id} ({} writes)", writes.len());

        for (key, write) in writes {
            let modification = match write {
                Some(value) => {
                    ledger.world.insert(key.clone(), value.clone());
                    KeyModification {
                        tx_id: tx_id.clone(),
                        timestamp,
                        value,
                        is_delete: false,
                    }
                }
                None => {
                    ledger.world.remove(&key);
                    KeyModification {
                        tx_id: tx_id.clone(),
                        timestamp,
                        value: Vec::new(),
                        is_delete: true,
                    }
                }
            };
            ledger.history.entry(key).or_default().push(modification);
        }
    }

    /// Discard all staged writes.
    pub fn abort(self) {
        log::debug!("memory ledger: abort {}", self.tx_id);
    }

    // Merged view of `[start, end)` with staged writes applied.
    fn merged_range(&self, start: &str, end: &str) -> Vec<KeyValue> {
        let lower = if start.is_empty() {
            Unbounded
        } else {
            Included(start.to_string())
        };
        let upper = if end.is_empty() {
            Unbounded
        } else {
            Excluded(end.to_string())
        };
        if !start.is_empty() && !end.is_empty() && start >= end {
            return Vec::new();
        }

        let mut merged: BTreeMap<&str, &[u8]> = self
            .ledger
            .world
            .range::<String, _>((lower.clone(), upper.clone()))
            .map(|(k, v)| (k.as_str(), v.as_slice()))
            .collect();

        for (key, write) in self.writes.range::<String, _>((lower, upper)) {
            match write {
                Some(value) => {
                    merged.insert(key.as_str(), value.as_slice());
                }
                None => {
                    merged.remove(key.as_str());
                }
            }
        }

        merged
            .into_iter()
            .map(|(key, value)| KeyValue {
                key: key.to_string(),
                value: value.to_vec(),
            })
            .collect()
    }

    // Primary entries matching a parsed selector, in key order.
    fn selector_matches(&self, query: &str) -> Result<Vec<KeyValue>, LedgerError> {
        let fields = parse_query(query)?;

        let mut hits = Vec::new();
        for entry in self.merged_range("", "") {
            if is_composite(&entry.key) {
                continue;
            }
            let Ok(doc) = serde_json::from_slice::<Value>(&entry.value) else {
                continue;
            };
            if doc.is_object() && selector::matches(&fields, &doc)? {
                hits.push(entry);
            }
        }

        Ok(hits)
    }
}

impl LedgerState for MemoryTx<'_> {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, LedgerError> {
        match self.writes.get(key) {
            Some(staged) => Ok(staged.clone()),
            None => Ok(self.ledger.world.get(key).cloned()),
        }
    }

    fn put(&mut self, key: &str, value: &[u8]) -> Result<(), LedgerError> {
        if key.is_empty() {
            return Err(LedgerError::InvalidQuery("empty key".to_string()));
        }
        self.writes.insert(key.to_string(), Some(value.to_vec()));

        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<(), LedgerError> {
        self.writes.insert(key.to_string(), None);

        Ok(())
    }

    fn range_scan(&self, start: &str, end: &str) -> Result<StateScanIter<'_>, LedgerError> {
        Ok(Box::new(self.merged_range(start, end).into_iter().map(Ok)))
    }

    fn rich_query(&self, query: &str) -> Result<StateScanIter<'_>, LedgerError> {
        let hits = self.selector_matches(query)?;

        Ok(Box::new(hits.into_iter().map(Ok)))
    }

    fn rich_query_paginated(
        &self,
        query: &str,
        page_size: u32,
        bookmark: &str,
    ) -> Result<(StateScanIter<'_>, QueryMetadata), LedgerError> {
        if page_size == 0 {
            return Err(LedgerError::InvalidQuery(
                "page size must be positive".to_string(),
            ));
        }
        let after = decode_bookmark(bookmark)?;

        let mut remaining = self
            .selector_matches(query)?
            .into_iter()
            .filter(|entry| after.as_deref().is_none_or(|after| entry.key.as_str() > after))
            .peekable();

        let page: Vec<KeyValue> = remaining.by_ref().take(page_size as usize).collect();
        let more = remaining.peek().is_some();

        let bookmark = match page.last() {
            Some(last) if more => hex::encode(last.key.as_bytes()),
            _ => String::new(),
        };
        let metadata = QueryMetadata {
            fetched_records_count: u32::try_from(page.len()).unwrap_or(u32::MAX),
            bookmark,
        };

        Ok((Box::new(page.into_iter().map(Ok)), metadata))
    }

    fn history_for(&self, key: &str) -> Result<HistoryIter<'_>, LedgerError> {
        let log = self.ledger.history.get(key).cloned().unwrap_or_default();

        Ok(Box::new(log.into_iter().map(Ok)))
    }

    fn current_identity(&self) -> Result<IdentityAttributes, LedgerError> {
        Ok(self.identity.clone())
    }
}

// Parse `{"selector": {...}, "use_index": ...}`; the index hint is ignored.
fn parse_query(query: &str) -> Result<Map<String, Value>, LedgerError> {
    let value: Value = serde_json::from_str(query)
        .map_err(|err| LedgerError::InvalidQuery(format!("query is not JSON: {err}")))?;

    match value {
        Value::Object(mut top) => match top.remove("selector") {
            Some(Value::Object(selector)) => Ok(selector),
            Some(_) => Err(LedgerError::InvalidQuery(
                "selector must be an object".to_string(),
            )),
            None => Err(LedgerError::InvalidQuery("missing selector".to_string())),
        },
        _ => Err(LedgerError::InvalidQuery(
            "query must be an object".to_string(),
        )),
    }
}

fn decode_bookmark(bookmark: &str) -> Result<Option<String>, LedgerError> {
    if bookmark.is_empty() {
        return Ok(None);
    }

    let bytes = hex::decode(bookmark)
        .map_err(|err| LedgerError::InvalidQuery(format!("invalid bookmark: {err}")))?;
    let key = String::from_utf8(bytes)
        .map_err(|err| LedgerError::InvalidQuery(format!("invalid bookmark: {err}")))?;

    Ok(Some(key))
}
