//! Read paths over primary and index entries.
//!
//! Three access paths:
//! - range scans over primary keys,
//! - attribute scans over one kind's composite index,
//! - selector queries evaluated by the host.

mod selector;


pub use selector::{IndexHint, Selector, SelectorError};

use crate::{
    db::{
        codec::{self, CompositeKey, Record, is_composite, peek_kind},
        ledger::{KeyValue, LedgerState},
        store,
    },
    error::InternalError,
    obs::sink::{self, ExecKind, MetricsEvent, Span},
};

///
/// QueryEngine
///

pub struct QueryEngine<'a, S: ?Sized> {
    state: &'a S,
}

impl<'a, S: LedgerState + ?Sized> QueryEngine<'a, S> {
    pub const fn new(state: &'a S) -> Self {
        Self { state }
    }

    /// Point read by primary key; `NotFound` when absent.
    pub fn get<R: Record>(&self, key: &str) -> Result<R, InternalError> {
        let mut span = Span::new(ExecKind::Read, R::KIND);
        let record = store::load::<R, S>(self.state, key)?;
        span.set_rows(1);

        Ok(record)
    }

    /// Whether `key` holds a primary entry of kind `R`.
    pub fn exists<R: Record>(&self, key: &str) -> Result<bool, InternalError> {
        let Some(bytes) = self.state.get(key)? else {
            return Ok(false);
        };

        Ok(peek_kind(&bytes).as_deref() == Some(R::KIND))
    }

    /// Records of kind `R` with primary keys in `[start, end)`, in key order.
    ///
    /// Empty bounds are open; `range_scan("", "")` returns every record of
    /// the kind. Index entries and records of other kinds are skipped.
    pub fn range_scan<R: Record>(&self, start: &str, end: &str) -> Result<Vec<R>, InternalError> {
        let mut span = Span::new(ExecKind::Query, R::KIND);
        let mut scanned = 0u64;
        let mut records = Vec::new();

        for entry in self.state.range_scan(start, end)? {
            let entry = entry?;
            scanned += 1;
            if let Some(record) = primary_hit::<R>(&entry)? {
                records.push(record);
            }
        }

        log::debug!(
            "query: range scan of {} [{start:?}, {end:?}) -> {} rows",
            R::KIND,
            records.len()
        );
        finish_scan::<R>(&mut span, scanned, records.len());

        Ok(records)
    }

    pub fn all<R: Record>(&self) -> Result<Vec<R>, InternalError> {
        self.range_scan::<R>("", "")
    }

    /// Records whose index entries share the prefix `(namespace, values...)`.
    ///
    /// Returns an empty vec when nothing matches. A marker whose primary
    /// entry is missing is `IndexInconsistent`.
    pub fn attribute_scan<R: Record>(
        &self,
        namespace: &str,
        values: &[&str],
    ) -> Result<Vec<R>, InternalError> {
        let mut span = Span::new(ExecKind::Query, R::KIND);

        let prefix = attribute_prefix::<R>(namespace, values)?;
        let mut scanned = 0u64;
        let mut records = Vec::new();

        for entry in self.state.range_scan(prefix.as_str(), &prefix.prefix_end())? {
            let entry = entry?;
            scanned += 1;
            records.push(dereference::<R, S>(self.state, &entry.key)?);
        }

        log::debug!(
            "query: attribute scan {namespace} {values:?} -> {} rows",
            records.len()
        );
        finish_scan::<R>(&mut span, scanned, records.len());

        Ok(records)
    }

    /// Records matching a host-evaluated selector, in the host's order.
    pub fn selector_query<R: Record>(&self, selector: &Selector) -> Result<Vec<R>, InternalError> {
        let mut span = Span::new(ExecKind::Query, R::KIND);

        let query = selector.to_query_string()?;
        let mut scanned = 0u64;
        let mut records = Vec::new();

        for entry in self.state.rich_query(&query)? {
            let entry = entry?;
            scanned += 1;
            if let Some(record) = primary_hit::<R>(&entry)? {
                records.push(record);
            }
        }

        log::debug!("query: selector {query} -> {} rows", records.len());
        finish_scan::<R>(&mut span, scanned, records.len());

        Ok(records)
    }

    /// In-process filtering over a range scan, for hosts without a
    /// selector facility.
    pub fn filter_scan<R, F>(
        &self,
        start: &str,
        end: &str,
        predicate: F,
    ) -> Result<Vec<R>, InternalError>
    where
        R: Record,
        F: Fn(&R) -> bool,
    {
        let mut records = self.range_scan::<R>(start, end)?;
        records.retain(predicate);

        Ok(records)
    }
}

// Decode a scanned entry if it is a primary entry of kind `R`.
pub(crate) fn primary_hit<R: Record>(entry: &KeyValue) -> Result<Option<R>, InternalError> {
    if is_composite(&entry.key) {
        return Ok(None);
    }
    if peek_kind(&entry.value).as_deref() != Some(R::KIND) {
        return Ok(None);
    }

    codec::decode(&entry.value).map(Some)
}

// Prefix key for an attribute scan over `R`'s index.
pub(crate) fn attribute_prefix<R: Record>(
    namespace: &str,
    values: &[&str],
) -> Result<CompositeKey, InternalError> {
    let descriptor = R::INDEX;
    if namespace != descriptor.namespace {
        return Err(InternalError::query_malformed(format!(
            "index '{namespace}' does not belong to {} (expected '{}')",
            R::KIND,
            descriptor.namespace
        )));
    }
    if values.len() > descriptor.arity() {
        return Err(InternalError::query_malformed(format!(
            "index '{namespace}' has {} attributes, got {} values",
            descriptor.arity(),
            values.len()
        )));
    }

    CompositeKey::new(namespace, values)
        .map_err(|err| InternalError::query_malformed(err.to_string()))
}

// Follow an index marker to its primary entry.
pub(crate) fn dereference<R: Record, S: LedgerState + ?Sized>(
    state: &S,
    index_key: &str,
) -> Result<R, InternalError> {
    let composite = CompositeKey::from_raw(index_key)
        .map_err(|err| InternalError::index_inconsistent(format!("{index_key:?}: {err}")))?;
    let primary = composite.last_value().unwrap_or_default();

    match store::load::<R, S>(state, primary) {
        Err(err) if err.is_not_found() => {
            log::warn!(
                "query: index entry {index_key:?} points at missing {} '{primary}'",
                R::KIND
            );
            sink::record(MetricsEvent::IndexInconsistent {
                record_kind: R::KIND,
            });

            Err(InternalError::index_inconsistent(format!(
                "index entry {index_key:?} points at missing {} '{primary}'",
                R::KIND
            )))
        }
        other => other,
    }
}

fn finish_scan<R: Record>(span: &mut Span, scanned: u64, rows: usize) {
    record_scanned::<R>(scanned);
    span.set_rows(u64::try_from(rows).unwrap_or(u64::MAX));
}

pub(crate) fn record_scanned<R: Record>(rows_scanned: u64) {
    sink::record(MetricsEvent::RowsScanned {
        record_kind: R::KIND,
        rows_scanned,
    });
}
