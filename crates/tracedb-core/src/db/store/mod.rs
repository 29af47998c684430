
use crate::{
    db::{
        codec::{self, Record, Transferable},
        ledger::LedgerState,
    },
    error::InternalError,
    obs::sink::{self, ExecKind, MetricsEvent, Span},
};

/// Payload of an index entry; the key carries all information.
pub const INDEX_MARKER: &[u8] = &[0x00];

///
/// IndexedStore
///
/// Owns primary entries and their composite index entries.
///
/// Every mutation derives all keys and bytes before issuing its first write,
/// then writes primary and index entries inside the caller's transaction;
/// the host's all-or-nothing commit keeps the pair consistent.
///

pub struct IndexedStore<'a, S: ?Sized> {
    state: &'a mut S,
}

impl<'a, S: LedgerState + ?Sized> IndexedStore<'a, S> {
    pub const fn new(state: &'a mut S) -> Self {
        Self { state }
    }

    /// Insert a new record and its index entry.
    pub fn create<R: Record>(&mut self, record: &R) -> Result<(), InternalError> {
        let mut span = Span::new(ExecKind::Create, R::KIND);

        let key = codec::primary_key(record)?;
        let bytes = codec::encode(record)?;
        let index_key = codec::index_key(record)?;

        if self.state.get(key)?.is_some() {
            return Err(InternalError::already_exists(key));
        }

        self.state.put(key, &bytes)?;
        self.state.put(index_key.as_str(), INDEX_MARKER)?;

        log::debug!("store: created {} {key}", R::KIND);
        record_index_delta::<R>(1, 0);
        span.set_rows(1);

        Ok(())
    }

    /// Load one record by primary key.
    pub fn read<R: Record>(&self, key: &str) -> Result<R, InternalError> {
        let mut span = Span::new(ExecKind::Read, R::KIND);
        let record = load::<R, S>(self.state, key)?;
        span.set_rows(1);

        Ok(record)
    }

    /// Whether `key` holds a primary entry; index keys never do.
    pub fn exists(&self, key: &str) -> Result<bool, InternalError> {
        if codec::is_composite(key) {
            return Ok(false);
        }

        Ok(self.state.get(key)?.is_some())
    }

    /// Apply a mutator to a stored record and move its index entry.
    ///
    /// The stale index key is derived from the record as read, before the
    /// mutator runs. The mutator must not change the primary key.
    /// Returns the updated record.
    pub fn update<R, F>(&mut self, key: &str, mutator: F) -> Result<R, InternalError>
    where
        R: Record,
        F: FnOnce(&mut R) -> Result<(), InternalError>,
    {
        let mut span = Span::new(ExecKind::Update, R::KIND);

        let current = load::<R, S>(self.state, key)?;
        let old_index = codec::index_key(&current)?;

        let mut next = current;
        mutator(&mut next)?;
        if next.primary_key() != key {
            return Err(InternalError::store_malformed(format!(
                "update of {} {key} must not change its primary key (got '{}')",
                R::KIND,
                next.primary_key()
            )));
        }
        let bytes = codec::encode(&next)?;
        let new_index = codec::index_key(&next)?;

        let moved = old_index != new_index;
        if moved {
            self.state.delete(old_index.as_str())?;
        }
        self.state.put(key, &bytes)?;
        self.state.put(new_index.as_str(), INDEX_MARKER)?;

        log::debug!("store: updated {} {key} (index moved: {moved})", R::KIND);
        if moved {
            record_index_delta::<R>(1, 1);
        }
        span.set_rows(1);

        Ok(next)
    }

    /// Replace a stored record wholesale, keeping the index in step.
    /// Returns the record as it was before replacement.
    pub fn replace<R: Record>(&mut self, record: &R) -> Result<R, InternalError> {
        let key = codec::primary_key(record)?.to_string();
        let mut previous = None;

        self.update::<R, _>(&key, |current| {
            previous = Some(std::mem::replace(current, record.clone()));
            Ok(())
        })?;

        previous.ok_or_else(|| InternalError::not_found(&key))
    }

    /// Hand a record to a new owner, returning the previous owner.
    pub fn transfer<R: Transferable>(
        &mut self,
        key: &str,
        new_owner: &str,
        transfer_date: &str,
    ) -> Result<String, InternalError> {
        let mut previous = String::new();

        self.update::<R, _>(key, |record| {
            previous = record.owner().to_string();
            record.transfer_to(new_owner, transfer_date);
            Ok(())
        })?;

        log::debug!(
            "store: transferred {} {key} from '{previous}' to '{new_owner}'",
            R::KIND
        );

        Ok(previous)
    }

    /// Remove a record and its index entry, returning the removed record.
    pub fn delete<R: Record>(&mut self, key: &str) -> Result<R, InternalError> {
        let mut span = Span::new(ExecKind::Delete, R::KIND);

        let current = load::<R, S>(self.state, key)?;
        let index_key = codec::index_key(&current)?;

        self.state.delete(key)?;
        self.state.delete(index_key.as_str())?;

        log::debug!("store: deleted {} {key}", R::KIND);
        record_index_delta::<R>(0, 1);
        span.set_rows(1);

        Ok(current)
    }

    /// Check that a live primary entry has its index entry.
    pub fn verify_index<R: Record>(&self, key: &str) -> Result<(), InternalError> {
        let current = load::<R, S>(self.state, key)?;
        let index_key = codec::index_key(&current)?;

        if self.state.get(index_key.as_str())?.is_none() {
            log::warn!("store: {} {key} has no index entry", R::KIND);
            sink::record(MetricsEvent::IndexInconsistent {
                record_kind: R::KIND,
            });
            return Err(InternalError::index_inconsistent(format!(
                "{} {key} has no index entry in '{}'",
                R::KIND,
                R::INDEX.namespace
            )));
        }

        Ok(())
    }
}

// Read and decode a primary entry, failing NotFound when absent.
// Composite keys address index markers, never primary entries.
pub(crate) fn load<R: Record, S: LedgerState + ?Sized>(
    state: &S,
    key: &str,
) -> Result<R, InternalError> {
    if codec::is_composite(key) {
        return Err(InternalError::not_found(key.escape_debug().to_string()));
    }

    let bytes = state
        .get(key)?
        .ok_or_else(|| InternalError::not_found(key))?;

    codec::decode(&bytes)
}

fn record_index_delta<R: Record>(inserts: u64, removes: u64) {
    sink::record(MetricsEvent::IndexDelta {
        record_kind: R::KIND,
        inserts,
        removes,
    });
}
