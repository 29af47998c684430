
use crate::{
    db::{
        codec::{self, Record},
        ledger::{HistoryOrder, KeyModification, LedgerState, Timestamp},
    },
    error::{ErrorOrigin, InternalError},
    obs::sink::{ExecKind, Span},
};
use serde::{Deserialize, Serialize};

///
/// HistoryEntry
///
/// One write or delete of a primary key, as recorded by the host.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry<R> {
    pub record: R,
    pub tx_id: String,
    pub timestamp: Timestamp,
    pub is_delete: bool,
}

///
/// HistoryReader
///
/// Replays a key's change log without re-sorting it: host timestamps are not
/// guaranteed monotonic, so the log's own order is authoritative.
///

pub struct HistoryReader<'a, S: ?Sized> {
    state: &'a S,
}

impl<'a, S: LedgerState + ?Sized> HistoryReader<'a, S> {
    pub const fn new(state: &'a S) -> Self {
        Self { state }
    }

    /// Every historical write and delete of `key`, in the host's order.
    ///
    /// A delete carries the payload the host kept for it, else the nearest
    /// older snapshot, else `R::tombstone(key)`.
    pub fn history<R: Record>(&self, key: &str) -> Result<Vec<HistoryEntry<R>>, InternalError> {
        let mut span = Span::new(ExecKind::History, R::KIND);

        let log = self
            .state
            .history_for(key)?
            .collect::<Result<Vec<KeyModification>, _>>()?;

        let mut snapshots = Vec::with_capacity(log.len());
        for modification in &log {
            snapshots.push(snapshot::<R>(key, modification)?);
        }

        // Walk oldest to newest so each tombstone sees its predecessor.
        let order: Vec<usize> = match self.state.history_order() {
            HistoryOrder::CommitOrder => (0..log.len()).collect(),
            HistoryOrder::NewestFirst => (0..log.len()).rev().collect(),
        };
        let mut previous: Option<R> = None;
        let mut records: Vec<Option<R>> = vec![None; log.len()];
        for index in order {
            let record = match snapshots[index].take() {
                Some(record) => {
                    if !log[index].is_delete {
                        previous = Some(record.clone());
                    }
                    record
                }
                None => previous.clone().unwrap_or_else(|| R::tombstone(key)),
            };
            records[index] = Some(record);
        }

        let entries: Vec<HistoryEntry<R>> = log
            .into_iter()
            .zip(records)
            .map(|(modification, record)| HistoryEntry {
                record: record.unwrap_or_else(|| R::tombstone(key)),
                tx_id: modification.tx_id,
                timestamp: modification.timestamp,
                is_delete: modification.is_delete,
            })
            .collect();

        log::debug!("history: {} {key} -> {} entries", R::KIND, entries.len());
        span.set_rows(u64::try_from(entries.len()).unwrap_or(u64::MAX));

        Ok(entries)
    }
}

// Decode the payload of one change; deletes without a payload yield `None`.
fn snapshot<R: Record>(
    key: &str,
    modification: &KeyModification,
) -> Result<Option<R>, InternalError> {
    if modification.is_delete && modification.value.is_empty() {
        return Ok(None);
    }

    codec::decode(&modification.value).map(Some).map_err(|err| {
        InternalError::new(
            err.class,
            ErrorOrigin::History,
            format!(
                "{} {key} at tx {}: {}",
                R::KIND,
                modification.tx_id,
                err.message
            ),
        )
    })
}
