use serde::{Deserialize, Serialize};
use std::{cell::RefCell, collections::BTreeMap};

///
/// EventState
/// Ephemeral, in-memory counters for one process.
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub(crate) struct EventState {
    pub(crate) ops: EventOps,
    pub(crate) kinds: BTreeMap<String, KindCounters>,
}

///
/// EventOps
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct EventOps {
    // Entry points
    pub create_calls: u64,
    pub read_calls: u64,
    pub update_calls: u64,
    pub delete_calls: u64,
    pub query_calls: u64,
    pub page_calls: u64,
    pub history_calls: u64,

    // Rows touched
    pub rows_loaded: u64,
    pub rows_scanned: u64,
    pub rows_written: u64,
    pub rows_deleted: u64,

    // Index maintenance
    pub index_inserts: u64,
    pub index_removes: u64,
    pub index_inconsistencies: u64,

    // Access gate
    pub access_denied: u64,
}

///
/// KindCounters
/// Per-record-kind counters.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct KindCounters {
    pub calls: u64,
    pub rows_touched: u64,
    pub rows_scanned: u64,
    pub index_inserts: u64,
    pub index_removes: u64,
}

///
/// EventReport
/// Point-in-time snapshot of metrics state.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct EventReport {
    pub ops: EventOps,
    pub kinds: BTreeMap<String, KindCounters>,
}

thread_local! {
    static EVENT_STATE: RefCell<EventState> = RefCell::new(EventState::default());
}

/// Borrow metrics mutably.
pub(crate) fn with_state_mut<R>(f: impl FnOnce(&mut EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&mut m.borrow_mut()))
}

/// Snapshot current state.
pub(crate) fn report() -> EventReport {
    EVENT_STATE.with(|m| {
        let state = m.borrow();
        EventReport {
            ops: state.ops.clone(),
            kinds: state.kinds.clone(),
        }
    })
}

/// Reset all counters.
pub(crate) fn reset_all() {
    with_state_mut(|m| *m = EventState::default());
}
