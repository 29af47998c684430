//! Metrics sink boundary.
//!
//! Core DB logic MUST NOT depend on obs::metrics directly.
//! All instrumentation flows through MetricsEvent and MetricsSink.
use crate::obs::metrics::{self, EventReport};
use std::{cell::RefCell, rc::Rc};

thread_local! {
    static SINK_OVERRIDE: RefCell<Option<Rc<dyn MetricsSink>>> = RefCell::new(None);
}

///
/// ExecKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ExecKind {
    Create,
    Read,
    Update,
    Delete,
    Query,
    Page,
    History,
}

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MetricsEvent {
    ExecStart {
        kind: ExecKind,
        record_kind: &'static str,
    },
    ExecFinish {
        kind: ExecKind,
        record_kind: &'static str,
        rows_touched: u64,
    },
    RowsScanned {
        record_kind: &'static str,
        rows_scanned: u64,
    },
    IndexDelta {
        record_kind: &'static str,
        inserts: u64,
        removes: u64,
    },
    IndexInconsistent {
        record_kind: &'static str,
    },
    AccessDenied,
}

///
/// MetricsSink
///

pub trait MetricsSink {
    fn record(&self, event: MetricsEvent);
}

/// GlobalMetricsSink
/// Default sink that writes into thread-local metrics state.

pub(crate) struct GlobalMetricsSink;

impl MetricsSink for GlobalMetricsSink {
    fn record(&self, event: MetricsEvent) {
        match event {
            MetricsEvent::ExecStart { kind, record_kind } => {
                metrics::with_state_mut(|m| {
                    let calls = match kind {
                        ExecKind::Create => &mut m.ops.create_calls,
                        ExecKind::Read => &mut m.ops.read_calls,
                        ExecKind::Update => &mut m.ops.update_calls,
                        ExecKind::Delete => &mut m.ops.delete_calls,
                        ExecKind::Query => &mut m.ops.query_calls,
                        ExecKind::Page => &mut m.ops.page_calls,
                        ExecKind::History => &mut m.ops.history_calls,
                    };
                    *calls = calls.saturating_add(1);

                    let entry = m.kinds.entry(record_kind.to_string()).or_default();
                    entry.calls = entry.calls.saturating_add(1);
                });
            }

            MetricsEvent::ExecFinish {
                kind,
                record_kind,
                rows_touched,
            } => {
                metrics::with_state_mut(|m| {
                    let rows = match kind {
                        ExecKind::Create | ExecKind::Update => &mut m.ops.rows_written,
                        ExecKind::Delete => &mut m.ops.rows_deleted,
                        ExecKind::Read | ExecKind::Query | ExecKind::Page | ExecKind::History => {
                            &mut m.ops.rows_loaded
                        }
                    };
                    *rows = rows.saturating_add(rows_touched);

                    let entry = m.kinds.entry(record_kind.to_string()).or_default();
                    entry.rows_touched = entry.rows_touched.saturating_add(rows_touched);
                });
            }

            MetricsEvent::RowsScanned {
                record_kind,
                rows_scanned,
            } => {
                metrics::with_state_mut(|m| {
                    m.ops.rows_scanned = m.ops.rows_scanned.saturating_add(rows_scanned);
                    let entry = m.kinds.entry(record_kind.to_string()).or_default();
                    entry.rows_scanned = entry.rows_scanned.saturating_add(rows_scanned);
                });
            }

            MetricsEvent::IndexDelta {
                record_kind,
                inserts,
                removes,
            } => {
                metrics::with_state_mut(|m| {
                    m.ops.index_inserts = m.ops.index_inserts.saturating_add(inserts);
                    m.ops.index_removes = m.ops.index_removes.saturating_add(removes);
                    let entry = m.kinds.entry(record_kind.to_string()).or_default();
                    entry.index_inserts = entry.index_inserts.saturating_add(inserts);
                    entry.index_removes = entry.index_removes.saturating_add(removes);
                });
            }

            MetricsEvent::IndexInconsistent { .. } => {
                metrics::with_state_mut(|m| {
                    m.ops.index_inconsistencies = m.ops.index_inconsistencies.saturating_add(1);
                });
            }

            MetricsEvent::AccessDenied => {
                metrics::with_state_mut(|m| {
                    m.ops.access_denied = m.ops.access_denied.saturating_add(1);
                });
            }
        }
    }
}

pub(crate) const GLOBAL_METRICS_SINK: GlobalMetricsSink = GlobalMetricsSink;

pub(crate) fn record(event: MetricsEvent) {
    let override_sink = SINK_OVERRIDE.with(|cell| cell.borrow().clone());
    match override_sink {
        Some(sink) => sink.record(event),
        None => GLOBAL_METRICS_SINK.record(event),
    }
}

/// Snapshot the current metrics state.
#[must_use]
pub fn metrics_report() -> EventReport {
    metrics::report()
}

/// Reset all metrics state.
pub fn metrics_reset_all() {
    metrics::reset_all();
}

/// Run a closure with a temporary metrics sink override.
pub fn with_metrics_sink<T>(sink: Rc<dyn MetricsSink>, f: impl FnOnce() -> T) -> T {
    struct Guard(Option<Rc<dyn MetricsSink>>);

    impl Drop for Guard {
        fn drop(&mut self) {
            let prev = self.0.take();
            SINK_OVERRIDE.with(|cell| {
                *cell.borrow_mut() = prev;
            });
        }
    }

    let prev = SINK_OVERRIDE.with(|cell| cell.borrow_mut().replace(sink));
    let _guard = Guard(prev);

    f()
}

/// Span
/// RAII guard that emits start/finish events for one top-level operation.
/// Finish accounting happens even on early return.

pub(crate) struct Span {
    kind: ExecKind,
    record_kind: &'static str,
    rows: u64,
}

impl Span {
    #[must_use]
    pub(crate) fn new(kind: ExecKind, record_kind: &'static str) -> Self {
        record(MetricsEvent::ExecStart { kind, record_kind });

        Self {
            kind,
            record_kind,
            rows: 0,
        }
    }

    pub(crate) const fn set_rows(&mut self, rows: u64) {
        self.rows = rows;
    }
}

impl Drop for Span {
    fn drop(&mut self) {
        record(MetricsEvent::ExecFinish {
            kind: self.kind,
            record_kind: self.record_kind,
            rows_touched: self.rows,
        });
    }
}
