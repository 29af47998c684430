//! Observability: runtime counters and the sink abstraction.
//!
//! Store and query code emit `MetricsEvent`s through `sink::record`;
//! nothing outside this module touches metrics state directly.

pub(crate) mod metrics;
pub(crate) mod sink;

pub use metrics::{EventOps, EventReport, KindCounters};
pub use sink::{
    ExecKind, MetricsEvent, MetricsSink, metrics_report, metrics_reset_all, with_metrics_sink,
};
