//! Metrics definitions for the API server.

use shared::metrics_defs::{MetricDef, MetricType};

pub const COMPUTE_TOTAL: MetricDef = MetricDef {
    name: "compute.total",
    metric_type: MetricType::Counter,
    description: "Running sum of every value returned by the compute endpoint.",
};

pub const ALL_METRICS: &[MetricDef] = &[COMPUTE_TOTAL];
