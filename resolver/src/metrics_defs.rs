//! Metrics definitions for endpoint resolution.

use shared::metrics_defs::{MetricDef, MetricType};

pub const RESOLVE_REQUESTS: MetricDef = MetricDef {
    name: "resolver.requests",
    metric_type: MetricType::Counter,
    description: "Number of service reference resolutions. Tagged with result.",
};

pub const ALL_METRICS: &[MetricDef] = &[RESOLVE_REQUESTS];
