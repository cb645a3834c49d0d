//! Metrics definitions for database provisioning.

use shared::metrics_defs::{MetricDef, MetricType};

pub const PROVISION_OUTCOMES: MetricDef = MetricDef {
    name: "provisioner.outcome",
    metric_type: MetricType::Counter,
    description: "Number of successful ensure calls. Tagged with outcome (already_exists, created, create_raced).",
};

pub const PROVISION_FAILURES: MetricDef = MetricDef {
    name: "provisioner.failure",
    metric_type: MetricType::Counter,
    description: "Number of ensure calls that failed. Tagged with stage (check, create).",
};

pub const ALL_METRICS: &[MetricDef] = &[PROVISION_OUTCOMES, PROVISION_FAILURES];
