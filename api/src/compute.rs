use crate::metrics_defs::COMPUTE_TOTAL;
use shared::instrument::InstrumentedOperation;
use std::convert::Infallible;
use tracing::Span;

/// Adds two optional operands, treating a missing one as zero.
pub fn sum(a: Option<u64>, b: Option<u64>) -> u64 {
    a.unwrap_or(0).saturating_add(b.unwrap_or(0))
}

/// Computes the sum inside a `compute` operation parented to `parent`. The result is added to
/// the `compute.total` counter.
pub async fn compute(parent: &Span, a: Option<u64>, b: Option<u64>) -> u64 {
    let Ok(total) = InstrumentedOperation::new("compute", COMPUTE_TOTAL)
        .with_parent(parent)
        .run(async move { Ok::<_, Infallible>(sum(a, b)) })
        .await;
    total
}
