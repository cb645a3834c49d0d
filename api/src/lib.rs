//! HTTP surface of the service: health and readiness probes, service endpoint lookups,
//! on-demand database provisioning and an instrumented computation.

pub mod api;
pub mod compute;
pub mod config;
pub mod databases;
pub mod metrics_defs;

#[cfg(test)]
mod testutils;

pub use api::{ApiError, AppState, router, serve};
pub use config::Config;
