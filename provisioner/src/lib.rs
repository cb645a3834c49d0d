//! On-demand database provisioning.
//!
//! Several replicas of the service can discover at the same time that a database is missing
//! and all try to create it. Nothing serializes them: the existence check and the
//! `CREATE DATABASE` are separate statements, and the statement cannot run inside a
//! transaction. Instead a create that fails because the database now exists is classified as
//! a benign race ([`ProvisioningOutcome::CreateRaced`]); every other failure is fatal.

pub mod metrics_defs;
pub mod name;
pub mod postgres;
pub mod provisioner;

#[cfg(test)]
mod testutils;

pub use name::{DatabaseName, NameError};
pub use postgres::{PgControl, PoolSettings, Provisioner};
pub use provisioner::{
    ControlConnection, CreateError, ProvisionError, ProvisioningOutcome, ensure_database,
};
