use crate::name::DatabaseName;
use crate::provisioner::{ControlConnection, CreateError};
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Barrier;

/// In-memory stand-in for `pg_database`. Creating a name that is already present fails the way
/// the server does when two sessions race.
#[derive(Default)]
pub struct FakeCatalog {
    databases: Mutex<BTreeSet<String>>,
    create_statements: AtomicUsize,
    barrier: Option<Barrier>,
    check_failure: Option<String>,
    create_failure: Option<String>,
}

impl FakeCatalog {
    pub fn with_databases(names: &[&str]) -> Self {
        let catalog = FakeCatalog::default();
        catalog
            .databases
            .lock()
            .unwrap()
            .extend(names.iter().map(|n| n.to_string()));
        catalog
    }

    /// Holds every existence check until `callers` checks are in flight.
    pub fn with_barrier(mut self, callers: usize) -> Self {
        self.barrier = Some(Barrier::new(callers));
        self
    }

    pub fn failing_check(mut self, message: &str) -> Self {
        self.check_failure = Some(message.to_string());
        self
    }

    pub fn failing_create(mut self, message: &str) -> Self {
        self.create_failure = Some(message.to_string());
        self
    }

    pub fn databases(&self) -> Vec<String> {
        self.databases.lock().unwrap().iter().cloned().collect()
    }

    pub fn create_statements(&self) -> usize {
        self.create_statements.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ControlConnection for FakeCatalog {
    async fn database_exists(&self, name: &DatabaseName) -> Result<bool, sqlx::Error> {
        if let Some(message) = &self.check_failure {
            return Err(sqlx::Error::Protocol(message.clone()));
        }

        let exists = self.databases.lock().unwrap().contains(name.as_str());
        if let Some(barrier) = &self.barrier {
            barrier.wait().await;
        }
        Ok(exists)
    }

    async fn create_database(&self, name: &DatabaseName) -> Result<(), CreateError> {
        self.create_statements.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.create_failure {
            return Err(CreateError::Failed(sqlx::Error::Protocol(message.clone())));
        }

        if self.databases.lock().unwrap().insert(name.to_string()) {
            Ok(())
        } else {
            Err(CreateError::AlreadyExists)
        }
    }
}
