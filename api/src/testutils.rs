use crate::config::Config;
use crate::databases::{DatabaseError, Databases};
use async_trait::async_trait;
use provisioner::{DatabaseName, ProvisionError, ProvisioningOutcome};
use resolver::HostLookup;
use std::collections::HashSet;
use std::io;
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub fn test_config() -> Config {
    serde_yaml::from_str(
        r#"
database:
    control_url: "postgres://localhost/postgres"
services:
    backend:
        https:
            - "https://backend:8080"
            - "https://backend-2:8080"
"#,
    )
    .unwrap()
}

/// `backend` has one address, `backend-2` has none, anything else does not exist.
pub struct FakeLookup;

#[async_trait]
impl HostLookup for FakeLookup {
    async fn lookup(&self, host: &str) -> io::Result<Vec<IpAddr>> {
        match host {
            "backend" => Ok(vec!["10.0.0.5".parse().unwrap()]),
            "backend-2" => Ok(vec![]),
            _ => Err(io::Error::new(io::ErrorKind::NotFound, "unknown host")),
        }
    }
}

#[derive(Clone, Default)]
pub struct FakeDatabases {
    created: Arc<Mutex<HashSet<String>>>,
    calls: Arc<AtomicUsize>,
    unreachable: bool,
    failure: Option<String>,
}

impl FakeDatabases {
    pub fn unreachable() -> Self {
        FakeDatabases {
            unreachable: true,
            ..Default::default()
        }
    }

    pub fn failing(message: &str) -> Self {
        FakeDatabases {
            failure: Some(message.to_string()),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Databases for FakeDatabases {
    async fn is_ready(&self) -> bool {
        !self.unreachable
    }

    async fn ensure_and_ping(
        &self,
        name: &DatabaseName,
    ) -> Result<(ProvisioningOutcome, i32), DatabaseError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.failure {
            return Err(ProvisionError::Create {
                name: name.clone(),
                source: sqlx::Error::Protocol(message.clone()),
            }
            .into());
        }

        let outcome = if self.created.lock().unwrap().insert(name.to_string()) {
            ProvisioningOutcome::Created
        } else {
            ProvisioningOutcome::AlreadyExists
        };
        Ok((outcome, 1))
    }
}
