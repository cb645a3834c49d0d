use provisioner::PoolSettings;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("Port cannot be 0")]
    InvalidPort,

    #[error("Unsupported database url scheme: {0}")]
    UnsupportedDatabaseScheme(String),

    #[error("max_connections cannot be 0")]
    NoConnections,

    #[error("resolve_timeout_ms cannot be 0")]
    NoResolveTimeout,

    #[error("Service {0} has an empty scheme or candidate list")]
    EmptyService(String),
}

/// API server configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub listener: Listener,
    pub database: DatabaseConfig,
    /// Candidate references per service and scheme, e.g.
    /// `services: {backend: {https: ["https://backend:8080"]}}`.
    #[serde(default)]
    pub services: HashMap<String, HashMap<String, Vec<String>>>,
    /// Deadline for each service host lookup
    #[serde(default = "default_resolve_timeout_ms")]
    pub resolve_timeout_ms: u64,
}

fn default_resolve_timeout_ms() -> u64 {
    2000
}

impl Config {
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.listener.validate()?;
        self.database.validate()?;

        if self.resolve_timeout_ms == 0 {
            return Err(ValidationError::NoResolveTimeout);
        }

        for (name, schemes) in &self.services {
            if schemes.is_empty() || schemes.values().any(Vec::is_empty) {
                return Err(ValidationError::EmptyService(name.clone()));
            }
        }

        Ok(())
    }

    pub fn resolve_timeout(&self) -> Duration {
        Duration::from_millis(self.resolve_timeout_ms)
    }

    /// The `index`-th candidate reference of `name` over `scheme`. Names and schemes are
    /// matched case-insensitively.
    pub fn service_reference(&self, name: &str, scheme: &str, index: usize) -> Option<&str> {
        let schemes = find_ignore_case(&self.services, name)?;
        let candidates = find_ignore_case(schemes, scheme)?;
        candidates.get(index).map(String::as_str)
    }

    /// Looks up a flat `services:<name>:<scheme>:<index>` key.
    pub fn lookup(&self, key: &str) -> Option<&str> {
        let mut parts = key.split(':');
        let (Some(section), Some(name), Some(scheme), Some(index), None) = (
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
        ) else {
            return None;
        };

        if !section.eq_ignore_ascii_case("services") {
            return None;
        }
        self.service_reference(name, scheme, index.parse().ok()?)
    }
}

fn find_ignore_case<'a, V>(map: &'a HashMap<String, V>, key: &str) -> Option<&'a V> {
    map.get(key).or_else(|| {
        map.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v)
    })
}

/// Network listener configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Listener {
    pub host: String,
    pub port: u16,
}

impl Default for Listener {
    fn default() -> Self {
        Listener {
            host: "127.0.0.1".into(),
            port: 3000,
        }
    }
}

impl Listener {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct DatabaseConfig {
    /// Administrative connection used to create databases. Target databases are reached on the
    /// same server with the same credentials.
    pub control_url: Url,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_acquire_timeout_ms")]
    pub acquire_timeout_ms: u64,
}

fn default_max_connections() -> u32 {
    5
}

fn default_acquire_timeout_ms() -> u64 {
    5000
}

impl DatabaseConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self.control_url.scheme() {
            "postgres" | "postgresql" => {}
            other => return Err(ValidationError::UnsupportedDatabaseScheme(other.to_string())),
        }
        if self.max_connections == 0 {
            return Err(ValidationError::NoConnections);
        }
        Ok(())
    }

    pub fn pool_settings(&self) -> PoolSettings {
        PoolSettings {
            max_connections: self.max_connections,
            acquire_timeout: Duration::from_millis(self.acquire_timeout_ms),
        }
    }
}
