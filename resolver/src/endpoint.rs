use crate::lookup::{HostLookup, SystemLookup};
use crate::metrics_defs::RESOLVE_REQUESTS;
use serde::Serialize;
use shared::counter;
use std::io;
use std::sync::Arc;
use std::time::Duration;

pub const REFERENCE_UNAVAILABLE: &str = "Service reference not available";
pub const ADDRESS_NOT_FOUND: &str = "Not found";
pub const RESOLUTION_ERROR_PREFIX: &str = "Error resolving IP: ";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ResolvedEndpoint {
    pub host: String,
    pub port: String,
    pub address: Option<String>,
}

impl ResolvedEndpoint {
    fn unavailable() -> Self {
        ResolvedEndpoint {
            host: String::new(),
            port: String::new(),
            address: Some(REFERENCE_UNAVAILABLE.to_string()),
        }
    }
}

/// Reasons a reference could not be turned into an address. These never leave the resolver;
/// they end up as the description in the `address` placeholder.
#[derive(thiserror::Error, Debug)]
pub enum ResolveError {
    #[error("missing port in '{0}'")]
    MissingPort(String),
    #[error("missing host in '{0}'")]
    MissingHost(String),
    #[error("invalid port '{0}'")]
    InvalidPort(String),
    #[error("{0}")]
    Lookup(#[from] io::Error),
    #[error("lookup timed out after {0}ms")]
    Timeout(u128),
}

#[derive(Clone)]
pub struct EndpointResolver {
    lookup: Arc<dyn HostLookup>,
}

impl Default for EndpointResolver {
    fn default() -> Self {
        EndpointResolver::new(Arc::new(SystemLookup))
    }
}

impl EndpointResolver {
    pub fn new(lookup: Arc<dyn HostLookup>) -> Self {
        EndpointResolver { lookup }
    }

    /// Resolves a `scheme://host:port` reference. Never fails: problems are reported through the
    /// `address` field of the returned endpoint.
    pub async fn resolve(&self, reference: &str) -> ResolvedEndpoint {
        self.resolve_inner(reference, None).await
    }

    /// Same as [`resolve`](Self::resolve), giving up on the DNS lookup once `deadline` elapses.
    pub async fn resolve_with_deadline(
        &self,
        reference: &str,
        deadline: Duration,
    ) -> ResolvedEndpoint {
        self.resolve_inner(reference, Some(deadline)).await
    }

    async fn resolve_inner(&self, reference: &str, deadline: Option<Duration>) -> ResolvedEndpoint {
        let target = strip_scheme(reference);
        if target.is_empty() {
            counter!(RESOLVE_REQUESTS, "result" => "unavailable").increment(1);
            return ResolvedEndpoint::unavailable();
        }

        let (host, port) = split_host_port(target);
        let address = match self.lookup_address(target, host, port, deadline).await {
            Ok(Some(address)) => {
                counter!(RESOLVE_REQUESTS, "result" => "resolved").increment(1);
                address
            }
            Ok(None) => {
                counter!(RESOLVE_REQUESTS, "result" => "not_found").increment(1);
                ADDRESS_NOT_FOUND.to_string()
            }
            Err(e) => {
                tracing::warn!(reference = %reference, error = %e, "Failed to resolve service reference");
                counter!(RESOLVE_REQUESTS, "result" => "error").increment(1);
                format!("{RESOLUTION_ERROR_PREFIX}{e}")
            }
        };

        ResolvedEndpoint {
            host: host.to_string(),
            port: port.to_string(),
            address: Some(address),
        }
    }

    async fn lookup_address(
        &self,
        target: &str,
        host: &str,
        port: &str,
        deadline: Option<Duration>,
    ) -> Result<Option<String>, ResolveError> {
        if port.is_empty() {
            return Err(ResolveError::MissingPort(target.to_string()));
        }
        if host.is_empty() {
            return Err(ResolveError::MissingHost(target.to_string()));
        }
        port.parse::<u16>()
            .map_err(|_| ResolveError::InvalidPort(port.to_string()))?;

        let lookup = self.lookup.lookup(host);
        let addrs = match deadline {
            Some(deadline) => tokio::time::timeout(deadline, lookup)
                .await
                .map_err(|_| ResolveError::Timeout(deadline.as_millis()))??,
            None => lookup.await?,
        };

        tracing::debug!(host = %host, count = addrs.len(), "Resolved host");
        Ok(addrs.first().map(|addr| addr.to_string()))
    }
}

fn strip_scheme(reference: &str) -> &str {
    let reference = reference.trim();
    let rest = match reference.split_once("://") {
        Some((_scheme, rest)) => rest,
        None => reference,
    };
    rest.trim_end_matches('/')
}

// Hosts cannot contain colons, so the port always follows the last one.
fn split_host_port(target: &str) -> (&str, &str) {
    target.rsplit_once(':').unwrap_or((target, ""))
}
