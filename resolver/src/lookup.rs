use async_trait::async_trait;
use std::io;
use std::net::IpAddr;

/// Forward DNS lookup of a bare host name.
///
/// Implementations return addresses in the order the underlying resolver produced them; the
/// endpoint resolver always takes the first one.
#[async_trait]
pub trait HostLookup: Send + Sync {
    async fn lookup(&self, host: &str) -> io::Result<Vec<IpAddr>>;
}

/// Uses the operating system resolver through tokio.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemLookup;

#[async_trait]
impl HostLookup for SystemLookup {
    async fn lookup(&self, host: &str) -> io::Result<Vec<IpAddr>> {
        // The port is required by the socket address API and ignored here.
        let addrs = tokio::net::lookup_host((host, 0)).await?;
        Ok(addrs.map(|addr| addr.ip()).collect())
    }
}
