use crate::lookup::HostLookup;
use async_trait::async_trait;
use std::collections::HashMap;
use std::io;
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Answers lookups from a fixed table. Hosts missing from the table fail like NXDOMAIN.
#[derive(Default)]
pub struct StaticLookup {
    hosts: HashMap<String, Vec<IpAddr>>,
    calls: AtomicUsize,
}

impl StaticLookup {
    pub fn with_host(mut self, host: &str, addrs: &[&str]) -> Self {
        let addrs = addrs.iter().map(|a| a.parse().unwrap()).collect();
        self.hosts.insert(host.to_string(), addrs);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HostLookup for StaticLookup {
    async fn lookup(&self, host: &str) -> io::Result<Vec<IpAddr>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.hosts.get(host).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such host is known: {host}"),
            )
        })
    }
}

/// Never answers within any reasonable deadline.
pub struct SlowLookup(pub Duration);

#[async_trait]
impl HostLookup for SlowLookup {
    async fn lookup(&self, _host: &str) -> io::Result<Vec<IpAddr>> {
        tokio::time::sleep(self.0).await;
        Ok(vec![])
    }
}
