//! Turns a configured service reference (`scheme://host:port`) into a host, a port and a
//! resolved address.
//!
//! Resolution is fail-soft: callers always get a [`ResolvedEndpoint`] back, with a descriptive
//! placeholder in `address` when the reference is missing, malformed or does not resolve.

pub mod endpoint;
pub mod lookup;
pub mod metrics_defs;

#[cfg(test)]
mod testutils;

pub use endpoint::{EndpointResolver, ResolvedEndpoint};
pub use lookup::{HostLookup, SystemLookup};
