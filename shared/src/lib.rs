pub mod instrument;
pub mod metrics_defs;

#[cfg(test)]
mod testutils;
