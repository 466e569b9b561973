//! Shared plumbing for the shop backend crates: logging setup, Prometheus
//! metrics and small wire types used by more than one crate.

pub mod types;
pub mod utils;
pub mod metrics;
