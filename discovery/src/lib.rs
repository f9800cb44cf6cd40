//! Load balancer target discovery for Prometheus file-based service discovery.
//!
//! A run asks the load balancer which instances are in service, looks those
//! instances up in the compute inventory, groups the running ones by tag
//! values, and publishes a sorted JSON target group document.
//!
//! - **[`core`]**: Pure, deterministic logic (tag spec parsing, health
//!   filtering, grouping, encoding). No I/O.
//! - **[`io`]**: Side effects (config files, the AWS CLI, publication).
//!
//! [`discover`] wires the two together behind the [`sources`] traits;
//! [`validate`] checks a published file.

pub mod core;
pub mod discover;
pub mod error;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod sources;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod validate;
