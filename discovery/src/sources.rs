//! Collaborator seams for load balancer membership and instance inventory.

use anyhow::Result;

use crate::core::types::{InstanceHealth, InstanceRecord};

/// Membership and health of a named load balancer.
pub trait LoadBalancer {
    /// Ids of every instance registered with `name`.
    fn member_ids(&self, name: &str) -> Result<Vec<String>>;

    /// Health status for each of `ids` as seen by `name`.
    fn instance_health(&self, name: &str, ids: &[String]) -> Result<Vec<InstanceHealth>>;
}

/// Compute inventory lookup.
pub trait Inventory {
    /// Records for the given instance ids. Callers must not pass an empty list.
    fn describe_instances(&self, ids: &[String]) -> Result<Vec<InstanceRecord>>;
}
