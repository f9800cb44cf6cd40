//! Test-only helpers for building instance snapshots and fake collaborators.

use std::cell::RefCell;
use std::collections::HashMap;

use anyhow::{Result, anyhow};

use crate::core::types::{InstanceHealth, InstanceRecord, LifecycleState, Tag};
use crate::sources::{Inventory, LoadBalancer};

/// Create a running instance with the given private address and tags.
pub fn running(id: &str, address: &str, tags: &[(&str, &str)]) -> InstanceRecord {
    with_state(id, address, LifecycleState::Running, tags)
}

/// Create an instance with an explicit lifecycle state.
pub fn with_state(
    id: &str,
    address: &str,
    state: LifecycleState,
    tags: &[(&str, &str)],
) -> InstanceRecord {
    InstanceRecord {
        id: id.to_string(),
        state,
        private_address: Some(address.to_string()),
        tags: tags.iter().map(|(k, v)| Tag::new(*k, *v)).collect(),
    }
}

/// Owned grouping keys from string literals.
pub fn keys(keys: &[&str]) -> Vec<String> {
    keys.iter().map(|key| key.to_string()).collect()
}

/// In-memory load balancer keyed by instance id.
#[derive(Debug, Default)]
pub struct FakeLoadBalancer {
    pub name: String,
    /// `(instance id, status)` in registration order.
    pub members: Vec<(String, String)>,
    pub fail: bool,
    pub health_calls: RefCell<Vec<Vec<String>>>,
}

impl FakeLoadBalancer {
    pub fn new(name: &str, members: &[(&str, &str)]) -> Self {
        Self {
            name: name.to_string(),
            members: members
                .iter()
                .map(|(id, state)| (id.to_string(), state.to_string()))
                .collect(),
            ..Self::default()
        }
    }

    pub fn failing(name: &str) -> Self {
        Self {
            name: name.to_string(),
            fail: true,
            ..Self::default()
        }
    }
}

impl LoadBalancer for FakeLoadBalancer {
    fn member_ids(&self, name: &str) -> Result<Vec<String>> {
        if self.fail || name != self.name {
            return Err(anyhow!("LoadBalancerNotFound: {name}"));
        }
        Ok(self.members.iter().map(|(id, _)| id.clone()).collect())
    }

    fn instance_health(&self, name: &str, ids: &[String]) -> Result<Vec<InstanceHealth>> {
        if name != self.name {
            return Err(anyhow!("LoadBalancerNotFound: {name}"));
        }
        self.health_calls.borrow_mut().push(ids.to_vec());
        Ok(self
            .members
            .iter()
            .filter(|(id, _)| ids.contains(id))
            .map(|(id, state)| InstanceHealth {
                instance_id: id.clone(),
                state: state.clone(),
            })
            .collect())
    }
}

/// In-memory inventory that records every lookup.
#[derive(Debug, Default)]
pub struct FakeInventory {
    pub records: HashMap<String, InstanceRecord>,
    pub fail: bool,
    pub calls: RefCell<Vec<Vec<String>>>,
}

impl FakeInventory {
    pub fn new(records: Vec<InstanceRecord>) -> Self {
        Self {
            records: records
                .into_iter()
                .map(|record| (record.id.clone(), record))
                .collect(),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

impl Inventory for FakeInventory {
    fn describe_instances(&self, ids: &[String]) -> Result<Vec<InstanceRecord>> {
        self.calls.borrow_mut().push(ids.to_vec());
        if self.fail {
            return Err(anyhow!("RequestLimitExceeded"));
        }
        Ok(ids
            .iter()
            .filter_map(|id| self.records.get(id).cloned())
            .collect())
    }
}
