//! Shared deterministic types for the discovery core.
//!
//! Instance records are read-only snapshots handed over by the inventory
//! collaborator. Target groups are built fresh for every run.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Lifecycle state reported by the compute inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Pending,
    Running,
    ShuttingDown,
    Terminated,
    Stopping,
    Stopped,
    Unknown(u16),
}

impl LifecycleState {
    /// Decode an EC2 state code. Only the low byte is significant; the high
    /// byte is reserved for internal use by the service.
    pub fn from_code(code: u16) -> Self {
        let low = code & 0xff;
        match low {
            0 => Self::Pending,
            16 => Self::Running,
            32 => Self::ShuttingDown,
            48 => Self::Terminated,
            64 => Self::Stopping,
            80 => Self::Stopped,
            _ => Self::Unknown(low),
        }
    }

    pub fn is_running(self) -> bool {
        self == Self::Running
    }
}

/// A single `key=value` tag attached to an instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

impl Tag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Snapshot of one instance as reported by the inventory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceRecord {
    pub id: String,
    pub state: LifecycleState,
    pub private_address: Option<String>,
    /// Tag keys are unique per instance.
    pub tags: Vec<Tag>,
}

impl InstanceRecord {
    /// Value of the tag named `key`, or `""` when the instance lacks it.
    pub fn tag(&self, key: &str) -> &str {
        self.tags
            .iter()
            .find(|tag| tag.key == key)
            .map(|tag| tag.value.as_str())
            .unwrap_or("")
    }

    /// Private address, treating an empty string as absent.
    pub fn address(&self) -> Option<&str> {
        self.private_address
            .as_deref()
            .filter(|address| !address.is_empty())
    }
}

/// Health status of one load balancer member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceHealth {
    pub instance_id: String,
    /// Raw status string, e.g. `InService` or `OutOfService`.
    pub state: String,
}

/// A set of monitoring targets sharing the same grouping tag values.
///
/// Field order matters: `targets` serializes before `labels`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetGroup {
    pub targets: Vec<String>,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
}
