//! Grouping key fallback when the tag spec names no keys.

use std::collections::BTreeSet;

use crate::core::types::InstanceRecord;

/// Union of every tag key seen on `instances`, sorted ascending.
pub fn all_tag_keys(instances: &[InstanceRecord]) -> Vec<String> {
    instances
        .iter()
        .flat_map(|instance| instance.tags.iter())
        .map(|tag| tag.key.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
