//! Validation of a published target group file.
//!
//! Schema conformance is checked first; semantic rules the schema cannot
//! express (well-formed `host:port` targets, non-empty groups and label
//! values) are checked on the parsed groups.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use jsonschema::validator_for;
use serde_json::Value;
use tracing::debug;

use crate::core::types::TargetGroup;

const FILE_SD_SCHEMA: &str = include_str!("../schemas/file_sd/v1.schema.json");

/// Validate the target group file at `path`, returning its groups.
pub fn validate_file(path: &Path) -> Result<Vec<TargetGroup>> {
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    validate_document(&raw).with_context(|| format!("validate {}", path.display()))
}

/// Validate a target group document held in memory.
pub fn validate_document(raw: &str) -> Result<Vec<TargetGroup>> {
    let value: Value = serde_json::from_str(raw).context("parse target groups json")?;
    validate_schema(&value)?;
    let groups: Vec<TargetGroup> =
        serde_json::from_value(value).context("deserialize target groups")?;
    let errors = check_target_groups(&groups);
    if !errors.is_empty() {
        bail!("target group violations:\n- {}", errors.join("\n- "));
    }
    debug!(groups = groups.len(), "target groups valid");
    Ok(groups)
}

fn validate_schema(document: &Value) -> Result<()> {
    let schema: Value = serde_json::from_str(FILE_SD_SCHEMA).context("parse bundled schema")?;
    let compiled = validator_for(&schema).map_err(|err| anyhow!("invalid schema: {}", err))?;
    let messages: Vec<String> = compiled
        .iter_errors(document)
        .map(|err| err.to_string())
        .collect();
    if !messages.is_empty() {
        bail!("schema validation failed:\n- {}", messages.join("\n- "));
    }
    Ok(())
}

/// Semantic checks not expressible in JSON Schema:
/// - every group has at least one target
/// - every target is `host:port` with a non-zero numeric port
/// - no label value is empty
pub fn check_target_groups(groups: &[TargetGroup]) -> Vec<String> {
    let mut errors = Vec::new();
    for (idx, group) in groups.iter().enumerate() {
        if group.targets.is_empty() {
            errors.push(format!("group {idx}: no targets"));
        }
        for target in &group.targets {
            if !is_host_port(target) {
                errors.push(format!("group {idx}: target {target:?} is not host:port"));
            }
        }
        for (key, value) in &group.labels {
            if value.is_empty() {
                errors.push(format!("group {idx}: label {key:?} has an empty value"));
            }
        }
    }
    errors
}

fn is_host_port(target: &str) -> bool {
    match target.rsplit_once(':') {
        Some((host, port)) => {
            !host.is_empty() && port.parse::<u16>().is_ok_and(|port| port > 0)
        }
        None => false,
    }
}
