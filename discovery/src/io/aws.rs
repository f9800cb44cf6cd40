//! AWS CLI adapter for the load balancer and inventory collaborators.
//!
//! Each lookup is a single `aws ... --output json` invocation. Failures are
//! returned as-is; there is no retry.

use std::process::Command;
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::core::types::{InstanceHealth, InstanceRecord, LifecycleState, Tag};
use crate::io::config::{AwsConfig, DiscoveryConfig};
use crate::io::process::run_captured;
use crate::sources::{Inventory, LoadBalancer};

/// Wrapper for invoking the AWS CLI in a fixed region.
#[derive(Debug, Clone)]
pub struct AwsCli {
    command: Vec<String>,
    region: String,
    timeout: Duration,
    output_limit_bytes: usize,
}

impl AwsCli {
    pub fn new(command: Vec<String>, region: impl Into<String>, timeout: Duration) -> Self {
        Self {
            command,
            region: region.into(),
            timeout,
            output_limit_bytes: AwsConfig::default().output_limit_bytes,
        }
    }

    pub fn from_config(cfg: &DiscoveryConfig) -> Self {
        Self {
            command: cfg.aws.command.clone(),
            region: cfg.region.clone(),
            timeout: cfg.aws.timeout(),
            output_limit_bytes: cfg.aws.output_limit_bytes,
        }
    }

    fn run_json(&self, args: &[&str]) -> Result<Vec<u8>> {
        let (program, leading) = self
            .command
            .split_first()
            .ok_or_else(|| anyhow!("aws command is empty"))?;
        let mut cmd = Command::new(program);
        cmd.args(leading)
            .args(args)
            .args(["--region", self.region.as_str(), "--output", "json"]);

        let out = run_captured(cmd, self.timeout, self.output_limit_bytes)?;
        if out.timed_out {
            bail!("timed out after {}s", self.timeout.as_secs());
        }
        if !out.status.success() {
            bail!("exited with {}: {}", out.status, out.stderr_lossy());
        }
        if out.stdout_truncated > 0 {
            bail!(
                "output exceeded {} bytes ({} truncated)",
                self.output_limit_bytes,
                out.stdout_truncated
            );
        }
        Ok(out.stdout)
    }
}

impl LoadBalancer for AwsCli {
    #[instrument(skip(self))]
    fn member_ids(&self, name: &str) -> Result<Vec<String>> {
        let raw = self
            .run_json(&[
                "elb",
                "describe-load-balancers",
                "--load-balancer-names",
                name,
            ])
            .with_context(|| format!("describe load balancer {name}"))?;
        let ids = parse_member_ids(&raw).with_context(|| format!("parse load balancer {name}"))?;
        debug!(members = ids.len(), "load balancer members");
        Ok(ids)
    }

    #[instrument(skip(self, ids), fields(instances = ids.len()))]
    fn instance_health(&self, name: &str, ids: &[String]) -> Result<Vec<InstanceHealth>> {
        let mut args = vec![
            "elb",
            "describe-instance-health",
            "--load-balancer-name",
            name,
            "--instances",
        ];
        args.extend(ids.iter().map(String::as_str));
        let raw = self
            .run_json(&args)
            .with_context(|| format!("describe instance health for {name}"))?;
        parse_instance_health(&raw).with_context(|| format!("parse instance health for {name}"))
    }
}

impl Inventory for AwsCli {
    #[instrument(skip(self, ids), fields(instances = ids.len()))]
    fn describe_instances(&self, ids: &[String]) -> Result<Vec<InstanceRecord>> {
        let mut args = vec!["ec2", "describe-instances", "--instance-ids"];
        args.extend(ids.iter().map(String::as_str));
        let raw = self.run_json(&args).context("describe instances")?;
        parse_instances(&raw).context("parse instances")
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeLoadBalancersOutput {
    #[serde(default)]
    load_balancer_descriptions: Vec<LoadBalancerDescription>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct LoadBalancerDescription {
    #[serde(default)]
    instances: Vec<ElbInstance>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ElbInstance {
    instance_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeInstanceHealthOutput {
    #[serde(default)]
    instance_states: Vec<InstanceState>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InstanceState {
    instance_id: String,
    state: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeInstancesOutput {
    #[serde(default)]
    reservations: Vec<Reservation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Reservation {
    #[serde(default)]
    instances: Vec<Ec2Instance>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Ec2Instance {
    instance_id: String,
    state: Ec2State,
    private_ip_address: Option<String>,
    #[serde(default)]
    tags: Vec<Ec2Tag>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Ec2State {
    code: u16,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Ec2Tag {
    key: String,
    #[serde(default)]
    value: String,
}

/// Member ids of the first (only) load balancer description.
pub fn parse_member_ids(raw: &[u8]) -> Result<Vec<String>> {
    let output: DescribeLoadBalancersOutput = serde_json::from_slice(raw)?;
    let description = output
        .load_balancer_descriptions
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("no load balancer description returned"))?;
    Ok(description
        .instances
        .into_iter()
        .map(|instance| instance.instance_id)
        .collect())
}

pub fn parse_instance_health(raw: &[u8]) -> Result<Vec<InstanceHealth>> {
    let output: DescribeInstanceHealthOutput = serde_json::from_slice(raw)?;
    Ok(output
        .instance_states
        .into_iter()
        .map(|state| InstanceHealth {
            instance_id: state.instance_id,
            state: state.state,
        })
        .collect())
}

/// Instance records flattened across reservations, in response order.
pub fn parse_instances(raw: &[u8]) -> Result<Vec<InstanceRecord>> {
    let output: DescribeInstancesOutput = serde_json::from_slice(raw)?;
    Ok(output
        .reservations
        .into_iter()
        .flat_map(|reservation| reservation.instances)
        .map(|instance| InstanceRecord {
            id: instance.instance_id,
            state: LifecycleState::from_code(instance.state.code),
            private_address: instance.private_ip_address,
            tags: instance
                .tags
                .into_iter()
                .map(|tag| Tag::new(tag.key, tag.value))
                .collect(),
        })
        .collect())
}
