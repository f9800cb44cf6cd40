//! Discovery configuration: optional TOML file plus command-line overrides.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;
use crate::io::publish::{Destination, STDOUT_SENTINEL};

/// Settings for one discovery run.
///
/// Built once at startup and passed explicitly into the pipeline. Missing
/// fields default to the values the CLI documents.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Port appended to every target address.
    pub port: u16,

    /// Output file, or `-` for stdout.
    pub dest: String,

    /// AWS region used for both the load balancer and the inventory.
    pub region: String,

    /// Name of the classic load balancer to query. Required.
    pub elb: String,

    /// Comma separated grouping keys, e.g. `Application,Environment=Production`.
    pub tags: String,

    pub aws: AwsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AwsConfig {
    /// Program and leading args used to invoke the AWS CLI.
    pub command: Vec<String>,

    /// Per-call timeout in seconds.
    pub timeout_secs: u64,

    /// Maximum bytes of CLI output kept in memory per call.
    pub output_limit_bytes: usize,
}

impl Default for AwsConfig {
    fn default() -> Self {
        Self {
            command: vec!["aws".to_string()],
            timeout_secs: 60,
            output_limit_bytes: 10 * 1024 * 1024,
        }
    }
}

impl AwsConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            port: 80,
            dest: STDOUT_SENTINEL.to_string(),
            region: "us-west-2".to_string(),
            elb: String::new(),
            tags: "Name".to_string(),
            aws: AwsConfig::default(),
        }
    }
}

/// Values given on the command line; `None` keeps the file/default value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub port: Option<u16>,
    pub dest: Option<String>,
    pub region: Option<String>,
    pub elb: Option<String>,
    pub tags: Option<String>,
}

impl DiscoveryConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.elb.trim().is_empty() {
            return Err(ConfigError::MissingLoadBalancer);
        }
        if self.port == 0 {
            return Err(ConfigError::InvalidPort);
        }
        if self.aws.command.is_empty() || self.aws.command[0].trim().is_empty() {
            return Err(ConfigError::EmptyCommand);
        }
        if self.aws.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout);
        }
        if self.aws.output_limit_bytes == 0 {
            return Err(ConfigError::InvalidOutputLimit);
        }
        Ok(())
    }

    pub fn apply(mut self, overrides: Overrides) -> Self {
        if let Some(port) = overrides.port {
            self.port = port;
        }
        if let Some(dest) = overrides.dest {
            self.dest = dest;
        }
        if let Some(region) = overrides.region {
            self.region = region;
        }
        if let Some(elb) = overrides.elb {
            self.elb = elb;
        }
        if let Some(tags) = overrides.tags {
            self.tags = tags;
        }
        self
    }

    pub fn destination(&self) -> Destination {
        Destination::parse(&self.dest)
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `DiscoveryConfig::default()`. The result is
/// not validated: the load balancer name usually arrives as a flag.
pub fn load_config(path: &Path) -> Result<DiscoveryConfig, ConfigError> {
    if !path.exists() {
        debug!(path = %path.display(), "config file missing, using defaults");
        return Ok(DiscoveryConfig::default());
    }
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&contents).map_err(|source| ConfigError::ParseFile {
        path: path.to_path_buf(),
        source,
    })
}

/// Resolve the effective config: file (if any), then flags, then validation.
pub fn resolve_config(
    path: Option<&Path>,
    overrides: Overrides,
) -> Result<DiscoveryConfig, ConfigError> {
    let base = match path {
        Some(path) => load_config(path)?,
        None => DiscoveryConfig::default(),
    };
    let cfg = base.apply(overrides);
    cfg.validate()?;
    Ok(cfg)
}
