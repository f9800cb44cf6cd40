//! Error kinds surfaced by a discovery run.
//!
//! Every failure aborts the run before anything is published. The binary
//! maps each kind to a stable exit code (see [`crate::exit_codes`]).

use std::path::PathBuf;

use thiserror::Error;

use crate::exit_codes;

/// Invalid configuration, detected before any collaborator is called.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unrecognized tag filter {field:?}: expected `Key` or `Key=Value`")]
    TagSpec { field: String },

    #[error("load balancer name is required (--elb)")]
    MissingLoadBalancer,

    #[error("port must be > 0")]
    InvalidPort,

    #[error("aws.command must be a non-empty array")]
    EmptyCommand,

    #[error("aws.timeout_secs must be > 0")]
    InvalidTimeout,

    #[error("aws.output_limit_bytes must be > 0")]
    InvalidOutputLimit,

    #[error("read config file {}", path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config file {}", path.display())]
    ParseFile {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("configuration error")]
    Config(#[from] ConfigError),

    #[error("lookup failed")]
    Lookup {
        #[source]
        source: anyhow::Error,
    },

    #[error("encode target groups")]
    Encode(#[from] serde_json::Error),

    #[error("publish {path}")]
    Publish {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl DiscoveryError {
    /// Wrap a collaborator failure; its context chain stays reachable
    /// through `source()`.
    pub fn lookup(source: anyhow::Error) -> Self {
        Self::Lookup { source }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => exit_codes::CONFIG,
            Self::Lookup { .. } => exit_codes::LOOKUP,
            Self::Encode(_) => exit_codes::ENCODE,
            Self::Publish { .. } => exit_codes::PUBLISH,
        }
    }
}
