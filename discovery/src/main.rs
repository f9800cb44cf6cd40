//! Publish the healthy instances behind a load balancer as Prometheus
//! file-based service discovery target groups.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;

use elb_discovery::discover;
use elb_discovery::error::DiscoveryError;
use elb_discovery::exit_codes;
use elb_discovery::io::aws::AwsCli;
use elb_discovery::io::config::{Overrides, resolve_config};
use elb_discovery::logging;
use elb_discovery::validate::validate_file;

#[derive(Parser)]
#[command(
    name = "elb-discovery",
    version,
    about = "Load balancer target discovery for Prometheus file_sd"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Query the load balancer and publish grouped targets.
    Discover {
        /// TOML config file; flags override its values.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Port that is exposing /metrics [default: 80]
        #[arg(long)]
        port: Option<u16>,
        /// File to write the target groups to (e.g. `tgroups/targets.json`), or `-` for stdout [default: -]
        #[arg(long)]
        dest: Option<String>,
        /// AWS region to query [default: us-west-2]
        #[arg(long)]
        region: Option<String>,
        /// Load balancer to query.
        #[arg(long)]
        elb: Option<String>,
        /// Comma separated tags to group by (e.g. `Environment,Application`).
        /// `Key=Value` fields are accepted; only the key is used for grouping.
        /// An empty value groups by every tag key found [default: Name]
        #[arg(long)]
        tags: Option<String>,
    },
    /// Check a target group file against the schema and target rules.
    Validate {
        /// Target group file to check.
        path: PathBuf,
    },
}

fn main() {
    if let Err(err) = logging::init() {
        eprintln!("warning: logging disabled: {err:#}");
    }
    let cli = Cli::parse();
    let code = match cli.command {
        Command::Discover {
            config,
            port,
            dest,
            region,
            elb,
            tags,
        } => {
            let overrides = Overrides {
                port,
                dest,
                region,
                elb,
                tags,
            };
            match cmd_discover(config, overrides) {
                Ok(()) => exit_codes::OK,
                Err(err) => {
                    let code = err.exit_code();
                    eprintln!("{:#}", anyhow::Error::from(err));
                    code
                }
            }
        }
        Command::Validate { path } => match validate_file(&path) {
            Ok(groups) => {
                println!("ok: {} target groups", groups.len());
                exit_codes::OK
            }
            Err(err) => {
                eprintln!("{:#}", err);
                exit_codes::INVALID
            }
        },
    };
    std::process::exit(code);
}

fn cmd_discover(config: Option<PathBuf>, overrides: Overrides) -> Result<(), DiscoveryError> {
    let cfg = resolve_config(config.as_deref(), overrides)?;
    info!(elb = %cfg.elb, region = %cfg.region, dest = %cfg.dest, "starting discovery");
    let aws = AwsCli::from_config(&cfg);
    discover::run(&cfg, &aws, &aws)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_discover_flags() {
        let cli = Cli::parse_from([
            "elb-discovery",
            "discover",
            "--elb",
            "web",
            "--port",
            "9100",
            "--tags",
            "",
        ]);
        match cli.command {
            Command::Discover {
                elb, port, tags, dest, ..
            } => {
                assert_eq!(elb.as_deref(), Some("web"));
                assert_eq!(port, Some(9100));
                assert_eq!(tags.as_deref(), Some(""));
                assert_eq!(dest, None);
            }
            Command::Validate { .. } => panic!("expected discover"),
        }
    }

    #[test]
    fn parse_validate() {
        let cli = Cli::parse_from(["elb-discovery", "validate", "targets.json"]);
        assert!(matches!(cli.command, Command::Validate { path } if path == PathBuf::from("targets.json")));
    }
}
