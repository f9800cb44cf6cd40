//! Diagnostic tracing for discovery runs.
//!
//! stdout may carry the target group document (`--dest -`), so all
//! diagnostics go to stderr.

use anyhow::{Context, Result};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter directives checked first; falls back to `RUST_LOG`.
pub const LOG_ENV: &str = "ELB_DISCOVERY_LOG";

const DEFAULT_DIRECTIVES: &str = "warn";

/// Install the stderr subscriber.
///
/// Directives come from `ELB_DISCOVERY_LOG`, then `RUST_LOG`, then `warn`.
/// Fails on unparsable directives or when a subscriber is already installed.
///
/// # Example
/// ```bash
/// ELB_DISCOVERY_LOG=elb_discovery=debug elb-discovery discover --elb web
/// ```
pub fn init() -> Result<()> {
    let own = std::env::var(LOG_ENV).ok();
    let shared = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = filter_from(own.as_deref().or(shared.as_deref()))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .try_init()
        .context("install tracing subscriber")
}

fn filter_from(directives: Option<&str>) -> Result<EnvFilter> {
    match directives.map(str::trim).filter(|d| !d.is_empty()) {
        Some(directives) => EnvFilter::try_new(directives)
            .with_context(|| format!("invalid log directives {directives:?}")),
        None => Ok(EnvFilter::new(DEFAULT_DIRECTIVES)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_directives_fall_back_to_warn() {
        assert_eq!(filter_from(None).expect("filter").to_string(), "warn");
        assert_eq!(filter_from(Some("  ")).expect("filter").to_string(), "warn");
    }

    #[test]
    fn parses_module_directives() {
        let filter = filter_from(Some("elb_discovery=debug")).expect("filter");
        assert_eq!(filter.to_string(), "elb_discovery=debug");
    }

    #[test]
    fn rejects_unknown_level() {
        let err = filter_from(Some("elb_discovery=loud")).expect_err("should fail");
        assert!(format!("{err:#}").contains("elb_discovery=loud"));
    }

    #[test]
    fn second_init_is_an_error() {
        let _ = init();
        assert!(init().is_err());
    }
}
