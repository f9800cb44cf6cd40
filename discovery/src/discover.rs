//! One discovery run: collaborators in, target group document out.

use tracing::{debug, info, instrument, warn};

use crate::core::grouping::group_by_tags;
use crate::core::health::healthy_instance_ids;
use crate::core::keys::all_tag_keys;
use crate::core::serialize::encode_target_groups;
use crate::core::tag_spec::TagSpec;
use crate::error::DiscoveryError;
use crate::io::config::DiscoveryConfig;
use crate::io::publish::publish;
use crate::sources::{Inventory, LoadBalancer};

/// Build the target group document for the configured load balancer.
///
/// The tag spec is parsed before any collaborator is called. An empty member
/// list or no healthy member yields `[]` without querying the inventory.
#[instrument(skip_all, fields(elb = %cfg.elb, region = %cfg.region))]
pub fn discover(
    cfg: &DiscoveryConfig,
    load_balancer: &dyn LoadBalancer,
    inventory: &dyn Inventory,
) -> Result<Vec<u8>, DiscoveryError> {
    let spec = TagSpec::parse(&cfg.tags)?;
    if spec.has_required_values() {
        warn!(tags = %spec, "tag values are not applied as filters; grouping uses keys only");
    }

    let members = load_balancer
        .member_ids(&cfg.elb)
        .map_err(DiscoveryError::lookup)?;
    if members.is_empty() {
        info!("load balancer has no registered instances");
        return Ok(encode_target_groups(&Default::default())?);
    }

    let health = load_balancer
        .instance_health(&cfg.elb, &members)
        .map_err(DiscoveryError::lookup)?;
    let healthy = healthy_instance_ids(&health);
    debug!(members = members.len(), healthy = healthy.len(), "health filtered");
    if healthy.is_empty() {
        info!("no instance is in service");
        return Ok(encode_target_groups(&Default::default())?);
    }

    let instances = inventory
        .describe_instances(&healthy)
        .map_err(DiscoveryError::lookup)?;

    let mut keys = spec.keys();
    if keys.is_empty() {
        keys = all_tag_keys(&instances);
        debug!(?keys, "grouping by every observed tag key");
    }

    let groups = group_by_tags(&instances, &keys, cfg.port);
    info!(
        instances = instances.len(),
        groups = groups.len(),
        "target groups built"
    );
    Ok(encode_target_groups(&groups)?)
}

/// Discover and publish to the configured destination.
pub fn run(
    cfg: &DiscoveryConfig,
    load_balancer: &dyn LoadBalancer,
    inventory: &dyn Inventory,
) -> Result<(), DiscoveryError> {
    let payload = discover(cfg, load_balancer, inventory)?;
    let dest = cfg.destination();
    publish(&dest, &payload)?;
    debug!(dest = %dest, bytes = payload.len(), "published target groups");
    Ok(())
}
