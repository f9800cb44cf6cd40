//! Load balancer health filtering.

use crate::core::types::InstanceHealth;

/// Status string the load balancer reports for healthy members.
pub const IN_SERVICE: &str = "InService";

/// Ids of members whose status is exactly `InService`, in input order.
pub fn healthy_instance_ids(states: &[InstanceHealth]) -> Vec<String> {
    states
        .iter()
        .filter(|health| health.state == IN_SERVICE)
        .map(|health| health.instance_id.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn health(id: &str, state: &str) -> InstanceHealth {
        InstanceHealth {
            instance_id: id.to_string(),
            state: state.to_string(),
        }
    }

    #[test]
    fn keeps_in_service_members_in_order() {
        let states = vec![
            health("i-3", "InService"),
            health("i-1", "OutOfService"),
            health("i-2", "InService"),
            health("i-4", "Unknown"),
        ];
        assert_eq!(healthy_instance_ids(&states), vec!["i-3", "i-2"]);
    }

    #[test]
    fn status_match_is_case_sensitive() {
        let states = vec![health("i-1", "inservice"), health("i-2", " InService")];
        assert!(healthy_instance_ids(&states).is_empty());
    }
}
