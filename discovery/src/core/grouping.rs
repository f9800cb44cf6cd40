//! Partitioning of instances into target groups.
//!
//! Two instances land in the same group iff their grouping signatures are
//! equal. The signature concatenates `|<key>=<value>` for every grouping key
//! in order, with an empty value when the instance lacks the tag.

use std::collections::{BTreeMap, HashMap};

use crate::core::types::{InstanceRecord, TargetGroup};

/// Grouping signature of `instance` for the ordered `keys`.
pub fn signature(instance: &InstanceRecord, keys: &[String]) -> String {
    let mut signature = String::new();
    for key in keys {
        signature.push('|');
        signature.push_str(key);
        signature.push('=');
        signature.push_str(instance.tag(key));
    }
    signature
}

/// Group running instances by signature.
///
/// Instances that are not running or have no private address are skipped
/// silently. Labels are taken from the first instance of each group and omit
/// keys whose value is empty.
pub fn group_by_tags(
    instances: &[InstanceRecord],
    keys: &[String],
    port: u16,
) -> HashMap<String, TargetGroup> {
    let mut groups: HashMap<String, TargetGroup> = HashMap::new();

    for instance in instances {
        if !instance.state.is_running() {
            continue;
        }
        let Some(address) = instance.address() else {
            continue;
        };

        let group = groups
            .entry(signature(instance, keys))
            .or_insert_with(|| TargetGroup {
                targets: Vec::new(),
                labels: labels_for(instance, keys),
            });
        group.targets.push(format!("{address}:{port}"));
    }

    groups
}

fn labels_for(instance: &InstanceRecord, keys: &[String]) -> BTreeMap<String, String> {
    keys.iter()
        .filter_map(|key| {
            let value = instance.tag(key);
            (!value.is_empty()).then(|| (key.clone(), value.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tag_spec::TagSpec;
    use crate::core::types::LifecycleState;
    use crate::test_support::{keys, running, with_state};

    #[test]
    fn signature_uses_empty_value_for_missing_tag() {
        let instance = running("i-1", "10.0.0.1", &[("Name", "web")]);
        assert_eq!(
            signature(&instance, &keys(&["Name", "Team"])),
            "|Name=web|Team="
        );
    }

    #[test]
    fn no_keys_put_every_instance_in_one_group() {
        let instances = vec![
            running("i-1", "10.0.0.1", &[("Name", "web")]),
            running("i-2", "10.0.0.2", &[("Name", "db")]),
        ];
        let groups = group_by_tags(&instances, &[], 80);
        assert_eq!(groups.len(), 1);
        let group = &groups[""];
        assert_eq!(group.targets, vec!["10.0.0.1:80", "10.0.0.2:80"]);
        assert!(group.labels.is_empty());
    }

    #[test]
    fn equal_signatures_share_a_group_in_first_seen_order() {
        let instances = vec![
            running("i-1", "10.0.0.3", &[("Name", "web")]),
            running("i-2", "10.0.0.1", &[("Name", "db")]),
            running("i-3", "10.0.0.2", &[("Name", "web")]),
        ];
        let groups = group_by_tags(&instances, &keys(&["Name"]), 9100);
        assert_eq!(groups.len(), 2);
        assert_eq!(
            groups["|Name=web"].targets,
            vec!["10.0.0.3:9100", "10.0.0.2:9100"]
        );
        assert_eq!(groups["|Name=db"].targets, vec!["10.0.0.1:9100"]);
    }

    #[test]
    fn partition_matches_signature_equality() {
        let instances = vec![
            running("i-1", "10.0.0.1", &[("App", "api"), ("Env", "prod")]),
            running("i-2", "10.0.0.2", &[("App", "api"), ("Env", "stage")]),
            running("i-3", "10.0.0.3", &[("App", "api"), ("Env", "prod")]),
            running("i-4", "10.0.0.4", &[("App", "api")]),
            running("i-5", "10.0.0.5", &[("Env", "prod")]),
        ];
        let keys = keys(&["App", "Env"]);
        let groups = group_by_tags(&instances, &keys, 80);

        let group_of = |address: &str| {
            let target = format!("{address}:80");
            groups
                .iter()
                .find(|(_, group)| group.targets.contains(&target))
                .map(|(sig, _)| sig.clone())
                .expect("instance grouped")
        };
        for a in &instances {
            for b in &instances {
                let same_group =
                    group_of(a.address().unwrap()) == group_of(b.address().unwrap());
                let same_signature = signature(a, &keys) == signature(b, &keys);
                assert_eq!(same_group, same_signature, "{} vs {}", a.id, b.id);
            }
        }
        assert_eq!(groups.len(), 4);
    }

    #[test]
    fn labels_omit_missing_and_empty_values() {
        let instances = vec![running("i-1", "10.0.0.1", &[("App", "api"), ("Env", "")])];
        let groups = group_by_tags(&instances, &keys(&["App", "Env", "Team"]), 80);
        let group = &groups["|App=api|Env=|Team="];
        assert_eq!(group.labels.len(), 1);
        assert_eq!(group.labels["App"], "api");
        assert!(!group.labels.contains_key("Env"));
        assert!(!group.labels.contains_key("Team"));
    }

    #[test]
    fn non_running_instances_are_excluded() {
        let instances = vec![
            with_state("i-1", "10.0.0.1", LifecycleState::Stopped, &[("Name", "web")]),
            with_state("i-2", "10.0.0.2", LifecycleState::Pending, &[("Name", "web")]),
            with_state("i-3", "10.0.0.3", LifecycleState::Unknown(99), &[("Name", "web")]),
            running("i-4", "10.0.0.4", &[("Name", "web")]),
        ];
        let groups = group_by_tags(&instances, &keys(&["Name"]), 80);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups["|Name=web"].targets, vec!["10.0.0.4:80"]);
    }

    #[test]
    fn instances_without_address_are_excluded() {
        let mut no_address = running("i-1", "", &[("Name", "web")]);
        no_address.private_address = None;
        let instances = vec![no_address, running("i-2", "", &[("Name", "db")])];
        assert!(group_by_tags(&instances, &keys(&["Name"]), 80).is_empty());
    }

    #[test]
    fn required_tag_values_do_not_filter_instances() {
        let spec = TagSpec::parse("Environment=Production").expect("parse");
        let instances = vec![
            running("i-1", "10.0.0.1", &[("Environment", "Production")]),
            running("i-2", "10.0.0.2", &[("Environment", "Staging")]),
        ];
        let groups = group_by_tags(&instances, &spec.keys(), 80);
        assert_eq!(groups.len(), 2);
        assert_eq!(
            groups["|Environment=Staging"].targets,
            vec!["10.0.0.2:80"]
        );
    }
}
