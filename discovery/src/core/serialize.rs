//! Encoding of target groups into the file-based service discovery document.

use std::collections::HashMap;

use crate::core::types::TargetGroup;

/// Groups ordered by ascending signature.
pub fn ordered_groups(groups: &HashMap<String, TargetGroup>) -> Vec<&TargetGroup> {
    let mut signatures: Vec<&String> = groups.keys().collect();
    signatures.sort();
    signatures.into_iter().map(|sig| &groups[sig]).collect()
}

/// Serialize groups to a pretty-printed JSON array with a trailing newline.
pub fn encode_target_groups(
    groups: &HashMap<String, TargetGroup>,
) -> Result<Vec<u8>, serde_json::Error> {
    let mut payload = serde_json::to_string_pretty(&ordered_groups(groups))?;
    payload.push('\n');
    Ok(payload.into_bytes())
}
