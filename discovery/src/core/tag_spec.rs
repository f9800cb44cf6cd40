//! Parsing of the `--tags` grouping specification.
//!
//! The spec is a comma-separated list of `Key` or `Key=Value` fields, e.g.
//! `Application,Environment=Production`.

use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// One grouping field: a tag key and an optional required value.
///
/// The required value is carried along but grouping only ever looks at the
/// key, so `Environment=Production` still yields one group per environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagSelector {
    pub key: String,
    pub required_value: Option<String>,
}

impl TagSelector {
    pub fn key(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            required_value: None,
        }
    }
}

/// Ordered selectors parsed from a tag spec. Duplicates are preserved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSpec {
    selectors: Vec<TagSelector>,
}

impl TagSpec {
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        if raw.is_empty() {
            return Ok(Self::default());
        }
        let selectors = raw
            .split(',')
            .map(parse_field)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { selectors })
    }

    pub fn selectors(&self) -> &[TagSelector] {
        &self.selectors
    }

    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }

    /// Selector keys with duplicates removed, in first-occurrence order.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = Vec::with_capacity(self.selectors.len());
        for selector in &self.selectors {
            if !keys.contains(&selector.key) {
                keys.push(selector.key.clone());
            }
        }
        keys
    }

    pub fn has_required_values(&self) -> bool {
        self.selectors
            .iter()
            .any(|selector| selector.required_value.is_some())
    }
}

fn parse_field(field: &str) -> Result<TagSelector, ConfigError> {
    let mut parts = field.split('=');
    let key = parts.next().unwrap_or_default();
    let value = parts.next();
    if parts.next().is_some() {
        return Err(ConfigError::TagSpec {
            field: field.to_string(),
        });
    }
    Ok(TagSelector {
        key: key.to_string(),
        required_value: value.map(str::to_string),
    })
}

impl FromStr for TagSpec {
    type Err = ConfigError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::parse(raw)
    }
}

impl fmt::Display for TagSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, selector) in self.selectors.iter().enumerate() {
            if idx > 0 {
                f.write_str(",")?;
            }
            f.write_str(&selector.key)?;
            if let Some(value) = &selector.required_value {
                write!(f, "={value}")?;
            }
        }
        Ok(())
    }
}
