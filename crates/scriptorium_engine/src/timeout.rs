//! Per-content-type provider call timeouts.

use scriptorium_core::ContentType;
use scriptorium_error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

fn default_secs() -> u64 {
    120
}

fn default_per_type() -> BTreeMap<ContentType, u64> {
    BTreeMap::from([
        (ContentType::Caption, 30),
        (ContentType::CommunityPost, 45),
        (ContentType::Review, 60),
        (ContentType::Guide, 180),
    ])
}

/// Hard deadline for a single provider call, chosen by content type.
///
/// Loaded from the `[timeouts]` section:
///
/// ```toml
/// default_secs = 120
///
/// [per_type]
/// caption = 20
/// article = 240
/// ```
///
/// Entries in `per_type` replace the built-in overrides for the types they name.
///
/// # Examples
///
/// ```
/// use scriptorium_core::ContentType;
/// use scriptorium_engine::TimeoutPolicy;
/// use std::time::Duration;
///
/// let policy = TimeoutPolicy::default().with_override(ContentType::Article, 300);
/// assert_eq!(policy.for_content(ContentType::Caption), Duration::from_secs(30));
/// assert_eq!(policy.for_content(ContentType::Article), Duration::from_secs(300));
/// assert_eq!(policy.for_content(ContentType::Digest), Duration::from_secs(120));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeoutPolicy {
    #[serde(default = "default_secs")]
    default_secs: u64,
    #[serde(default = "default_per_type", deserialize_with = "merge_defaults")]
    per_type: BTreeMap<ContentType, u64>,
}

fn merge_defaults<'de, D>(deserializer: D) -> Result<BTreeMap<ContentType, u64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let mut merged = default_per_type();
    merged.extend(BTreeMap::<ContentType, u64>::deserialize(deserializer)?);
    Ok(merged)
}

impl Default for TimeoutPolicy {
    fn default() -> Self {
        Self {
            default_secs: default_secs(),
            per_type: default_per_type(),
        }
    }
}

impl TimeoutPolicy {
    /// Policy with one deadline for every content type.
    pub fn uniform(secs: u64) -> Self {
        Self {
            default_secs: secs,
            per_type: BTreeMap::new(),
        }
    }

    /// Replace the deadline for one content type.
    pub fn with_override(mut self, content_type: ContentType, secs: u64) -> Self {
        self.per_type.insert(content_type, secs);
        self
    }

    /// Deadline for content types without an override.
    pub fn default_timeout(&self) -> Duration {
        Duration::from_secs(self.default_secs)
    }

    /// Deadline for a provider call producing `content_type`.
    pub fn for_content(&self, content_type: ContentType) -> Duration {
        Duration::from_secs(
            self.per_type
                .get(&content_type)
                .copied()
                .unwrap_or(self.default_secs),
        )
    }

    /// Reject zero deadlines.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_secs == 0 {
            return Err(ConfigError::new("timeouts.default_secs must be positive"));
        }
        if let Some((content_type, _)) = self.per_type.iter().find(|(_, secs)| **secs == 0) {
            return Err(ConfigError::new(format!(
                "timeouts.per_type.{} must be positive",
                content_type
            )));
        }
        Ok(())
    }
}
