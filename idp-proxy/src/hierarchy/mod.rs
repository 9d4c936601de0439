//! Group-to-level hierarchy mapping and level resolution.
//!
//! A caller's hierarchy level is the highest level among the configured groups
//! they are a member of. Callers without any configured group resolve to
//! [`HierarchyLevel::None`].

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use utoipa::ToSchema;

pub mod store;

pub use store::{DefaultReason, HierarchyConfigStore, LoadOutcome, StoreError};

/// Coarse access tier, ordered from `none` to `admin`
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum HierarchyLevel {
    #[default]
    None = 0,
    Member = 1,
    Leader = 2,
    Admin = 3,
}

impl HierarchyLevel {
    pub fn rank(self) -> u8 {
        self as u8
    }
}

/// One configured group and the level its members receive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct GroupMapping {
    /// IDP group identifier
    pub group_id: i64,
    /// Role names within the group (informational only)
    #[serde(default)]
    pub roles: Vec<String>,
    /// Level granted to members of the group
    #[serde(rename = "profile")]
    pub level: HierarchyLevel,
}

/// The persisted group-to-level mapping
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HierarchyConfig {
    #[serde(default)]
    pub groups: Vec<GroupMapping>,
}

impl HierarchyConfig {
    /// The configuration used when none can be loaded; every caller resolves to `none`
    pub fn fallback() -> Self {
        Self::default()
    }
}

/// Returns the highest level among the mappings whose group is in `group_ids`
pub fn resolve(group_ids: &HashSet<i64>, config: &HierarchyConfig) -> HierarchyLevel {
    config
        .groups
        .iter()
        .filter(|group| group_ids.contains(&group.group_id))
        .map(|group| group.level)
        .max()
        .unwrap_or_default()
}
