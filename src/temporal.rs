//! Lifecycle state shared by embargoes and leases

use serde::{Deserialize, Serialize};

/// Where a resource stands with respect to one embargo or lease.
///
/// `Lapsed` means the date has passed but nobody released it yet; release is
/// always an explicit call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestrictionState {
    None,
    Active,
    Lapsed,
    Released,
}

impl RestrictionState {
    pub fn is_active(&self) -> bool {
        *self == RestrictionState::Active
    }

    /// True when a release would change something
    pub fn is_releasable(&self) -> bool {
        matches!(self, RestrictionState::Active | RestrictionState::Lapsed)
    }
}

/// When a release may go ahead. Callers choose explicitly whether an embargo
/// or lease still in force may be lifted early.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReleasePolicy {
    /// Release whatever is attached, active or lapsed
    #[default]
    Always,
    /// Release only once the date has passed
    OnlyIfLapsed,
}

impl ReleasePolicy {
    pub fn allows(&self, state: RestrictionState) -> bool {
        match self {
            ReleasePolicy::Always => state.is_releasable(),
            ReleasePolicy::OnlyIfLapsed => state == RestrictionState::Lapsed,
        }
    }
}
