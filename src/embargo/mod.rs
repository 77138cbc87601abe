//! Embargoes: temporary restrictions that lift on a release date.

pub mod manager;

pub use manager::EmbargoManager;

use crate::error::{AccessError, AccessResult};
use crate::resource::ResourceId;
use crate::temporal::RestrictionState;
use crate::visibility::Visibility;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embargo {
    /// Assigned by the persister on first save
    #[serde(default)]
    pub id: Option<ResourceId>,
    pub embargo_release_date: DateTime<Utc>,
    pub visibility_during_embargo: Visibility,
    pub visibility_after_embargo: Visibility,
    /// Set once the embargo has been released; release is irreversible
    #[serde(default)]
    pub released_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub embargo_history: Vec<String>,
}

impl Embargo {
    pub fn new(
        embargo_release_date: DateTime<Utc>,
        visibility_during_embargo: Visibility,
        visibility_after_embargo: Visibility,
    ) -> Self {
        Self {
            id: None,
            embargo_release_date,
            visibility_during_embargo,
            visibility_after_embargo,
            released_at: None,
            embargo_history: Vec::new(),
        }
    }

    /// Both visibilities must be plain grant patterns
    pub fn validate(&self) -> AccessResult<()> {
        for (field, visibility) in [
            ("visibility_during_embargo", self.visibility_during_embargo),
            ("visibility_after_embargo", self.visibility_after_embargo),
        ] {
            if !visibility.is_grant_based() {
                return Err(AccessError::invalid_transition(format!(
                    "{} cannot be '{}'",
                    field, visibility
                )));
            }
        }
        Ok(())
    }

    pub fn is_released(&self) -> bool {
        self.released_at.is_some()
    }

    /// Unreleased with a release date still in the future
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        !self.is_released() && self.embargo_release_date > now
    }

    pub fn state(&self, now: DateTime<Utc>) -> RestrictionState {
        if self.is_released() {
            RestrictionState::Released
        } else if self.embargo_release_date > now {
            RestrictionState::Active
        } else {
            RestrictionState::Lapsed
        }
    }

    /// Mark released and record the deactivation in the history.
    pub fn deactivate(&mut self, now: DateTime<Utc>) {
        if self.is_released() {
            return;
        }
        let state = if self.embargo_release_date > now {
            "An active"
        } else {
            "An expired"
        };
        self.embargo_history.push(format!(
            "{} embargo was deactivated on {}. Its release date was {}. Visibility during embargo was {} and intended visibility after embargo was {}",
            state,
            now.format("%Y-%m-%d"),
            self.embargo_release_date.format("%Y-%m-%d"),
            self.visibility_during_embargo,
            self.visibility_after_embargo
        ));
        self.released_at = Some(now);
    }

    /// Unreleased and carrying the same date and visibilities as `other`
    pub fn same_terms(&self, other: &Embargo) -> bool {
        !self.is_released()
            && self.embargo_release_date == other.embargo_release_date
            && self.visibility_during_embargo == other.visibility_during_embargo
            && self.visibility_after_embargo == other.visibility_after_embargo
    }

    /// Unsaved copy of the date and visibility fields, for attaching to
    /// another resource.
    pub fn duplicate(&self) -> Embargo {
        Embargo::new(
            self.embargo_release_date,
            self.visibility_during_embargo,
            self.visibility_after_embargo,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_state_transitions() {
        let now = Utc::now();
        let mut embargo = Embargo::new(
            now + Duration::days(1),
            Visibility::Restricted,
            Visibility::Open,
        );
        assert_eq!(embargo.state(now), RestrictionState::Active);
        assert_eq!(embargo.state(now + Duration::days(2)), RestrictionState::Lapsed);

        embargo.deactivate(now);
        assert_eq!(embargo.state(now), RestrictionState::Released);
        assert!(!embargo.is_active(now));
        assert_eq!(embargo.embargo_history.len(), 1);
        assert!(embargo.embargo_history[0].starts_with("An active embargo"));

        embargo.deactivate(now);
        assert_eq!(embargo.embargo_history.len(), 1);
    }

    #[test]
    fn test_validate_rejects_temporal_visibility() {
        let embargo = Embargo::new(Utc::now(), Visibility::Lease, Visibility::Open);
        assert!(matches!(
            embargo.validate(),
            Err(AccessError::InvalidTransition(_))
        ));
    }
}
