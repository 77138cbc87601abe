//! Leases: temporary grants that expire on a date.
//!
//! A lease has no "during" visibility of its own; while it is active the
//! resource keeps whatever grants were assigned to it.

pub mod manager;

pub use manager::LeaseManager;

use crate::error::{AccessError, AccessResult};
use crate::resource::ResourceId;
use crate::temporal::RestrictionState;
use crate::visibility::Visibility;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lease {
    #[serde(default)]
    pub id: Option<ResourceId>,
    pub lease_expiration_date: DateTime<Utc>,
    pub visibility_after_lease: Visibility,
    #[serde(default)]
    pub released_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub lease_history: Vec<String>,
}

impl Lease {
    pub fn new(lease_expiration_date: DateTime<Utc>, visibility_after_lease: Visibility) -> Self {
        Self {
            id: None,
            lease_expiration_date,
            visibility_after_lease,
            released_at: None,
            lease_history: Vec::new(),
        }
    }

    pub fn validate(&self) -> AccessResult<()> {
        if self.visibility_after_lease.is_grant_based() {
            Ok(())
        } else {
            Err(AccessError::invalid_transition(format!(
                "visibility_after_lease cannot be '{}'",
                self.visibility_after_lease
            )))
        }
    }

    pub fn is_released(&self) -> bool {
        self.released_at.is_some()
    }

    /// Unreleased with an expiration date still in the future
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        !self.is_released() && self.lease_expiration_date > now
    }

    pub fn state(&self, now: DateTime<Utc>) -> RestrictionState {
        if self.is_released() {
            RestrictionState::Released
        } else if self.lease_expiration_date > now {
            RestrictionState::Active
        } else {
            RestrictionState::Lapsed
        }
    }

    /// Mark expired and record the deactivation in the history.
    pub fn deactivate(&mut self, now: DateTime<Utc>, visibility_during_lease: Visibility) {
        if self.is_released() {
            return;
        }
        let state = if self.lease_expiration_date > now {
            "An active"
        } else {
            "An expired"
        };
        self.lease_history.push(format!(
            "{} lease was deactivated on {}. Its expiration date was {}. Visibility during the lease was {} and intended visibility after the lease was {}",
            state,
            now.format("%Y-%m-%d"),
            self.lease_expiration_date.format("%Y-%m-%d"),
            visibility_during_lease,
            self.visibility_after_lease
        ));
        self.released_at = Some(now);
    }

    pub fn same_terms(&self, other: &Lease) -> bool {
        !self.is_released()
            && self.lease_expiration_date == other.lease_expiration_date
            && self.visibility_after_lease == other.visibility_after_lease
    }

    /// Unsaved copy of the date and visibility fields
    pub fn duplicate(&self) -> Lease {
        Lease::new(self.lease_expiration_date, self.visibility_after_lease)
    }
}
