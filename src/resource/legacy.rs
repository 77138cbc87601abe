//! Resources that predate detached access control lists.
//!
//! A legacy resource carries its permissions, embargo and lease inline and is
//! persisted as a single record in its own keyspace. Release keeps the
//! deactivated embargo or lease on the record for its history.

use super::{
    set_string_attribute, string_attribute, ResourceId, ResourceKind, DEPOSITOR_ATTRIBUTE,
    PROXY_DEPOSITOR_ATTRIBUTE,
};
use crate::embargo::Embargo;
use crate::error::{AccessError, AccessResult};
use crate::lease::Lease;
use crate::permissions::{AccessMode, Agent, Permission};
use crate::temporal::RestrictionState;
use crate::visibility::reader::resolve_visibility;
use crate::visibility::{Visibility, VisibilityMap};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyResource {
    pub id: ResourceId,
    pub kind: ResourceKind,
    #[serde(default)]
    pub member_ids: Vec<ResourceId>,
    #[serde(default)]
    pub attributes: BTreeMap<String, Value>,
    #[serde(default)]
    pub permissions: BTreeSet<Permission>,
    #[serde(default)]
    pub embargo: Option<Embargo>,
    #[serde(default)]
    pub lease: Option<Lease>,
}

impl LegacyResource {
    pub fn new(id: ResourceId, kind: ResourceKind) -> Self {
        Self {
            id,
            kind,
            member_ids: Vec::new(),
            attributes: BTreeMap::new(),
            permissions: BTreeSet::new(),
            embargo: None,
            lease: None,
        }
    }

    pub fn work() -> Self {
        Self::new(ResourceId::generate(), ResourceKind::Work)
    }

    pub fn file_set() -> Self {
        Self::new(ResourceId::generate(), ResourceKind::FileSet)
    }

    pub fn with_members(mut self, member_ids: Vec<ResourceId>) -> Self {
        self.member_ids = member_ids;
        self
    }

    pub fn is_file_set(&self) -> bool {
        self.kind == ResourceKind::FileSet
    }

    pub fn depositor(&self) -> Option<&str> {
        string_attribute(&self.attributes, DEPOSITOR_ATTRIBUTE)
    }

    pub fn set_depositor(&mut self, depositor: &str) {
        set_string_attribute(&mut self.attributes, DEPOSITOR_ATTRIBUTE, Some(depositor));
    }

    pub fn proxy_depositor(&self) -> Option<&str> {
        string_attribute(&self.attributes, PROXY_DEPOSITOR_ATTRIBUTE)
    }

    pub fn set_proxy_depositor(&mut self, proxy: Option<&str>) {
        set_string_attribute(&mut self.attributes, PROXY_DEPOSITOR_ATTRIBUTE, proxy);
    }

    pub fn grant(&mut self, mode: AccessMode, agent: Agent) -> &mut Self {
        self.permissions
            .insert(Permission::new(agent, mode, self.id.clone()));
        self
    }

    pub fn revoke(&mut self, mode: AccessMode, agent: Agent) -> &mut Self {
        self.permissions
            .remove(&Permission::new(agent, mode, self.id.clone()));
        self
    }

    /// Embargo > lease > grant pattern, as for managed resources
    pub fn visibility_at(&self, map: &VisibilityMap, now: DateTime<Utc>) -> Visibility {
        resolve_visibility(
            map,
            &self.permissions,
            self.embargo.as_ref(),
            self.lease.as_ref(),
            now,
        )
    }

    /// Rewrite the inline grants in memory. Nothing is persisted.
    pub fn apply_visibility(
        &mut self,
        map: &VisibilityMap,
        visibility: Visibility,
    ) -> AccessResult<()> {
        let pattern = match visibility {
            Visibility::Embargo => {
                self.embargo
                    .as_ref()
                    .ok_or_else(|| missing(&self.id, "an embargo"))?
                    .visibility_during_embargo
            }
            Visibility::Lease => {
                if self.lease.is_none() {
                    return Err(missing(&self.id, "a lease"));
                }
                return Ok(());
            }
            grants => grants,
        };
        map.apply_to_permissions(&mut self.permissions, &self.id, pattern)
    }

    pub fn embargo_state(&self, now: DateTime<Utc>) -> RestrictionState {
        self.embargo
            .as_ref()
            .map_or(RestrictionState::None, |e| e.state(now))
    }

    pub fn lease_state(&self, now: DateTime<Utc>) -> RestrictionState {
        self.lease
            .as_ref()
            .map_or(RestrictionState::None, |l| l.state(now))
    }

    /// Apply the post-embargo grants and deactivate the inline embargo.
    /// Returns false when there is nothing to release.
    pub fn deactivate_embargo(
        &mut self,
        map: &VisibilityMap,
        now: DateTime<Utc>,
    ) -> AccessResult<bool> {
        let after = match &self.embargo {
            Some(embargo) if !embargo.is_released() => embargo.visibility_after_embargo,
            _ => return Ok(false),
        };
        map.apply_to_permissions(&mut self.permissions, &self.id, after)?;
        if let Some(embargo) = self.embargo.as_mut() {
            embargo.deactivate(now);
        }
        Ok(true)
    }

    /// Apply the post-lease grants and deactivate the inline lease.
    pub fn deactivate_lease(&mut self, map: &VisibilityMap, now: DateTime<Utc>) -> AccessResult<bool> {
        let after = match &self.lease {
            Some(lease) if !lease.is_released() => lease.visibility_after_lease,
            _ => return Ok(false),
        };
        let during = map.visibility_for(&self.permissions);
        map.apply_to_permissions(&mut self.permissions, &self.id, after)?;
        if let Some(lease) = self.lease.as_mut() {
            lease.deactivate(now, during);
        }
        Ok(true)
    }
}

fn missing(id: &ResourceId, what: &str) -> AccessError {
    AccessError::invalid_transition(format!("Legacy resource {} has no {}", id, what))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_inline_visibility() {
        let map = VisibilityMap::default();
        let now = Utc::now();
        let mut work = LegacyResource::work();
        work.apply_visibility(&map, Visibility::Authenticated).unwrap();
        assert_eq!(work.visibility_at(&map, now), Visibility::Authenticated);

        work.lease = Some(Lease::new(now + Duration::days(1), Visibility::Restricted));
        assert_eq!(work.visibility_at(&map, now), Visibility::Lease);
    }

    #[test]
    fn test_deactivate_embargo_keeps_history_inline() {
        let map = VisibilityMap::default();
        let now = Utc::now();
        let mut work = LegacyResource::work();
        work.embargo = Some(Embargo::new(
            now + Duration::days(1),
            Visibility::Restricted,
            Visibility::Open,
        ));
        work.apply_visibility(&map, Visibility::Embargo).unwrap();
        assert_eq!(work.visibility_at(&map, now), Visibility::Embargo);

        assert!(work.deactivate_embargo(&map, now).unwrap());
        assert!(!work.deactivate_embargo(&map, now).unwrap());
        assert_eq!(work.visibility_at(&map, now), Visibility::Open);
        assert_eq!(work.embargo_state(now), RestrictionState::Released);
        assert_eq!(work.embargo.as_ref().unwrap().embargo_history.len(), 1);
    }

    #[test]
    fn test_lease_visibility_needs_lease() {
        let map = VisibilityMap::default();
        let mut work = LegacyResource::work();
        assert!(matches!(
            work.apply_visibility(&map, Visibility::Lease),
            Err(AccessError::InvalidTransition(_))
        ));
    }
}
