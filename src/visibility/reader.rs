use super::{Visibility, VisibilityMap};
use crate::embargo::Embargo;
use crate::error::AccessResult;
use crate::lease::Lease;
use crate::permissions::{AccessControlList, Permission};
use crate::resource::Resource;
use crate::store::AccessContext;
use chrono::{DateTime, Utc};

/// Derives the visibility of a managed resource at read time.
///
/// Precedence, first match wins:
/// 1. an active, unreleased embargo => `Embargo`
/// 2. an active, unexpired lease => `Lease`
/// 3. the grant pattern of the access control list
pub struct VisibilityReader<'a> {
    resource: &'a Resource,
    context: &'a AccessContext,
}

impl<'a> VisibilityReader<'a> {
    pub fn new(resource: &'a Resource, context: &'a AccessContext) -> Self {
        Self { resource, context }
    }

    pub fn read(&self) -> AccessResult<Visibility> {
        let queries = self.context.queries();
        let embargo = match &self.resource.embargo_id {
            Some(id) => Some(queries.find_embargo(id)?),
            None => None,
        };
        let lease = match &self.resource.lease_id {
            Some(id) => Some(queries.find_lease(id)?),
            None => None,
        };
        let acl = AccessControlList::load(&self.resource.id, self.context)?;

        Ok(resolve_visibility(
            self.context.visibility_map(),
            acl.permissions(),
            embargo.as_ref(),
            lease.as_ref(),
            self.context.now(),
        ))
    }

    /// Visibility implied by the grants alone, ignoring embargo and lease
    pub fn grant_visibility(&self) -> AccessResult<Visibility> {
        let acl = AccessControlList::load(&self.resource.id, self.context)?;
        Ok(self.context.visibility_map().visibility_for(acl.permissions()))
    }
}

/// Pure visibility derivation shared by managed and legacy resources.
pub fn resolve_visibility<'p, I>(
    map: &VisibilityMap,
    permissions: I,
    embargo: Option<&Embargo>,
    lease: Option<&Lease>,
    now: DateTime<Utc>,
) -> Visibility
where
    I: IntoIterator<Item = &'p Permission>,
{
    if embargo.map_or(false, |e| e.is_active(now)) {
        return Visibility::Embargo;
    }
    if lease.map_or(false, |l| l.is_active(now)) {
        return Visibility::Lease;
    }
    map.visibility_for(permissions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permissions::{AccessMode, Agent};
    use crate::resource::ResourceId;
    use chrono::Duration;

    fn public_read() -> Vec<Permission> {
        vec![Permission::new(
            Agent::group("public"),
            AccessMode::Read,
            ResourceId::from("r"),
        )]
    }

    #[test]
    fn test_active_embargo_wins_over_grants() {
        let now = Utc::now();
        let embargo = Embargo::new(now + Duration::days(5), Visibility::Restricted, Visibility::Open);
        let visibility = resolve_visibility(
            &VisibilityMap::default(),
            &public_read(),
            Some(&embargo),
            None,
            now,
        );
        assert_eq!(visibility, Visibility::Embargo);
    }

    #[test]
    fn test_embargo_wins_over_lease() {
        let now = Utc::now();
        let embargo = Embargo::new(now + Duration::days(5), Visibility::Restricted, Visibility::Open);
        let lease = Lease::new(now + Duration::days(5), Visibility::Restricted);
        let visibility = resolve_visibility(
            &VisibilityMap::default(),
            &public_read(),
            Some(&embargo),
            Some(&lease),
            now,
        );
        assert_eq!(visibility, Visibility::Embargo);
    }

    #[test]
    fn test_lapsed_lease_falls_back_to_grants() {
        let now = Utc::now();
        let lease = Lease::new(now - Duration::days(1), Visibility::Restricted);
        let visibility = resolve_visibility(
            &VisibilityMap::default(),
            &public_read(),
            None,
            Some(&lease),
            now,
        );
        assert_eq!(visibility, Visibility::Open);
    }
}
