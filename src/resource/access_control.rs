use super::{LegacyResource, Resource, ResourceId};
use crate::embargo::EmbargoManager;
use crate::error::{AccessError, AccessResult};
use crate::lease::LeaseManager;
use crate::permissions::{AccessMode, Agent, PermissionManager};
use crate::propagation::ChildFileSetsNavigator;
use crate::store::AccessContext;
use crate::temporal::ReleasePolicy;
use crate::visibility::{Visibility, VisibilityReader, VisibilityWriter};
use std::collections::BTreeSet;

/// Access operations shared by managed and legacy resources.
///
/// Permission changes are durable when the call returns. Depositor changes
/// stay in memory until [`AccessControl::persist`].
pub trait AccessControl {
    fn resource_id(&self) -> &ResourceId;

    fn visibility(&self, context: &AccessContext) -> AccessResult<Visibility>;

    fn set_visibility(&mut self, visibility: Visibility, context: &AccessContext)
        -> AccessResult<()>;

    /// Drop every grant on the resource
    fn clear_permissions(&mut self, context: &AccessContext) -> AccessResult<()>;

    fn grant_edit(&mut self, user: &str, context: &AccessContext) -> AccessResult<()>;

    fn depositor(&self) -> Option<&str>;

    fn set_depositor(&mut self, depositor: &str);

    fn set_proxy_depositor(&mut self, proxy: Option<&str>);

    /// Release the embargo if `policy` allows it. Returns whether it did.
    fn release_embargo(
        &mut self,
        policy: ReleasePolicy,
        context: &AccessContext,
    ) -> AccessResult<bool>;

    /// Expire the lease if `policy` allows it. Returns whether it did.
    fn release_lease(&mut self, policy: ReleasePolicy, context: &AccessContext)
        -> AccessResult<bool>;

    fn child_file_sets(&self, context: &AccessContext) -> AccessResult<Vec<Self>>
    where
        Self: Sized;

    fn persist(&mut self, context: &AccessContext) -> AccessResult<()>;
}

impl AccessControl for Resource {
    fn resource_id(&self) -> &ResourceId {
        &self.id
    }

    fn visibility(&self, context: &AccessContext) -> AccessResult<Visibility> {
        VisibilityReader::new(self, context).read()
    }

    fn set_visibility(
        &mut self,
        visibility: Visibility,
        context: &AccessContext,
    ) -> AccessResult<()> {
        VisibilityWriter::new(self, context)?.assign_access_for(visibility)
    }

    fn clear_permissions(&mut self, context: &AccessContext) -> AccessResult<()> {
        let mut permissions = PermissionManager::for_resource(&self.id, context)?;
        permissions.acl_mut().set_permissions(BTreeSet::new()).save()
    }

    fn grant_edit(&mut self, user: &str, context: &AccessContext) -> AccessResult<()> {
        let mut permissions = PermissionManager::for_resource(&self.id, context)?;
        permissions
            .acl_mut()
            .grant(AccessMode::Edit)
            .to(Agent::user(user))
            .save()
    }

    fn depositor(&self) -> Option<&str> {
        Resource::depositor(self)
    }

    fn set_depositor(&mut self, depositor: &str) {
        Resource::set_depositor(self, depositor)
    }

    fn set_proxy_depositor(&mut self, proxy: Option<&str>) {
        Resource::set_proxy_depositor(self, proxy)
    }

    fn release_embargo(
        &mut self,
        policy: ReleasePolicy,
        context: &AccessContext,
    ) -> AccessResult<bool> {
        let mut manager = EmbargoManager::new(self.clone(), context.clone());
        let released = if policy.allows(manager.state()?) {
            manager.release()
        } else {
            Ok(false)
        };
        *self = manager.into_resource();
        released
    }

    fn release_lease(
        &mut self,
        policy: ReleasePolicy,
        context: &AccessContext,
    ) -> AccessResult<bool> {
        let mut manager = LeaseManager::new(self.clone(), context.clone());
        let released = if policy.allows(manager.state()?) {
            manager.expire()
        } else {
            Ok(false)
        };
        *self = manager.into_resource();
        released
    }

    fn child_file_sets(&self, context: &AccessContext) -> AccessResult<Vec<Self>> {
        ChildFileSetsNavigator::new(context).find_child_file_sets(self)
    }

    fn persist(&mut self, context: &AccessContext) -> AccessResult<()> {
        *self = context.persister().save_resource(self)?;
        Ok(())
    }
}

impl LegacyResource {
    /// Apply `change` to a copy, persist the copy, and keep it only if the
    /// save succeeded.
    fn save_with<T, F>(&mut self, context: &AccessContext, change: F) -> AccessResult<T>
    where
        F: FnOnce(&mut LegacyResource) -> AccessResult<T>,
    {
        let mut staged = self.clone();
        let outcome = change(&mut staged)?;
        *self = context.persister().save_legacy(&staged)?;
        Ok(outcome)
    }
}

impl AccessControl for LegacyResource {
    fn resource_id(&self) -> &ResourceId {
        &self.id
    }

    fn visibility(&self, context: &AccessContext) -> AccessResult<Visibility> {
        Ok(self.visibility_at(context.visibility_map(), context.now()))
    }

    fn set_visibility(
        &mut self,
        visibility: Visibility,
        context: &AccessContext,
    ) -> AccessResult<()> {
        self.save_with(context, |staged| {
            staged.apply_visibility(context.visibility_map(), visibility)
        })
    }

    fn clear_permissions(&mut self, context: &AccessContext) -> AccessResult<()> {
        self.save_with(context, |staged| {
            staged.permissions.clear();
            Ok(())
        })
    }

    fn grant_edit(&mut self, user: &str, context: &AccessContext) -> AccessResult<()> {
        self.save_with(context, |staged| {
            staged.grant(AccessMode::Edit, Agent::user(user));
            Ok(())
        })
    }

    fn depositor(&self) -> Option<&str> {
        LegacyResource::depositor(self)
    }

    fn set_depositor(&mut self, depositor: &str) {
        LegacyResource::set_depositor(self, depositor)
    }

    fn set_proxy_depositor(&mut self, proxy: Option<&str>) {
        LegacyResource::set_proxy_depositor(self, proxy)
    }

    fn release_embargo(
        &mut self,
        policy: ReleasePolicy,
        context: &AccessContext,
    ) -> AccessResult<bool> {
        let now = context.now();
        if !policy.allows(self.embargo_state(now)) {
            return Ok(false);
        }
        let id = self.id.clone();
        self.save_with(context, |staged| {
            staged.deactivate_embargo(context.visibility_map(), now)
        })
        .map_err(|e| AccessError::release_failed(&id, &e))
    }

    fn release_lease(
        &mut self,
        policy: ReleasePolicy,
        context: &AccessContext,
    ) -> AccessResult<bool> {
        let now = context.now();
        if !policy.allows(self.lease_state(now)) {
            return Ok(false);
        }
        let id = self.id.clone();
        self.save_with(context, |staged| {
            staged.deactivate_lease(context.visibility_map(), now)
        })
        .map_err(|e| AccessError::release_failed(&id, &e))
    }

    fn child_file_sets(&self, context: &AccessContext) -> AccessResult<Vec<Self>> {
        ChildFileSetsNavigator::new(context).find_legacy_child_file_sets(self)
    }

    fn persist(&mut self, context: &AccessContext) -> AccessResult<()> {
        *self = context.persister().save_legacy(self)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embargo::Embargo;
    use crate::store::{FixedClock, MemoryStore};
    use chrono::{Duration, TimeZone, Utc};
    use std::sync::Arc;

    fn context() -> AccessContext {
        let now = Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap();
        AccessContext::with_store(Arc::new(MemoryStore::new()))
            .with_clock(Arc::new(FixedClock(now)))
    }

    fn set_and_read<R: AccessControl>(resource: &mut R, context: &AccessContext) {
        for visibility in [
            Visibility::Open,
            Visibility::Authenticated,
            Visibility::Restricted,
        ] {
            resource.set_visibility(visibility, context).unwrap();
            assert_eq!(resource.visibility(context).unwrap(), visibility);
        }
    }

    #[test]
    fn test_both_kinds_round_trip_visibility() {
        let ctx = context();
        set_and_read(&mut Resource::work(), &ctx);
        set_and_read(&mut LegacyResource::work(), &ctx);
    }

    #[test]
    fn test_policy_keeps_active_embargo() {
        let ctx = context();
        let mut manager = EmbargoManager::new(Resource::work(), ctx.clone());
        manager
            .attach(Embargo::new(
                ctx.now() + Duration::days(3),
                Visibility::Restricted,
                Visibility::Open,
            ))
            .unwrap();
        let mut work = manager.into_resource();

        assert!(!work
            .release_embargo(ReleasePolicy::OnlyIfLapsed, &ctx)
            .unwrap());
        assert!(work.embargo_id.is_some());
        assert!(work.release_embargo(ReleasePolicy::Always, &ctx).unwrap());
        assert!(work.embargo_id.is_none());
    }

    #[test]
    fn test_legacy_release_persists_record() {
        let ctx = context();
        let mut work = LegacyResource::work();
        work.embargo = Some(Embargo::new(
            ctx.now() - Duration::days(1),
            Visibility::Restricted,
            Visibility::Authenticated,
        ));
        work.persist(&ctx).unwrap();

        assert!(work.release_embargo(ReleasePolicy::OnlyIfLapsed, &ctx).unwrap());
        let stored = ctx.queries().find_legacy(&work.id).unwrap();
        assert!(stored.embargo.as_ref().unwrap().is_released());
        assert_eq!(
            AccessControl::visibility(&stored, &ctx).unwrap(),
            Visibility::Authenticated
        );
    }
}
