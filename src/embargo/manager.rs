use super::Embargo;
use crate::error::{AccessError, AccessResult};
use crate::resource::{Resource, ResourceId};
use crate::store::AccessContext;
use crate::temporal::RestrictionState;
use crate::visibility::{Visibility, VisibilityWriter};
use crate::{log_embargo_error, log_embargo_info, log_embargo_warn};
use once_cell::unsync::OnceCell;

/// Lifecycle operations for the embargo attached to one resource.
///
/// The embargo record is looked up on first use and memoised for the life
/// of the manager, so a manager should be scoped to a single operation.
///
/// # Examples
///
/// ```no_run
/// use access_lifecycle::embargo::EmbargoManager;
/// use access_lifecycle::resource::Resource;
/// use access_lifecycle::store::{AccessContext, MemoryStore};
/// use std::sync::Arc;
///
/// let context = AccessContext::with_store(Arc::new(MemoryStore::new()));
/// let mut manager = EmbargoManager::new(Resource::work(), context);
/// if manager.release()? {
///     println!("released");
/// }
/// # Ok::<(), access_lifecycle::error::AccessError>(())
/// ```
pub struct EmbargoManager {
    resource: Resource,
    context: AccessContext,
    embargo: OnceCell<Option<Embargo>>,
}

impl EmbargoManager {
    pub fn new(resource: Resource, context: AccessContext) -> Self {
        Self {
            resource,
            context,
            embargo: OnceCell::new(),
        }
    }

    pub fn resource(&self) -> &Resource {
        &self.resource
    }

    pub fn into_resource(self) -> Resource {
        self.resource
    }

    /// The attached embargo record, if any
    pub fn embargo(&self) -> AccessResult<Option<&Embargo>> {
        let embargo = self.embargo.get_or_try_init(|| match &self.resource.embargo_id {
            Some(id) => self.context.queries().find_embargo(id).map(Some),
            None => Ok(None),
        })?;
        Ok(embargo.as_ref())
    }

    pub fn under_embargo(&self) -> AccessResult<bool> {
        let now = self.context.now();
        Ok(self.embargo()?.map_or(false, |e| e.is_active(now)))
    }

    pub fn state(&self) -> AccessResult<RestrictionState> {
        let now = self.context.now();
        Ok(self
            .embargo()?
            .map_or(RestrictionState::None, |e| e.state(now)))
    }

    /// Assign the embargo's "during" grants when the resource is under embargo.
    /// Returns whether anything was applied.
    pub fn apply(&self) -> AccessResult<bool> {
        if !self.under_embargo()? {
            return Ok(false);
        }
        VisibilityWriter::new(&self.resource, &self.context)?
            .assign_access_for(Visibility::Embargo)?;
        Ok(true)
    }

    /// Shorthand for `EmbargoManager::new(..).apply()`
    pub fn apply_embargo_for(resource: &Resource, context: &AccessContext) -> AccessResult<bool> {
        EmbargoManager::new(resource.clone(), context.clone()).apply()
    }

    /// Persist a new embargo and attach it to the resource.
    pub fn attach(&mut self, embargo: Embargo) -> AccessResult<Embargo> {
        embargo.validate()?;
        let saved = self.context.persister().save_embargo(&embargo)?;
        let previous = self.resource.embargo_id.replace(require_id(&saved)?);
        if let Err(e) = self.context.persister().save_resource(&self.resource) {
            self.resource.embargo_id = previous;
            return Err(e);
        }

        log_embargo_info!(
            "Attached embargo until {} to {}",
            saved.embargo_release_date.format("%Y-%m-%d"),
            self.resource.id
        );
        self.embargo = OnceCell::new();
        Ok(saved)
    }

    /// Lift the embargo regardless of its date.
    ///
    /// Assigns the post-embargo visibility, marks the record released, then
    /// detaches it from the resource. Returns `Ok(false)` when no embargo is
    /// attached.
    ///
    /// # Errors
    ///
    /// `ReleaseFailed` if any step fails. The resource keeps its `embargo_id`
    /// in every failure case.
    pub fn release(&mut self) -> AccessResult<bool> {
        let mut embargo = match self.embargo()? {
            Some(embargo) => embargo.clone(),
            None => return Ok(false),
        };

        if let Err(e) = self.release_record(&mut embargo) {
            log_embargo_error!("Releasing embargo on {} failed: {}", self.resource.id, e);
            return Err(AccessError::release_failed(&self.resource.id, &e));
        }
        self.nullify()
            .map_err(|e| AccessError::release_failed(&self.resource.id, &e))?;

        log_embargo_info!("Released embargo on {}", self.resource.id);
        Ok(true)
    }

    fn release_record(&mut self, embargo: &mut Embargo) -> AccessResult<()> {
        if embargo.is_released() {
            log_embargo_warn!(
                "Embargo on {} was already released; detaching only",
                self.resource.id
            );
            return Ok(());
        }
        VisibilityWriter::new(&self.resource, &self.context)?
            .assign_access_for(embargo.visibility_after_embargo)?;
        embargo.deactivate(self.context.now());
        let saved = self.context.persister().save_embargo(embargo)?;
        self.embargo = OnceCell::with_value(Some(saved));
        Ok(())
    }

    /// Detach the embargo without touching visibility. Idempotent.
    /// Returns the id of the detached record.
    pub fn nullify(&mut self) -> AccessResult<Option<ResourceId>> {
        let detached = match self.resource.embargo_id.take() {
            Some(id) => id,
            None => return Ok(None),
        };
        if let Err(e) = self.context.persister().save_resource(&self.resource) {
            self.resource.embargo_id = Some(detached);
            return Err(e);
        }
        self.embargo = OnceCell::with_value(None);
        Ok(Some(detached))
    }

    /// Unsaved copy of the attached embargo, for attaching elsewhere.
    pub fn clone_embargo(&self) -> AccessResult<Option<Embargo>> {
        Ok(self.embargo()?.map(Embargo::duplicate))
    }
}

fn require_id(embargo: &Embargo) -> AccessResult<ResourceId> {
    embargo
        .id
        .clone()
        .ok_or_else(|| AccessError::persistence("Store returned an embargo without an id"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permissions::PermissionManager;
    use crate::store::{FixedClock, MemoryStore};
    use crate::visibility::VisibilityReader;
    use chrono::{Duration, TimeZone, Utc};
    use std::sync::Arc;

    fn context() -> AccessContext {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        AccessContext::with_store(Arc::new(MemoryStore::new()))
            .with_clock(Arc::new(FixedClock(now)))
    }

    fn embargoed(context: &AccessContext, days: i64) -> Resource {
        let mut manager = EmbargoManager::new(Resource::work(), context.clone());
        manager
            .attach(Embargo::new(
                context.now() + Duration::days(days),
                Visibility::Restricted,
                Visibility::Open,
            ))
            .unwrap();
        manager.apply().unwrap();
        manager.into_resource()
    }

    #[test]
    fn test_no_embargo() {
        let ctx = context();
        let mut manager = EmbargoManager::new(Resource::work(), ctx);
        assert!(!manager.under_embargo().unwrap());
        assert_eq!(manager.state().unwrap(), RestrictionState::None);
        assert!(!manager.release().unwrap());
        assert_eq!(manager.nullify().unwrap(), None);
        assert!(manager.clone_embargo().unwrap().is_none());
    }

    #[test]
    fn test_release_active_embargo() {
        let ctx = context();
        let work = embargoed(&ctx, 10);
        let embargo_id = work.embargo_id.clone().unwrap();
        assert_eq!(
            VisibilityReader::new(&work, &ctx).read().unwrap(),
            Visibility::Embargo
        );

        let mut manager = EmbargoManager::new(work, ctx.clone());
        assert!(manager.release().unwrap());
        let work = manager.into_resource();

        assert!(work.embargo_id.is_none());
        assert_eq!(ctx.queries().find_resource(&work.id).unwrap().embargo_id, None);
        assert_eq!(
            VisibilityReader::new(&work, &ctx).read().unwrap(),
            Visibility::Open
        );
        let record = ctx.queries().find_embargo(&embargo_id).unwrap();
        assert!(record.is_released());
        assert_eq!(record.embargo_history.len(), 1);
    }

    #[test]
    fn test_lapsed_embargo_is_not_under_embargo() {
        let ctx = context();
        let work = embargoed(&ctx, -1);
        let manager = EmbargoManager::new(work, ctx);
        assert!(!manager.under_embargo().unwrap());
        assert_eq!(manager.state().unwrap(), RestrictionState::Lapsed);
    }

    #[test]
    fn test_nullify_keeps_grants() {
        let ctx = context();
        let work = embargoed(&ctx, 10);
        let mut manager = EmbargoManager::new(work, ctx.clone());
        assert!(manager.nullify().unwrap().is_some());
        assert_eq!(manager.nullify().unwrap(), None);

        let work = manager.into_resource();
        let permissions = PermissionManager::for_resource(&work.id, &ctx).unwrap();
        assert!(permissions.read_groups().is_empty());
        assert_eq!(
            VisibilityReader::new(&work, &ctx).read().unwrap(),
            Visibility::Restricted
        );
    }

    #[test]
    fn test_clone_is_unsaved_copy() {
        let ctx = context();
        let work = embargoed(&ctx, 10);
        let manager = EmbargoManager::new(work, ctx);
        let copy = manager.clone_embargo().unwrap().unwrap();
        assert!(copy.id.is_none());
        assert_eq!(copy.visibility_after_embargo, Visibility::Open);
    }

    #[test]
    fn test_attach_rejects_temporal_visibility() {
        let ctx = context();
        let mut manager = EmbargoManager::new(Resource::work(), ctx.clone());
        let err = manager
            .attach(Embargo::new(ctx.now(), Visibility::Embargo, Visibility::Open))
            .unwrap_err();
        assert!(matches!(err, AccessError::InvalidTransition(_)));
        assert!(manager.resource().embargo_id.is_none());
    }
}
