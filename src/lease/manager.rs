use super::Lease;
use crate::error::{AccessError, AccessResult};
use crate::resource::{Resource, ResourceId};
use crate::store::AccessContext;
use crate::temporal::RestrictionState;
use crate::visibility::{Visibility, VisibilityReader, VisibilityWriter};
use crate::{log_lease_error, log_lease_info, log_lease_warn};
use once_cell::unsync::OnceCell;

/// Lifecycle operations for the lease attached to one resource.
///
/// Mirrors [`crate::embargo::EmbargoManager`]; the lease is memoised for the
/// life of the manager.
pub struct LeaseManager {
    resource: Resource,
    context: AccessContext,
    lease: OnceCell<Option<Lease>>,
}

impl LeaseManager {
    pub fn new(resource: Resource, context: AccessContext) -> Self {
        Self {
            resource,
            context,
            lease: OnceCell::new(),
        }
    }

    pub fn resource(&self) -> &Resource {
        &self.resource
    }

    pub fn into_resource(self) -> Resource {
        self.resource
    }

    pub fn lease(&self) -> AccessResult<Option<&Lease>> {
        let lease = self.lease.get_or_try_init(|| match &self.resource.lease_id {
            Some(id) => self.context.queries().find_lease(id).map(Some),
            None => Ok(None),
        })?;
        Ok(lease.as_ref())
    }

    pub fn under_lease(&self) -> AccessResult<bool> {
        let now = self.context.now();
        Ok(self.lease()?.map_or(false, |l| l.is_active(now)))
    }

    pub fn state(&self) -> AccessResult<RestrictionState> {
        let now = self.context.now();
        Ok(self.lease()?.map_or(RestrictionState::None, |l| l.state(now)))
    }

    /// Save the current grants as the lease's access. Returns whether the
    /// resource is under lease.
    pub fn apply(&self) -> AccessResult<bool> {
        if !self.under_lease()? {
            return Ok(false);
        }
        VisibilityWriter::new(&self.resource, &self.context)?
            .assign_access_for(Visibility::Lease)?;
        Ok(true)
    }

    /// Persist a new lease and attach it to the resource.
    pub fn attach(&mut self, lease: Lease) -> AccessResult<Lease> {
        lease.validate()?;
        let saved = self.context.persister().save_lease(&lease)?;
        let id = saved
            .id
            .clone()
            .ok_or_else(|| AccessError::persistence("Store returned a lease without an id"))?;
        let previous = self.resource.lease_id.replace(id);
        if let Err(e) = self.context.persister().save_resource(&self.resource) {
            self.resource.lease_id = previous;
            return Err(e);
        }

        log_lease_info!(
            "Attached lease until {} to {}",
            saved.lease_expiration_date.format("%Y-%m-%d"),
            self.resource.id
        );
        self.lease = OnceCell::new();
        Ok(saved)
    }

    /// End the lease regardless of its date: assign the post-lease
    /// visibility, mark the record expired, detach it.
    ///
    /// # Errors
    ///
    /// `ReleaseFailed` if any step fails; `lease_id` stays set.
    pub fn expire(&mut self) -> AccessResult<bool> {
        let mut lease = match self.lease()? {
            Some(lease) => lease.clone(),
            None => return Ok(false),
        };

        if let Err(e) = self.expire_record(&mut lease) {
            log_lease_error!("Expiring lease on {} failed: {}", self.resource.id, e);
            return Err(AccessError::release_failed(&self.resource.id, &e));
        }
        self.nullify()
            .map_err(|e| AccessError::release_failed(&self.resource.id, &e))?;

        log_lease_info!("Expired lease on {}", self.resource.id);
        Ok(true)
    }

    fn expire_record(&mut self, lease: &mut Lease) -> AccessResult<()> {
        if lease.is_released() {
            log_lease_warn!(
                "Lease on {} was already expired; detaching only",
                self.resource.id
            );
            return Ok(());
        }
        let during = VisibilityReader::new(&self.resource, &self.context).grant_visibility()?;
        VisibilityWriter::new(&self.resource, &self.context)?
            .assign_access_for(lease.visibility_after_lease)?;
        lease.deactivate(self.context.now(), during);
        let saved = self.context.persister().save_lease(lease)?;
        self.lease = OnceCell::with_value(Some(saved));
        Ok(())
    }

    /// Detach the lease without touching visibility. Idempotent.
    pub fn nullify(&mut self) -> AccessResult<Option<ResourceId>> {
        let detached = match self.resource.lease_id.take() {
            Some(id) => id,
            None => return Ok(None),
        };
        if let Err(e) = self.context.persister().save_resource(&self.resource) {
            self.resource.lease_id = Some(detached);
            return Err(e);
        }
        self.lease = OnceCell::with_value(None);
        Ok(Some(detached))
    }

    pub fn clone_lease(&self) -> AccessResult<Option<Lease>> {
        Ok(self.lease()?.map(Lease::duplicate))
    }
}
