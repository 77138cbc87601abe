use super::{ReleasePolicy, ReleaseService};
use crate::config::AccessConfig;
use crate::embargo::{Embargo, EmbargoManager};
use crate::error::AccessResult;
use crate::lease::{Lease, LeaseManager};
use crate::permissions::{AccessControlList, AccessMode, Agent};
use crate::propagation::{PropagationReport, VisibilityPropagator};
use crate::resource::{Resource, ResourceId};
use crate::store::AccessContext;
use crate::visibility::{Visibility, VisibilityReader, VisibilityWriter};
use crate::{log_services_info, log_services_warn};

/// In-process entry point keyed by resource id.
///
/// Each call loads what it needs through the query service, performs one
/// transition and returns. Nothing is cached between calls.
#[derive(Clone)]
pub struct AccessService {
    context: AccessContext,
}

impl AccessService {
    pub fn new(context: AccessContext) -> Self {
        Self { context }
    }

    pub fn from_config(config: &AccessConfig) -> AccessResult<Self> {
        Ok(Self::new(AccessContext::from_config(config)?))
    }

    pub fn context(&self) -> &AccessContext {
        &self.context
    }

    fn resource(&self, id: &ResourceId) -> AccessResult<Resource> {
        self.context.queries().find_resource(id)
    }

    pub fn grant_access(&self, id: &ResourceId, agent: Agent, mode: AccessMode) -> AccessResult<()> {
        AccessControlList::load(id, &self.context)?
            .grant(mode)
            .to(agent)
            .save()
    }

    pub fn revoke_access(&self, id: &ResourceId, agent: Agent, mode: AccessMode) -> AccessResult<()> {
        AccessControlList::load(id, &self.context)?
            .revoke(mode)
            .from(agent)
            .save()
    }

    pub fn set_visibility(&self, id: &ResourceId, visibility: Visibility) -> AccessResult<()> {
        let resource = self.resource(id)?;
        VisibilityWriter::new(&resource, &self.context)?.assign_access_for(visibility)?;
        log_services_info!("Set visibility of {} to {}", id, visibility);
        Ok(())
    }

    pub fn visibility_of(&self, id: &ResourceId) -> AccessResult<Visibility> {
        let resource = self.resource(id)?;
        VisibilityReader::new(&resource, &self.context).read()
    }

    /// Attach a new embargo and apply its "during" grants when it is active.
    pub fn attach_embargo(&self, id: &ResourceId, embargo: Embargo) -> AccessResult<Embargo> {
        let mut manager = EmbargoManager::new(self.resource(id)?, self.context.clone());
        let saved = manager.attach(embargo)?;
        manager.apply()?;
        Ok(saved)
    }

    pub fn attach_lease(&self, id: &ResourceId, lease: Lease) -> AccessResult<Lease> {
        let mut manager = LeaseManager::new(self.resource(id)?, self.context.clone());
        let saved = manager.attach(lease)?;
        manager.apply()?;
        Ok(saved)
    }

    pub fn release_embargo(&self, id: &ResourceId, policy: ReleasePolicy) -> AccessResult<bool> {
        let mut resource = self.resource(id)?;
        ReleaseService::new(self.context.clone()).destroy_embargo(&mut resource, policy)
    }

    pub fn expire_lease(&self, id: &ResourceId, policy: ReleasePolicy) -> AccessResult<bool> {
        let mut resource = self.resource(id)?;
        ReleaseService::new(self.context.clone()).destroy_lease(&mut resource, policy)
    }

    pub fn propagate_visibility(&self, id: &ResourceId) -> AccessResult<PropagationReport> {
        let resource = self.resource(id)?;
        VisibilityPropagator::new(&resource, &self.context).propagate()
    }

    /// Detach and delete the embargo without changing visibility.
    pub fn delete_embargo(&self, id: &ResourceId) -> AccessResult<bool> {
        let mut manager = EmbargoManager::new(self.resource(id)?, self.context.clone());
        match manager.nullify()? {
            Some(embargo_id) => self.context.persister().delete_embargo(&embargo_id),
            None => {
                log_services_warn!("No embargo to delete on {}", id);
                Ok(false)
            }
        }
    }

    /// Detach and delete the lease without changing visibility.
    pub fn delete_lease(&self, id: &ResourceId) -> AccessResult<bool> {
        let mut manager = LeaseManager::new(self.resource(id)?, self.context.clone());
        match manager.nullify()? {
            Some(lease_id) => self.context.persister().delete_lease(&lease_id),
            None => {
                log_services_warn!("No lease to delete on {}", id);
                Ok(false)
            }
        }
    }
}
