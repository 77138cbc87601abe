use super::ReleasePolicy;
use crate::error::AccessResult;
use crate::resource::AccessControl;
use crate::store::AccessContext;
use crate::log_services_info;

/// Tears down an embargo or lease on either kind of resource.
///
/// Managed resources have their post-release visibility saved and the
/// reference cleared. Legacy resources have the record deactivated in place
/// and the whole resource saved.
pub struct ReleaseService {
    context: AccessContext,
}

impl ReleaseService {
    pub fn new(context: AccessContext) -> Self {
        Self { context }
    }

    pub fn destroy_embargo<R: AccessControl>(
        &self,
        resource: &mut R,
        policy: ReleasePolicy,
    ) -> AccessResult<bool> {
        let released = resource.release_embargo(policy, &self.context)?;
        if released {
            log_services_info!("Destroyed embargo on {}", resource.resource_id());
        }
        Ok(released)
    }

    pub fn destroy_lease<R: AccessControl>(
        &self,
        resource: &mut R,
        policy: ReleasePolicy,
    ) -> AccessResult<bool> {
        let released = resource.release_lease(policy, &self.context)?;
        if released {
            log_services_info!("Destroyed lease on {}", resource.resource_id());
        }
        Ok(released)
    }
}
