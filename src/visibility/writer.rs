use super::Visibility;
use crate::error::{AccessError, AccessResult};
use crate::permissions::PermissionManager;
use crate::resource::Resource;
use crate::store::AccessContext;
use crate::{log_visibility_debug, log_visibility_warn};

/// Rewrites the access control list of a managed resource to match a
/// requested visibility and saves it.
///
/// The writer never creates or removes embargo and lease records. Assigning
/// `Embargo` applies the attached embargo's "during" pattern; assigning
/// `Lease` keeps the current grants of a resource with an attached lease.
pub struct VisibilityWriter<'a> {
    resource: &'a Resource,
    context: &'a AccessContext,
    permissions: PermissionManager,
}

impl<'a> VisibilityWriter<'a> {
    pub fn new(resource: &'a Resource, context: &'a AccessContext) -> AccessResult<Self> {
        let permissions = PermissionManager::for_resource(&resource.id, context)?;
        Ok(Self::with_permission_manager(resource, context, permissions))
    }

    /// Writer over an already loaded permission manager
    pub fn with_permission_manager(
        resource: &'a Resource,
        context: &'a AccessContext,
        permissions: PermissionManager,
    ) -> Self {
        Self {
            resource,
            context,
            permissions,
        }
    }

    pub fn permission_manager(&self) -> &PermissionManager {
        &self.permissions
    }

    pub fn into_permission_manager(self) -> PermissionManager {
        self.permissions
    }

    /// Rewrite and save the grants for `visibility`.
    ///
    /// # Errors
    ///
    /// * `InvalidTransition` when `Embargo`/`Lease` is requested with no
    ///   embargo/lease attached
    /// * `Persistence` when the store rejects the ACL; the writer's in-memory
    ///   list is left unchanged
    pub fn assign_access_for(&mut self, visibility: Visibility) -> AccessResult<()> {
        let pattern = self.grant_pattern_for(visibility)?;

        let mut staged = self.permissions.clone();
        if let Some(pattern) = pattern {
            self.context
                .visibility_map()
                .apply_to_acl(staged.acl_mut(), pattern)?;
        }
        staged.acl_mut().save().map_err(|e| {
            log_visibility_warn!(
                "Could not assign '{}' to {}: {}",
                visibility,
                self.resource.id,
                e
            );
            e
        })?;

        log_visibility_debug!("Assigned '{}' to {}", visibility, self.resource.id);
        self.permissions = staged;
        Ok(())
    }

    /// The grant pattern a visibility stands for; `None` keeps current grants.
    fn grant_pattern_for(&self, visibility: Visibility) -> AccessResult<Option<Visibility>> {
        match visibility {
            Visibility::Embargo => {
                let id = self.resource.embargo_id.as_ref().ok_or_else(|| {
                    AccessError::invalid_transition(format!(
                        "Cannot assign embargo visibility to {} without an embargo",
                        self.resource.id
                    ))
                })?;
                let embargo = self.context.queries().find_embargo(id)?;
                Ok(Some(embargo.visibility_during_embargo))
            }
            Visibility::Lease => {
                let id = self.resource.lease_id.as_ref().ok_or_else(|| {
                    AccessError::invalid_transition(format!(
                        "Cannot assign lease visibility to {} without a lease",
                        self.resource.id
                    ))
                })?;
                self.context.queries().find_lease(id)?;
                Ok(None)
            }
            grants => Ok(Some(grants)),
        }
    }
}
