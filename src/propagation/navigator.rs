use crate::error::AccessResult;
use crate::resource::{LegacyResource, Resource, ResourceId};
use crate::store::AccessContext;

/// Finds the file sets that belong to a work, in member order.
pub struct ChildFileSetsNavigator<'a> {
    context: &'a AccessContext,
}

impl<'a> ChildFileSetsNavigator<'a> {
    pub fn new(context: &'a AccessContext) -> Self {
        Self { context }
    }

    pub fn find_child_file_sets(&self, resource: &Resource) -> AccessResult<Vec<Resource>> {
        Ok(self
            .context
            .queries()
            .find_members(resource)?
            .into_iter()
            .filter(Resource::is_file_set)
            .collect())
    }

    pub fn find_child_file_set_ids(&self, resource: &Resource) -> AccessResult<Vec<ResourceId>> {
        Ok(self
            .find_child_file_sets(resource)?
            .into_iter()
            .map(|child| child.id)
            .collect())
    }

    pub fn find_legacy_child_file_sets(
        &self,
        resource: &LegacyResource,
    ) -> AccessResult<Vec<LegacyResource>> {
        Ok(self
            .context
            .queries()
            .find_legacy_members(resource)?
            .into_iter()
            .filter(LegacyResource::is_file_set)
            .collect())
    }
}
