use super::ChildFileSetsNavigator;
use crate::embargo::{Embargo, EmbargoManager};
use crate::error::{AccessError, AccessResult};
use crate::lease::{Lease, LeaseManager};
use crate::resource::{Resource, ResourceId};
use crate::store::AccessContext;
use crate::visibility::{Visibility, VisibilityReader, VisibilityWriter};
use crate::{log_propagation_debug, log_propagation_error, log_propagation_info};

/// Children updated by a completed propagation, in the order they were
/// written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropagationReport {
    pub updated: Vec<ResourceId>,
}

impl PropagationReport {
    pub fn len(&self) -> usize {
        self.updated.len()
    }

    pub fn is_empty(&self) -> bool {
        self.updated.is_empty()
    }
}

/// What each child receives, decided once from the source.
enum Plan {
    Embargo(Embargo),
    Lease(Lease, Visibility),
    Grants(Visibility),
}

/// Pushes the visibility of a work onto each of its child file sets.
///
/// An active embargo or lease on the source is copied as a fresh record per
/// child; otherwise the source's visibility is assigned. Children are
/// updated one at a time and the run stops at the first failure, leaving
/// earlier children updated.
pub struct VisibilityPropagator<'a> {
    source: &'a Resource,
    context: &'a AccessContext,
}

impl<'a> VisibilityPropagator<'a> {
    pub fn new(source: &'a Resource, context: &'a AccessContext) -> Self {
        Self { source, context }
    }

    /// # Errors
    ///
    /// `PropagationHalted` carrying the number of children already updated
    /// and the error from the failing child.
    pub fn propagate(&self) -> AccessResult<PropagationReport> {
        let plan = self.plan()?;
        let children = ChildFileSetsNavigator::new(self.context).find_child_file_sets(self.source)?;
        log_propagation_debug!(
            "Propagating from {} to {} file sets",
            self.source.id,
            children.len()
        );

        let mut report = PropagationReport::default();
        for child in children {
            let child_id = child.id.clone();
            if let Err(e) = self.update_child(child, &plan) {
                log_propagation_error!(
                    "Propagation from {} halted at {}: {}",
                    self.source.id,
                    child_id,
                    e
                );
                return Err(AccessError::PropagationHalted {
                    completed: report.len(),
                    source: Box::new(e),
                });
            }
            report.updated.push(child_id);
        }

        log_propagation_info!(
            "Propagated access from {} to {} file sets",
            self.source.id,
            report.len()
        );
        Ok(report)
    }

    fn plan(&self) -> AccessResult<Plan> {
        let embargo = EmbargoManager::new(self.source.clone(), self.context.clone());
        if embargo.under_embargo()? {
            if let Some(copy) = embargo.clone_embargo()? {
                return Ok(Plan::Embargo(copy));
            }
        }
        let lease = LeaseManager::new(self.source.clone(), self.context.clone());
        let reader = VisibilityReader::new(self.source, self.context);
        if lease.under_lease()? {
            if let Some(copy) = lease.clone_lease()? {
                return Ok(Plan::Lease(copy, reader.grant_visibility()?));
            }
        }
        Ok(Plan::Grants(reader.grant_visibility()?))
    }

    fn update_child(&self, child: Resource, plan: &Plan) -> AccessResult<()> {
        let child = match plan {
            Plan::Embargo(embargo) => {
                let mut manager = EmbargoManager::new(child, self.context.clone());
                let held = manager.embargo()?.map_or(false, |e| e.same_terms(embargo));
                if !held {
                    let replaced = manager.resource().embargo_id.clone();
                    manager.attach(embargo.clone())?;
                    if let Some(id) = replaced {
                        self.context.persister().delete_embargo(&id)?;
                    }
                }
                manager.apply()?;
                manager.into_resource()
            }
            Plan::Lease(lease, grants) => {
                let child = self.detach_embargo(child)?;
                let mut manager = LeaseManager::new(child, self.context.clone());
                let held = manager.lease()?.map_or(false, |l| l.same_terms(lease));
                if !held {
                    let replaced = manager.resource().lease_id.clone();
                    manager.attach(lease.clone())?;
                    if let Some(id) = replaced {
                        self.context.persister().delete_lease(&id)?;
                    }
                }
                let child = manager.into_resource();
                VisibilityWriter::new(&child, self.context)?.assign_access_for(*grants)?;
                child
            }
            Plan::Grants(visibility) => {
                let child = self.detach_embargo(child)?;
                let child = self.detach_lease(child)?;
                VisibilityWriter::new(&child, self.context)?.assign_access_for(*visibility)?;
                child
            }
        };
        self.context.persister().save_resource(&child)?;
        Ok(())
    }

    /// A child must not keep a restriction its source no longer has
    fn detach_embargo(&self, child: Resource) -> AccessResult<Resource> {
        let mut manager = EmbargoManager::new(child, self.context.clone());
        if let Some(id) = manager.nullify()? {
            log_propagation_debug!("Detached embargo {} from {}", id, manager.resource().id);
        }
        Ok(manager.into_resource())
    }

    fn detach_lease(&self, child: Resource) -> AccessResult<Resource> {
        let mut manager = LeaseManager::new(child, self.context.clone());
        if let Some(id) = manager.nullify()? {
            log_propagation_debug!("Detached lease {} from {}", id, manager.resource().id);
        }
        Ok(manager.into_resource())
    }
}
