use crate::error::AccessResult;
use crate::resource::AccessControl;
use crate::store::AccessContext;
use crate::log_services_info;

/// Makes a user the depositor of a work and its file sets.
///
/// The previous depositor is kept as the proxy depositor. With `reset` every
/// existing grant on the work and its file sets is dropped first.
pub struct ChangeDepositorService {
    context: AccessContext,
}

impl ChangeDepositorService {
    pub fn new(context: AccessContext) -> Self {
        Self { context }
    }

    pub fn call<R: AccessControl>(
        &self,
        work: &mut R,
        depositor: &str,
        reset: bool,
    ) -> AccessResult<()> {
        if reset {
            work.clear_permissions(&self.context)?;
        }
        let previous = work.depositor().map(str::to_string);
        work.set_proxy_depositor(previous.as_deref());
        self.apply_depositor(work, depositor)?;

        for mut file_set in work.child_file_sets(&self.context)? {
            if reset {
                file_set.clear_permissions(&self.context)?;
            }
            self.apply_depositor(&mut file_set, depositor)?;
            file_set.persist(&self.context)?;
        }
        work.persist(&self.context)?;

        log_services_info!(
            "Changed depositor of {} to {} (reset: {})",
            work.resource_id(),
            depositor,
            reset
        );
        Ok(())
    }

    fn apply_depositor<R: AccessControl>(&self, resource: &mut R, depositor: &str) -> AccessResult<()> {
        resource.set_depositor(depositor);
        resource.grant_edit(depositor, &self.context)
    }
}
