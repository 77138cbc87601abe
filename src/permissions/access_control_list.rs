use crate::error::{AccessError, AccessResult};
use crate::permissions::types::{AccessControlRecord, AccessMode, Agent, AgentKind, Permission};
use crate::resource::ResourceId;
use crate::store::AccessContext;
use crate::{log_acl_debug, log_acl_error};
use std::collections::BTreeSet;
use std::fmt;

/// In-memory access control list for one resource.
///
/// The list is detached from its resource: it is loaded and saved on its own,
/// correlated only through `access_to`. Grants and revokes are staged in
/// memory and recorded as pending changes until [`AccessControlList::save`]
/// writes the whole permission set.
///
/// ```rust,no_run
/// # use access_lifecycle::permissions::{AccessControlList, AccessMode, Agent};
/// # use access_lifecycle::store::{AccessContext, MemoryStore};
/// # use std::sync::Arc;
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let ctx = AccessContext::with_store(Arc::new(MemoryStore::new()));
/// let mut acl = AccessControlList::load(&"work-1".into(), &ctx)?;
/// acl.grant(AccessMode::Edit).to(Agent::user("alice")).save()?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct AccessControlList {
    access_to: ResourceId,
    permissions: BTreeSet<Permission>,
    pending_additions: BTreeSet<Permission>,
    pending_deletions: BTreeSet<Permission>,
    context: AccessContext,
}

impl fmt::Debug for AccessControlList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessControlList")
            .field("access_to", &self.access_to)
            .field("permissions", &self.permissions)
            .field("pending_additions", &self.pending_additions)
            .field("pending_deletions", &self.pending_deletions)
            .finish()
    }
}

/// Pending grant of one access mode; completed with [`Grant::to`].
pub struct Grant<'a> {
    acl: &'a mut AccessControlList,
    mode: AccessMode,
}

impl<'a> Grant<'a> {
    pub fn to(self, agent: Agent) -> &'a mut AccessControlList {
        let permission = Permission::new(agent, self.mode, self.acl.access_to.clone());
        self.acl.add(permission);
        self.acl
    }
}

/// Pending revoke of one access mode; completed with [`Revoke::from`].
pub struct Revoke<'a> {
    acl: &'a mut AccessControlList,
    mode: AccessMode,
}

impl<'a> Revoke<'a> {
    pub fn from(self, agent: Agent) -> &'a mut AccessControlList {
        let permission = Permission::new(agent, self.mode, self.acl.access_to.clone());
        self.acl.remove(&permission);
        self.acl
    }
}

impl AccessControlList {
    /// An empty list for `access_to` with nothing persisted yet
    pub fn new(access_to: ResourceId, context: &AccessContext) -> Self {
        Self {
            access_to,
            permissions: BTreeSet::new(),
            pending_additions: BTreeSet::new(),
            pending_deletions: BTreeSet::new(),
            context: context.clone(),
        }
    }

    /// Load the persisted list for `access_to`; a resource without one gets an
    /// empty list.
    pub fn load(access_to: &ResourceId, context: &AccessContext) -> AccessResult<Self> {
        let mut acl = Self::new(access_to.clone(), context);
        if let Some(record) = context.queries().find_access_control(access_to)? {
            acl.permissions = record.permissions;
        }
        log_acl_debug!(
            "Loaded ACL for {} with {} permissions",
            access_to,
            acl.permissions.len()
        );
        Ok(acl)
    }

    pub fn access_to(&self) -> &ResourceId {
        &self.access_to
    }

    pub fn permissions(&self) -> &BTreeSet<Permission> {
        &self.permissions
    }

    /// Replace every permission at once. Used by reset flows that must clear
    /// existing grants before applying new ones.
    pub fn set_permissions(&mut self, permissions: BTreeSet<Permission>) -> &mut Self {
        let removed: Vec<Permission> = self.permissions.difference(&permissions).cloned().collect();
        let added: Vec<Permission> = permissions.difference(&self.permissions).cloned().collect();
        for permission in removed {
            self.remove(&permission);
        }
        for permission in added {
            self.add(permission);
        }
        self
    }

    pub fn grant(&mut self, mode: AccessMode) -> Grant<'_> {
        Grant { acl: self, mode }
    }

    pub fn revoke(&mut self, mode: AccessMode) -> Revoke<'_> {
        Revoke { acl: self, mode }
    }

    pub fn contains(&self, agent: &Agent, mode: AccessMode) -> bool {
        self.permissions
            .iter()
            .any(|p| p.mode == mode && &p.agent == agent)
    }

    /// Names of agents of `kind` holding `mode`
    pub fn agents_with(&self, mode: AccessMode, kind: AgentKind) -> BTreeSet<String> {
        self.permissions
            .iter()
            .filter(|p| p.mode == mode && p.agent.kind() == kind)
            .map(|p| p.agent.name().to_string())
            .collect()
    }

    /// Permissions granted since the list was loaded or last saved
    pub fn pending_additions(&self) -> &BTreeSet<Permission> {
        &self.pending_additions
    }

    /// Permissions revoked since the list was loaded or last saved
    pub fn pending_deletions(&self) -> &BTreeSet<Permission> {
        &self.pending_deletions
    }

    pub fn has_pending_changes(&self) -> bool {
        !self.pending_additions.is_empty() || !self.pending_deletions.is_empty()
    }

    /// Persist the full permission set, replacing whatever was stored for
    /// this resource.
    ///
    /// # Errors
    ///
    /// * `InvariantViolation` if any permission points at another resource
    /// * `Persistence` if the store rejects the write; the in-memory list is
    ///   left as it was and should be treated as stale
    pub fn save(&mut self) -> AccessResult<()> {
        self.check_access_to()?;

        let record = AccessControlRecord {
            access_to: self.access_to.clone(),
            permissions: self.permissions.clone(),
        };
        self.context
            .persister()
            .save_access_control(&record)
            .map_err(|e| {
                log_acl_error!("Failed to save ACL for {}: {}", self.access_to, e);
                e
            })?;

        log_acl_debug!(
            "Saved ACL for {} (+{} / -{})",
            self.access_to,
            self.pending_additions.len(),
            self.pending_deletions.len()
        );
        self.pending_additions.clear();
        self.pending_deletions.clear();
        Ok(())
    }

    fn check_access_to(&self) -> AccessResult<()> {
        match self.permissions.iter().find(|p| p.access_to != self.access_to) {
            Some(stray) => Err(AccessError::invariant(format!(
                "Permission for {} ({}) points at {} but belongs to the ACL of {}",
                stray.agent,
                stray.mode.as_str(),
                stray.access_to,
                self.access_to
            ))),
            None => Ok(()),
        }
    }

    fn add(&mut self, permission: Permission) {
        if self.permissions.insert(permission.clone()) && !self.pending_deletions.remove(&permission) {
            self.pending_additions.insert(permission);
        }
    }

    fn remove(&mut self, permission: &Permission) {
        if self.permissions.remove(permission) && !self.pending_additions.remove(permission) {
            self.pending_deletions.insert(permission.clone());
        }
    }
}
