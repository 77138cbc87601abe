use crate::error::AccessResult;
use crate::permissions::access_control_list::AccessControlList;
use crate::permissions::types::{AccessMode, Agent, AgentKind};
use crate::resource::ResourceId;
use crate::store::AccessContext;
use std::collections::BTreeSet;

/// Convenience accessors over the access control list of one resource.
///
/// Getters report the agents currently holding an access mode. Setters replace
/// the whole set for one (mode, agent kind) pair by revoking every current
/// holder and granting the new ones. Setters never save; call
/// `acl_mut().save()` when done.
#[derive(Debug, Clone)]
pub struct PermissionManager {
    acl: AccessControlList,
}

impl PermissionManager {
    /// Load the access control list of `resource_id`
    pub fn for_resource(resource_id: &ResourceId, context: &AccessContext) -> AccessResult<Self> {
        Ok(Self {
            acl: AccessControlList::load(resource_id, context)?,
        })
    }

    pub fn from_acl(acl: AccessControlList) -> Self {
        Self { acl }
    }

    pub fn acl(&self) -> &AccessControlList {
        &self.acl
    }

    pub fn acl_mut(&mut self) -> &mut AccessControlList {
        &mut self.acl
    }

    pub fn into_acl(self) -> AccessControlList {
        self.acl
    }

    pub fn edit_users(&self) -> BTreeSet<String> {
        self.acl.agents_with(AccessMode::Edit, AgentKind::User)
    }

    pub fn edit_groups(&self) -> BTreeSet<String> {
        self.acl.agents_with(AccessMode::Edit, AgentKind::Group)
    }

    pub fn read_users(&self) -> BTreeSet<String> {
        self.acl.agents_with(AccessMode::Read, AgentKind::User)
    }

    pub fn read_groups(&self) -> BTreeSet<String> {
        self.acl.agents_with(AccessMode::Read, AgentKind::Group)
    }

    pub fn set_edit_users<I, S>(&mut self, users: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.replace(AccessMode::Edit, AgentKind::User, users);
    }

    pub fn set_edit_groups<I, S>(&mut self, groups: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.replace(AccessMode::Edit, AgentKind::Group, groups);
    }

    pub fn set_read_users<I, S>(&mut self, users: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.replace(AccessMode::Read, AgentKind::User, users);
    }

    pub fn set_read_groups<I, S>(&mut self, groups: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.replace(AccessMode::Read, AgentKind::Group, groups);
    }

    fn replace<I, S>(&mut self, mode: AccessMode, kind: AgentKind, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let agent = |name: String| match kind {
            AgentKind::User => Agent::User(name),
            AgentKind::Group => Agent::Group(name),
        };

        for current in self.acl.agents_with(mode, kind) {
            self.acl.revoke(mode).from(agent(current));
        }
        for name in names {
            self.acl.grant(mode).to(agent(name.into()));
        }
    }
}
