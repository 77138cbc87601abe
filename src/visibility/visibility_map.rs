use super::Visibility;
use crate::constants::{DEFAULT_PUBLIC_GROUP, DEFAULT_REGISTERED_GROUP};
use crate::error::{AccessError, AccessResult};
use crate::permissions::{AccessControlList, AccessMode, Agent, Permission};
use crate::resource::ResourceId;
use std::collections::BTreeSet;

/// Canonical grant pattern for each grant-based visibility.
///
/// `open` grants read to the public group, `authenticated` to the registered
/// group, `restricted` to neither. Group names are configurable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibilityMap {
    public_group: String,
    registered_group: String,
}

impl Default for VisibilityMap {
    fn default() -> Self {
        Self::new(DEFAULT_PUBLIC_GROUP, DEFAULT_REGISTERED_GROUP)
    }
}

impl VisibilityMap {
    pub fn new(public_group: &str, registered_group: &str) -> Self {
        Self {
            public_group: public_group.to_string(),
            registered_group: registered_group.to_string(),
        }
    }

    pub fn public_agent(&self) -> Agent {
        Agent::group(self.public_group.clone())
    }

    pub fn registered_agent(&self) -> Agent {
        Agent::group(self.registered_group.clone())
    }

    /// Groups that must hold read access for `visibility`
    pub fn additions_for(&self, visibility: Visibility) -> AccessResult<Vec<Agent>> {
        match visibility {
            Visibility::Open => Ok(vec![self.public_agent()]),
            Visibility::Authenticated => Ok(vec![self.registered_agent()]),
            Visibility::Restricted => Ok(Vec::new()),
            other => Err(not_grant_based(other)),
        }
    }

    /// Groups whose read and discover access must be removed for `visibility`
    pub fn deletions_for(&self, visibility: Visibility) -> AccessResult<Vec<Agent>> {
        match visibility {
            Visibility::Open => Ok(vec![self.registered_agent()]),
            Visibility::Authenticated => Ok(vec![self.public_agent()]),
            Visibility::Restricted => Ok(vec![self.public_agent(), self.registered_agent()]),
            other => Err(not_grant_based(other)),
        }
    }

    /// Rewrite the read grants of `acl` to the pattern for `visibility`.
    /// Grants for other agents are left alone.
    pub fn apply_to_acl(
        &self,
        acl: &mut AccessControlList,
        visibility: Visibility,
    ) -> AccessResult<()> {
        let additions = self.additions_for(visibility)?;
        for agent in self.deletions_for(visibility)? {
            acl.revoke(AccessMode::Read)
                .from(agent.clone())
                .revoke(AccessMode::Discover)
                .from(agent);
        }
        for agent in additions {
            acl.grant(AccessMode::Read).to(agent);
        }
        Ok(())
    }

    /// Same rewrite as [`VisibilityMap::apply_to_acl`] over a bare permission
    /// set, for resources that hold their permissions inline.
    pub fn apply_to_permissions(
        &self,
        permissions: &mut BTreeSet<Permission>,
        access_to: &ResourceId,
        visibility: Visibility,
    ) -> AccessResult<()> {
        let additions = self.additions_for(visibility)?;
        let deletions = self.deletions_for(visibility)?;
        permissions.retain(|p| {
            !(matches!(p.mode, AccessMode::Read | AccessMode::Discover)
                && deletions.contains(&p.agent))
        });
        for agent in additions {
            permissions.insert(Permission::new(agent, AccessMode::Read, access_to.clone()));
        }
        Ok(())
    }

    /// Derive the grant-based visibility of a permission set.
    pub fn visibility_for<'a, I>(&self, permissions: I) -> Visibility
    where
        I: IntoIterator<Item = &'a Permission>,
    {
        let public = self.public_agent();
        let registered = self.registered_agent();
        let mut authenticated = false;

        for permission in permissions {
            let grants_read = matches!(permission.mode, AccessMode::Read | AccessMode::Discover);
            if grants_read && permission.agent == public {
                return Visibility::Open;
            }
            if permission.mode == AccessMode::Read && permission.agent == registered {
                authenticated = true;
            }
        }

        if authenticated {
            Visibility::Authenticated
        } else {
            Visibility::Restricted
        }
    }
}

fn not_grant_based(visibility: Visibility) -> AccessError {
    AccessError::invalid_transition(format!(
        "'{}' has no grant pattern of its own",
        visibility
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::ResourceId;

    fn permission(agent: Agent, mode: AccessMode) -> Permission {
        Permission::new(agent, mode, ResourceId::from("r"))
    }

    #[test]
    fn test_public_discover_is_open() {
        let map = VisibilityMap::default();
        let perms = vec![permission(Agent::group("public"), AccessMode::Discover)];
        assert_eq!(map.visibility_for(&perms), Visibility::Open);
    }

    #[test]
    fn test_public_wins_over_registered() {
        let map = VisibilityMap::default();
        let perms = vec![
            permission(Agent::group("registered"), AccessMode::Read),
            permission(Agent::group("public"), AccessMode::Read),
        ];
        assert_eq!(map.visibility_for(&perms), Visibility::Open);
    }

    #[test]
    fn test_user_grants_alone_are_restricted() {
        let map = VisibilityMap::default();
        let perms = vec![
            permission(Agent::user("alice"), AccessMode::Edit),
            permission(Agent::user("bob"), AccessMode::Read),
        ];
        assert_eq!(map.visibility_for(&perms), Visibility::Restricted);
    }

    #[test]
    fn test_custom_group_names() {
        let map = VisibilityMap::new("world", "members");
        let perms = vec![permission(Agent::group("members"), AccessMode::Read)];
        assert_eq!(map.visibility_for(&perms), Visibility::Authenticated);
        assert_eq!(map.additions_for(Visibility::Open).unwrap(), vec![Agent::group("world")]);
    }

    #[test]
    fn test_restricted_strips_public_discover_but_keeps_users() {
        let map = VisibilityMap::default();
        let id = ResourceId::from("r");
        let mut perms: BTreeSet<Permission> = [
            permission(Agent::group("public"), AccessMode::Discover),
            permission(Agent::group("registered"), AccessMode::Read),
            permission(Agent::user("alice"), AccessMode::Edit),
        ]
        .into_iter()
        .collect();

        map.apply_to_permissions(&mut perms, &id, Visibility::Restricted)
            .unwrap();
        assert_eq!(perms.len(), 1);
        assert_eq!(map.visibility_for(&perms), Visibility::Restricted);
    }

    #[test]
    fn test_embargo_has_no_grant_pattern() {
        let map = VisibilityMap::default();
        assert!(matches!(
            map.additions_for(Visibility::Embargo),
            Err(AccessError::InvalidTransition(_))
        ));
    }
}
