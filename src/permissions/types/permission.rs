use crate::resource::ResourceId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A user or group that can be granted access.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum Agent {
    User(String),
    Group(String),
}

impl Agent {
    pub fn user<S: Into<String>>(key: S) -> Self {
        Agent::User(key.into())
    }

    pub fn group<S: Into<String>>(name: S) -> Self {
        Agent::Group(name.into())
    }

    pub fn name(&self) -> &str {
        match self {
            Agent::User(name) | Agent::Group(name) => name,
        }
    }

    pub fn kind(&self) -> AgentKind {
        match self {
            Agent::User(_) => AgentKind::User,
            Agent::Group(_) => AgentKind::Group,
        }
    }
}

impl fmt::Display for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Agent::User(name) => write!(f, "{}", name),
            Agent::Group(name) => write!(f, "group/{}", name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentKind {
    User,
    Group,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessMode {
    Discover,
    Read,
    Edit,
}

impl AccessMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessMode::Discover => "discover",
            AccessMode::Read => "read",
            AccessMode::Edit => "edit",
        }
    }
}

/// One entry of an access control list.
///
/// `access_to` must equal the owning list's `access_to`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Permission {
    pub agent: Agent,
    pub mode: AccessMode,
    pub access_to: ResourceId,
}

impl Permission {
    pub fn new(agent: Agent, mode: AccessMode, access_to: ResourceId) -> Self {
        Self {
            agent,
            mode,
            access_to,
        }
    }
}

/// Persisted form of an access control list, stored apart from the resource
/// and keyed by `access_to`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessControlRecord {
    pub access_to: ResourceId,
    #[serde(default)]
    pub permissions: BTreeSet<Permission>,
}

impl AccessControlRecord {
    pub fn empty(access_to: ResourceId) -> Self {
        Self {
            access_to,
            permissions: BTreeSet::new(),
        }
    }
}
