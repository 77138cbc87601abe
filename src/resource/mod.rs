//! Resource model
//!
//! Resources are the durable objects whose access is managed: works and their
//! child file sets. Their access control list is NOT nested here; it lives in
//! its own keyspace and is correlated back only through `access_to`.

pub mod access_control;
pub mod legacy;

pub use access_control::AccessControl;
pub use legacy::LegacyResource;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

pub(crate) const DEPOSITOR_ATTRIBUTE: &str = "depositor";
pub(crate) const PROXY_DEPOSITOR_ATTRIBUTE: &str = "proxy_depositor";

/// Stable identifier shared by every persisted record (resources, ACLs,
/// embargoes and leases).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(String);

impl ResourceId {
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self(id.into())
    }

    /// Generate a fresh random identifier
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ResourceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Work,
    FileSet,
    Collection,
}

/// A managed resource. Its permissions are held by a detached access control
/// list; embargo and lease are referenced by id and resolved on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub id: ResourceId,
    pub kind: ResourceKind,
    /// Ordered member ids; file sets have none.
    #[serde(default)]
    pub member_ids: Vec<ResourceId>,
    #[serde(default)]
    pub attributes: BTreeMap<String, Value>,
    #[serde(default)]
    pub embargo_id: Option<ResourceId>,
    #[serde(default)]
    pub lease_id: Option<ResourceId>,
}

/// Alias naming the managed variant next to [`LegacyResource`]
pub type ManagedResource = Resource;

impl Resource {
    pub fn new(id: ResourceId, kind: ResourceKind) -> Self {
        Self {
            id,
            kind,
            member_ids: Vec::new(),
            attributes: BTreeMap::new(),
            embargo_id: None,
            lease_id: None,
        }
    }

    /// Create a work with a generated id
    pub fn work() -> Self {
        Self::new(ResourceId::generate(), ResourceKind::Work)
    }

    /// Create a file set with a generated id
    pub fn file_set() -> Self {
        Self::new(ResourceId::generate(), ResourceKind::FileSet)
    }

    pub fn with_members(mut self, member_ids: Vec<ResourceId>) -> Self {
        self.member_ids = member_ids;
        self
    }

    pub fn is_file_set(&self) -> bool {
        self.kind == ResourceKind::FileSet
    }

    pub fn is_work(&self) -> bool {
        self.kind == ResourceKind::Work
    }

    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    pub fn set_attribute<S: Into<String>>(&mut self, name: S, value: Value) {
        self.attributes.insert(name.into(), value);
    }

    pub fn depositor(&self) -> Option<&str> {
        string_attribute(&self.attributes, DEPOSITOR_ATTRIBUTE)
    }

    pub fn set_depositor(&mut self, depositor: &str) {
        set_string_attribute(&mut self.attributes, DEPOSITOR_ATTRIBUTE, Some(depositor));
    }

    pub fn proxy_depositor(&self) -> Option<&str> {
        string_attribute(&self.attributes, PROXY_DEPOSITOR_ATTRIBUTE)
    }

    pub fn set_proxy_depositor(&mut self, proxy: Option<&str>) {
        set_string_attribute(&mut self.attributes, PROXY_DEPOSITOR_ATTRIBUTE, proxy);
    }
}

pub(crate) fn string_attribute<'a>(
    attributes: &'a BTreeMap<String, Value>,
    name: &str,
) -> Option<&'a str> {
    attributes.get(name).and_then(Value::as_str)
}

pub(crate) fn set_string_attribute(
    attributes: &mut BTreeMap<String, Value>,
    name: &str,
    value: Option<&str>,
) {
    match value {
        Some(v) => {
            attributes.insert(name.to_string(), Value::String(v.to_string()));
        }
        None => {
            attributes.remove(name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depositor_attributes() {
        let mut work = Resource::work();
        assert_eq!(work.depositor(), None);
        work.set_depositor("alice");
        work.set_proxy_depositor(Some("bob"));
        assert_eq!(work.depositor(), Some("alice"));
        assert_eq!(work.proxy_depositor(), Some("bob"));
        work.set_proxy_depositor(None);
        assert_eq!(work.proxy_depositor(), None);
    }

    #[test]
    fn test_resource_serde_defaults() {
        let json = r#"{"id":"fs-1","kind":"file_set"}"#;
        let resource: Resource = serde_json::from_str(json).unwrap();
        assert!(resource.is_file_set());
        assert!(resource.member_ids.is_empty());
        assert!(resource.embargo_id.is_none());
    }
}
