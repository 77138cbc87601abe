//! The record types a store keeps, and the errors raised while keeping them.

use crate::constants::{
    ACCESS_CONTROLS_TREE, EMBARGOES_TREE, LEASES_TREE, LEGACY_RESOURCES_TREE, RESOURCES_TREE,
};
use crate::error::AccessError;
use crate::resource::ResourceId;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Resource,
    LegacyResource,
    /// Keyed by the `access_to` of the list
    AccessControl,
    Embargo,
    Lease,
}

impl RecordKind {
    pub const ALL: [RecordKind; 5] = [
        RecordKind::Resource,
        RecordKind::LegacyResource,
        RecordKind::AccessControl,
        RecordKind::Embargo,
        RecordKind::Lease,
    ];

    /// Sled tree holding records of this kind
    pub fn tree_name(self) -> &'static str {
        match self {
            RecordKind::Resource => RESOURCES_TREE,
            RecordKind::LegacyResource => LEGACY_RESOURCES_TREE,
            RecordKind::AccessControl => ACCESS_CONTROLS_TREE,
            RecordKind::Embargo => EMBARGOES_TREE,
            RecordKind::Lease => LEASES_TREE,
        }
    }

    pub fn not_found(self, id: &ResourceId) -> AccessError {
        AccessError::not_found(format!("{} '{}' not found", self, id))
    }

    /// A writer panicked while holding the in-memory map
    pub fn poisoned(self) -> AccessError {
        AccessError::persistence(format!("{} map is poisoned", self))
    }

    pub fn encode_failed(self, key: &str, error: serde_json::Error) -> AccessError {
        AccessError::persistence(format!("Cannot encode {} '{}': {}", self, key, error))
    }

    pub fn decode_failed(self, key: &str, error: serde_json::Error) -> AccessError {
        AccessError::persistence(format!("Cannot decode {} '{}': {}", self, key, error))
    }

    pub fn sled_failed(self, operation: &str, error: sled::Error) -> AccessError {
        AccessError::persistence(format!(
            "sled {} on tree '{}' failed: {}",
            operation,
            self.tree_name(),
            error
        ))
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecordKind::Resource => "Resource",
            RecordKind::LegacyResource => "Legacy resource",
            RecordKind::AccessControl => "Access control list",
            RecordKind::Embargo => "Embargo",
            RecordKind::Lease => "Lease",
        };
        f.write_str(name)
    }
}
