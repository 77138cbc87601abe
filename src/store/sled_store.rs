use super::{Persister, QueryService, RecordKind};
use crate::embargo::Embargo;
use crate::error::{AccessError, AccessResult};
use crate::lease::Lease;
use crate::log_store_debug;
use crate::permissions::AccessControlRecord;
use crate::resource::{LegacyResource, Resource, ResourceId};
use serde::{de::DeserializeOwned, Serialize};
use std::path::Path;

/// Sled-backed store. Each record kind lives in its own tree, values are JSON,
/// and every write is flushed before it is reported as saved.
#[derive(Clone)]
pub struct SledStore {
    /// The underlying sled database instance
    db: sled::Db,
    resources_tree: sled::Tree,
    legacy_tree: sled::Tree,
    /// Detached access control lists keyed by `access_to`
    access_controls_tree: sled::Tree,
    embargoes_tree: sled::Tree,
    leases_tree: sled::Tree,
}

impl SledStore {
    /// Creates a store over an already opened database, opening all trees
    pub fn new(db: sled::Db) -> AccessResult<Self> {
        let open = |kind: RecordKind| {
            db.open_tree(kind.tree_name())
                .map_err(|e| kind.sled_failed("open_tree", e))
        };
        Ok(Self {
            resources_tree: open(RecordKind::Resource)?,
            legacy_tree: open(RecordKind::LegacyResource)?,
            access_controls_tree: open(RecordKind::AccessControl)?,
            embargoes_tree: open(RecordKind::Embargo)?,
            leases_tree: open(RecordKind::Lease)?,
            db,
        })
    }

    /// Opens (or creates) a database at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> AccessResult<Self> {
        let db = sled::open(path.as_ref()).map_err(|e| {
            AccessError::persistence(format!(
                "Cannot open sled database at {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::new(db)
    }

    /// Opens a throwaway database that is removed on drop
    pub fn temporary() -> AccessResult<Self> {
        let db = sled::Config::new()
            .temporary(true)
            .open()
            .map_err(|e| AccessError::persistence(format!("Cannot open temporary sled database: {}", e)))?;
        Self::new(db)
    }

    /// Gets a reference to the underlying database
    pub fn db(&self) -> &sled::Db {
        &self.db
    }

    fn tree(&self, kind: RecordKind) -> &sled::Tree {
        match kind {
            RecordKind::Resource => &self.resources_tree,
            RecordKind::LegacyResource => &self.legacy_tree,
            RecordKind::AccessControl => &self.access_controls_tree,
            RecordKind::Embargo => &self.embargoes_tree,
            RecordKind::Lease => &self.leases_tree,
        }
    }

    /// Store a record under `key` in the tree for its kind
    fn store_in_tree<T: Serialize>(&self, kind: RecordKind, key: &str, item: &T) -> AccessResult<()> {
        let bytes = serde_json::to_vec(item).map_err(|e| kind.encode_failed(key, e))?;
        let tree = self.tree(kind);
        tree.insert(key.as_bytes(), bytes)
            .map_err(|e| kind.sled_failed("insert", e))?;
        tree.flush().map_err(|e| kind.sled_failed("flush", e))?;

        log_store_debug!("Stored {} '{}'", kind, key);
        Ok(())
    }

    /// Retrieve the record stored under `key`, if any
    fn get_from_tree<T: DeserializeOwned>(&self, kind: RecordKind, key: &str) -> AccessResult<Option<T>> {
        match self.tree(kind).get(key.as_bytes()) {
            Ok(Some(bytes)) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|e| kind.decode_failed(key, e)),
            Ok(None) => Ok(None),
            Err(e) => Err(kind.sled_failed("get", e)),
        }
    }

    fn delete_from_tree(&self, kind: RecordKind, key: &str) -> AccessResult<bool> {
        let tree = self.tree(kind);
        let existed = tree
            .remove(key.as_bytes())
            .map_err(|e| kind.sled_failed("remove", e))?
            .is_some();
        tree.flush().map_err(|e| kind.sled_failed("flush", e))?;
        if existed {
            log_store_debug!("Deleted {} '{}'", kind, key);
        }
        Ok(existed)
    }

    fn require<T: DeserializeOwned>(&self, kind: RecordKind, id: &ResourceId) -> AccessResult<T> {
        self.get_from_tree(kind, id.as_str())?
            .ok_or_else(|| kind.not_found(id))
    }

    /// Members in `member_ids` order; ids with no record are skipped
    fn members<T: DeserializeOwned>(&self, kind: RecordKind, ids: &[ResourceId]) -> AccessResult<Vec<T>> {
        let mut members = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(member) = self.get_from_tree(kind, id.as_str())? {
                members.push(member);
            }
        }
        Ok(members)
    }
}

impl Persister for SledStore {
    fn save_resource(&self, resource: &Resource) -> AccessResult<Resource> {
        self.store_in_tree(RecordKind::Resource, resource.id.as_str(), resource)?;
        Ok(resource.clone())
    }

    fn save_legacy(&self, resource: &LegacyResource) -> AccessResult<LegacyResource> {
        self.store_in_tree(RecordKind::LegacyResource, resource.id.as_str(), resource)?;
        Ok(resource.clone())
    }

    fn save_access_control(
        &self,
        record: &AccessControlRecord,
    ) -> AccessResult<AccessControlRecord> {
        self.store_in_tree(RecordKind::AccessControl, record.access_to.as_str(), record)?;
        Ok(record.clone())
    }

    fn save_embargo(&self, embargo: &Embargo) -> AccessResult<Embargo> {
        let mut embargo = embargo.clone();
        let id = embargo.id.get_or_insert_with(ResourceId::generate).clone();
        self.store_in_tree(RecordKind::Embargo, id.as_str(), &embargo)?;
        Ok(embargo)
    }

    fn save_lease(&self, lease: &Lease) -> AccessResult<Lease> {
        let mut lease = lease.clone();
        let id = lease.id.get_or_insert_with(ResourceId::generate).clone();
        self.store_in_tree(RecordKind::Lease, id.as_str(), &lease)?;
        Ok(lease)
    }

    fn delete_embargo(&self, id: &ResourceId) -> AccessResult<bool> {
        self.delete_from_tree(RecordKind::Embargo, id.as_str())
    }

    fn delete_lease(&self, id: &ResourceId) -> AccessResult<bool> {
        self.delete_from_tree(RecordKind::Lease, id.as_str())
    }
}

impl QueryService for SledStore {
    fn find_resource(&self, id: &ResourceId) -> AccessResult<Resource> {
        self.require(RecordKind::Resource, id)
    }

    fn find_legacy(&self, id: &ResourceId) -> AccessResult<LegacyResource> {
        self.require(RecordKind::LegacyResource, id)
    }

    fn find_access_control(
        &self,
        access_to: &ResourceId,
    ) -> AccessResult<Option<AccessControlRecord>> {
        self.get_from_tree(RecordKind::AccessControl, access_to.as_str())
    }

    fn find_embargo(&self, id: &ResourceId) -> AccessResult<Embargo> {
        self.require(RecordKind::Embargo, id)
    }

    fn find_lease(&self, id: &ResourceId) -> AccessResult<Lease> {
        self.require(RecordKind::Lease, id)
    }

    fn find_members(&self, resource: &Resource) -> AccessResult<Vec<Resource>> {
        self.members(RecordKind::Resource, &resource.member_ids)
    }

    fn find_legacy_members(&self, resource: &LegacyResource) -> AccessResult<Vec<LegacyResource>> {
        self.members(RecordKind::LegacyResource, &resource.member_ids)
    }
}
