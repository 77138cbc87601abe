use super::{Persister, QueryService, RecordKind};
use crate::embargo::Embargo;
use crate::error::AccessResult;
use crate::lease::Lease;
use crate::permissions::AccessControlRecord;
use crate::resource::{LegacyResource, Resource, ResourceId};
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory store implementing both the persister and the query service.
///
/// Intended for tests and for callers embedding the engine without durable
/// storage. Writes are last-writer-wins per key.
#[derive(Debug, Default)]
pub struct MemoryStore {
    resources: RwLock<HashMap<ResourceId, Resource>>,
    legacy: RwLock<HashMap<ResourceId, LegacyResource>>,
    access_controls: RwLock<HashMap<ResourceId, AccessControlRecord>>,
    embargoes: RwLock<HashMap<ResourceId, Embargo>>,
    leases: RwLock<HashMap<ResourceId, Lease>>,
}

fn insert<T: Clone>(
    map: &RwLock<HashMap<ResourceId, T>>,
    kind: RecordKind,
    id: ResourceId,
    item: &T,
) -> AccessResult<T> {
    let mut guard = map.write().map_err(|_| kind.poisoned())?;
    guard.insert(id, item.clone());
    Ok(item.clone())
}

fn fetch<T: Clone>(
    map: &RwLock<HashMap<ResourceId, T>>,
    kind: RecordKind,
    id: &ResourceId,
) -> AccessResult<Option<T>> {
    let guard = map.read().map_err(|_| kind.poisoned())?;
    Ok(guard.get(id).cloned())
}

fn remove<T>(map: &RwLock<HashMap<ResourceId, T>>, kind: RecordKind, id: &ResourceId) -> AccessResult<bool> {
    let mut guard = map.write().map_err(|_| kind.poisoned())?;
    Ok(guard.remove(id).is_some())
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored embargo records
    pub fn embargo_count(&self) -> AccessResult<usize> {
        let guard = self
            .embargoes
            .read()
            .map_err(|_| RecordKind::Embargo.poisoned())?;
        Ok(guard.len())
    }

    /// Number of stored lease records
    pub fn lease_count(&self) -> AccessResult<usize> {
        let guard = self
            .leases
            .read()
            .map_err(|_| RecordKind::Lease.poisoned())?;
        Ok(guard.len())
    }
}

impl Persister for MemoryStore {
    fn save_resource(&self, resource: &Resource) -> AccessResult<Resource> {
        insert(&self.resources, RecordKind::Resource, resource.id.clone(), resource)
    }

    fn save_legacy(&self, resource: &LegacyResource) -> AccessResult<LegacyResource> {
        insert(&self.legacy, RecordKind::LegacyResource, resource.id.clone(), resource)
    }

    fn save_access_control(
        &self,
        record: &AccessControlRecord,
    ) -> AccessResult<AccessControlRecord> {
        insert(
            &self.access_controls,
            RecordKind::AccessControl,
            record.access_to.clone(),
            record,
        )
    }

    fn save_embargo(&self, embargo: &Embargo) -> AccessResult<Embargo> {
        let mut embargo = embargo.clone();
        let id = embargo.id.get_or_insert_with(ResourceId::generate).clone();
        insert(&self.embargoes, RecordKind::Embargo, id, &embargo)
    }

    fn save_lease(&self, lease: &Lease) -> AccessResult<Lease> {
        let mut lease = lease.clone();
        let id = lease.id.get_or_insert_with(ResourceId::generate).clone();
        insert(&self.leases, RecordKind::Lease, id, &lease)
    }

    fn delete_embargo(&self, id: &ResourceId) -> AccessResult<bool> {
        remove(&self.embargoes, RecordKind::Embargo, id)
    }

    fn delete_lease(&self, id: &ResourceId) -> AccessResult<bool> {
        remove(&self.leases, RecordKind::Lease, id)
    }
}

impl QueryService for MemoryStore {
    fn find_resource(&self, id: &ResourceId) -> AccessResult<Resource> {
        fetch(&self.resources, RecordKind::Resource, id)?
            .ok_or_else(|| RecordKind::Resource.not_found(id))
    }

    fn find_legacy(&self, id: &ResourceId) -> AccessResult<LegacyResource> {
        fetch(&self.legacy, RecordKind::LegacyResource, id)?
            .ok_or_else(|| RecordKind::LegacyResource.not_found(id))
    }

    fn find_access_control(
        &self,
        access_to: &ResourceId,
    ) -> AccessResult<Option<AccessControlRecord>> {
        fetch(&self.access_controls, RecordKind::AccessControl, access_to)
    }

    fn find_embargo(&self, id: &ResourceId) -> AccessResult<Embargo> {
        fetch(&self.embargoes, RecordKind::Embargo, id)?
            .ok_or_else(|| RecordKind::Embargo.not_found(id))
    }

    fn find_lease(&self, id: &ResourceId) -> AccessResult<Lease> {
        fetch(&self.leases, RecordKind::Lease, id)?
            .ok_or_else(|| RecordKind::Lease.not_found(id))
    }

    fn find_members(&self, resource: &Resource) -> AccessResult<Vec<Resource>> {
        let guard = self
            .resources
            .read()
            .map_err(|_| RecordKind::Resource.poisoned())?;
        Ok(resource
            .member_ids
            .iter()
            .filter_map(|id| guard.get(id).cloned())
            .collect())
    }

    fn find_legacy_members(&self, resource: &LegacyResource) -> AccessResult<Vec<LegacyResource>> {
        let guard = self
            .legacy
            .read()
            .map_err(|_| RecordKind::LegacyResource.poisoned())?;
        Ok(resource
            .member_ids
            .iter()
            .filter_map(|id| guard.get(id).cloned())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visibility::Visibility;
    use chrono::{Duration, Utc};

    #[test]
    fn test_save_embargo_assigns_id() {
        let store = MemoryStore::new();
        let embargo = Embargo::new(
            Utc::now() + Duration::days(10),
            Visibility::Restricted,
            Visibility::Open,
        );
        let saved = store.save_embargo(&embargo).unwrap();
        let id = saved.id.clone().unwrap();
        assert_eq!(store.find_embargo(&id).unwrap(), saved);

        let resaved = store.save_embargo(&saved).unwrap();
        assert_eq!(resaved.id, Some(id));
        assert_eq!(store.embargo_count().unwrap(), 1);
    }

    #[test]
    fn test_find_members_keeps_member_order() {
        let store = MemoryStore::new();
        let a = Resource::file_set();
        let b = Resource::file_set();
        store.save_resource(&a).unwrap();
        store.save_resource(&b).unwrap();
        let work = Resource::work().with_members(vec![b.id.clone(), a.id.clone()]);

        let members = store.find_members(&work).unwrap();
        let ids: Vec<_> = members.iter().map(|r| r.id.clone()).collect();
        assert_eq!(ids, vec![b.id, a.id]);
    }

    #[test]
    fn test_missing_resource_is_not_found() {
        let store = MemoryStore::new();
        let err = store.find_resource(&ResourceId::from("missing")).unwrap_err();
        assert!(matches!(err, crate::error::AccessError::NotFound(_)));
    }
}
