//! Common test utilities and fixtures for the integration tests
//!
//! Provides a fault-injecting store, a pinned clock and helpers for building
//! works with file sets.

#![allow(dead_code)]

use access_lifecycle::embargo::Embargo;
use access_lifecycle::error::{AccessError, AccessResult};
use access_lifecycle::lease::Lease;
use access_lifecycle::permissions::AccessControlRecord;
use access_lifecycle::resource::{LegacyResource, Resource, ResourceId};
use access_lifecycle::store::{AccessContext, FixedClock, MemoryStore, Persister, QueryService};
use chrono::{DateTime, TimeZone, Utc};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// Kinds of write a [`FlakyStore`] can be told to reject
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Write {
    Resource,
    AccessControl,
    Embargo,
    Lease,
}

/// Memory store that rejects chosen writes with a persistence error.
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    failing: Mutex<HashSet<(Write, ResourceId)>>,
    failing_all: Mutex<HashSet<Write>>,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inner(&self) -> &MemoryStore {
        &self.inner
    }

    /// Reject writes of `write` for the record keyed by `id`
    pub fn fail_on(&self, write: Write, id: &ResourceId) {
        self.failing.lock().unwrap().insert((write, id.clone()));
    }

    /// Reject every write of `write`
    pub fn fail_all(&self, write: Write) {
        self.failing_all.lock().unwrap().insert(write);
    }

    pub fn heal(&self) {
        self.failing.lock().unwrap().clear();
        self.failing_all.lock().unwrap().clear();
    }

    fn check(&self, write: Write, id: Option<&ResourceId>) -> AccessResult<()> {
        let rejected = self.failing_all.lock().unwrap().contains(&write)
            || id.map_or(false, |id| {
                self.failing.lock().unwrap().contains(&(write, id.clone()))
            });
        if rejected {
            Err(AccessError::persistence(format!(
                "injected {:?} write failure",
                write
            )))
        } else {
            Ok(())
        }
    }
}

impl Persister for FlakyStore {
    fn save_resource(&self, resource: &Resource) -> AccessResult<Resource> {
        self.check(Write::Resource, Some(&resource.id))?;
        self.inner.save_resource(resource)
    }

    fn save_legacy(&self, resource: &LegacyResource) -> AccessResult<LegacyResource> {
        self.check(Write::Resource, Some(&resource.id))?;
        self.inner.save_legacy(resource)
    }

    fn save_access_control(
        &self,
        record: &AccessControlRecord,
    ) -> AccessResult<AccessControlRecord> {
        self.check(Write::AccessControl, Some(&record.access_to))?;
        self.inner.save_access_control(record)
    }

    fn save_embargo(&self, embargo: &Embargo) -> AccessResult<Embargo> {
        self.check(Write::Embargo, embargo.id.as_ref())?;
        self.inner.save_embargo(embargo)
    }

    fn save_lease(&self, lease: &Lease) -> AccessResult<Lease> {
        self.check(Write::Lease, lease.id.as_ref())?;
        self.inner.save_lease(lease)
    }

    fn delete_embargo(&self, id: &ResourceId) -> AccessResult<bool> {
        self.inner.delete_embargo(id)
    }

    fn delete_lease(&self, id: &ResourceId) -> AccessResult<bool> {
        self.inner.delete_lease(id)
    }
}

impl QueryService for FlakyStore {
    fn find_resource(&self, id: &ResourceId) -> AccessResult<Resource> {
        self.inner.find_resource(id)
    }

    fn find_legacy(&self, id: &ResourceId) -> AccessResult<LegacyResource> {
        self.inner.find_legacy(id)
    }

    fn find_access_control(
        &self,
        access_to: &ResourceId,
    ) -> AccessResult<Option<AccessControlRecord>> {
        self.inner.find_access_control(access_to)
    }

    fn find_embargo(&self, id: &ResourceId) -> AccessResult<Embargo> {
        self.inner.find_embargo(id)
    }

    fn find_lease(&self, id: &ResourceId) -> AccessResult<Lease> {
        self.inner.find_lease(id)
    }

    fn find_members(&self, resource: &Resource) -> AccessResult<Vec<Resource>> {
        self.inner.find_members(resource)
    }

    fn find_legacy_members(&self, resource: &LegacyResource) -> AccessResult<Vec<LegacyResource>> {
        self.inner.find_legacy_members(resource)
    }
}

/// The instant every test clock is pinned to
pub fn test_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 4, 1, 12, 0, 0).unwrap()
}

/// Context over a fresh flaky store with a pinned clock
pub fn flaky_context() -> (AccessContext, Arc<FlakyStore>) {
    let store = Arc::new(FlakyStore::new());
    let context = AccessContext::with_store(store.clone()).with_clock(Arc::new(FixedClock(test_now())));
    (context, store)
}

/// Persist `count` file sets and a work that holds them, in order
pub fn work_with_file_sets(context: &AccessContext, count: usize) -> (Resource, Vec<Resource>) {
    let file_sets: Vec<Resource> = (0..count).map(|_| Resource::file_set()).collect();
    for file_set in &file_sets {
        context.persister().save_resource(file_set).unwrap();
    }
    let work = Resource::work().with_members(file_sets.iter().map(|f| f.id.clone()).collect());
    context.persister().save_resource(&work).unwrap();
    (work, file_sets)
}
