//! Persistence collaborators
//!
//! The engine never owns durable storage. It talks to a [`Persister`] for
//! writes and a [`QueryService`] for reads, both injected through an
//! [`AccessContext`]. Two implementations ship with the crate: an in-memory
//! store and a sled-backed store.

pub mod memory;
pub mod record;
pub mod sled_store;

pub use memory::MemoryStore;
pub use record::RecordKind;
pub use sled_store::SledStore;

use crate::config::{AccessConfig, StorageConfig};
use crate::embargo::Embargo;
use crate::error::AccessResult;
use crate::lease::Lease;
use crate::permissions::AccessControlRecord;
use crate::resource::{LegacyResource, Resource, ResourceId};
use crate::visibility::VisibilityMap;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Write side of the store. Every save is an idempotent upsert keyed by the
/// record's identity and either fully succeeds or fails with
/// `AccessError::Persistence`.
pub trait Persister: Send + Sync {
    fn save_resource(&self, resource: &Resource) -> AccessResult<Resource>;

    fn save_legacy(&self, resource: &LegacyResource) -> AccessResult<LegacyResource>;

    /// Replace the persisted permission set for `record.access_to`.
    fn save_access_control(&self, record: &AccessControlRecord)
        -> AccessResult<AccessControlRecord>;

    /// Persist an embargo, assigning a fresh id when it has none.
    fn save_embargo(&self, embargo: &Embargo) -> AccessResult<Embargo>;

    /// Persist a lease, assigning a fresh id when it has none.
    fn save_lease(&self, lease: &Lease) -> AccessResult<Lease>;

    /// Returns whether a record was removed.
    fn delete_embargo(&self, id: &ResourceId) -> AccessResult<bool>;

    fn delete_lease(&self, id: &ResourceId) -> AccessResult<bool>;
}

/// Read side of the store.
pub trait QueryService: Send + Sync {
    fn find_resource(&self, id: &ResourceId) -> AccessResult<Resource>;

    fn find_legacy(&self, id: &ResourceId) -> AccessResult<LegacyResource>;

    fn find_access_control(&self, access_to: &ResourceId)
        -> AccessResult<Option<AccessControlRecord>>;

    fn find_embargo(&self, id: &ResourceId) -> AccessResult<Embargo>;

    fn find_lease(&self, id: &ResourceId) -> AccessResult<Lease>;

    /// Members of `resource` in `member_ids` order.
    fn find_members(&self, resource: &Resource) -> AccessResult<Vec<Resource>>;

    fn find_legacy_members(&self, resource: &LegacyResource) -> AccessResult<Vec<LegacyResource>>;
}

/// Source of "now" for embargo and lease date checks.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to one instant; used in tests and replays.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Injected collaborators shared by every component of the engine.
///
/// Cloning is cheap; each clone refers to the same store.
#[derive(Clone)]
pub struct AccessContext {
    persister: Arc<dyn Persister>,
    queries: Arc<dyn QueryService>,
    clock: Arc<dyn Clock>,
    visibility_map: VisibilityMap,
}

impl AccessContext {
    pub fn new(persister: Arc<dyn Persister>, queries: Arc<dyn QueryService>) -> Self {
        Self {
            persister,
            queries,
            clock: Arc::new(SystemClock),
            visibility_map: VisibilityMap::default(),
        }
    }

    /// Context over a single store that implements both sides
    pub fn with_store<S>(store: Arc<S>) -> Self
    where
        S: Persister + QueryService + 'static,
    {
        Self::new(store.clone(), store)
    }

    /// Build the context described by a configuration
    pub fn from_config(config: &AccessConfig) -> AccessResult<Self> {
        config.validate()?;
        let context = match &config.storage {
            StorageConfig::Memory => Self::with_store(Arc::new(MemoryStore::new())),
            StorageConfig::Sled { path } => Self::with_store(Arc::new(SledStore::open(path)?)),
        };
        Ok(context.with_visibility_map(VisibilityMap::new(
            &config.public_group,
            &config.registered_group,
        )))
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_visibility_map(mut self, visibility_map: VisibilityMap) -> Self {
        self.visibility_map = visibility_map;
        self
    }

    pub fn persister(&self) -> &dyn Persister {
        self.persister.as_ref()
    }

    pub fn queries(&self) -> &dyn QueryService {
        self.queries.as_ref()
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn visibility_map(&self) -> &VisibilityMap {
        &self.visibility_map
    }
}
