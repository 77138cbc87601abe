//! # Access Lifecycle Library
//!
//! This library manages who may see and edit repository resources, and how
//! that changes over time through embargoes and leases.
//!
//! ## Core Components
//!
//! * `permissions` - Access control lists and the permission manager facade
//! * `visibility` - Deriving and assigning the visibility of a resource
//! * `embargo` / `lease` - Time-bound restrictions and their release
//! * `propagation` - Copying a work's access state onto its file sets
//! * `resource` - Managed and legacy resources behind one `AccessControl` trait
//! * `services` - Release, depositor change and the `AccessService` facade
//! * `store` - Persister and query service collaborators, memory and sled stores
//! * `config` / `logging` - TOML configuration and per-feature logging
//!
//! ## Architecture
//!
//! Visibility is never stored. It is derived from the grants in a resource's
//! access control list, overridden by an active embargo or lease, and written
//! back by rewriting read grants for the configured public and registered
//! groups. Every component receives its store and clock through an
//! [`AccessContext`], so there is no global state besides the logger.

pub mod config;
pub mod constants;
pub mod embargo;
pub mod error;
pub mod lease;
pub mod logging;
pub mod permissions;
pub mod propagation;
pub mod resource;
pub mod services;
pub mod store;
pub mod temporal;
pub mod visibility;

// Re-export main types for convenience
pub use config::{AccessConfig, StorageConfig};
pub use embargo::{Embargo, EmbargoManager};
pub use error::{AccessError, AccessResult};
pub use lease::{Lease, LeaseManager};
pub use logging::{LogConfig, LoggingSystem};
pub use permissions::{AccessControlList, AccessMode, Agent, Permission, PermissionManager};
pub use propagation::{PropagationReport, VisibilityPropagator};
pub use resource::{AccessControl, LegacyResource, Resource, ResourceId, ResourceKind};
pub use services::{AccessService, ChangeDepositorService, ReleasePolicy, ReleaseService};
pub use store::{AccessContext, Clock, MemoryStore, Persister, QueryService, SledStore};
pub use temporal::RestrictionState;
pub use visibility::{Visibility, VisibilityMap, VisibilityReader, VisibilityWriter};
