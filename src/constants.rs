/// Common constants used across the access lifecycle engine.
///
/// These defaults are used for configuration when explicit values are not
/// provided.
pub const DEFAULT_PUBLIC_GROUP: &str = "public";
pub const DEFAULT_REGISTERED_GROUP: &str = "registered";
pub const DEFAULT_LOG_LEVEL: &str = "INFO";

/// Directory name used under the platform data dir for sled storage
pub const DEFAULT_STORAGE_DIR: &str = "access_lifecycle";

// Sled tree names
pub const RESOURCES_TREE: &str = "resources";
pub const LEGACY_RESOURCES_TREE: &str = "legacy_resources";
pub const ACCESS_CONTROLS_TREE: &str = "access_controls";
pub const EMBARGOES_TREE: &str = "embargoes";
pub const LEASES_TREE: &str = "leases";
