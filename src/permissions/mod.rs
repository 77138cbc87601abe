// permissions module

pub mod access_control_list;
pub mod permission_manager;
pub mod types;

pub use access_control_list::{AccessControlList, Grant, Revoke};
pub use permission_manager::PermissionManager;
pub use types::{AccessControlRecord, AccessMode, Agent, AgentKind, Permission};
