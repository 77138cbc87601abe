pub mod permission;

pub use permission::{AccessControlRecord, AccessMode, Agent, AgentKind, Permission};
