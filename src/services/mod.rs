//! Higher-level flows composed from the managers.

pub mod access_service;
pub mod depositor;
pub mod release;

pub use crate::temporal::ReleasePolicy;
pub use access_service::AccessService;
pub use depositor::ChangeDepositorService;
pub use release::ReleaseService;
