//! Feature-specific logging macros and utilities
//!
//! Each subsystem logs under its own target so operators can raise the level
//! for, say, propagation without drowning in ACL chatter.

/// Feature categories for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFeature {
    Acl,
    Visibility,
    Embargo,
    Lease,
    Propagation,
    Store,
    Services,
}

impl LogFeature {
    /// Get the target string for this feature
    pub fn target(&self) -> &'static str {
        match self {
            LogFeature::Acl => "access_lifecycle::acl",
            LogFeature::Visibility => "access_lifecycle::visibility",
            LogFeature::Embargo => "access_lifecycle::embargo",
            LogFeature::Lease => "access_lifecycle::lease",
            LogFeature::Propagation => "access_lifecycle::propagation",
            LogFeature::Store => "access_lifecycle::store",
            LogFeature::Services => "access_lifecycle::services",
        }
    }

    /// Short name used as the key in `LogConfig::features`
    pub fn name(&self) -> &'static str {
        match self {
            LogFeature::Acl => "acl",
            LogFeature::Visibility => "visibility",
            LogFeature::Embargo => "embargo",
            LogFeature::Lease => "lease",
            LogFeature::Propagation => "propagation",
            LogFeature::Store => "store",
            LogFeature::Services => "services",
        }
    }

    pub fn all() -> [LogFeature; 7] {
        [
            LogFeature::Acl,
            LogFeature::Visibility,
            LogFeature::Embargo,
            LogFeature::Lease,
            LogFeature::Propagation,
            LogFeature::Store,
            LogFeature::Services,
        ]
    }

    pub fn from_name(name: &str) -> Option<LogFeature> {
        Self::all().into_iter().find(|f| f.name() == name)
    }
}

// ACL-specific logging macros
#[macro_export]
macro_rules! log_acl_debug {
    ($($arg:tt)*) => {
        log::debug!(target: "access_lifecycle::acl", $($arg)*)
    };
}

#[macro_export]
macro_rules! log_acl_info {
    ($($arg:tt)*) => {
        log::info!(target: "access_lifecycle::acl", $($arg)*)
    };
}

#[macro_export]
macro_rules! log_acl_error {
    ($($arg:tt)*) => {
        log::error!(target: "access_lifecycle::acl", $($arg)*)
    };
}

// Visibility-specific logging macros
#[macro_export]
macro_rules! log_visibility_debug {
    ($($arg:tt)*) => {
        log::debug!(target: "access_lifecycle::visibility", $($arg)*)
    };
}

#[macro_export]
macro_rules! log_visibility_info {
    ($($arg:tt)*) => {
        log::info!(target: "access_lifecycle::visibility", $($arg)*)
    };
}

#[macro_export]
macro_rules! log_visibility_warn {
    ($($arg:tt)*) => {
        log::warn!(target: "access_lifecycle::visibility", $($arg)*)
    };
}

// Embargo-specific logging macros
#[macro_export]
macro_rules! log_embargo_info {
    ($($arg:tt)*) => {
        log::info!(target: "access_lifecycle::embargo", $($arg)*)
    };
}

#[macro_export]
macro_rules! log_embargo_warn {
    ($($arg:tt)*) => {
        log::warn!(target: "access_lifecycle::embargo", $($arg)*)
    };
}

#[macro_export]
macro_rules! log_embargo_error {
    ($($arg:tt)*) => {
        log::error!(target: "access_lifecycle::embargo", $($arg)*)
    };
}

// Lease-specific logging macros
#[macro_export]
macro_rules! log_lease_info {
    ($($arg:tt)*) => {
        log::info!(target: "access_lifecycle::lease", $($arg)*)
    };
}

#[macro_export]
macro_rules! log_lease_warn {
    ($($arg:tt)*) => {
        log::warn!(target: "access_lifecycle::lease", $($arg)*)
    };
}

#[macro_export]
macro_rules! log_lease_error {
    ($($arg:tt)*) => {
        log::error!(target: "access_lifecycle::lease", $($arg)*)
    };
}

// Propagation-specific logging macros
#[macro_export]
macro_rules! log_propagation_debug {
    ($($arg:tt)*) => {
        log::debug!(target: "access_lifecycle::propagation", $($arg)*)
    };
}

#[macro_export]
macro_rules! log_propagation_info {
    ($($arg:tt)*) => {
        log::info!(target: "access_lifecycle::propagation", $($arg)*)
    };
}

#[macro_export]
macro_rules! log_propagation_error {
    ($($arg:tt)*) => {
        log::error!(target: "access_lifecycle::propagation", $($arg)*)
    };
}

// Store logging macros
#[macro_export]
macro_rules! log_store_debug {
    ($($arg:tt)*) => {
        log::debug!(target: "access_lifecycle::store", $($arg)*)
    };
}

// Service-level logging macros
#[macro_export]
macro_rules! log_services_info {
    ($($arg:tt)*) => {
        log::info!(target: "access_lifecycle::services", $($arg)*)
    };
}

#[macro_export]
macro_rules! log_services_warn {
    ($($arg:tt)*) => {
        log::warn!(target: "access_lifecycle::services", $($arg)*)
    };
}
