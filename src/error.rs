use crate::resource::ResourceId;
use thiserror::Error;

/// Result type for access lifecycle operations
pub type AccessResult<T> = Result<T, AccessError>;

/// Unified error type for the access lifecycle engine.
///
/// Every operation surfaces errors to its immediate caller; nothing in this
/// crate retries on its own. Callers decide whether a failed transition is
/// worth retrying with [`AccessError::is_retryable`].
#[derive(Error, Debug)]
pub enum AccessError {
    /// The requested visibility or state change cannot be performed from the
    /// current state (e.g. assigning `embargo` with no embargo attached).
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    /// An internal consistency check failed. Always a programmer error.
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// The injected store rejected a read or write.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// A lookup through the query service found nothing.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A release/expire transition could not complete. The resource keeps its
    /// embargo or lease reference.
    #[error("Release failed for {resource_id}: {reason}")]
    ReleaseFailed {
        resource_id: ResourceId,
        reason: String,
    },

    /// Propagation stopped at the first failing child.
    #[error("Propagation halted after {completed} children: {source}")]
    PropagationHalted {
        completed: usize,
        #[source]
        source: Box<AccessError>,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl AccessError {
    /// Create an invalid transition error with context
    pub fn invalid_transition<S: Into<String>>(msg: S) -> Self {
        Self::InvalidTransition(msg.into())
    }

    /// Create an invariant violation error with context
    pub fn invariant<S: Into<String>>(msg: S) -> Self {
        Self::InvariantViolation(msg.into())
    }

    /// Create a persistence error with context
    pub fn persistence<S: Into<String>>(msg: S) -> Self {
        Self::Persistence(msg.into())
    }

    /// Create a not found error with context
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a configuration error with context
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Wrap a failure that happened while releasing an embargo or lease.
    pub fn release_failed(resource_id: &ResourceId, cause: &AccessError) -> Self {
        Self::ReleaseFailed {
            resource_id: resource_id.clone(),
            reason: cause.to_string(),
        }
    }

    /// Check if a caller may retry the operation from a clean state
    pub fn is_retryable(&self) -> bool {
        match self {
            AccessError::Persistence(_) => true,
            AccessError::ReleaseFailed { .. } => true,
            AccessError::PropagationHalted { .. } => true,
            AccessError::InvalidTransition(_) => false,
            AccessError::InvariantViolation(_) => false,
            AccessError::NotFound(_) => false,
            AccessError::Config(_) => false,
            AccessError::Io(_) => false,
            AccessError::Toml(_) => false,
        }
    }

    /// The innermost error, looking through propagation wrappers.
    pub fn root_cause(&self) -> &AccessError {
        match self {
            AccessError::PropagationHalted { source, .. } => source.root_cause(),
            other => other,
        }
    }
}
