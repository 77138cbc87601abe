//! Visibility derivation and assignment
//!
//! Visibility is never stored. It is read from the access control list plus
//! any active embargo or lease, and written by rewriting read grants.

pub mod reader;
pub mod visibility_map;
pub mod writer;

pub use reader::VisibilityReader;
pub use visibility_map::VisibilityMap;
pub use writer::VisibilityWriter;

use crate::error::AccessError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Open,
    Authenticated,
    Restricted,
    Embargo,
    Lease,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Open => "open",
            Visibility::Authenticated => "authenticated",
            Visibility::Restricted => "restricted",
            Visibility::Embargo => "embargo",
            Visibility::Lease => "lease",
        }
    }

    /// True for visibilities backed only by grants, with no temporal record
    pub fn is_grant_based(&self) -> bool {
        matches!(
            self,
            Visibility::Open | Visibility::Authenticated | Visibility::Restricted
        )
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Visibility {
    type Err = AccessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(Visibility::Open),
            "authenticated" => Ok(Visibility::Authenticated),
            "restricted" => Ok(Visibility::Restricted),
            "embargo" => Ok(Visibility::Embargo),
            "lease" => Ok(Visibility::Lease),
            other => Err(AccessError::invalid_transition(format!(
                "Unknown visibility '{}'",
                other
            ))),
        }
    }
}
