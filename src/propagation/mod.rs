//! Copying a work's access state down to its file sets.

pub mod navigator;
pub mod propagator;

pub use navigator::ChildFileSetsNavigator;
pub use propagator::{PropagationReport, VisibilityPropagator};
