//! Adapters layer - External system implementations.
//!
//! This module contains implementations of the cluster boundary traits.
//! Each adapter handles communication with external systems.

pub mod kubectl;

// Re-export main types for convenience
pub use kubectl::{Kubectl, KubectlControlPlane, KubectlExec};
