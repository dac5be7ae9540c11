//! Kubernetes backend for the cluster gateway.
//!
//! This module provides:
//! - Pod, ephemeral container and status models
//! - Boundary traits for the control plane and the exec channel
//! - The gateway that attaches debug containers and streams exec output
//! - kubectl discovery

pub mod client;
pub mod discovery;
pub mod errors;
pub mod gateway;
pub mod models;
pub mod wait;

// Re-export commonly used types
pub use client::{ControlPlane, ExecOutcome, ExecRequest, ExecTransport};
pub use discovery::KubernetesDiscovery;
pub use errors::{KubectlError, Result};
pub use gateway::{KubernetesGateway, POLL_INTERVAL};
pub use models::{EphemeralContainer, Pod, PodStatus};
