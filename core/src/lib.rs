//! ksniff Core Library
//!
//! Captures network traffic of a running Kubernetes pod without modifying
//! it. A debug container carrying tcpdump is attached to the pod as an
//! ephemeral container, and tcpdump's pcap output is streamed back over an
//! exec channel.
//!
//! # Architecture
//! This library follows hexagonal architecture (ports & adapters):
//! - `domain`: Capture targets, container specs, command construction
//! - `ports`: Trait definitions (`ClusterGateway`, `Sniffer`)
//! - `kubernetes`: Gateway over a control plane and an exec transport
//! - `adapters`: kubectl-backed control plane and exec transport
//! - `application`: The capture session
//!
//! # Session lifecycle
//! `setup` attaches the debug container and waits for it to run, `start`
//! streams the capture, `cleanup` is a no-op because ephemeral containers
//! cannot be removed from a pod.

// Hexagonal architecture layers
pub mod adapters;
pub mod application;
pub mod domain;
pub mod kubernetes;
pub mod ports;

pub mod config;
pub mod error;

// Re-export domain types (primary API)
pub use domain::{capture_command, CaptureTarget, EphemeralContainerSpec, ExecutionResult};

// Re-export other commonly used types
pub use adapters::kubectl::{Kubectl, KubectlGateway};
pub use application::{EphemeralContainerSniffer, EPHEMERAL_CONTAINER_NAME};
pub use config::{SettingsStore, SnifferSettings, StoredDefaults, DEFAULT_TCPDUMP_IMAGE};
pub use error::{Error, Result};
pub use ports::{ClusterGateway, Sniffer};
