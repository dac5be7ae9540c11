//! Application layer - Use case services.
//!
//! Services are thin orchestrators that:
//! - Accept domain types and settings as inputs
//! - Use ports (traits) for cluster access
//! - Map cluster failures into session-level errors

mod sniffer_service;

pub use sniffer_service::{EphemeralContainerSniffer, EPHEMERAL_CONTAINER_NAME};
