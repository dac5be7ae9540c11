//! Ports layer - Trait definitions (interfaces).
//!
//! This module defines the interfaces that the application layer uses
//! to interact with the cluster. Implementations live in `kubernetes`.

mod gateway;
mod sniffer;

pub use gateway::ClusterGateway;
pub use sniffer::Sniffer;
