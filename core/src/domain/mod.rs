//! Domain layer - Pure capture session types.
//!
//! This module contains the values a capture session is built from.
//! These types have no I/O dependencies and can be tested in isolation.

mod capture;
mod ephemeral;
mod execution;
mod target;

// Re-export all domain types
pub use capture::{capture_command, CAPTURE_TOOL};
pub use ephemeral::{EphemeralContainerSpec, CAPTURE_CAPABILITIES, IDLE_COMMAND};
pub use execution::ExecutionResult;
pub use target::CaptureTarget;
