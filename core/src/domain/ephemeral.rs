//! Ephemeral debug container description.

use serde::{Deserialize, Serialize};

/// Capabilities the capture tool needs to open raw sockets on the pod network.
pub const CAPTURE_CAPABILITIES: &[&str] = &["NET_RAW", "NET_ADMIN"];

/// Keeps the debug container alive until a capture command is executed in it.
pub const IDLE_COMMAND: &[&str] = &["sh", "-c", "sleep 10000000"];

/// The sidecar process attached to a running pod.
///
/// Once submitted the container belongs to the pod: Kubernetes has no way to
/// remove an ephemeral container, it lives until the pod is deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EphemeralContainerSpec {
    pub name: String,
    pub image: String,
    /// Container whose process namespace the debug container joins.
    pub target_container: String,
    pub capabilities: Vec<String>,
    pub idle_command: Vec<String>,
}

impl EphemeralContainerSpec {
    /// Creates a spec with the capture capability set and the idle command.
    pub fn new(
        name: impl Into<String>,
        image: impl Into<String>,
        target_container: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            image: image.into(),
            target_container: target_container.into(),
            capabilities: CAPTURE_CAPABILITIES.iter().map(|c| c.to_string()).collect(),
            idle_command: IDLE_COMMAND.iter().map(|c| c.to_string()).collect(),
        }
    }
}
