//! Capture target identification.

use serde::{Deserialize, Serialize};

/// Identifies the pod and container a capture session acts on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CaptureTarget {
    pub namespace: String,
    pub pod: String,
    pub container: String,
}

impl CaptureTarget {
    pub fn new(
        namespace: impl Into<String>,
        pod: impl Into<String>,
        container: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            pod: pod.into(),
            container: container.into(),
        }
    }

    /// Returns the target ID in the format "namespace/pod/container".
    pub fn id(&self) -> String {
        format!("{}/{}/{}", self.namespace, self.pod, self.container)
    }
}
