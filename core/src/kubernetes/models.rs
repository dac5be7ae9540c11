//! Kubernetes pod models used for ephemeral container management.
//!
//! Only the fields this crate reads or writes are typed. Everything else is
//! kept in a flattened map so a fetched pod can be submitted back to the
//! API server without losing data.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::EphemeralContainerSpec;

/// Image pull policy used for the debug container.
pub const PULL_IF_NOT_PRESENT: &str = "IfNotPresent";

// ============================================================================
// Pod
// ============================================================================

/// A Kubernetes pod as returned by `kubectl get pod -o json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pod {
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default = "default_kind")]
    pub kind: String,
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: PodSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<PodStatus>,
}

fn default_api_version() -> String {
    "v1".to_string()
}

fn default_kind() -> String {
    "Pod".to_string()
}

impl Pod {
    /// Returns true if the pod spec already lists an ephemeral container with this name.
    pub fn has_ephemeral_container(&self, name: &str) -> bool {
        self.spec
            .ephemeral_containers
            .iter()
            .any(|ec| ec.name == name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_version: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodSpec {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ephemeral_containers: Vec<EphemeralContainer>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ============================================================================
// Ephemeral Containers
// ============================================================================

/// An ephemeral container entry of `spec.ephemeralContainers`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EphemeralContainer {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_pull_policy: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub command: Vec<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub tty: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub stdin: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_context: Option<SecurityContext>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_container_name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capabilities: Option<Capabilities>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Capabilities {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub add: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub drop: Vec<String>,
}

impl From<&EphemeralContainerSpec> for EphemeralContainer {
    fn from(spec: &EphemeralContainerSpec) -> Self {
        Self {
            name: spec.name.clone(),
            image: Some(spec.image.clone()),
            image_pull_policy: Some(PULL_IF_NOT_PRESENT.to_string()),
            command: spec.idle_command.clone(),
            tty: true,
            stdin: true,
            security_context: Some(SecurityContext {
                capabilities: Some(Capabilities {
                    add: spec.capabilities.clone(),
                    drop: Vec::new(),
                }),
                extra: Map::new(),
            }),
            target_container_name: Some(spec.target_container.clone()),
            extra: Map::new(),
        }
    }
}

// ============================================================================
// Status
// ============================================================================

/// The status sub-resource of a pod.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ephemeral_container_statuses: Vec<ContainerStatus>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PodStatus {
    /// Returns true if the named ephemeral container reports a running state.
    pub fn is_ephemeral_container_running(&self, name: &str) -> bool {
        self.ephemeral_container_statuses
            .iter()
            .any(|cs| cs.name == name && cs.is_running())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerStatus {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<ContainerState>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ContainerStatus {
    pub fn is_running(&self) -> bool {
        self.state
            .as_ref()
            .map(|s| s.running.is_some())
            .unwrap_or(false)
    }
}

/// Container state; exactly one of the fields is set by the kubelet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContainerState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub running: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub waiting: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terminated: Option<Value>,
}
