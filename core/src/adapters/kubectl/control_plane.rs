//! Pod reads and ephemeral container updates through kubectl.

use std::sync::Arc;

use super::cli::{Kubectl, REQUEST_TIMEOUT};
use crate::kubernetes::client::ControlPlane;
use crate::kubernetes::errors::{KubectlError, Result};
use crate::kubernetes::models::{Pod, PodStatus};

/// Control plane client driving `kubectl get` and `kubectl replace --raw`.
#[derive(Debug, Clone)]
pub struct KubectlControlPlane {
    kubectl: Arc<Kubectl>,
}

impl KubectlControlPlane {
    pub fn new(kubectl: Arc<Kubectl>) -> Self {
        Self { kubectl }
    }
}

/// API path of a pod sub-resource.
fn pod_subresource_path(namespace: &str, name: &str, subresource: &str) -> String {
    format!("/api/v1/namespaces/{}/pods/{}/{}", namespace, name, subresource)
}

fn parse_pod(output: &str) -> Result<Pod> {
    serde_json::from_str(output).map_err(|e| KubectlError::ParsingFailed(e.to_string()))
}

impl ControlPlane for KubectlControlPlane {
    async fn get_pod(&self, namespace: &str, name: &str) -> Result<Pod> {
        let output = self
            .kubectl
            .run(
                &["get", "pod", name, "-n", namespace, "-o", "json", REQUEST_TIMEOUT],
                None,
            )
            .await?;

        parse_pod(&output)
    }

    async fn update_ephemeral_containers(&self, pod: &Pod) -> Result<Pod> {
        let namespace = pod.metadata.namespace.as_deref().ok_or_else(|| {
            KubectlError::ParsingFailed(format!("pod '{}' has no namespace", pod.metadata.name))
        })?;
        let path = pod_subresource_path(namespace, &pod.metadata.name, "ephemeralcontainers");
        let body =
            serde_json::to_vec(pod).map_err(|e| KubectlError::ParsingFailed(e.to_string()))?;

        let output = self
            .kubectl
            .run(
                &["replace", "--raw", path.as_str(), "-f", "-", REQUEST_TIMEOUT],
                Some(body.as_slice()),
            )
            .await?;

        parse_pod(&output)
    }

    async fn get_pod_status(&self, namespace: &str, name: &str) -> Result<PodStatus> {
        let path = pod_subresource_path(namespace, name, "status");
        let output = self
            .kubectl
            .run(&["get", "--raw", path.as_str(), REQUEST_TIMEOUT], None)
            .await?;

        Ok(parse_pod(&output)?.status.unwrap_or_default())
    }
}
