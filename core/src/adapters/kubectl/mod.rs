//! kubectl-backed control plane and exec transport.
//!
//! Credentials and cluster selection are left to kubectl itself; the
//! optional context and kubeconfig flags are passed through unchanged.

mod cli;
mod control_plane;
mod exec;

pub use cli::Kubectl;
pub use control_plane::KubectlControlPlane;
pub use exec::KubectlExec;

use std::sync::Arc;

use crate::kubernetes::KubernetesGateway;

/// Gateway wired to a shared kubectl invocation.
pub type KubectlGateway = KubernetesGateway<KubectlControlPlane, KubectlExec>;

impl KubectlGateway {
    /// Creates a gateway that drives `kubectl` for pods in `namespace`.
    pub fn from_kubectl(kubectl: Kubectl, namespace: impl Into<String>) -> Self {
        let kubectl = Arc::new(kubectl);
        KubernetesGateway::new(
            KubectlControlPlane::new(Arc::clone(&kubectl)),
            KubectlExec::new(kubectl),
            namespace,
        )
    }
}
