//! Cluster gateway port (interface).

use std::time::Duration;

use tokio::io::AsyncWrite;

use crate::domain::{EphemeralContainerSpec, ExecutionResult};
use crate::error::Result;

/// Port for the two cluster operations a capture session needs.
///
/// A different orchestration backend only has to implement these two
/// operations for the capture session to run against it.
pub trait ClusterGateway: Send + Sync {
    /// Attach an ephemeral container to a running pod and wait until it runs.
    ///
    /// Returns immediately if a container with `spec.name` is already part of
    /// the pod. Otherwise the container is added and its status is polled
    /// until it reports running or `timeout` elapses.
    ///
    /// Attaching is permanent: the container stays until the pod is deleted.
    fn attach_ephemeral_container(
        &self,
        pod: &str,
        spec: &EphemeralContainerSpec,
        timeout: Duration,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Execute a command in a container of the pod.
    ///
    /// Remote stdout is relayed to `stdout` chunk by chunk as it arrives.
    /// Remote stderr is collected internally and attached to the error, if any.
    fn execute_command<W>(
        &self,
        pod: &str,
        container: &str,
        command: &[String],
        stdout: &mut W,
    ) -> impl std::future::Future<Output = ExecutionResult> + Send
    where
        W: AsyncWrite + Unpin + Send;
}
