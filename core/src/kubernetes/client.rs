//! Boundary traits for the Kubernetes control plane and exec channel.
//!
//! The gateway only depends on these traits. `adapters::kubectl` implements
//! them with the kubectl binary; tests substitute in-memory fakes.

use tokio::io::AsyncWrite;

use super::errors::{KubectlError, Result};
use super::models::{Pod, PodStatus};

/// Reads and updates pod objects.
pub trait ControlPlane: Send + Sync {
    /// Fetch a pod by name.
    fn get_pod(
        &self,
        namespace: &str,
        name: &str,
    ) -> impl std::future::Future<Output = Result<Pod>> + Send;

    /// Submit `pod` to the `ephemeralcontainers` sub-resource.
    fn update_ephemeral_containers(
        &self,
        pod: &Pod,
    ) -> impl std::future::Future<Output = Result<Pod>> + Send;

    /// Fetch the status sub-resource of a pod.
    fn get_pod_status(
        &self,
        namespace: &str,
        name: &str,
    ) -> impl std::future::Future<Output = Result<PodStatus>> + Send;
}

/// Parameters of an exec channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecRequest {
    pub namespace: String,
    pub pod: String,
    pub container: String,
    pub command: Vec<String>,
    pub stdin: bool,
    pub tty: bool,
}

impl ExecRequest {
    /// A non-interactive exec: no stdin, no TTY, so stdout stays binary-clean.
    pub fn new(namespace: &str, pod: &str, container: &str, command: &[String]) -> Self {
        Self {
            namespace: namespace.to_string(),
            pod: pod.to_string(),
            container: container.to_string(),
            command: command.to_vec(),
            stdin: false,
            tty: false,
        }
    }
}

/// What the exec channel reports once it closes.
#[derive(Debug)]
pub struct ExecOutcome {
    pub exit_code: i32,
    pub error: Option<KubectlError>,
}

/// Opens exec channels into containers.
pub trait ExecTransport: Send + Sync {
    /// Run `request` and block until the remote process exits or the channel fails.
    ///
    /// Every chunk read from remote stdout is written to `stdout` before the
    /// next one is read. Remote stderr is appended to `stderr`; transports may
    /// keep only its tail.
    fn exec<W>(
        &self,
        request: &ExecRequest,
        stdout: &mut W,
        stderr: &mut Vec<u8>,
    ) -> impl std::future::Future<Output = ExecOutcome> + Send
    where
        W: AsyncWrite + Unpin + Send;
}
