//! Capture session over an ephemeral debug container.

use std::time::Duration;

use tokio::io::AsyncWrite;
use tracing::{debug, error, info};

use crate::config::SnifferSettings;
use crate::domain::{capture_command, CaptureTarget, EphemeralContainerSpec, CAPTURE_TOOL};
use crate::error::{Error, Result};
use crate::ports::{ClusterGateway, Sniffer};

/// Name of the debug container. Fixed so repeated sessions against the same
/// pod reuse one container instead of adding a new one each time.
pub const EPHEMERAL_CONTAINER_NAME: &str = "ksniff-debug";

/// Captures traffic of a pod by attaching an ephemeral debug container and
/// running tcpdump inside it.
///
/// One instance drives exactly one `setup` -> `start` -> `cleanup` cycle.
/// The debug container outlives the session: Kubernetes cannot remove
/// ephemeral containers, they are reclaimed when the pod is deleted.
pub struct EphemeralContainerSniffer<G: ClusterGateway> {
    gateway: G,
    target: CaptureTarget,
    interface: String,
    filter: String,
    image: String,
    container_timeout: Duration,
}

impl<G: ClusterGateway> EphemeralContainerSniffer<G> {
    /// Create a session for the pod described by `settings`.
    pub fn new(settings: &SnifferSettings, gateway: G) -> Self {
        Self {
            gateway,
            target: settings.target(),
            interface: settings.interface.clone(),
            filter: settings.filter.clone(),
            image: settings.effective_image().to_string(),
            container_timeout: settings.container_timeout,
        }
    }

    pub fn target(&self) -> &CaptureTarget {
        &self.target
    }

    /// The debug container this session attaches.
    pub fn container_spec(&self) -> EphemeralContainerSpec {
        EphemeralContainerSpec::new(
            EPHEMERAL_CONTAINER_NAME,
            self.image.clone(),
            self.target.container.clone(),
        )
    }

    /// The tcpdump command line run in the debug container.
    pub fn command(&self) -> Vec<String> {
        capture_command(&self.interface, &self.filter)
    }
}

impl<G: ClusterGateway> Sniffer for EphemeralContainerSniffer<G> {
    async fn setup(&self) -> Result<()> {
        info!(pod = %self.target.pod, "creating ephemeral container in pod");

        let spec = self.container_spec();
        if let Err(e) = self
            .gateway
            .attach_ephemeral_container(&self.target.pod, &spec, self.container_timeout)
            .await
        {
            error!(pod = %self.target.pod, error = %e, "failed to create ephemeral container in pod");
            return Err(Error::Setup {
                pod: self.target.pod.clone(),
                source: Box::new(e),
            });
        }

        info!("ephemeral container created successfully");
        Ok(())
    }

    async fn start<W>(&self, stdout: &mut W) -> Result<()>
    where
        W: AsyncWrite + Unpin + Send,
    {
        info!("starting remote sniffing using ephemeral container");

        let command = self.command();
        let result = self
            .gateway
            .execute_command(&self.target.pod, EPHEMERAL_CONTAINER_NAME, &command, stdout)
            .await;

        if !result.is_success() {
            return Err(Error::CaptureFailed {
                tool: CAPTURE_TOOL.to_string(),
                exit_code: result.exit_code,
                source: result.error.map(Box::new),
            });
        }

        info!("remote sniffing using ephemeral container completed");
        Ok(())
    }

    async fn cleanup(&self) -> Result<()> {
        // Ephemeral containers cannot be removed; they go away with the pod.
        debug!("ephemeral container cleanup not needed (auto-cleanup with pod)");
        Ok(())
    }
}
