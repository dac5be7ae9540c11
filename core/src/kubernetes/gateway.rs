//! Kubernetes implementation of the cluster gateway.
//!
//! Hides the eventually-consistent pod status behind a deadline-bounded
//! attach call, and relays exec output into the caller's sink.

use std::time::Duration;

use tokio::io::AsyncWrite;
use tracing::{debug, error, info};

use super::client::{ControlPlane, ExecRequest, ExecTransport};
use super::models::EphemeralContainer;
use super::wait::poll_until;
use crate::domain::{EphemeralContainerSpec, ExecutionResult};
use crate::error::{Error, Result};
use crate::ports::ClusterGateway;

/// Interval between ephemeral container status checks.
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Cluster gateway backed by a control-plane client and an exec transport.
///
/// Both collaborators are shared read-only across calls; all operations
/// act on pods of a single namespace.
pub struct KubernetesGateway<C, E> {
    control_plane: C,
    exec: E,
    namespace: String,
    poll_interval: Duration,
}

impl<C: ControlPlane, E: ExecTransport> KubernetesGateway<C, E> {
    /// Creates a gateway for pods in `namespace`.
    pub fn new(control_plane: C, exec: E, namespace: impl Into<String>) -> Self {
        Self {
            control_plane,
            exec,
            namespace: namespace.into(),
            poll_interval: POLL_INTERVAL,
        }
    }

    /// Overrides the status poll interval.
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// A failed status read counts as "not running yet".
    async fn is_ephemeral_container_running(&self, pod: &str, container: &str) -> bool {
        match self.control_plane.get_pod_status(&self.namespace, pod).await {
            Ok(status) => status.is_ephemeral_container_running(container),
            Err(e) => {
                debug!(pod, container, error = %e, "status poll failed");
                false
            }
        }
    }
}

impl<C: ControlPlane, E: ExecTransport> ClusterGateway for KubernetesGateway<C, E> {
    async fn attach_ephemeral_container(
        &self,
        pod: &str,
        spec: &EphemeralContainerSpec,
        timeout: Duration,
    ) -> Result<()> {
        debug!(container = %spec.name, pod, "creating ephemeral container");

        let mut current = self
            .control_plane
            .get_pod(&self.namespace, pod)
            .await
            .map_err(|source| Error::PodFetch {
                pod: pod.to_string(),
                source,
            })?;

        if current.has_ephemeral_container(&spec.name) {
            info!(container = %spec.name, pod, "ephemeral container already exists");
            return Ok(());
        }

        current
            .spec
            .ephemeral_containers
            .push(EphemeralContainer::from(spec));

        self.control_plane
            .update_ephemeral_containers(&current)
            .await
            .map_err(|source| Error::AttachFailed {
                container: spec.name.clone(),
                pod: pod.to_string(),
                source,
            })?;

        info!(
            container = %spec.name,
            pod,
            "ephemeral container created, waiting for it to be ready"
        );

        let this = self;
        let name = spec.name.as_str();
        let ready = poll_until(timeout, self.poll_interval, move || {
            this.is_ephemeral_container_running(pod, name)
        })
        .await;

        if !ready {
            return Err(Error::NotReady {
                container: spec.name.clone(),
                timeout,
            });
        }

        info!(container = %spec.name, pod, "ephemeral container is now running");
        Ok(())
    }

    async fn execute_command<W>(
        &self,
        pod: &str,
        container: &str,
        command: &[String],
        stdout: &mut W,
    ) -> ExecutionResult
    where
        W: AsyncWrite + Unpin + Send,
    {
        info!(
            ?command,
            container,
            pod,
            namespace = %self.namespace,
            "executing command"
        );

        let request = ExecRequest::new(&self.namespace, pod, container, command);
        let mut stderr = Vec::new();
        let outcome = self.exec.exec(&request, stdout, &mut stderr).await;
        let stderr = String::from_utf8_lossy(&stderr).into_owned();

        match outcome.error {
            Some(source) => {
                error!(
                    ?command,
                    exit_code = outcome.exit_code,
                    %stderr,
                    error = %source,
                    "failed executing command"
                );
                ExecutionResult::new(outcome.exit_code, Some(Error::Exec { source, stderr }))
            }
            None => {
                info!(
                    ?command,
                    exit_code = outcome.exit_code,
                    %stderr,
                    "command executed successfully"
                );
                ExecutionResult::new(outcome.exit_code, None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kubernetes::client::ExecOutcome;
    use crate::kubernetes::errors::{KubectlError, Result as KubeResult};
    use crate::kubernetes::models::{ObjectMeta, Pod, PodSpec, PodStatus};
    use parking_lot::Mutex;
    use serde_json::json;
    use tokio::io::AsyncWriteExt;
    use tokio::time::Instant;

    /// In-memory control plane: the debug container starts running after a
    /// configurable number of status polls.
    #[derive(Default)]
    struct FakeControlPlane {
        pod: Mutex<Option<Pod>>,
        updates: Mutex<Vec<Pod>>,
        status_polls: Mutex<u32>,
        running_after_polls: Option<u32>,
        failing_polls: u32,
        reject_update: bool,
        status_delay: Option<Duration>,
    }

    impl FakeControlPlane {
        fn with_pod(pod: Pod) -> Self {
            Self {
                pod: Mutex::new(Some(pod)),
                running_after_polls: Some(1),
                ..Default::default()
            }
        }

        fn update_count(&self) -> usize {
            self.updates.lock().len()
        }
    }

    impl ControlPlane for FakeControlPlane {
        async fn get_pod(&self, _namespace: &str, name: &str) -> KubeResult<Pod> {
            self.pod
                .lock()
                .clone()
                .ok_or_else(|| KubectlError::NotFound(format!("pods \"{}\" not found", name)))
        }

        async fn update_ephemeral_containers(&self, pod: &Pod) -> KubeResult<Pod> {
            if self.reject_update {
                return Err(KubectlError::CommandFailed("admission webhook denied".into()));
            }
            self.updates.lock().push(pod.clone());
            *self.pod.lock() = Some(pod.clone());
            Ok(pod.clone())
        }

        async fn get_pod_status(&self, _namespace: &str, _name: &str) -> KubeResult<PodStatus> {
            if let Some(delay) = self.status_delay {
                tokio::time::sleep(delay).await;
            }

            let polls = {
                let mut polls = self.status_polls.lock();
                *polls += 1;
                *polls
            };

            if polls <= self.failing_polls {
                return Err(KubectlError::ClusterNotConnected("connection refused".into()));
            }

            let running = self
                .running_after_polls
                .map(|after| polls >= after)
                .unwrap_or(false);
            let state = if running {
                json!({ "running": { "startedAt": "2024-01-01T00:00:00Z" } })
            } else {
                json!({ "waiting": { "reason": "ContainerCreating" } })
            };

            Ok(serde_json::from_value(json!({
                "ephemeralContainerStatuses": [{ "name": "ksniff-debug", "state": state }]
            }))
            .unwrap())
        }
    }

    /// Exec transport that replays scripted stdout chunks.
    struct FakeExec {
        chunks: Vec<&'static [u8]>,
        stderr: &'static [u8],
        exit_code: i32,
        error: Option<&'static str>,
        requests: Mutex<Vec<ExecRequest>>,
    }

    impl FakeExec {
        fn new(chunks: Vec<&'static [u8]>) -> Self {
            Self {
                chunks,
                stderr: b"",
                exit_code: 0,
                error: None,
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    impl ExecTransport for FakeExec {
        async fn exec<W>(
            &self,
            request: &ExecRequest,
            stdout: &mut W,
            stderr: &mut Vec<u8>,
        ) -> ExecOutcome
        where
            W: AsyncWrite + Unpin + Send,
        {
            self.requests.lock().push(request.clone());
            for chunk in &self.chunks {
                if let Err(e) = stdout.write_all(chunk).await {
                    return ExecOutcome {
                        exit_code: -1,
                        error: Some(KubectlError::Io(e)),
                    };
                }
            }
            stderr.extend_from_slice(self.stderr);
            ExecOutcome {
                exit_code: self.exit_code,
                error: self.error.map(|e| KubectlError::CommandFailed(e.to_string())),
            }
        }
    }

    fn pod() -> Pod {
        Pod {
            api_version: "v1".into(),
            kind: "Pod".into(),
            metadata: ObjectMeta {
                name: "web-0".into(),
                namespace: Some("shop".into()),
                ..Default::default()
            },
            spec: PodSpec::default(),
            status: None,
        }
    }

    fn spec() -> EphemeralContainerSpec {
        EphemeralContainerSpec::new("ksniff-debug", "nicolaka/netshoot", "nginx")
    }

    fn gateway(control_plane: FakeControlPlane) -> KubernetesGateway<FakeControlPlane, FakeExec> {
        KubernetesGateway::new(control_plane, FakeExec::new(Vec::new()), "shop")
    }

    #[tokio::test(start_paused = true)]
    async fn test_attach_submits_container_and_waits() {
        let control_plane = FakeControlPlane {
            running_after_polls: Some(3),
            ..FakeControlPlane::with_pod(pod())
        };
        let gateway = gateway(control_plane);

        gateway
            .attach_ephemeral_container("web-0", &spec(), Duration::from_secs(30))
            .await
            .unwrap();

        let updates = gateway.control_plane.updates.lock();
        assert_eq!(updates.len(), 1);
        let added = &updates[0].spec.ephemeral_containers[0];
        assert_eq!(added.name, "ksniff-debug");
        assert_eq!(added.target_container_name.as_deref(), Some("nginx"));
        assert_eq!(*gateway.control_plane.status_polls.lock(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_attach_is_idempotent() {
        let gateway = gateway(FakeControlPlane::with_pod(pod()));

        for _ in 0..2 {
            gateway
                .attach_ephemeral_container("web-0", &spec(), Duration::from_secs(30))
                .await
                .unwrap();
        }

        assert_eq!(gateway.control_plane.update_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_existing_container_short_circuits() {
        let mut existing = pod();
        existing
            .spec
            .ephemeral_containers
            .push(EphemeralContainer::from(&spec()));
        let gateway = gateway(FakeControlPlane::with_pod(existing));

        gateway
            .attach_ephemeral_container("web-0", &spec(), Duration::from_secs(30))
            .await
            .unwrap();

        assert_eq!(gateway.control_plane.update_count(), 0);
        assert_eq!(*gateway.control_plane.status_polls.lock(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_attach_times_out() {
        let control_plane = FakeControlPlane {
            running_after_polls: None,
            ..FakeControlPlane::with_pod(pod())
        };
        let gateway = gateway(control_plane);
        let timeout = Duration::from_secs(5);
        let start = Instant::now();

        let err = gateway
            .attach_ephemeral_container("web-0", &spec(), timeout)
            .await
            .unwrap_err();
        let elapsed = start.elapsed();

        assert!(matches!(err, Error::NotReady { .. }));
        assert!(err.to_string().contains("within timeout (5s)"));
        assert!(elapsed >= timeout);
        assert!(elapsed <= timeout + POLL_INTERVAL);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_status_read_respects_deadline() {
        let control_plane = FakeControlPlane {
            status_delay: Some(Duration::from_secs(15)),
            ..FakeControlPlane::with_pod(pod())
        };
        let gateway = gateway(control_plane);
        let timeout = Duration::from_secs(5);
        let start = Instant::now();

        let err = gateway
            .attach_ephemeral_container("web-0", &spec(), timeout)
            .await
            .unwrap_err();
        let elapsed = start.elapsed();

        assert!(matches!(err, Error::NotReady { .. }));
        assert!(elapsed >= timeout);
        assert!(elapsed <= timeout + POLL_INTERVAL);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_polls_are_tolerated() {
        let control_plane = FakeControlPlane {
            failing_polls: 2,
            running_after_polls: Some(1),
            ..FakeControlPlane::with_pod(pod())
        };
        let gateway = gateway(control_plane);

        gateway
            .attach_ephemeral_container("web-0", &spec(), Duration::from_secs(30))
            .await
            .unwrap();

        assert_eq!(*gateway.control_plane.status_polls.lock(), 3);
    }

    #[tokio::test]
    async fn test_pod_fetch_failure() {
        let gateway = gateway(FakeControlPlane::default());

        let err = gateway
            .attach_ephemeral_container("web-0", &spec(), Duration::from_secs(30))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::PodFetch { .. }));
        assert!(err.to_string().contains("failed to get pod 'web-0'"));
        assert!(err.to_string().contains("not found"));
    }

    #[tokio::test]
    async fn test_update_failure_is_not_retried() {
        let control_plane = FakeControlPlane {
            reject_update: true,
            ..FakeControlPlane::with_pod(pod())
        };
        let gateway = gateway(control_plane);

        let err = gateway
            .attach_ephemeral_container("web-0", &spec(), Duration::from_secs(30))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::AttachFailed { .. }));
        assert!(err.to_string().contains("in pod 'web-0'"));
        assert!(err.to_string().contains("admission webhook denied"));
        assert_eq!(*gateway.control_plane.status_polls.lock(), 0);
    }

    #[tokio::test]
    async fn test_execute_relays_chunks_in_order() {
        let exec = FakeExec::new(vec![&b"\xd4\xc3\xb2\xa1"[..], &b"\x00\x01"[..], &b"\xff"[..]]);
        let gateway = KubernetesGateway::new(FakeControlPlane::default(), exec, "shop");
        let command = vec!["tcpdump".to_string(), "-w".to_string(), "-".to_string()];

        let mut sink = tokio_test::io::Builder::new()
            .write(b"\xd4\xc3\xb2\xa1")
            .write(b"\x00\x01")
            .write(b"\xff")
            .build();

        let result = gateway
            .execute_command("web-0", "ksniff-debug", &command, &mut sink)
            .await;

        assert!(result.is_success());
        let requests = gateway.exec.requests.lock();
        assert_eq!(requests[0].namespace, "shop");
        assert_eq!(requests[0].container, "ksniff-debug");
        assert_eq!(requests[0].command, command);
        assert!(!requests[0].tty);
    }

    #[tokio::test]
    async fn test_execute_error_includes_stderr() {
        let exec = FakeExec {
            stderr: b"tcpdump: eth9: No such device exists",
            exit_code: 1,
            error: Some("command terminated with exit code 1"),
            ..FakeExec::new(vec![&b"partial"[..]])
        };
        let gateway = KubernetesGateway::new(FakeControlPlane::default(), exec, "shop");
        let mut sink = Vec::new();

        let result = gateway
            .execute_command("web-0", "ksniff-debug", &["tcpdump".to_string()], &mut sink)
            .await;

        assert_eq!(sink, b"partial");
        assert_eq!(result.exit_code, 1);
        let message = result.error.unwrap().to_string();
        assert!(message.contains("command terminated with exit code 1"));
        assert!(message.contains("No such device exists"));
    }
}
