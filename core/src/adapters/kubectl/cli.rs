//! kubectl invocation.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

use crate::kubernetes::discovery::KubernetesDiscovery;
use crate::kubernetes::errors::{KubectlError, Result};

/// Server-side timeout passed to control-plane requests.
pub(crate) const REQUEST_TIMEOUT: &str = "--request-timeout=10s";

/// Local timeout for one control-plane kubectl call.
const KUBECTL_TIMEOUT: Duration = Duration::from_secs(15);

/// A kubectl binary plus the global flags every call carries.
#[derive(Debug, Clone)]
pub struct Kubectl {
    path: PathBuf,
    context: Option<String>,
    kubeconfig: Option<PathBuf>,
    call_timeout: Duration,
}

impl Kubectl {
    /// Creates a runner for the kubectl binary at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            context: None,
            kubeconfig: None,
            call_timeout: KUBECTL_TIMEOUT,
        }
    }

    /// Locates kubectl on this machine.
    pub fn discover() -> Result<Self> {
        let discovery = KubernetesDiscovery::new();
        Ok(Self::new(discovery.require_kubectl()?))
    }

    /// Selects a kubeconfig context.
    pub fn with_context(mut self, context: Option<String>) -> Self {
        self.context = context.filter(|c| !c.is_empty());
        self
    }

    /// Uses an explicit kubeconfig file.
    pub fn with_kubeconfig(mut self, kubeconfig: Option<PathBuf>) -> Self {
        self.kubeconfig = kubeconfig;
        self
    }

    /// Overrides the local timeout of control-plane calls.
    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    /// Flags placed before every subcommand.
    pub fn global_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(context) = &self.context {
            args.push(format!("--context={}", context));
        }
        if let Some(kubeconfig) = &self.kubeconfig {
            args.push(format!("--kubeconfig={}", kubeconfig.display()));
        }
        args
    }

    /// Builds a command with the global flags applied.
    pub(crate) fn command(&self) -> Command {
        let mut command = Command::new(&self.path);
        command.args(self.global_args());
        command
    }

    /// Runs a short-lived kubectl call and returns its stdout.
    ///
    /// `stdin`, when given, is written to the process before waiting on it.
    pub async fn run(&self, args: &[&str], stdin: Option<&[u8]>) -> Result<String> {
        debug!(kubectl = %self.path.display(), ?args, "running kubectl");

        let mut command = self.command();
        command
            .args(args)
            .stdin(if stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let result = timeout(self.call_timeout, async {
            let mut child = command.spawn()?;

            if let (Some(input), Some(mut pipe)) = (stdin, child.stdin.take()) {
                pipe.write_all(input).await?;
                // Closing stdin lets kubectl see end of input.
                drop(pipe);
            }

            let output = child.wait_with_output().await?;
            Ok::<_, std::io::Error>((output.status, output.stdout, output.stderr))
        })
        .await;

        match result {
            Ok(Ok((status, stdout, stderr))) => {
                if status.success() {
                    String::from_utf8(stdout)
                        .map_err(|e| KubectlError::ParsingFailed(e.to_string()))
                } else {
                    let stderr_str = String::from_utf8_lossy(&stderr);
                    Err(KubectlError::from_kubectl_error(&stderr_str))
                }
            }
            Ok(Err(e)) => Err(KubectlError::Io(e)),
            Err(_) => Err(KubectlError::Timeout),
        }
    }
}
