//! Streaming `kubectl exec`.

use std::process::Stdio;
use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

use super::cli::Kubectl;
use crate::kubernetes::client::{ExecOutcome, ExecRequest, ExecTransport};
use crate::kubernetes::errors::KubectlError;

/// Read buffer size for relaying remote stdout.
const CHUNK_SIZE: usize = 32 * 1024;

/// Most remote stderr kept for diagnostics; older output is dropped.
const STDERR_TAIL_LIMIT: usize = 64 * 1024;

/// Exit code reported when the process status carries none (killed by signal, never started).
const UNKNOWN_EXIT_CODE: i32 = -1;

/// Exec transport running `kubectl exec` as a child process.
///
/// The child's stdout pipe is the exec channel. Dropping the exec future or
/// failing to write into the sink closes that pipe; what happens to the
/// remote process then is up to kubectl and the API server.
#[derive(Debug, Clone)]
pub struct KubectlExec {
    kubectl: Arc<Kubectl>,
}

impl KubectlExec {
    pub fn new(kubectl: Arc<Kubectl>) -> Self {
        Self { kubectl }
    }
}

/// Arguments of `kubectl exec` for a request.
fn exec_args(request: &ExecRequest) -> Vec<String> {
    let mut args = vec![
        "exec".to_string(),
        format!("--namespace={}", request.namespace),
        request.pod.clone(),
        format!("--container={}", request.container),
    ];
    if request.stdin {
        args.push("--stdin".to_string());
    }
    if request.tty {
        args.push("--tty".to_string());
    }
    args.push("--".to_string());
    args.extend(request.command.iter().cloned());
    args
}

/// Copies `reader` into `writer`, one write and flush per chunk read.
async fn relay<R, W>(mut reader: R, writer: &mut W) -> std::io::Result<u64>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut total = 0u64;

    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            return Ok(total);
        }
        writer.write_all(&buf[..n]).await?;
        writer.flush().await?;
        total += n as u64;
    }
}

/// Reads `reader` to the end, keeping only its last `limit` bytes in `tail`.
async fn read_tail<R>(mut reader: R, tail: &mut Vec<u8>, limit: usize) -> std::io::Result<()>
where
    R: AsyncRead + Unpin,
{
    let mut buf = [0u8; 4096];

    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            return Ok(());
        }
        tail.extend_from_slice(&buf[..n]);
        if tail.len() > limit {
            let excess = tail.len() - limit;
            tail.drain(..excess);
        }
    }
}

fn failed(error: KubectlError) -> ExecOutcome {
    ExecOutcome {
        exit_code: UNKNOWN_EXIT_CODE,
        error: Some(error),
    }
}

impl ExecTransport for KubectlExec {
    async fn exec<W>(
        &self,
        request: &ExecRequest,
        stdout: &mut W,
        stderr: &mut Vec<u8>,
    ) -> ExecOutcome
    where
        W: AsyncWrite + Unpin + Send,
    {
        let mut command = self.kubectl.command();
        command
            .args(exec_args(request))
            .stdin(if request.stdin {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(e) => return failed(KubectlError::Io(e)),
        };

        let (Some(child_stdout), Some(child_stderr)) =
            (child.stdout.take(), child.stderr.take())
        else {
            return failed(KubectlError::CommandFailed(
                "exec channel has no output pipes".to_string(),
            ));
        };

        let (relayed, drained) = tokio::join!(
            relay(child_stdout, stdout),
            read_tail(child_stderr, stderr, STDERR_TAIL_LIMIT)
        );

        if let Err(e) = &drained {
            warn!(error = %e, "failed reading remote stderr");
        }

        let status = child.wait().await;

        let relayed = match relayed {
            Ok(bytes) => bytes,
            Err(e) => {
                let exit_code = status
                    .ok()
                    .and_then(|s| s.code())
                    .unwrap_or(UNKNOWN_EXIT_CODE);
                return ExecOutcome {
                    exit_code,
                    error: Some(KubectlError::Io(e)),
                };
            }
        };
        debug!(bytes = relayed, "exec stdout closed");

        match status {
            Ok(status) if status.success() => ExecOutcome {
                exit_code: 0,
                error: None,
            },
            Ok(status) => {
                let exit_code = status.code().unwrap_or(UNKNOWN_EXIT_CODE);
                ExecOutcome {
                    exit_code,
                    error: Some(KubectlError::CommandFailed(format!(
                        "command terminated with exit code {}",
                        exit_code
                    ))),
                }
            }
            Err(e) => failed(KubectlError::Io(e)),
        }
    }
}
