//! Error types for the ksniff-core library.

use std::time::Duration;

use thiserror::Error;

use crate::kubernetes::errors::KubectlError;

/// Result type alias for ksniff operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while setting up or running a capture.
#[derive(Error, Debug)]
pub enum Error {
    /// Reading the pod from the control plane failed.
    #[error("failed to get pod '{pod}': {source}")]
    PodFetch {
        pod: String,
        #[source]
        source: KubectlError,
    },

    /// The ephemeral container update was rejected or not delivered.
    #[error("failed to create ephemeral container '{container}' in pod '{pod}': {source}")]
    AttachFailed {
        container: String,
        pod: String,
        #[source]
        source: KubectlError,
    },

    /// The ephemeral container never reported a running state.
    #[error("ephemeral container '{container}' did not become ready within timeout ({timeout:?})")]
    NotReady { container: String, timeout: Duration },

    /// The exec channel failed before or while the command ran.
    #[error("command execution failed: {source}, stderr: '{stderr}'")]
    Exec {
        #[source]
        source: KubectlError,
        stderr: String,
    },

    /// Session setup failed.
    #[error("setup failed for pod '{pod}': {source}")]
    Setup {
        pod: String,
        #[source]
        source: Box<Error>,
    },

    /// The capture tool exited non-zero or its channel failed.
    #[error("{tool} failed, exit code: '{exit_code}'{}", cause_suffix(.source))]
    CaptureFailed {
        tool: String,
        exit_code: i32,
        #[source]
        source: Option<Box<Error>>,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Kubernetes/kubectl error.
    #[error("Kubernetes error: {0}")]
    Kubernetes(#[from] KubectlError),
}

fn cause_suffix(source: &Option<Box<Error>>) -> String {
    match source {
        Some(err) => format!(": {}", err),
        None => String::new(),
    }
}
