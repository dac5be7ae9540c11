//! Error types for kubectl-backed cluster access.

use thiserror::Error;

/// Result type alias for Kubernetes operations.
pub type Result<T> = std::result::Result<T, KubectlError>;

/// Errors raised while talking to the cluster through kubectl.
#[derive(Error, Debug)]
pub enum KubectlError {
    /// kubectl binary could not be located.
    #[error("kubectl not found")]
    KubectlNotFound,

    /// The requested object does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The cluster could not be reached or no configuration is available.
    #[error("cluster not connected: {0}")]
    ClusterNotConnected(String),

    /// kubectl ran but reported a failure.
    #[error("kubectl command failed: {0}")]
    CommandFailed(String),

    /// kubectl output could not be parsed.
    #[error("failed to parse kubectl output: {0}")]
    ParsingFailed(String),

    /// kubectl did not finish in time.
    #[error("kubectl command timed out")]
    Timeout,

    /// I/O error while running kubectl.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl KubectlError {
    /// Classifies kubectl stderr output into an error variant.
    pub fn from_kubectl_error(stderr: &str) -> Self {
        let message = stderr.trim().to_string();
        let lower = message.to_lowercase();

        if lower.contains("notfound") || lower.contains("not found") {
            KubectlError::NotFound(message)
        } else if lower.contains("connection refused")
            || lower.contains("no configuration has been provided")
            || lower.contains("dial tcp")
            || lower.contains("unable to connect to the server")
        {
            KubectlError::ClusterNotConnected(message)
        } else {
            KubectlError::CommandFailed(message)
        }
    }

    /// Returns true if the error means the object does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, KubectlError::NotFound(_))
    }

    /// Returns true if the error means the cluster is unreachable.
    pub fn is_cluster_not_connected(&self) -> bool {
        matches!(self, KubectlError::ClusterNotConnected(_))
    }
}
