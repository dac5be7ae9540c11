//! kubectl discovery.

use std::path::{Path, PathBuf};

use super::errors::{KubectlError, Result};

/// Default paths to search for kubectl.
const KUBECTL_PATHS: &[&str] = &[
    "/opt/homebrew/bin/kubectl", // Apple Silicon
    "/usr/local/bin/kubectl",    // Intel Mac / Homebrew
    "/usr/bin/kubectl",          // System
];

/// Locates the kubectl binary.
pub struct KubernetesDiscovery {
    kubectl_path: Option<PathBuf>,
}

impl KubernetesDiscovery {
    /// Creates a new KubernetesDiscovery, searching well-known paths and then `$PATH`.
    pub fn new() -> Self {
        let kubectl_path = find_executable(KUBECTL_PATHS).or_else(|| {
            std::env::var_os("PATH").and_then(|path| {
                std::env::split_paths(&path)
                    .map(|dir| dir.join("kubectl"))
                    .find(|candidate| candidate.is_file())
            })
        });

        Self { kubectl_path }
    }

    /// Creates a new KubernetesDiscovery with a custom path.
    pub fn with_path(kubectl_path: Option<PathBuf>) -> Self {
        Self { kubectl_path }
    }

    /// Returns the kubectl path if found.
    pub fn kubectl_path(&self) -> Option<&PathBuf> {
        self.kubectl_path.as_ref()
    }

    /// Returns true if kubectl is available.
    pub fn is_kubectl_available(&self) -> bool {
        self.kubectl_path.is_some()
    }

    /// Returns the kubectl path or `KubectlNotFound`.
    pub fn require_kubectl(&self) -> Result<&Path> {
        self.kubectl_path
            .as_deref()
            .ok_or(KubectlError::KubectlNotFound)
    }
}

impl Default for KubernetesDiscovery {
    fn default() -> Self {
        Self::new()
    }
}

/// Finds an executable in the given paths.
fn find_executable(paths: &[&str]) -> Option<PathBuf> {
    for path in paths {
        let path_buf = PathBuf::from(path);
        if path_buf.exists() {
            return Some(path_buf);
        }
    }
    None
}
