//! Capture settings and persisted user defaults.
//!
//! Defaults are stored in JSON format at `~/.ksniff/config.json`. Values
//! given on the command line take precedence over stored ones.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::domain::CaptureTarget;
use crate::error::{Error, Result};

/// Default debug image; ships tcpdump.
pub const DEFAULT_TCPDUMP_IMAGE: &str = "docker.io/nicolaka/netshoot:v0.14";

pub const DEFAULT_NAMESPACE: &str = "default";

pub const DEFAULT_INTERFACE: &str = "any";

/// How long to wait for the debug container to start.
pub const DEFAULT_CONTAINER_TIMEOUT: Duration = Duration::from_secs(60);

/// Everything a capture session needs, already resolved from flags and defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnifferSettings {
    pub pod: String,
    pub namespace: String,
    /// Container whose network the capture observes.
    pub container: String,
    pub interface: String,
    /// Capture filter expression; empty captures everything.
    #[serde(default)]
    pub filter: String,
    /// Overrides [`DEFAULT_TCPDUMP_IMAGE`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default = "default_container_timeout")]
    pub container_timeout: Duration,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kube_context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kubeconfig: Option<PathBuf>,
}

fn default_container_timeout() -> Duration {
    DEFAULT_CONTAINER_TIMEOUT
}

impl SnifferSettings {
    /// Creates settings for a pod and container with all other values defaulted.
    pub fn new(pod: impl Into<String>, container: impl Into<String>) -> Self {
        Self {
            pod: pod.into(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            container: container.into(),
            interface: DEFAULT_INTERFACE.to_string(),
            filter: String::new(),
            image: None,
            container_timeout: DEFAULT_CONTAINER_TIMEOUT,
            kube_context: None,
            kubeconfig: None,
        }
    }

    /// Rejects settings a session cannot run with.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("pod", &self.pod),
            ("namespace", &self.namespace),
            ("container", &self.container),
            ("interface", &self.interface),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(Error::Config(format!("{} must not be empty", name)));
            }
        }

        if self.container_timeout.is_zero() {
            return Err(Error::Config(
                "container timeout must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    /// The image override, or the built-in default.
    pub fn effective_image(&self) -> &str {
        match self.image.as_deref() {
            Some(image) if !image.is_empty() => image,
            _ => DEFAULT_TCPDUMP_IMAGE,
        }
    }

    pub fn target(&self) -> CaptureTarget {
        CaptureTarget::new(&self.namespace, &self.pod, &self.container)
    }
}

/// User defaults stored on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredDefaults {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interface: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_timeout_secs: Option<u64>,
}

impl StoredDefaults {
    /// Fills every value `settings` left at its built-in default.
    pub fn apply(&self, settings: &mut SnifferSettings) {
        if let Some(namespace) = &self.namespace {
            if settings.namespace == DEFAULT_NAMESPACE {
                settings.namespace = namespace.clone();
            }
        }
        if let Some(interface) = &self.interface {
            if settings.interface == DEFAULT_INTERFACE {
                settings.interface = interface.clone();
            }
        }
        if settings.image.is_none() {
            settings.image = self.image.clone();
        }
        if let Some(secs) = self.container_timeout_secs {
            if settings.container_timeout == DEFAULT_CONTAINER_TIMEOUT {
                settings.container_timeout = Duration::from_secs(secs);
            }
        }
    }
}

/// Reads and writes `~/.ksniff/config.json`.
pub struct SettingsStore {
    /// Path to the configuration file.
    config_path: PathBuf,
}

impl SettingsStore {
    /// Create a new settings store with the default path.
    ///
    /// Default path: `~/.ksniff/config.json`
    pub fn new() -> Result<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| Error::Config("Could not determine home directory".to_string()))?;
        let config_path = home.join(".ksniff").join("config.json");

        Ok(Self { config_path })
    }

    /// Create a settings store with a custom path (for testing).
    pub fn with_path(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    pub fn config_path(&self) -> &PathBuf {
        &self.config_path
    }

    /// Load stored defaults.
    ///
    /// Returns empty defaults if the file doesn't exist.
    pub async fn load(&self) -> Result<StoredDefaults> {
        if !self.config_path.exists() {
            return Ok(StoredDefaults::default());
        }

        let content = fs::read_to_string(&self.config_path)
            .await
            .map_err(|e| Error::Config(format!("Failed to read config: {}", e)))?;

        serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Save defaults to disk, creating the directory if needed.
    pub async fn save(&self, defaults: &StoredDefaults) -> Result<()> {
        if let Some(config_dir) = self.config_path.parent() {
            fs::create_dir_all(config_dir)
                .await
                .map_err(|e| Error::Config(format!("Failed to create config directory: {}", e)))?;
        }

        let content = serde_json::to_string_pretty(defaults)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;

        // Write atomically by writing to temp file then renaming
        let temp_path = self.config_path.with_extension("json.tmp");

        let mut file = fs::File::create(&temp_path)
            .await
            .map_err(|e| Error::Config(format!("Failed to create temp config file: {}", e)))?;

        file.write_all(content.as_bytes())
            .await
            .map_err(|e| Error::Config(format!("Failed to write config: {}", e)))?;

        file.sync_all()
            .await
            .map_err(|e| Error::Config(format!("Failed to sync config: {}", e)))?;

        fs::rename(&temp_path, &self.config_path)
            .await
            .map_err(|e| Error::Config(format!("Failed to rename config file: {}", e)))?;

        Ok(())
    }
}
