//! Typed configuration with a lock-guarded process-wide cache.
//!
//! The configuration lives in `~/.trellis/config.yml`. A missing home
//! directory or missing file is the "not yet initialized" case and
//! yields defaults without error; an unreadable, unparsable or invalid
//! file is fatal. Once loaded, the value is cached in the
//! [`ConfigStore`] until a forced reload.

pub mod layout;

use std::fs;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::{Error, Result};
pub use layout::Layout;

/// Version tag written to generated `config.yml` files.
pub const CONFIG_VERSION: &str = "1.0";

/// Application configuration, grouped as it appears in `config.yml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Configuration file format version.
    pub version: String,
    pub docker: DockerConfig,
    pub proxy: ProxyConfig,
    pub ssh: SshConfig,
}

/// Docker-related configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DockerConfig {
    /// Path of the docker socket mounted into the proxy container.
    pub sock: String,
    /// Compose project name.
    pub project_name: String,
    /// Name of the virtual network shared by the managed containers.
    pub network_name: String,
}

/// Reverse-proxy configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProxyConfig {
    /// Traefik image to run.
    pub image_name: String,
    /// Host port mapped to the proxy's HTTP entry point.
    pub http_port: u16,
    /// Host port mapped to the proxy's HTTPS entry point.
    pub https_port: u16,
    /// Host port mapped to the Traefik dashboard.
    pub admin_port: u16,
}

/// SSH-tunnel configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SshConfig {
    /// Image name for the ssh-tunnel service.
    pub image_name: String,
    /// Host port mapped to the tunnel's sshd.
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION.to_string(),
            docker: DockerConfig::default(),
            proxy: ProxyConfig::default(),
            ssh: SshConfig::default(),
        }
    }
}

impl Default for DockerConfig {
    fn default() -> Self {
        Self {
            sock: "/var/run/docker.sock".to_string(),
            project_name: "trellis".to_string(),
            network_name: "trellis".to_string(),
        }
    }
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            image_name: "traefik:3.3.4".to_string(),
            http_port: 80,
            https_port: 443,
            admin_port: 8850,
        }
    }
}

impl Default for SshConfig {
    fn default() -> Self {
        Self {
            image_name: "ssh".to_string(),
            port: 8851,
        }
    }
}

impl Config {
    /// Check that no name, path or image field is empty.
    pub fn validate(&self) -> Result<()> {
        let checks = [
            (self.docker.project_name.is_empty(), "docker project name cannot be empty"),
            (self.docker.network_name.is_empty(), "docker network name cannot be empty"),
            (self.docker.sock.is_empty(), "docker socket path cannot be empty"),
            (self.proxy.image_name.is_empty(), "proxy image name cannot be empty"),
            (self.ssh.image_name.is_empty(), "ssh image name cannot be empty"),
        ];
        for (failed, reason) in checks {
            if failed {
                return Err(Error::InvalidConfig {
                    reason: reason.to_string(),
                });
            }
        }
        Ok(())
    }

    /// The TCP ports that must be free before the container stack is
    /// started, in verification order.
    pub fn required_ports(&self) -> [u16; 4] {
        [
            self.proxy.http_port,
            self.proxy.https_port,
            self.proxy.admin_port,
            self.ssh.port,
        ]
    }
}

/// Lazily loaded, cached configuration, shared by every controller.
///
/// The cache is guarded by a read-write lock: concurrent [`get`]s take
/// the read path, a [`load`] holds the write lock for the whole parse
/// so no caller can observe a half-initialized value.
///
/// [`get`]: ConfigStore::get
/// [`load`]: ConfigStore::load
pub struct ConfigStore {
    layout: Layout,
    cached: RwLock<Option<Arc<Config>>>,
}

impl ConfigStore {
    pub fn new(layout: Layout) -> Self {
        Self {
            layout,
            cached: RwLock::new(None),
        }
    }

    /// The on-disk layout this configuration belongs to.
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Cached configuration, loading it on first use.
    pub async fn get(&self) -> Result<Arc<Config>> {
        if let Some(config) = self.cached.read().await.as_ref() {
            return Ok(Arc::clone(config));
        }
        self.load(false).await
    }

    /// Load the configuration from disk, replacing the cache.
    ///
    /// Without `force`, a value cached while waiting for the write lock
    /// is returned as-is.
    pub async fn load(&self, force: bool) -> Result<Arc<Config>> {
        let mut slot = self.cached.write().await;
        if !force && let Some(config) = slot.as_ref() {
            return Ok(Arc::clone(config));
        }

        let config = Arc::new(self.read_from_disk()?);
        *slot = Some(Arc::clone(&config));
        Ok(config)
    }

    fn read_from_disk(&self) -> Result<Config> {
        let mut config = Config::default();

        // A missing home directory or config file means "not yet
        // initialized": defaults apply, no error.
        let path = self.layout.config_file();
        if self.layout.exists() && path.exists() {
            let raw = fs::read_to_string(&path).map_err(|source| Error::ConfigRead {
                path: path.clone(),
                source,
            })?;
            config = serde_yml::from_str(&raw).map_err(|source| Error::ConfigParse {
                path: path.clone(),
                source,
            })?;
        }

        config.validate()?;
        Ok(config)
    }
}
