//! Compose-stack controller for the proxy container.
//!
//! The proxy runs as a compose stack rendered into
//! `~/.trellis/containers/proxy/`. The controller knows nothing about
//! compose-file syntax; it parameterizes the stack entirely through an
//! environment overlay on the `docker compose` invocation.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::net::TcpStream;

use crate::config::{Config, ConfigStore};
use crate::error::{Error, Result};
use crate::output;
use crate::proxy::ManagedResource;
use crate::runtime::{ContainerCli, Invocation};

/// Container name of the proxy service, fixed in the compose template.
pub const PROXY_CONTAINER_NAME: &str = "trellis-proxy";

/// Controller for the proxy compose stack.
pub struct ProxyContainer<C> {
    cli: Arc<C>,
    config: Arc<ConfigStore>,
}

impl<C: ContainerCli> ProxyContainer<C> {
    pub fn new(cli: Arc<C>, config: Arc<ConfigStore>) -> Self {
        Self { cli, config }
    }

    /// Fail fast if any port the stack binds is already taken.
    ///
    /// Best-effort probe: a port freed between this check and the
    /// launch is not re-validated, and the runtime's own bind failure
    /// remains the final authority.
    async fn verify_ports(&self, config: &Config) -> Result<()> {
        for port in config.required_ports() {
            if port_in_use(port).await {
                return Err(Error::PortInUse { port });
            }
        }
        Ok(())
    }

    /// A `docker compose` invocation rooted in the proxy config
    /// directory, with the variables the compose template expects.
    fn compose_invocation<I, S>(args: I, proxy_dir: &Path, config: &Config) -> Invocation
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Invocation::new(args)
            .current_dir(proxy_dir)
            .env("COMPOSE_IGNORE_ORPHANS", "1")
            .env("DOCKER_SOCK", &config.docker.sock)
            .env("DOCKER_PROJECT_NAME", &config.docker.project_name)
            .env("DOCKER_NETWORK_NAME", &config.docker.network_name)
            .env("DOCKER_IMAGE_PROXY", &config.proxy.image_name)
            .env("HTTP_PORT", config.proxy.http_port.to_string())
            .env("HTTPS_PORT", config.proxy.https_port.to_string())
            .env("ADMIN_PORT", config.proxy.admin_port.to_string())
    }

    fn proxy_dir(&self) -> Result<PathBuf> {
        let dir = self.config.layout().proxy_dir();
        if !dir.exists() {
            return Err(Error::LayoutMissing { path: dir });
        }
        Ok(dir)
    }
}

/// Whether something is already accepting TCP connections on the port.
async fn port_in_use(port: u16) -> bool {
    TcpStream::connect(("127.0.0.1", port)).await.is_ok()
}

#[async_trait]
impl<C: ContainerCli> ManagedResource for ProxyContainer<C> {
    /// Whether a container with the proxy's name is listed as running.
    /// Probe errors are logged and treated as "not running".
    async fn is_running(&self) -> bool {
        let filter = format!("name={PROXY_CONTAINER_NAME}");
        let listed = self
            .cli
            .capture(
                "failed to check if the proxy container is running",
                &["ps", "--filter", &filter, "--format", "{{.Names}}"],
            )
            .await;
        match listed {
            Ok(names) => !names.is_empty(),
            Err(err) => {
                tracing::warn!(%err, "proxy container probe failed");
                false
            }
        }
    }

    async fn start(&self) -> Result<bool> {
        let config = self.config.get().await?;

        if self.is_running().await {
            output::warning(&format!("Proxy {PROXY_CONTAINER_NAME} is already running"));
            return Ok(false);
        }

        self.verify_ports(&config).await?;

        output::info(&format!("Starting {PROXY_CONTAINER_NAME} proxy.."));
        let proxy_dir = self.proxy_dir()?;
        self.cli
            .run(
                &format!("error starting {PROXY_CONTAINER_NAME} proxy"),
                Self::compose_invocation(["compose", "up", "-d"], &proxy_dir, &config),
            )
            .await?;

        output::info_replace(&format!("Proxy {PROXY_CONTAINER_NAME} started"));
        Ok(true)
    }

    async fn stop(&self) -> Result<bool> {
        let config = self.config.get().await?;

        if !self.is_running().await {
            output::warning(&format!("Proxy {PROXY_CONTAINER_NAME} is already stopped"));
            return Ok(false);
        }

        output::info(&format!("Stopping {PROXY_CONTAINER_NAME} proxy.."));
        let proxy_dir = self.proxy_dir()?;
        self.cli
            .run(
                &format!("error stopping {PROXY_CONTAINER_NAME} proxy"),
                Self::compose_invocation(["compose", "down", "--remove-orphans"], &proxy_dir, &config),
            )
            .await?;

        output::info_replace(&format!("Proxy {PROXY_CONTAINER_NAME} was stopped"));
        Ok(true)
    }
}
