//! Proxy stack lifecycle.
//!
//! The stack is two coupled resources with a fixed dependency order:
//! the shared Docker network and the compose-managed proxy container.
//! The container references the network by name and needs it to exist
//! at creation time, so start brings the network up first; stop tears
//! the container down first so the network is never removed while a
//! container still references it.

pub mod container;
pub mod network;

use std::sync::Arc;

use async_trait::async_trait;

pub use container::{PROXY_CONTAINER_NAME, ProxyContainer};
pub use network::NetworkResource;

use crate::config::ConfigStore;
use crate::error::Result;
use crate::output;
use crate::runtime::DockerCli;

/// A runtime object whose presence is the unit of lifecycle control.
///
/// State is observed fresh from the runtime on every call; starting a
/// running resource and stopping a stopped one are reporting no-ops.
/// `start`/`stop` return whether the resource actually transitioned.
#[async_trait]
pub trait ManagedResource: Send + Sync {
    async fn is_running(&self) -> bool;

    async fn start(&self) -> Result<bool>;

    async fn stop(&self) -> Result<bool>;

    /// Make the resource present, doing nothing if it already is.
    async fn ensure(&self) -> Result<()> {
        if self.is_running().await {
            return Ok(());
        }
        self.start().await.map(|_| ())
    }
}

/// Lifecycle operations of the proxy stack as a whole. Dyn-compatible
/// so the setup reconciler can be handed a fake in tests.
#[async_trait]
pub trait ProxyLifecycle: Send + Sync {
    async fn start(&self) -> Result<()>;
    async fn stop(&self) -> Result<()>;
    async fn restart(&self) -> Result<()>;
    async fn ensure(&self) -> Result<()>;
}

/// Orchestrates the network and container controllers.
pub struct ProxyStack<N, C> {
    network: N,
    container: C,
    config: Arc<ConfigStore>,
}

impl<N, C> ProxyStack<N, C> {
    pub fn new(network: N, container: C, config: Arc<ConfigStore>) -> Self {
        Self {
            network,
            container,
            config,
        }
    }
}

impl ProxyStack<NetworkResource<DockerCli>, ProxyContainer<DockerCli>> {
    /// A stack wired to the real docker CLI.
    pub fn with_docker(config: Arc<ConfigStore>) -> Self {
        let cli = Arc::new(DockerCli);
        Self::new(
            NetworkResource::new(Arc::clone(&cli), Arc::clone(&config)),
            ProxyContainer::new(cli, Arc::clone(&config)),
            config,
        )
    }
}

#[async_trait]
impl<N: ManagedResource, C: ManagedResource> ProxyLifecycle for ProxyStack<N, C> {
    /// Network first, then container; abort on the first failure.
    async fn start(&self) -> Result<()> {
        let network_started = self.network.start().await?;
        let container_started = self.container.start().await?;

        if network_started || container_started {
            output::success("The trellis proxy was successfully started!");
        }

        let config = self.config.get().await?;
        output::success(&format!(
            "Access the dashboard: http://localhost:{}",
            config.proxy.admin_port
        ));
        Ok(())
    }

    /// Reverse order: container first, then network.
    async fn stop(&self) -> Result<()> {
        let container_stopped = self.container.stop().await?;
        let network_stopped = self.network.stop().await?;

        if container_stopped || network_stopped {
            output::success("The trellis proxy was stopped");
        }
        Ok(())
    }

    /// Stop then start; a failed stop skips the start entirely.
    async fn restart(&self) -> Result<()> {
        self.stop().await?;
        self.start().await
    }

    /// Bring both resources up if absent, for command paths that need
    /// the proxy as a prerequisite rather than as the primary action.
    async fn ensure(&self) -> Result<()> {
        self.network.ensure().await?;
        self.container.ensure().await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    use super::*;
    use crate::config::Layout;
    use crate::error::Error;

    type CallLog = Arc<Mutex<Vec<String>>>;

    /// Fake resource that records call order into a shared log.
    struct Recording {
        label: &'static str,
        log: CallLog,
        running: bool,
        fail_stop: bool,
    }

    impl Recording {
        fn new(label: &'static str, log: CallLog) -> Self {
            Self {
                label,
                log,
                running: false,
                fail_stop: false,
            }
        }

        fn push(&self, op: &str) {
            self.log.lock().unwrap().push(format!("{}:{op}", self.label));
        }
    }

    #[async_trait]
    impl ManagedResource for Recording {
        async fn is_running(&self) -> bool {
            self.running
        }

        async fn start(&self) -> Result<bool> {
            self.push("start");
            Ok(true)
        }

        async fn stop(&self) -> Result<bool> {
            self.push("stop");
            if self.fail_stop {
                return Err(Error::Runtime {
                    context: format!("error stopping {}", self.label),
                    stderr: "boom".to_string(),
                });
            }
            Ok(true)
        }
    }

    fn stack_with(
        network: Recording,
        container: Recording,
    ) -> (ProxyStack<Recording, Recording>, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let config = Arc::new(ConfigStore::new(Layout::with_root(dir.path().join(".trellis"))));
        (ProxyStack::new(network, container, config), dir)
    }

    #[tokio::test]
    async fn test_start_brings_network_up_before_container() {
        let log: CallLog = Arc::default();
        let (stack, _dir) = stack_with(
            Recording::new("network", Arc::clone(&log)),
            Recording::new("container", Arc::clone(&log)),
        );

        stack.start().await.unwrap();
        assert_eq!(*log.lock().unwrap(), ["network:start", "container:start"]);
    }

    #[tokio::test]
    async fn test_stop_tears_container_down_before_network() {
        let log: CallLog = Arc::default();
        let (stack, _dir) = stack_with(
            Recording::new("network", Arc::clone(&log)),
            Recording::new("container", Arc::clone(&log)),
        );

        stack.stop().await.unwrap();
        assert_eq!(*log.lock().unwrap(), ["container:stop", "network:stop"]);
    }

    #[tokio::test]
    async fn test_restart_skips_start_when_stop_fails() {
        let log: CallLog = Arc::default();
        let network = Recording::new("network", Arc::clone(&log));
        let mut container = Recording::new("container", Arc::clone(&log));
        container.fail_stop = true;
        let (stack, _dir) = stack_with(network, container);

        let err = stack.restart().await.unwrap_err();
        assert!(matches!(err, Error::Runtime { .. }));
        assert_eq!(*log.lock().unwrap(), ["container:stop"]);
    }

    #[tokio::test]
    async fn test_restart_runs_full_cycle_when_stop_succeeds() {
        let log: CallLog = Arc::default();
        let (stack, _dir) = stack_with(
            Recording::new("network", Arc::clone(&log)),
            Recording::new("container", Arc::clone(&log)),
        );

        stack.restart().await.unwrap();
        assert_eq!(
            *log.lock().unwrap(),
            [
                "container:stop",
                "network:stop",
                "network:start",
                "container:start"
            ]
        );
    }

    #[tokio::test]
    async fn test_ensure_starts_absent_resources_in_order() {
        let log: CallLog = Arc::default();
        let (stack, _dir) = stack_with(
            Recording::new("network", Arc::clone(&log)),
            Recording::new("container", Arc::clone(&log)),
        );

        stack.ensure().await.unwrap();
        assert_eq!(*log.lock().unwrap(), ["network:start", "container:start"]);
    }

    #[tokio::test]
    async fn test_ensure_is_a_noop_when_everything_runs() {
        let log: CallLog = Arc::default();
        let mut network = Recording::new("network", Arc::clone(&log));
        let mut container = Recording::new("container", Arc::clone(&log));
        network.running = true;
        container.running = true;
        let (stack, _dir) = stack_with(network, container);

        stack.ensure().await.unwrap();
        assert!(log.lock().unwrap().is_empty());
    }
}
