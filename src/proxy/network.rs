//! Docker network controller for the proxy stack.
//!
//! Manages the single named virtual network the proxy and ssh
//! containers attach to. Presence is re-derived from the runtime on
//! every decision; nothing is cached in-process.

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::ConfigStore;
use crate::error::Result;
use crate::output;
use crate::proxy::ManagedResource;
use crate::runtime::{ContainerCli, Invocation};

/// Controller for the shared proxy network.
pub struct NetworkResource<C> {
    cli: Arc<C>,
    config: Arc<ConfigStore>,
}

impl<C: ContainerCli> NetworkResource<C> {
    pub fn new(cli: Arc<C>, config: Arc<ConfigStore>) -> Self {
        Self { cli, config }
    }
}

#[async_trait]
impl<C: ContainerCli> ManagedResource for NetworkResource<C> {
    /// Whether a network with the configured name exists. Any probe
    /// error is treated as "not running" so a later start re-creates
    /// the network instead of failing hard.
    async fn is_running(&self) -> bool {
        let config = match self.config.get().await {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(%err, "configuration unavailable, treating proxy network as absent");
                return false;
            }
        };
        self.cli
            .succeeds(&["network", "inspect", &config.docker.network_name])
            .await
    }

    async fn start(&self) -> Result<bool> {
        let config = self.config.get().await?;
        let name = &config.docker.network_name;

        if self.is_running().await {
            output::warning(&format!("Proxy network {name} is already running"));
            return Ok(false);
        }

        output::info(&format!("Starting {name} proxy network.."));
        self.cli
            .run(
                &format!("error starting {name} proxy network"),
                Invocation::new(["network", "create", name.as_str()]),
            )
            .await?;

        output::info_replace(&format!("Proxy network {name} started"));
        Ok(true)
    }

    async fn stop(&self) -> Result<bool> {
        let config = self.config.get().await?;
        let name = &config.docker.network_name;

        if !self.is_running().await {
            output::warning(&format!("Proxy network {name} is already stopped"));
            return Ok(false);
        }

        output::info(&format!("Stopping {name} proxy network.."));
        self.cli
            .run(
                &format!("error stopping {name} proxy network"),
                Invocation::new(["network", "remove", name.as_str()]),
            )
            .await?;

        output::info_replace(&format!("Proxy network {name} was stopped"));
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    use tempfile::tempdir;

    use super::*;
    use crate::config::Layout;
    use crate::error::Error;

    /// Records invocations; `present` drives the inspect probe.
    struct FakeCli {
        present: AtomicBool,
        invocations: Mutex<Vec<Vec<String>>>,
        fail_run: bool,
    }

    impl FakeCli {
        fn new(present: bool) -> Self {
            Self {
                present: AtomicBool::new(present),
                invocations: Mutex::new(Vec::new()),
                fail_run: false,
            }
        }

        fn recorded(&self) -> Vec<Vec<String>> {
            self.invocations.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ContainerCli for FakeCli {
        async fn run(&self, context: &str, invocation: Invocation) -> Result<()> {
            self.invocations.lock().unwrap().push(invocation.args);
            if self.fail_run {
                return Err(Error::Runtime {
                    context: context.to_string(),
                    stderr: "boom".to_string(),
                });
            }
            Ok(())
        }

        async fn capture(&self, _context: &str, _args: &[&str]) -> Result<String> {
            Ok(String::new())
        }

        async fn succeeds(&self, _args: &[&str]) -> bool {
            self.present.load(Ordering::SeqCst)
        }
    }

    fn network(cli: Arc<FakeCli>) -> (NetworkResource<FakeCli>, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let store = Arc::new(ConfigStore::new(Layout::with_root(dir.path().join(".trellis"))));
        (NetworkResource::new(cli, store), dir)
    }

    #[tokio::test]
    async fn test_start_creates_network_when_absent() {
        let cli = Arc::new(FakeCli::new(false));
        let (network, _dir) = network(Arc::clone(&cli));

        assert!(network.start().await.unwrap());
        assert_eq!(cli.recorded(), vec![vec!["network", "create", "trellis"]]);
    }

    #[tokio::test]
    async fn test_start_is_noop_when_running() {
        let cli = Arc::new(FakeCli::new(true));
        let (network, _dir) = network(Arc::clone(&cli));

        assert!(!network.start().await.unwrap());
        assert!(cli.recorded().is_empty());
    }

    #[tokio::test]
    async fn test_stop_is_noop_when_absent() {
        let cli = Arc::new(FakeCli::new(false));
        let (network, _dir) = network(Arc::clone(&cli));

        assert!(!network.stop().await.unwrap());
        assert!(cli.recorded().is_empty());
    }

    #[tokio::test]
    async fn test_stop_removes_network_when_running() {
        let cli = Arc::new(FakeCli::new(true));
        let (network, _dir) = network(Arc::clone(&cli));

        assert!(network.stop().await.unwrap());
        assert_eq!(cli.recorded(), vec![vec!["network", "remove", "trellis"]]);
    }

    #[tokio::test]
    async fn test_ensure_starts_only_when_absent() {
        let cli = Arc::new(FakeCli::new(true));
        let (present, _dir) = network(Arc::clone(&cli));
        present.ensure().await.unwrap();
        assert!(cli.recorded().is_empty());

        let cli = Arc::new(FakeCli::new(false));
        let (absent, _dir) = network(Arc::clone(&cli));
        absent.ensure().await.unwrap();
        assert_eq!(cli.recorded().len(), 1);
    }

    #[tokio::test]
    async fn test_start_failure_carries_runtime_stderr() {
        let cli = Arc::new(FakeCli {
            present: AtomicBool::new(false),
            invocations: Mutex::new(Vec::new()),
            fail_run: true,
        });
        let (network, _dir) = network(Arc::clone(&cli));

        let err = network.start().await.unwrap_err();
        assert!(matches!(err, Error::Runtime { ref stderr, .. } if stderr == "boom"));
    }
}
