//! Docker CLI invocation.
//!
//! The controllers talk to the container runtime exclusively through
//! the `docker` binary; the exit code and the child's stderr are the
//! only feedback channels. [`ContainerCli`] is the seam the resource
//! controllers are written against, so tests can substitute a
//! recording fake.

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::{Error, Result};

/// Name of the container runtime binary.
pub const PROGRAM: &str = "docker";

/// One runtime invocation: arguments plus an optional working
/// directory and an environment overlay on top of the inherited
/// process environment.
#[derive(Debug, Clone, Default)]
pub struct Invocation {
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub env: Vec<(String, String)>,
}

impl Invocation {
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
            cwd: None,
            env: Vec::new(),
        }
    }

    /// Set the working directory the command runs in.
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// Add one variable to the environment overlay.
    pub fn env(mut self, key: &str, value: impl Into<String>) -> Self {
        self.env.push((key.to_string(), value.into()));
        self
    }
}

/// Container runtime CLI operations used by the resource controllers.
#[async_trait]
pub trait ContainerCli: Send + Sync {
    /// Run an invocation to completion. A non-zero exit becomes a
    /// runtime error carrying the child's stderr verbatim.
    async fn run(&self, context: &str, invocation: Invocation) -> Result<()>;

    /// Run and return trimmed stdout.
    async fn capture(&self, context: &str, args: &[&str]) -> Result<String>;

    /// Probe: true only on a zero exit. Launch failures are logged and
    /// reported as false, never propagated.
    async fn succeeds(&self, args: &[&str]) -> bool;
}

/// The real `docker` binary.
pub struct DockerCli;

impl DockerCli {
    fn command(invocation: &Invocation) -> Command {
        let mut cmd = Command::new(PROGRAM);
        cmd.args(&invocation.args);
        if let Some(dir) = &invocation.cwd {
            cmd.current_dir(dir);
        }
        // The inherited environment stays; the overlay is additive.
        cmd.envs(invocation.env.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        cmd
    }
}

#[async_trait]
impl ContainerCli for DockerCli {
    async fn run(&self, context: &str, invocation: Invocation) -> Result<()> {
        tracing::debug!(args = ?invocation.args, cwd = ?invocation.cwd, "invoking docker");
        let output = Self::command(&invocation)
            .output()
            .await
            .map_err(|source| Error::Launch {
                program: PROGRAM.to_string(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim_end().to_string();
            return Err(Error::Runtime {
                context: context.to_string(),
                stderr,
            });
        }
        Ok(())
    }

    async fn capture(&self, context: &str, args: &[&str]) -> Result<String> {
        let invocation = Invocation::new(args.iter().copied());
        let output = Self::command(&invocation)
            .output()
            .await
            .map_err(|source| Error::Launch {
                program: PROGRAM.to_string(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim_end().to_string();
            return Err(Error::Runtime {
                context: context.to_string(),
                stderr,
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    async fn succeeds(&self, args: &[&str]) -> bool {
        let status = Command::new(PROGRAM)
            .args(args)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;
        match status {
            Ok(status) => status.success(),
            Err(err) => {
                tracing::debug!(%err, "docker probe failed to launch");
                false
            }
        }
    }
}
