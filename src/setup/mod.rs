//! Environment verification and (re)initialization.
//!
//! [`Setup::ensure`] checks the required layout and refuses to run on
//! a broken install; [`Setup::initialize`] (re)creates the whole tree
//! from the current configuration and restarts the proxy. A missing
//! entry is never patched in place — repair is always a full `init`.

pub mod proxy;
pub mod ssh;

use std::fs;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::{Config, ConfigStore, Layout};
use crate::error::{Error, Result};
use crate::output;
use crate::proxy::ProxyLifecycle;

/// Interactive yes/no decision, injected so the reconciler can be
/// tested without a real terminal.
pub trait Confirm: Send + Sync {
    fn confirm(&self) -> Result<bool>;
}

/// Reads one line from stdin; only `y`/`Y` confirms, anything else
/// (including empty input) declines.
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&self) -> Result<bool> {
        let mut line = String::new();
        io::stdin()
            .lock()
            .read_line(&mut line)
            .map_err(Error::Prompt)?;
        Ok(matches!(line.trim(), "y" | "Y"))
    }
}

/// Verifies and (re)creates the on-disk environment.
pub struct Setup<'a> {
    config: Arc<ConfigStore>,
    proxy: &'a dyn ProxyLifecycle,
    confirm: &'a dyn Confirm,
}

impl<'a> Setup<'a> {
    pub fn new(
        config: Arc<ConfigStore>,
        proxy: &'a dyn ProxyLifecycle,
        confirm: &'a dyn Confirm,
    ) -> Self {
        Self {
            config,
            proxy,
            confirm,
        }
    }

    fn layout(&self) -> &Layout {
        self.config.layout()
    }

    /// Check that every required directory and file exists, in fixed
    /// order. The first missing entry aborts; nothing is repaired.
    pub fn ensure(&self) -> Result<()> {
        let layout = self.layout();
        for dir in layout.required_dirs() {
            if !dir.exists() {
                return Err(Self::missing(dir));
            }
        }
        for file in layout.required_files() {
            if !file.exists() {
                return Err(Self::missing(file));
            }
        }
        Ok(())
    }

    fn missing(path: PathBuf) -> Error {
        output::warning("Note that the files in ~/.trellis may be overwritten by `trellis init`");
        Error::LayoutMissing { path }
    }

    /// Create or re-create the full environment.
    ///
    /// An existing install asks for confirmation first; declining
    /// leaves every file untouched and starts the proxy on the
    /// existing configuration. A failed initialize may leave a subset
    /// of files written — there is no rollback, re-running `init`
    /// overwrites them.
    pub async fn initialize(&self) -> Result<()> {
        let layout = self.layout();

        if layout.exists() {
            output::warning(&format!(
                "trellis is already initialized at {}",
                layout.root().display()
            ));
            output::warning(
                "Do you want to reinitialize? This will overwrite existing configuration. (y/N)",
            );
            let confirmed = self.confirm.confirm()?;
            output::blank();

            if !confirmed {
                return self.proxy.start().await;
            }
        }

        output::info("Initializing trellis..");
        self.write_layout().await?;

        output::success("trellis initialized successfully!");
        output::blank();

        self.proxy.restart().await
    }

    async fn write_layout(&self) -> Result<()> {
        let layout = self.layout();

        for dir in [layout.containers_dir(), layout.certs_dir()] {
            fs::create_dir_all(&dir).map_err(|source| Error::CreateDir {
                path: dir.clone(),
                source,
            })?;
        }

        // Forced reload: a reinitialize must render whatever is on
        // disk right now, not a stale cache.
        let config = self.config.load(true).await?;
        write_file(&layout.config_file(), &render_config(&config)?)?;

        proxy::write_files(layout)?;
        ssh::write_files(layout)?;
        Ok(())
    }
}

/// Serialize the configuration for the top-level `config.yml`.
fn render_config(config: &Config) -> Result<String> {
    serde_yml::to_string(config).map_err(Error::ConfigRender)
}

/// Write a generated file and report it.
pub(crate) fn write_file(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).map_err(|source| Error::WriteFile {
        path: path.to_path_buf(),
        source,
    })?;
    output::info(&format!("Created {}", path.display()));
    Ok(())
}
