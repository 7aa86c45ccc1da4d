//! On-disk layout of the trellis home directory.
//!
//! Everything trellis writes lives under `~/.trellis`:
//!
//! ```text
//! ~/.trellis/
//!   config.yml
//!   certs/
//!   containers/
//!     proxy/
//!       docker-compose.yml
//!       traefik.yml
//!     ssh/
//!       docker-compose.yml
//!       Dockerfile
//! ```
//!
//! [`Layout`] derives every path from a single root so tests can point
//! it at a temporary directory.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Directory under the user's home that holds all trellis state.
pub const APP_DIR: &str = ".trellis";

/// Top-level configuration file name.
pub const CONFIG_FILE: &str = "config.yml";
/// Directory for container configurations.
pub const CONTAINERS_DIR: &str = "containers";
/// Directory for TLS certificates picked up by the proxy.
pub const CERTS_DIR: &str = "certs";
/// Proxy configuration directory, under `containers/`.
pub const PROXY_DIR: &str = "proxy";
/// SSH-tunnel configuration directory, under `containers/`.
pub const SSH_DIR: &str = "ssh";

/// Compose file name, shared by the proxy and ssh services.
pub const COMPOSE_FILE: &str = "docker-compose.yml";
/// Traefik configuration file name.
pub const TRAEFIK_FILE: &str = "traefik.yml";
/// Dockerfile name for the ssh-tunnel image.
pub const DOCKERFILE: &str = "Dockerfile";

/// Resolves every path of the required on-disk layout from one root.
#[derive(Debug, Clone)]
pub struct Layout {
    root: PathBuf,
}

impl Layout {
    /// Layout rooted at `~/.trellis` in the current user's home.
    pub fn discover() -> Result<Self> {
        let home = dirs::home_dir().ok_or(Error::HomeDirUnavailable)?;
        Ok(Self {
            root: home.join(APP_DIR),
        })
    }

    /// Layout rooted at an explicit directory.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The application home directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether the application home directory exists at all.
    pub fn exists(&self) -> bool {
        self.root.exists()
    }

    /// Path of the top-level `config.yml`.
    pub fn config_file(&self) -> PathBuf {
        self.root.join(CONFIG_FILE)
    }

    /// Path of the `containers/` directory.
    pub fn containers_dir(&self) -> PathBuf {
        self.root.join(CONTAINERS_DIR)
    }

    /// Path of the `certs/` directory.
    pub fn certs_dir(&self) -> PathBuf {
        self.root.join(CERTS_DIR)
    }

    /// Path of the proxy configuration directory.
    pub fn proxy_dir(&self) -> PathBuf {
        self.containers_dir().join(PROXY_DIR)
    }

    /// Path of the ssh-tunnel configuration directory.
    pub fn ssh_dir(&self) -> PathBuf {
        self.containers_dir().join(SSH_DIR)
    }

    /// Directories that must exist for trellis to consider itself
    /// installed, in verification order.
    pub fn required_dirs(&self) -> Vec<PathBuf> {
        vec![
            self.root.clone(),
            self.containers_dir(),
            self.certs_dir(),
            self.proxy_dir(),
            self.ssh_dir(),
        ]
    }

    /// Files that must exist for trellis to consider itself installed,
    /// in verification order.
    pub fn required_files(&self) -> Vec<PathBuf> {
        vec![
            self.config_file(),
            self.proxy_dir().join(COMPOSE_FILE),
            self.proxy_dir().join(TRAEFIK_FILE),
            self.ssh_dir().join(COMPOSE_FILE),
            self.ssh_dir().join(DOCKERFILE),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_derive_from_root() {
        let layout = Layout::with_root("/tmp/home/.trellis");
        assert_eq!(layout.config_file(), Path::new("/tmp/home/.trellis/config.yml"));
        assert_eq!(
            layout.proxy_dir(),
            Path::new("/tmp/home/.trellis/containers/proxy")
        );
        assert_eq!(
            layout.ssh_dir(),
            Path::new("/tmp/home/.trellis/containers/ssh")
        );
    }

    #[test]
    fn test_required_layout_order() {
        let layout = Layout::with_root("/r");
        let dirs = layout.required_dirs();
        assert_eq!(dirs.len(), 5);
        assert_eq!(dirs[0], Path::new("/r"));
        assert_eq!(dirs[1], Path::new("/r/containers"));

        let files = layout.required_files();
        assert_eq!(files.len(), 5);
        assert_eq!(files[0], Path::new("/r/config.yml"));
        assert_eq!(files[4], Path::new("/r/containers/ssh/Dockerfile"));
    }
}
