//! Error types for trellis operations.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for trellis operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while managing the proxy environment.
///
/// Four broad classes: configuration errors (unreadable, unparsable or
/// invalid config), environment errors (home directory undeterminable,
/// required layout entry missing), runtime errors (the docker CLI could
/// not be launched or exited non-zero) and conflict errors (a required
/// port already bound). None of these are retried; each aborts the
/// operation that hit it.
#[derive(Debug, Error)]
pub enum Error {
    /// The user's home directory could not be determined.
    #[error("home directory could not be determined")]
    HomeDirUnavailable,

    /// The configuration file exists but could not be read.
    #[error("failed to read configuration file {path}: {source}")]
    ConfigRead {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The configuration file could not be parsed as YAML.
    #[error("failed to parse configuration file {path}: {source}")]
    ConfigParse {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying parse error.
        source: serde_yml::Error,
    },

    /// The configuration could not be serialized back to YAML.
    #[error("failed to render configuration: {0}")]
    ConfigRender(#[source] serde_yml::Error),

    /// A loaded configuration failed validation.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// What was wrong with the configuration.
        reason: String,
    },

    /// A directory or file of the required layout is missing.
    #[error("required path missing: {path} (run `trellis init` to repair)")]
    LayoutMissing {
        /// The first missing entry, in layout order.
        path: PathBuf,
    },

    /// A port the proxy stack needs is already bound on localhost.
    #[error("port already in use: {port}")]
    PortInUse {
        /// The conflicting TCP port.
        port: u16,
    },

    /// The container runtime binary could not be launched.
    #[error("failed to launch {program}: {source}")]
    Launch {
        /// Program that failed to spawn.
        program: String,
        /// Underlying spawn error.
        source: io::Error,
    },

    /// The container runtime exited non-zero. The child's stderr is
    /// preserved verbatim.
    #[error("{context}: {stderr}")]
    Runtime {
        /// What was being attempted.
        context: String,
        /// Captured standard-error output.
        stderr: String,
    },

    /// A directory of the layout could not be created.
    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        /// Directory being created.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// A generated file could not be written.
    #[error("failed to write {path}: {source}")]
    WriteFile {
        /// File being written.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Reading the interactive confirmation failed.
    #[error("failed to read input: {0}")]
    Prompt(#[source] io::Error),
}
