//! CLI command surface.
//!
//! Subcommands:
//! - Initializing the environment (`init`)
//! - Managing the proxy stack (`proxy start`, `proxy stop`, `proxy restart`)

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "trellis")]
#[command(about = "Local development proxy manager")]
#[command(
    long_about = "trellis provisions and supervises a Traefik reverse-proxy stack under Docker.\nExamples:\n  trellis init  # Create ~/.trellis and start the proxy\n  trellis proxy restart  # Recreate the network and container"
)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Initialize trellis by creating missing directories and config
    /// files in the home directory
    #[command(
        about = "Initialize trellis",
        long_about = "Creates the ~/.trellis layout, renders the proxy and ssh-tunnel configuration and starts the proxy.\nExample: trellis init"
    )]
    Init,

    /// Manage the trellis proxy stack
    #[command(
        subcommand,
        about = "Manage the proxy stack",
        long_about = "Start, stop or restart the proxy network and container.\nExample: trellis proxy start"
    )]
    Proxy(ProxyCommand),
}

#[derive(Subcommand, Debug, Clone)]
pub enum ProxyCommand {
    /// Start the proxy network and container
    Start,

    /// Stop the proxy container and network
    Stop,

    /// Restart the proxy stack
    Restart,
}
