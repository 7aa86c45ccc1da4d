//! trellis — local developer-environment proxy manager.
//!
//! Provisions and supervises a reverse-proxy stack under Docker: a
//! shared virtual network, a Traefik routing/TLS-terminating container
//! managed through docker compose, and a generated ssh-tunnel service
//! definition. The interesting parts are the idempotent lifecycle of
//! the two coupled resources ([`proxy`]), pre-start port-conflict
//! detection, and the verification and (re)initialization of the
//! on-disk configuration tree ([`setup`]).

pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod proxy;
pub mod runtime;
pub mod setup;

pub use error::{Error, Result};
