//! Generated configuration for the ssh-tunnel service.
//!
//! The tunnel gives database clients a fixed-credential hop onto the
//! proxy network. Its image is built locally from the generated
//! Dockerfile; the compose file only maps the configured port.

use std::fs;

use crate::config::layout::{COMPOSE_FILE, DOCKERFILE};
use crate::config::Layout;
use crate::error::{Error, Result};
use crate::setup::write_file;

const DOCKER_COMPOSE: &str = r#"name: ${DOCKER_PROJECT_NAME}

services:
  ssh-tunnel:
    build: ./
    container_name: trellis-ssh-tunnel
    restart: unless-stopped
    networks:
      - trellis-default
    ports:
      - "${SSH_PORT}:22"

networks:
  trellis-default:
    name: ${DOCKER_NETWORK_NAME}
    external: true
"#;

const DOCKER_FILE: &str = r#"FROM alpine:latest

# Install OpenSSH server and MariaDB client
RUN apk add --no-cache openssh mariadb-client \
    && rm -rf /var/cache/apk/*

# Create required directories
RUN mkdir -p /var/run/sshd

# Configure SSH with more permissive settings for clients like TablePlus
RUN echo 'PermitRootLogin yes' >> /etc/ssh/sshd_config.d/custom.conf \
    && echo 'PasswordAuthentication yes' >> /etc/ssh/sshd_config.d/custom.conf \
    && echo 'ChallengeResponseAuthentication no' >> /etc/ssh/sshd_config.d/custom.conf \
    && echo 'UsePAM yes' >> /etc/ssh/sshd_config.d/custom.conf \
    && echo 'PermitTunnel yes' >> /etc/ssh/sshd_config.d/custom.conf \
    && echo 'GatewayPorts yes' >> /etc/ssh/sshd_config.d/custom.conf \
    && echo 'AllowTcpForwarding yes' >> /etc/ssh/sshd_config.d/custom.conf \
    && echo 'ClientAliveInterval 30' >> /etc/ssh/sshd_config.d/custom.conf \
    && echo 'ClientAliveCountMax 3' >> /etc/ssh/sshd_config.d/custom.conf \
    && echo 'TCPKeepAlive yes' >> /etc/ssh/sshd_config.d/custom.conf \
    && echo 'LogLevel DEBUG3' >> /etc/ssh/sshd_config.d/custom.conf \
    && echo 'PermitOpen any' >> /etc/ssh/sshd_config.d/custom.conf \
    && echo 'AllowStreamLocalForwarding yes' >> /etc/ssh/sshd_config.d/custom.conf

# Create a tunnel user with a simple password
RUN adduser -D -s /bin/sh trellis \
    && echo "trellis:trellis" | chpasswd

# Generate host keys
RUN ssh-keygen -A

# Expose SSH port
EXPOSE 22

# Start SSH daemon with debugging
CMD ["/usr/sbin/sshd", "-D", "-e"]
"#;

/// Render the tunnel's compose file and Dockerfile into the layout.
pub fn write_files(layout: &Layout) -> Result<()> {
    let dir = layout.ssh_dir();
    fs::create_dir_all(&dir).map_err(|source| Error::CreateDir {
        path: dir.clone(),
        source,
    })?;

    write_file(&dir.join(COMPOSE_FILE), DOCKER_COMPOSE)?;
    write_file(&dir.join(DOCKERFILE), DOCKER_FILE)?;
    Ok(())
}
