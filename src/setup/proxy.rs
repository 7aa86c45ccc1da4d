//! Generated configuration for the Traefik proxy service.
//!
//! The compose file is static text; docker compose resolves the
//! `${VAR}` references from the environment overlay the container
//! controller sets on every up/down invocation.

use std::fs;

use crate::config::layout::{COMPOSE_FILE, TRAEFIK_FILE};
use crate::config::Layout;
use crate::error::{Error, Result};
use crate::setup::write_file;

const DOCKER_COMPOSE: &str = r#"name: ${DOCKER_PROJECT_NAME}

services:
  proxy:
    image: ${DOCKER_IMAGE_PROXY}
    container_name: trellis-proxy
    restart: unless-stopped
    networks:
      - trellis-default
    ports:
      - "${HTTP_PORT}:80"
      - "${HTTPS_PORT}:443"
      - "${ADMIN_PORT}:8080"
    volumes:
      - ./traefik.yml:/etc/traefik/traefik.yml:ro
      - ${CONFIG_ROOT:-./../..}/certs/:/etc/traefik/certs/:ro
      - ${DOCKER_SOCK:-/var/run/docker.sock}:/var/run/docker.sock:ro

networks:
  trellis-default:
    name: ${DOCKER_NETWORK_NAME}
    external: true
"#;

const TRAEFIK: &str = r#"api:
  dashboard: true
  insecure: true

entryPoints:
  web:
    address: ":80"
  websecure:
    address: ":443"

providers:
  docker:
    endpoint: "unix:///var/run/docker.sock"
    exposedByDefault: false
    network: trellis
  file:
    directory: "/etc/traefik/certs/"
    watch: true

log:
  level: "DEBUG"

accessLog:
  filePath: "/var/log/traefik/access.log"
  format: json
"#;

/// Render the proxy's compose and Traefik files into the layout.
pub fn write_files(layout: &Layout) -> Result<()> {
    let dir = layout.proxy_dir();
    fs::create_dir_all(&dir).map_err(|source| Error::CreateDir {
        path: dir.clone(),
        source,
    })?;

    write_file(&dir.join(COMPOSE_FILE), DOCKER_COMPOSE)?;
    write_file(&dir.join(TRAEFIK_FILE), TRAEFIK)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_writes_compose_and_traefik() {
        let dir = tempdir().unwrap();
        let layout = Layout::with_root(dir.path().join(".trellis"));

        write_files(&layout).unwrap();

        let compose = fs::read_to_string(layout.proxy_dir().join(COMPOSE_FILE)).unwrap();
        assert!(compose.contains("${HTTP_PORT}:80"));
        assert!(compose.contains("${HTTPS_PORT}:443"));
        assert!(compose.contains("${ADMIN_PORT}:8080"));
        assert!(compose.contains("external: true"));

        let traefik = fs::read_to_string(layout.proxy_dir().join(TRAEFIK_FILE)).unwrap();
        assert!(traefik.contains("dashboard: true"));
        assert!(traefik.contains("websecure"));
        assert!(traefik.contains("watch: true"));
    }
}
