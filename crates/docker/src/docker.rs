//! Docker API client backed by `bollard`.
//!
//! [`BollardDockerClient`] implements [`ContainerRuntime`] for the Docker Engine.
//!
//! # Container ID Validation
//!
//! All methods that accept container IDs validate them first:
//! - Must be 1-64 characters
//! - Must contain only ASCII hex digits ([0-9a-fA-F])
//!
//! # Event subscription
//!
//! [`subscribe`](ContainerRuntime::subscribe) requests `/events` with `since` set to the
//! subscription timestamp, so Docker replays every container event emitted after that
//! point even if the HTTP stream attaches later. A forwarding task pushes converted
//! events into a bounded channel and waits when it is full; nothing is dropped.
//!
//! # Examples
//!
//! ```ignore
//! use registrator_docker::BollardDockerClient;
//!
//! let client = BollardDockerClient::connect("")?;
//! let containers = client.list_containers().await?;
//! # Ok::<(), registrator_core::RuntimeError>(())
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use bollard::container::ListContainersOptions;
use bollard::system::EventsOptions;
use futures_util::StreamExt;
use registrator_core::error::RuntimeError;
use registrator_core::event::{EventStream, event_channel};
use registrator_core::runtime::ContainerRuntime;
use registrator_core::types::{ContainerInfo, short_id};
use tracing::{debug, info, warn};

use crate::convert::{container_from_inspect, lifecycle_event};

/// Connection timeout passed to bollard (seconds).
const CONNECT_TIMEOUT_SECS: u64 = 120;

/// Validates a container ID before it is placed in an API path.
pub fn validate_container_id(id: &str) -> Result<(), RuntimeError> {
    if id.is_empty() || id.len() > 64 {
        return Err(RuntimeError::InvalidContainerId {
            id: id.to_owned(),
            reason: format!("length {} (must be 1-64)", id.len()),
        });
    }
    if !id.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(RuntimeError::InvalidContainerId {
            id: id.to_owned(),
            reason: "contains non-hex characters".to_owned(),
        });
    }
    Ok(())
}

fn map_api_error(id: &str, op: &str, e: bollard::errors::Error) -> RuntimeError {
    match e {
        bollard::errors::Error::DockerResponseServerError {
            status_code: 404, ..
        } => RuntimeError::ContainerNotFound(id.to_owned()),
        other => RuntimeError::Api(format!("{op} failed: {other}")),
    }
}

/// Production runtime client communicating with the Docker daemon.
///
/// Internally uses `Arc<bollard::Docker>` so the event forwarder can outlive a call.
#[derive(Clone)]
pub struct BollardDockerClient {
    docker: Arc<bollard::Docker>,
}

impl BollardDockerClient {
    /// Connects according to a `docker_host` setting.
    ///
    /// - empty: platform local defaults (honours `DOCKER_HOST`)
    /// - `unix://PATH` or a bare path: Unix socket
    /// - `tcp://HOST:PORT` or `http://HOST:PORT`: plain HTTP
    pub fn connect(docker_host: &str) -> Result<Self, RuntimeError> {
        let docker_host = docker_host.trim();
        if docker_host.is_empty() {
            return Self::connect_local();
        }
        if let Some(addr) = docker_host
            .strip_prefix("tcp://")
            .or_else(|| docker_host.strip_prefix("http://"))
        {
            return Self::connect_with_http(addr);
        }
        let socket_path = docker_host.strip_prefix("unix://").unwrap_or(docker_host);
        Self::connect_with_socket(socket_path)
    }

    /// Connects to Docker using the default local socket.
    pub fn connect_local() -> Result<Self, RuntimeError> {
        let docker = bollard::Docker::connect_with_local_defaults().map_err(|e| {
            RuntimeError::Connection(format!("failed to connect to docker: {e}"))
        })?;
        Ok(Self {
            docker: Arc::new(docker),
        })
    }

    /// Connects to Docker using a specific socket path.
    pub fn connect_with_socket(socket_path: &str) -> Result<Self, RuntimeError> {
        let docker = bollard::Docker::connect_with_socket(
            socket_path,
            CONNECT_TIMEOUT_SECS,
            bollard::API_DEFAULT_VERSION,
        )
        .map_err(|e| {
            RuntimeError::Connection(format!(
                "failed to connect to docker at {socket_path}: {e}"
            ))
        })?;
        Ok(Self {
            docker: Arc::new(docker),
        })
    }

    /// Connects to a Docker daemon listening on TCP.
    pub fn connect_with_http(addr: &str) -> Result<Self, RuntimeError> {
        let docker = bollard::Docker::connect_with_http(
            addr,
            CONNECT_TIMEOUT_SECS,
            bollard::API_DEFAULT_VERSION,
        )
        .map_err(|e| {
            RuntimeError::Connection(format!("failed to connect to docker at {addr}: {e}"))
        })?;
        Ok(Self {
            docker: Arc::new(docker),
        })
    }
}

impl ContainerRuntime for BollardDockerClient {
    async fn ping(&self) -> Result<(), RuntimeError> {
        self.docker
            .ping()
            .await
            .map_err(|e| RuntimeError::Connection(format!("ping failed: {e}")))?;
        Ok(())
    }

    async fn list_containers(&self) -> Result<Vec<ContainerInfo>, RuntimeError> {
        let options = ListContainersOptions::<String> {
            all: false,
            ..Default::default()
        };

        let summaries = self
            .docker
            .list_containers(Some(options))
            .await
            .map_err(|e| RuntimeError::Api(format!("list containers failed: {e}")))?;

        // 요약 응답에는 종료 코드와 전체 네트워크 정보가 없으므로 다시 조회
        let mut result = Vec::with_capacity(summaries.len());
        for summary in summaries {
            let Some(id) = summary.id else { continue };
            match self.inspect_container(&id).await {
                Ok(info) => result.push(info),
                Err(RuntimeError::ContainerNotFound(_)) => {
                    debug!(container_id = short_id(&id), "container vanished while listing");
                }
                Err(e) => return Err(e),
            }
        }

        Ok(result)
    }

    async fn inspect_container(&self, id: &str) -> Result<ContainerInfo, RuntimeError> {
        validate_container_id(id)?;

        let details = self
            .docker
            .inspect_container(id, None)
            .await
            .map_err(|e| map_api_error(id, "inspect container", e))?;

        Ok(container_from_inspect(details))
    }

    async fn subscribe(&self, since: SystemTime) -> Result<EventStream, RuntimeError> {
        // 스트림은 지연 연결되므로 데몬 도달 여부를 먼저 확인
        self.ping().await?;

        let since_secs = since
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        let mut filters = HashMap::new();
        filters.insert("type".to_owned(), vec!["container".to_owned()]);

        let options = EventsOptions::<String> {
            since: Some(since_secs.to_string()),
            until: None,
            filters,
        };

        let docker = Arc::clone(&self.docker);
        let (tx, rx) = event_channel();

        tokio::spawn(async move {
            let mut stream = std::pin::pin!(docker.events(Some(options)));
            while let Some(item) = stream.next().await {
                match item {
                    Ok(message) => {
                        let Some(event) = lifecycle_event(message) else {
                            continue;
                        };
                        if tx.send(event).await.is_err() {
                            debug!("event receiver dropped, stopping docker event forwarder");
                            return;
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "docker event stream failed");
                        return;
                    }
                }
            }
            info!("docker event stream ended");
        });

        info!(since = since_secs, "subscribed to docker container events");
        Ok(rx)
    }
}
