//! 테스트용 Mock 런타임

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::SystemTime;

use registrator_core::error::RuntimeError;
use registrator_core::event::{EventStream, event_channel};
use registrator_core::runtime::ContainerRuntime;
use registrator_core::types::{ContainerInfo, PortBinding};
use tokio::sync::Mutex;

/// 설정 가능한 컨테이너 목록을 돌려주는 mock 런타임
#[derive(Default)]
pub struct MockRuntime {
    containers: Mutex<Vec<ContainerInfo>>,
    fail_list: AtomicBool,
}

impl MockRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_containers(self, containers: Vec<ContainerInfo>) -> Self {
        Self {
            containers: Mutex::new(containers),
            ..self
        }
    }

    pub fn with_failing_list(self) -> Self {
        self.fail_list.store(true, Ordering::SeqCst);
        self
    }

    /// 컨테이너를 종료 상태로 바꿉니다.
    pub async fn exit(&self, id: &str, code: i64) {
        let mut containers = self.containers.lock().await;
        if let Some(c) = containers.iter_mut().find(|c| c.id == id) {
            c.running = false;
            c.exit_code = Some(code);
        }
    }

    /// 컨테이너를 삭제합니다.
    pub async fn remove(&self, id: &str) {
        self.containers.lock().await.retain(|c| c.id != id);
    }

    pub async fn insert(&self, container: ContainerInfo) {
        self.containers.lock().await.push(container);
    }
}

impl ContainerRuntime for MockRuntime {
    async fn ping(&self) -> Result<(), RuntimeError> {
        Ok(())
    }

    async fn list_containers(&self) -> Result<Vec<ContainerInfo>, RuntimeError> {
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(RuntimeError::Api("mock list failure".to_owned()));
        }
        Ok(self
            .containers
            .lock()
            .await
            .iter()
            .filter(|c| c.running)
            .cloned()
            .collect())
    }

    async fn inspect_container(&self, id: &str) -> Result<ContainerInfo, RuntimeError> {
        self.containers
            .lock()
            .await
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| RuntimeError::ContainerNotFound(id.to_owned()))
    }

    async fn subscribe(&self, _since: SystemTime) -> Result<EventStream, RuntimeError> {
        let (_tx, rx) = event_channel();
        Ok(rx)
    }
}

/// 포트 하나가 게시된 실행 중 컨테이너
pub fn web_container(id: &str, name: &str, host_port: u16) -> ContainerInfo {
    ContainerInfo {
        id: id.to_owned(),
        name: name.to_owned(),
        image: "nginx:latest".to_owned(),
        running: true,
        exit_code: None,
        ip_address: "172.17.0.2".to_owned(),
        global_ipv6_address: String::new(),
        ports: vec![PortBinding {
            container_port: 80,
            protocol: "tcp".to_owned(),
            host_ip: "0.0.0.0".to_owned(),
            host_port: Some(host_port),
        }],
    }
}
