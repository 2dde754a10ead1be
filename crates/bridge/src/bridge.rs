//! 레퍼런스 브리지
//!
//! [`Bridge`]는 [`BridgeHandle`] 연산을 컨테이너 조회와 레지스트리 기록으로 옮깁니다.
//! 등록한 레코드는 컨테이너 ID별로 기억해 두었다가 해제와 TTL 갱신에 사용합니다.
//!
//! 레지스트리/런타임 실패는 여기서 로그로 남기고 삼킵니다. 호출자에게 전파되는
//! 에러는 [`BridgeHandle::ping`]뿐입니다.

use std::collections::{HashMap, HashSet};

use registrator_core::bridge::BridgeHandle;
use registrator_core::config::BridgeConfig;
use registrator_core::error::{BridgeError, RegistratorError};
use registrator_core::metrics as m;
use registrator_core::runtime::ContainerRuntime;
use registrator_core::types::{ContainerInfo, DeregisterMode, ServiceRecord, short_id};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::registry::{Registry, RegistryAdapter, connect};
use crate::service::services_for;
use crate::settings::BridgeSettings;

/// 런타임과 레지스트리 URL, 설정으로 브리지를 생성합니다.
pub fn new<R: ContainerRuntime>(
    runtime: R,
    registry_url: &str,
    config: &BridgeConfig,
) -> Result<Bridge<R, Registry>, RegistratorError> {
    let settings = BridgeSettings::from_core(config)?;
    let registry = connect(registry_url)?;
    info!(
        registry_url,
        node = settings.node.as_str(),
        address_mode = %settings.address_mode,
        deregister = %settings.deregister,
        ttl = settings.ttl,
        "bridge created"
    );
    Ok(Bridge::with_registry(runtime, registry, settings))
}

/// 컨테이너 런타임과 레지스트리 사이의 브리지
pub struct Bridge<R, A> {
    runtime: R,
    registry: A,
    settings: BridgeSettings,
    /// 컨테이너 ID → 등록된 레코드
    services: Mutex<HashMap<String, Vec<ServiceRecord>>>,
}

impl<R: ContainerRuntime, A: RegistryAdapter> Bridge<R, A> {
    /// 이미 준비된 레지스트리 백엔드로 브리지를 생성합니다.
    pub fn with_registry(runtime: R, registry: A, settings: BridgeSettings) -> Self {
        Self {
            runtime,
            registry,
            settings,
            services: Mutex::new(HashMap::new()),
        }
    }

    pub fn settings(&self) -> &BridgeSettings {
        &self.settings
    }

    pub fn registry(&self) -> &A {
        &self.registry
    }

    /// 브리지가 추적 중인 레코드 (ID 순)
    pub async fn known_services(&self) -> Vec<ServiceRecord> {
        let mut records: Vec<ServiceRecord> = self
            .services
            .lock()
            .await
            .values()
            .flatten()
            .cloned()
            .collect();
        records.sort_by(|a, b| a.id.cmp(&b.id));
        records
    }

    /// 컨테이너의 레코드를 추적 중인지 여부
    pub async fn is_tracked(&self, container_id: &str) -> bool {
        self.services.lock().await.contains_key(container_id)
    }

    async fn register_container(&self, container: &ContainerInfo) {
        let records = services_for(container, &self.settings);
        if records.is_empty() {
            debug!(
                container_id = container.short_id(),
                name = container.name.as_str(),
                "no services to register"
            );
            return;
        }

        let mut registered = Vec::with_capacity(records.len());
        for record in records {
            match self.registry.register(&record).await {
                Ok(()) => {
                    metrics::counter!(m::BRIDGE_REGISTRATIONS_TOTAL, m::LABEL_RESULT => "success")
                        .increment(1);
                    info!(
                        container_id = container.short_id(),
                        service = %record,
                        "service registered"
                    );
                    registered.push(record);
                }
                Err(e) => {
                    metrics::counter!(m::BRIDGE_REGISTRATIONS_TOTAL, m::LABEL_RESULT => "failure")
                        .increment(1);
                    error!(
                        container_id = container.short_id(),
                        service_id = record.id.as_str(),
                        error = %e,
                        "failed to register service"
                    );
                }
            }
        }

        if registered.is_empty() {
            return;
        }
        // 재등록에 실패한 레코드도 해제할 수 있도록 기존 레코드에 병합
        let mut services = self.services.lock().await;
        let tracked = services.entry(container.id.clone()).or_default();
        for record in registered {
            match tracked.iter_mut().find(|r| r.id == record.id) {
                Some(existing) => *existing = record,
                None => tracked.push(record),
            }
        }
        record_gauge(&services);
    }

    async fn deregister_container(&self, container_id: &str) {
        let removed = {
            let mut services = self.services.lock().await;
            let removed = services.remove(container_id);
            record_gauge(&services);
            removed
        };

        let Some(records) = removed else {
            debug!(
                container_id = short_id(container_id),
                "no tracked services for container"
            );
            return;
        };

        for record in records {
            match self.registry.deregister(&record).await {
                Ok(()) => {
                    metrics::counter!(m::BRIDGE_DEREGISTRATIONS_TOTAL, m::LABEL_RESULT => "success")
                        .increment(1);
                    info!(
                        container_id = short_id(container_id),
                        service = %record,
                        "service deregistered"
                    );
                }
                Err(e) => {
                    metrics::counter!(m::BRIDGE_DEREGISTRATIONS_TOTAL, m::LABEL_RESULT => "failure")
                        .increment(1);
                    error!(
                        container_id = short_id(container_id),
                        service_id = record.id.as_str(),
                        error = %e,
                        "failed to deregister service"
                    );
                }
            }
        }
    }

    /// 레지스트리는 건드리지 않고 추적만 중단합니다.
    async fn forget_container(&self, container_id: &str) {
        let mut services = self.services.lock().await;
        services.remove(container_id);
        record_gauge(&services);
    }

    /// 해제 정책에 따라 레코드를 해제할지 결정합니다.
    async fn should_deregister(&self, container_id: &str) -> bool {
        match self.settings.deregister {
            DeregisterMode::Always => true,
            DeregisterMode::OnSuccess => match self.runtime.inspect_container(container_id).await {
                Ok(info) => info.exit_code == Some(0),
                Err(e) => {
                    debug!(
                        container_id = short_id(container_id),
                        error = %e,
                        "container no longer inspectable, deregistering"
                    );
                    true
                }
            },
        }
    }

    /// 이 노드가 등록했지만 컨테이너가 사라진 레코드를 정리합니다.
    async fn cleanup_orphans(&self, running: &HashSet<&str>) {
        let records = match self.registry.services().await {
            Ok(records) => records,
            Err(e) => {
                error!(error = %e, "cleanup skipped: unable to list registry services");
                return;
            }
        };

        let mut removed = 0usize;
        for record in records
            .iter()
            .filter(|r| r.node == self.settings.node && !running.contains(r.container_id.as_str()))
        {
            match self.registry.deregister(record).await {
                Ok(()) => removed += 1,
                Err(e) => warn!(
                    service_id = record.id.as_str(),
                    error = %e,
                    "failed to remove orphaned service"
                ),
            }
        }

        if removed > 0 {
            info!(removed, "removed orphaned services");
        }
    }
}

fn record_gauge(services: &HashMap<String, Vec<ServiceRecord>>) {
    let count: usize = services.values().map(Vec::len).sum();
    metrics::gauge!(m::BRIDGE_SERVICES_REGISTERED).set(count as f64);
}

impl<R: ContainerRuntime, A: RegistryAdapter> BridgeHandle for Bridge<R, A> {
    async fn ping(&self) -> Result<(), BridgeError> {
        self.registry.ping().await
    }

    async fn sync(&self, force: bool) {
        let containers = match self.runtime.list_containers().await {
            Ok(containers) => containers,
            Err(e) => {
                error!(error = %e, force, "sync failed: unable to list containers");
                return;
            }
        };

        info!(containers = containers.len(), force, "syncing services");

        let known: Vec<String> = self.services.lock().await.keys().cloned().collect();
        let running: HashSet<&str> = containers.iter().map(|c| c.id.as_str()).collect();

        for container in &containers {
            if force || !known.contains(&container.id) {
                self.register_container(container).await;
            }
        }

        for id in known.iter().filter(|id| !running.contains(id.as_str())) {
            debug!(
                container_id = short_id(id),
                "tracked container is no longer running"
            );
            self.remove_on_exit(id).await;
        }

        if self.settings.cleanup {
            self.cleanup_orphans(&running).await;
        }
    }

    async fn refresh(&self) {
        if self.settings.ttl == 0 {
            debug!("refresh skipped: services have no ttl");
            return;
        }

        let records = self.known_services().await;
        for record in &records {
            if let Err(e) = self.registry.refresh(record).await {
                warn!(
                    service_id = record.id.as_str(),
                    error = %e,
                    "ttl refresh failed, re-registering"
                );
                if let Err(e) = self.registry.register(record).await {
                    error!(
                        service_id = record.id.as_str(),
                        error = %e,
                        "failed to re-register service"
                    );
                }
            }
        }
        debug!(services = records.len(), "refreshed service ttl");
    }

    async fn add(&self, container_id: &str) {
        match self.runtime.inspect_container(container_id).await {
            Ok(info) if !info.running => {
                debug!(
                    container_id = short_id(container_id),
                    "container is not running, skipping"
                );
            }
            Ok(info) => self.register_container(&info).await,
            Err(e) => {
                warn!(
                    container_id = short_id(container_id),
                    error = %e,
                    "unable to inspect container, skipping"
                );
            }
        }
    }

    async fn remove_on_exit(&self, container_id: &str) {
        if self.should_deregister(container_id).await {
            self.deregister_container(container_id).await;
        } else {
            info!(
                container_id = short_id(container_id),
                "container exited with failure, leaving services for ttl expiry"
            );
            self.forget_container(container_id).await;
        }
    }
}
