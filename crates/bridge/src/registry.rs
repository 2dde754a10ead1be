//! 레지스트리 백엔드 추상화
//!
//! [`RegistryAdapter`]는 서비스 레코드를 실제 레지스트리에 기록하는 경계입니다.
//! [`connect`]는 URL 스킴으로 백엔드를 고릅니다. 현재 `memory://`만 지원하며,
//! 그 외 스킴은 [`BridgeError::UnsupportedBackend`]로 거부됩니다.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use registrator_core::error::BridgeError;
use registrator_core::types::ServiceRecord;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

/// 레지스트리 백엔드 trait
pub trait RegistryAdapter: Send + Sync + 'static {
    /// 백엔드 연결 상태를 확인합니다.
    fn ping(&self) -> impl Future<Output = Result<(), BridgeError>> + Send;

    /// 서비스를 등록합니다. 같은 ID가 있으면 덮어씁니다.
    fn register(
        &self,
        service: &ServiceRecord,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send;

    /// 서비스를 해제합니다. 없는 ID는 무시합니다.
    fn deregister(
        &self,
        service: &ServiceRecord,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send;

    /// 서비스 TTL을 갱신합니다.
    fn refresh(
        &self,
        service: &ServiceRecord,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send;

    /// 현재 등록된 (만료되지 않은) 서비스 목록
    fn services(&self) -> impl Future<Output = Result<Vec<ServiceRecord>, BridgeError>> + Send;
}

/// URL로 선택된 레지스트리 백엔드
#[derive(Debug)]
pub enum Registry {
    /// 프로세스 내 메모리 레지스트리 (`memory://`)
    Memory(MemoryRegistry),
}

/// 레지스트리 URL을 해석하고 백엔드를 생성합니다.
pub fn connect(registry_url: &str) -> Result<Registry, BridgeError> {
    let parsed = url::Url::parse(registry_url).map_err(|e| BridgeError::InvalidRegistryUrl {
        url: registry_url.to_owned(),
        reason: e.to_string(),
    })?;

    match parsed.scheme() {
        "memory" => {
            debug!(url = registry_url, "using in-memory registry");
            Ok(Registry::Memory(MemoryRegistry::new()))
        }
        other => Err(BridgeError::UnsupportedBackend {
            scheme: other.to_owned(),
        }),
    }
}

impl RegistryAdapter for Registry {
    async fn ping(&self) -> Result<(), BridgeError> {
        match self {
            Self::Memory(r) => r.ping().await,
        }
    }

    async fn register(&self, service: &ServiceRecord) -> Result<(), BridgeError> {
        match self {
            Self::Memory(r) => r.register(service).await,
        }
    }

    async fn deregister(&self, service: &ServiceRecord) -> Result<(), BridgeError> {
        match self {
            Self::Memory(r) => r.deregister(service).await,
        }
    }

    async fn refresh(&self, service: &ServiceRecord) -> Result<(), BridgeError> {
        match self {
            Self::Memory(r) => r.refresh(service).await,
        }
    }

    async fn services(&self) -> Result<Vec<ServiceRecord>, BridgeError> {
        match self {
            Self::Memory(r) => r.services().await,
        }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    record: ServiceRecord,
    expires_at: Option<Instant>,
}

impl Entry {
    fn new(record: ServiceRecord, now: Instant) -> Self {
        // 표현할 수 없을 만큼 먼 만료 시각은 만료 없음으로 취급
        let expires_at = (record.ttl > 0)
            .then(|| now.checked_add(Duration::from_secs(record.ttl)))
            .flatten();
        Self { record, expires_at }
    }

    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|at| at > now)
    }
}

/// 프로세스 내 메모리 레지스트리
///
/// TTL이 있는 레코드는 갱신되지 않으면 만료되어 목록에서 빠집니다.
/// `set_reachable(false)`로 백엔드 장애를 흉내낼 수 있습니다.
#[derive(Debug)]
pub struct MemoryRegistry {
    entries: Mutex<HashMap<String, Entry>>,
    reachable: AtomicBool,
}

impl Default for MemoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryRegistry {
    /// 빈 레지스트리를 생성합니다.
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            reachable: AtomicBool::new(true),
        }
    }

    /// 백엔드 도달 가능 여부를 설정합니다.
    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
    }

    /// ID로 살아있는 레코드를 조회합니다.
    pub async fn get(&self, id: &str) -> Option<ServiceRecord> {
        let now = Instant::now();
        self.entries
            .lock()
            .await
            .get(id)
            .filter(|e| e.is_live(now))
            .map(|e| e.record.clone())
    }

    fn check_reachable(&self) -> Result<(), BridgeError> {
        if self.reachable.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(BridgeError::Unreachable(
                "memory registry marked unreachable".to_owned(),
            ))
        }
    }
}

impl RegistryAdapter for MemoryRegistry {
    async fn ping(&self) -> Result<(), BridgeError> {
        self.check_reachable()
    }

    async fn register(&self, service: &ServiceRecord) -> Result<(), BridgeError> {
        self.check_reachable()?;
        let entry = Entry::new(service.clone(), Instant::now());
        self.entries.lock().await.insert(service.id.clone(), entry);
        Ok(())
    }

    async fn deregister(&self, service: &ServiceRecord) -> Result<(), BridgeError> {
        self.check_reachable()?;
        self.entries.lock().await.remove(&service.id);
        Ok(())
    }

    async fn refresh(&self, service: &ServiceRecord) -> Result<(), BridgeError> {
        self.check_reachable()?;
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        match entries.get_mut(&service.id) {
            Some(entry) if entry.is_live(now) => {
                *entry = Entry::new(entry.record.clone(), now);
                Ok(())
            }
            _ => Err(BridgeError::Registry(format!(
                "service {} is not registered",
                service.id
            ))),
        }
    }

    async fn services(&self) -> Result<Vec<ServiceRecord>, BridgeError> {
        self.check_reachable()?;
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        entries.retain(|_, e| e.is_live(now));

        let mut records: Vec<ServiceRecord> = entries.values().map(|e| e.record.clone()).collect();
        records.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(records)
    }
}
