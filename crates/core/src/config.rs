//! 설정 관리: registrator.toml 파싱 및 런타임 설정
//!
//! [`RegistratorConfig`]는 데몬 전체 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`REGISTRATOR_BRIDGE_HOST_IP=10.0.0.5` 형식)
//! 3. 설정 파일 (`registrator.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! 모든 검증은 백엔드 연결 시도 전에 수행됩니다.
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), registrator_core::error::RegistratorError> {
//! use registrator_core::config::RegistratorConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드 + 검증
//! let config = RegistratorConfig::load("registrator.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = RegistratorConfig::parse("[bridge]\nttl = 30\nttl_refresh = 10")?;
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, RegistratorError};
use crate::types::{AddressMode, DeregisterMode};

/// Registrator 통합 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistratorConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 레지스트리 백엔드 설정
    #[serde(default)]
    pub registry: RegistryConfig,
    /// 브리지 설정 (브리지에 그대로 전달됨)
    #[serde(default)]
    pub bridge: BridgeConfig,
    /// 주기적 재동기화 설정
    #[serde(default)]
    pub sync: SyncConfig,
    /// 연결/재시도 설정
    #[serde(default)]
    pub connection: ConnectionConfig,
    /// 메트릭 설정
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl RegistratorConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용한 뒤 검증합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, RegistratorError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드, 검증 없음).
    ///
    /// CLI 오버라이드를 적용한 뒤 [`validate`](Self::validate)를 호출해야 합니다.
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, RegistratorError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                RegistratorError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                RegistratorError::Io(e)
            }
        })?;
        Self::parse(&content)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, RegistratorError> {
        toml::from_str(toml_str).map_err(|e| {
            RegistratorError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `REGISTRATOR_{SECTION}_{FIELD}`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "REGISTRATOR_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "REGISTRATOR_GENERAL_LOG_FORMAT");

        // Registry
        override_string(&mut self.registry.url, "REGISTRATOR_REGISTRY_URL");

        // Bridge
        override_string(&mut self.bridge.host_ip, "REGISTRATOR_BRIDGE_HOST_IP");
        override_bool(&mut self.bridge.internal, "REGISTRATOR_BRIDGE_INTERNAL");
        override_bool(&mut self.bridge.global, "REGISTRATOR_BRIDGE_GLOBAL");
        override_csv(&mut self.bridge.tags, "REGISTRATOR_BRIDGE_TAGS");
        override_string(&mut self.bridge.deregister, "REGISTRATOR_BRIDGE_DEREGISTER");
        override_bool(&mut self.bridge.cleanup, "REGISTRATOR_BRIDGE_CLEANUP");
        override_i64(&mut self.bridge.ttl, "REGISTRATOR_BRIDGE_TTL");
        override_i64(&mut self.bridge.ttl_refresh, "REGISTRATOR_BRIDGE_TTL_REFRESH");

        // Sync
        override_i64(
            &mut self.sync.resync_interval_secs,
            "REGISTRATOR_SYNC_RESYNC_INTERVAL_SECS",
        );

        // Connection
        override_i64(
            &mut self.connection.retry_attempts,
            "REGISTRATOR_CONNECTION_RETRY_ATTEMPTS",
        );
        override_i64(
            &mut self.connection.retry_interval_ms,
            "REGISTRATOR_CONNECTION_RETRY_INTERVAL_MS",
        );
        override_string(
            &mut self.connection.on_stream_closed,
            "REGISTRATOR_CONNECTION_ON_STREAM_CLOSED",
        );
        override_string(
            &mut self.connection.docker_host,
            "REGISTRATOR_CONNECTION_DOCKER_HOST",
        );

        // Metrics
        override_bool(&mut self.metrics.enabled, "REGISTRATOR_METRICS_ENABLED");
        override_string(
            &mut self.metrics.listen_addr,
            "REGISTRATOR_METRICS_LISTEN_ADDR",
        );
        override_u16(&mut self.metrics.port, "REGISTRATOR_METRICS_PORT");
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), RegistratorError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::invalid(
                "general.log_level",
                format!("must be one of: {}", valid_levels.join(", ")),
            )
            .into());
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::invalid(
                "general.log_format",
                format!("must be one of: {}", valid_formats.join(", ")),
            )
            .into());
        }

        if self.registry.url.trim().is_empty() {
            return Err(ConfigError::invalid("registry.url", "must not be empty").into());
        }

        self.bridge.validate()?;

        if self.connection.retry_interval_ms <= 0 {
            return Err(ConfigError::invalid(
                "connection.retry_interval_ms",
                "must be greater than 0",
            )
            .into());
        }

        if self.connection.retry_attempts < -1 {
            return Err(ConfigError::invalid(
                "connection.retry_attempts",
                "must be -1 (unbounded) or a non-negative number",
            )
            .into());
        }

        self.connection.on_stream_closed.parse::<StreamClosePolicy>()?;

        if self.metrics.enabled && self.metrics.port == 0 {
            return Err(ConfigError::invalid(
                "metrics.port",
                "must be greater than 0 when metrics are enabled",
            )
            .into());
        }

        Ok(())
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "json".to_owned(),
        }
    }
}

/// 레지스트리 백엔드 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// 레지스트리 URL (예: `memory://`)
    pub url: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            url: "memory://".to_owned(),
        }
    }
}

/// 브리지 설정
///
/// 오케스트레이션 루프는 이 값을 해석하지 않고 브리지에 전달합니다.
/// `ttl_refresh`만은 TTL 갱신 루프의 주기로도 사용됩니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// 게시 주소 강제 지정 (빈 문자열이면 바인딩 주소 사용)
    pub host_ip: String,
    /// 컨테이너 내부 주소/포트 광고
    pub internal: bool,
    /// 컨테이너 global IPv6 주소 광고
    pub global: bool,
    /// 모든 서비스에 추가할 태그
    pub tags: Vec<String>,
    /// 해제 정책 (always, on-success)
    pub deregister: String,
    /// 고아 서비스 정리 여부
    pub cleanup: bool,
    /// 서비스 TTL (초, 0이면 만료 없음)
    pub ttl: i64,
    /// TTL 갱신 주기 (초, 0이면 갱신 루프 비활성화)
    pub ttl_refresh: i64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            host_ip: String::new(),
            internal: false,
            global: false,
            tags: Vec::new(),
            deregister: "always".to_owned(),
            cleanup: false,
            ttl: 0,
            ttl_refresh: 0,
        }
    }
}

impl BridgeConfig {
    /// ttl 조합, 해제 정책을 검증합니다.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ttl < 0 || self.ttl_refresh < 0 {
            return Err(ConfigError::invalid(
                "bridge.ttl",
                "ttl and ttl_refresh must not be negative",
            ));
        }

        if (self.ttl == 0) != (self.ttl_refresh == 0) {
            return Err(ConfigError::invalid(
                "bridge.ttl",
                "ttl and ttl_refresh must be specified together or not at all",
            ));
        }

        if self.ttl > 0 && self.ttl <= self.ttl_refresh {
            return Err(ConfigError::invalid(
                "bridge.ttl",
                "ttl must be greater than ttl_refresh",
            ));
        }

        self.deregister_mode()?;
        Ok(())
    }

    /// 해제 정책을 해석합니다.
    pub fn deregister_mode(&self) -> Result<DeregisterMode, ConfigError> {
        self.deregister.parse()
    }

    /// 광고 주소 모드
    pub fn address_mode(&self) -> AddressMode {
        AddressMode::from_flags(self.internal, self.global)
    }
}

/// 주기적 재동기화 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// 강제 재동기화 주기 (초, 0 이하면 비활성화)
    pub resync_interval_secs: i64,
}

/// 연결/재시도 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// 첫 실패 이후 재시도 횟수 (-1이면 무제한, 0이면 한 번만 시도)
    pub retry_attempts: i64,
    /// 재시도 간격 (밀리초, 0보다 커야 함)
    pub retry_interval_ms: i64,
    /// 이벤트 스트림 종료 시 동작 (exit, reconnect)
    pub on_stream_closed: String,
    /// Docker 소켓 경로 (빈 문자열이면 로컬 기본값)
    pub docker_host: String,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            retry_attempts: 0,
            retry_interval_ms: 2000,
            on_stream_closed: "exit".to_owned(),
            docker_host: String::new(),
        }
    }
}

impl ConnectionConfig {
    /// 스트림 종료 정책을 해석합니다.
    pub fn stream_close_policy(&self) -> Result<StreamClosePolicy, ConfigError> {
        self.on_stream_closed.parse()
    }
}

/// 이벤트 스트림이 닫혔을 때의 동작
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StreamClosePolicy {
    /// 치명적 에러로 프로세스 종료
    #[default]
    Exit,
    /// 연결 단계부터 다시 시작
    Reconnect,
}

impl FromStr for StreamClosePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "exit" => Ok(Self::Exit),
            "reconnect" => Ok(Self::Reconnect),
            other => Err(ConfigError::invalid(
                "connection.on_stream_closed",
                format!("must be \"exit\" or \"reconnect\", got \"{other}\""),
            )),
        }
    }
}

impl fmt::Display for StreamClosePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exit => write!(f, "exit"),
            Self::Reconnect => write!(f, "reconnect"),
        }
    }
}

/// 메트릭 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Prometheus 엔드포인트 활성화 여부
    pub enabled: bool,
    /// 수신 주소
    pub listen_addr: String,
    /// 수신 포트
    pub port: u16,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            listen_addr: "127.0.0.1".to_owned(),
            port: 9108,
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

fn override_i64(target: &mut i64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<i64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse i64 from env var, ignoring"
            ),
        }
    }
}

fn override_u16(target: &mut u16, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u16>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u16 from env var, ignoring"
            ),
        }
    }
}

fn override_csv(target: &mut Vec<String>, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = split_csv(&val);
    }
}

/// 쉼표로 구분된 목록을 파싱합니다. 빈 항목은 버립니다.
pub fn split_csv(val: &str) -> Vec<String> {
    val.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}
