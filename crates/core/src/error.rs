//! 에러 타입: 도메인별 에러 정의

/// Registrator 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum RegistratorError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 백엔드 연결 에러
    #[error("connection error: {0}")]
    Connection(#[from] ConnectionError),

    /// 컨테이너 런타임 에러
    #[error("runtime error: {0}")]
    Runtime(#[from] RuntimeError),

    /// 브리지 에러
    #[error("bridge error: {0}")]
    Bridge(#[from] BridgeError),

    /// 컨테이너 이벤트 스트림이 닫힘
    #[error("docker event stream closed")]
    EventStreamClosed,

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

impl ConfigError {
    /// `InvalidValue` 에러를 생성합니다.
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// 백엔드 연결 에러
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    /// 재시도 횟수 소진
    #[error("backend unreachable after {attempts} attempt(s): {source}")]
    Exhausted {
        /// 실제로 수행한 ping 횟수
        attempts: u64,
        /// 마지막 ping 실패 원인
        #[source]
        source: BridgeError,
    },

    /// 종료 신호로 연결 시도가 중단됨
    #[error("connection attempts cancelled by shutdown after {attempts} attempt(s)")]
    Cancelled { attempts: u64 },
}

/// 컨테이너 런타임 (Docker) 에러
#[derive(Debug, Clone, thiserror::Error)]
pub enum RuntimeError {
    /// 런타임 소켓 연결 실패
    #[error("docker connection error: {0}")]
    Connection(String),

    /// 런타임 API 호출 실패
    #[error("docker api error: {0}")]
    Api(String),

    /// 컨테이너를 찾을 수 없음
    #[error("container not found: {0}")]
    ContainerNotFound(String),

    /// 잘못된 컨테이너 ID
    #[error("invalid container id '{id}': {reason}")]
    InvalidContainerId { id: String, reason: String },
}

/// 브리지 / 레지스트리 에러
#[derive(Debug, Clone, thiserror::Error)]
pub enum BridgeError {
    /// 레지스트리 백엔드에 연결할 수 없음
    #[error("registry unreachable: {0}")]
    Unreachable(String),

    /// 잘못된 레지스트리 URL
    #[error("invalid registry url '{url}': {reason}")]
    InvalidRegistryUrl { url: String, reason: String },

    /// 지원하지 않는 레지스트리 백엔드
    #[error("unsupported registry backend: {scheme}")]
    UnsupportedBackend { scheme: String },

    /// 레지스트리 연산 실패
    #[error("registry operation failed: {0}")]
    Registry(String),

    /// 런타임 조회 실패
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}
