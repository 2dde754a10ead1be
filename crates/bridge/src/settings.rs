//! 브리지 설정
//!
//! [`BridgeSettings`]는 core의 [`BridgeConfig`]를 해석한 결과입니다.
//! 문자열 정책은 열거형으로, 부호 있는 ttl은 `u64`로 변환됩니다.
//!
//! # 사용 예시
//! ```
//! use registrator_core::config::BridgeConfig;
//! use registrator_bridge::BridgeSettings;
//!
//! let settings = BridgeSettings::from_core(&BridgeConfig::default()).unwrap();
//! assert_eq!(settings.ttl, 0);
//! ```

use registrator_core::config::BridgeConfig;
use registrator_core::error::ConfigError;
use registrator_core::types::{AddressMode, DeregisterMode};

/// 노드 이름을 얻지 못했을 때 쓰는 기본값
const DEFAULT_NODE_NAME: &str = "localhost";

/// 해석된 브리지 설정
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeSettings {
    /// 게시 주소 강제 지정 (`None`이면 포트 바인딩 주소)
    pub host_ip: Option<String>,
    /// 광고 주소 모드
    pub address_mode: AddressMode,
    /// 모든 서비스에 추가할 태그
    pub tags: Vec<String>,
    /// 해제 정책
    pub deregister: DeregisterMode,
    /// 고아 서비스 정리 여부
    pub cleanup: bool,
    /// 서비스 TTL (초, 0이면 만료 없음)
    pub ttl: u64,
    /// 레코드 소유 노드 이름
    pub node: String,
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self {
            host_ip: None,
            address_mode: AddressMode::Published,
            tags: Vec::new(),
            deregister: DeregisterMode::Always,
            cleanup: false,
            ttl: 0,
            node: DEFAULT_NODE_NAME.to_owned(),
        }
    }
}

impl BridgeSettings {
    /// core의 `BridgeConfig`에서 설정을 생성합니다.
    ///
    /// 노드 이름은 `HOSTNAME` 환경변수에서 가져옵니다.
    pub fn from_core(core: &BridgeConfig) -> Result<Self, ConfigError> {
        core.validate()?;

        let host_ip = core.host_ip.trim();
        Ok(Self {
            host_ip: (!host_ip.is_empty()).then(|| host_ip.to_owned()),
            address_mode: core.address_mode(),
            tags: core.tags.clone(),
            deregister: core.deregister_mode()?,
            cleanup: core.cleanup,
            ttl: u64::try_from(core.ttl).unwrap_or(0),
            node: node_name(),
        })
    }

    /// 노드 이름을 지정합니다.
    pub fn with_node(mut self, node: impl Into<String>) -> Self {
        self.node = node.into();
        self
    }
}

fn node_name() -> String {
    std::env::var("HOSTNAME")
        .ok()
        .map(|h| h.trim().to_owned())
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| DEFAULT_NODE_NAME.to_owned())
}
