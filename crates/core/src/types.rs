//! 도메인 타입: 컨테이너, 포트, 서비스 레코드

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// 컨테이너 정보
///
/// 런타임에서 조회한 컨테이너의 상태와 네트워크 정보를 담습니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerInfo {
    /// 컨테이너 ID (64자 hex)
    pub id: String,
    /// 컨테이너 이름 (선행 `/` 제거)
    pub name: String,
    /// 이미지명
    pub image: String,
    /// 실행 중 여부
    pub running: bool,
    /// 종료 코드 (종료된 컨테이너만)
    pub exit_code: Option<i64>,
    /// 기본 네트워크 IPv4 주소
    pub ip_address: String,
    /// 기본 네트워크 global IPv6 주소
    pub global_ipv6_address: String,
    /// 노출된 포트 목록
    pub ports: Vec<PortBinding>,
}

impl ContainerInfo {
    /// 로그용 짧은 ID (12자)
    pub fn short_id(&self) -> &str {
        short_id(&self.id)
    }
}

/// 컨테이너 ID를 로그용 12자로 자릅니다.
pub fn short_id(id: &str) -> &str {
    id.get(..12).unwrap_or(id)
}

/// 컨테이너 포트 바인딩
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortBinding {
    /// 컨테이너 내부 포트
    pub container_port: u16,
    /// 프로토콜 (`tcp`, `udp`)
    pub protocol: String,
    /// 호스트에 게시된 주소 (게시되지 않았으면 빈 문자열)
    pub host_ip: String,
    /// 호스트에 게시된 포트
    pub host_port: Option<u16>,
}

/// 레지스트리에 기록되는 서비스 레코드
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRecord {
    /// 레지스트리 내 고유 ID
    pub id: String,
    /// 서비스 이름
    pub name: String,
    /// 서비스를 제공하는 컨테이너 ID
    pub container_id: String,
    /// 광고 주소
    pub ip: String,
    /// 광고 포트
    pub port: u16,
    /// 프로토콜 (`tcp`, `udp`)
    pub protocol: String,
    /// 태그
    pub tags: Vec<String>,
    /// TTL (초, 0이면 만료 없음)
    pub ttl: u64,
    /// 레코드를 등록한 노드 식별자
    pub node: String,
}

impl fmt::Display for ServiceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}:{}/{})", self.id, self.ip, self.port, self.protocol)
    }
}

/// 종료된 컨테이너의 서비스 해제 정책
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeregisterMode {
    /// 종료 코드와 무관하게 항상 해제
    #[default]
    Always,
    /// 정상 종료(exit code 0)일 때만 해제
    OnSuccess,
}

impl FromStr for DeregisterMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "always" => Ok(Self::Always),
            "on-success" => Ok(Self::OnSuccess),
            other => Err(ConfigError::invalid(
                "bridge.deregister",
                format!("must be \"always\" or \"on-success\", got \"{other}\""),
            )),
        }
    }
}

impl fmt::Display for DeregisterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Always => write!(f, "always"),
            Self::OnSuccess => write!(f, "on-success"),
        }
    }
}

/// 광고할 컨테이너 주소 종류
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AddressMode {
    /// 호스트에 게시된 주소/포트
    #[default]
    Published,
    /// 컨테이너 내부 IPv4 주소와 내부 포트
    Internal,
    /// 컨테이너 global IPv6 주소와 내부 포트
    Global,
}

impl AddressMode {
    /// `internal` / `global` 플래그에서 모드를 결정합니다. 둘 다 켜지면 `Global`이 우선합니다.
    pub fn from_flags(internal: bool, global: bool) -> Self {
        match (internal, global) {
            (_, true) => Self::Global,
            (true, false) => Self::Internal,
            (false, false) => Self::Published,
        }
    }
}

impl fmt::Display for AddressMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Published => write!(f, "published"),
            Self::Internal => write!(f, "internal"),
            Self::Global => write!(f, "global"),
        }
    }
}
