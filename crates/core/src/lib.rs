//! # registrator-core
//!
//! Registrator 워크스페이스의 공통 기반 크레이트입니다.
//!
//! - [`error`]: 도메인별 에러 타입
//! - [`config`]: `registrator.toml` 설정과 검증
//! - [`event`]: 컨테이너 생명주기 이벤트와 이벤트 채널
//! - [`types`]: 컨테이너, 포트, 서비스 레코드
//! - [`bridge`] / [`runtime`]: 오케스트레이션 루프가 의존하는 경계 trait
//! - [`metrics`]: 메트릭 이름 상수

pub mod bridge;
pub mod config;
pub mod error;
pub mod event;
pub mod metrics;
pub mod runtime;
pub mod types;

// --- 주요 타입 re-export ---

// 에러
pub use error::{BridgeError, ConfigError, ConnectionError, RegistratorError, RuntimeError};

// 설정
pub use config::{RegistratorConfig, StreamClosePolicy};

// 이벤트
pub use event::{EventStatus, EventStream, LifecycleEvent};

// 경계 trait
pub use bridge::BridgeHandle;
pub use runtime::ContainerRuntime;

// 도메인 타입
pub use types::{AddressMode, ContainerInfo, DeregisterMode, PortBinding, ServiceRecord};
