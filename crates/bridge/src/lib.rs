//! # registrator-bridge
//!
//! 컨테이너 상태를 서비스 레지스트리에 반영하는 레퍼런스 브리지입니다.
//!
//! # Module Structure
//!
//! - [`settings`]: core `BridgeConfig`에서 해석된 브리지 설정
//! - [`service`]: 컨테이너 → 서비스 레코드 변환
//! - [`registry`]: 레지스트리 백엔드 추상화 (`RegistryAdapter`), `memory://` 구현
//! - [`bridge`]: `BridgeHandle` 구현체 (`Bridge`)
//!
//! # Architecture
//!
//! ```text
//! Orchestrator --BridgeHandle--> Bridge --ContainerRuntime--> Docker
//!                                   |
//!                                   +--RegistryAdapter--> registry backend
//! ```

pub mod bridge;
pub mod registry;
pub mod service;
pub mod settings;

#[cfg(test)]
pub(crate) mod testing;

pub use bridge::{Bridge, new};
pub use registry::{MemoryRegistry, Registry, RegistryAdapter, connect};
pub use settings::BridgeSettings;
