//! # registrator-docker
//!
//! Docker Engine API를 통해 [`ContainerRuntime`](registrator_core::ContainerRuntime)을
//! 구현합니다.
//!
//! # Module Structure
//!
//! - [`docker`]: `BollardDockerClient` (연결, 조회, 이벤트 구독)
//! - [`convert`]: bollard 응답 모델을 도메인 타입으로 변환
//!
//! # Architecture
//!
//! ```text
//! Docker daemon --/events (since=T)--> forwarder task --mpsc--> EventStream
//!               <--/containers/json, /containers/{id}/json-- Bridge
//! ```

pub mod convert;
pub mod docker;

pub use docker::{BollardDockerClient, validate_container_id};
