//! 컨테이너 런타임 추상화
//!
//! [`ContainerRuntime`]은 브리지가 컨테이너 상태를 조회하고 생명주기 이벤트를
//! 구독하기 위한 경계입니다. 프로덕션에서는 `registrator-docker`의
//! `BollardDockerClient`가, 테스트에서는 mock 구현이 사용됩니다.

use std::future::Future;
use std::time::SystemTime;

use crate::error::RuntimeError;
use crate::event::EventStream;
use crate::types::ContainerInfo;

/// 컨테이너 런타임 trait
pub trait ContainerRuntime: Send + Sync + 'static {
    /// 런타임 데몬 연결 상태를 확인합니다.
    fn ping(&self) -> impl Future<Output = Result<(), RuntimeError>> + Send;

    /// 실행 중인 컨테이너 목록을 조회합니다.
    fn list_containers(&self)
    -> impl Future<Output = Result<Vec<ContainerInfo>, RuntimeError>> + Send;

    /// 특정 컨테이너의 상세 정보를 조회합니다.
    ///
    /// 종료된 컨테이너도 삭제되기 전까지는 조회할 수 있습니다.
    fn inspect_container(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<ContainerInfo, RuntimeError>> + Send;

    /// `since` 이후 발생한 컨테이너 생명주기 이벤트를 구독합니다.
    ///
    /// 반환된 스트림은 런타임 연결이 끊기거나 스트림이 끝나면 닫힙니다.
    fn subscribe(
        &self,
        since: SystemTime,
    ) -> impl Future<Output = Result<EventStream, RuntimeError>> + Send;
}
