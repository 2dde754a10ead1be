//! 브리지 핸들: 오케스트레이션 루프가 호출하는 레지스트리 동기화 연산
//!
//! 오케스트레이터는 브리지 내부 동작을 알지 못합니다. 연산 실패는 브리지가
//! 직접 로그로 남기며 호출자에게 전파하지 않습니다. 예외는 연결 확인용
//! [`BridgeHandle::ping`]뿐입니다.
//!
//! 모든 연산은 서로 다른 태스크에서 동시에 호출될 수 있으므로 구현체는
//! 내부 상태를 스스로 동기화해야 합니다.

use std::future::Future;

use crate::error::BridgeError;

/// 서비스 레지스트리 브리지
pub trait BridgeHandle: Send + Sync + 'static {
    /// 레지스트리 백엔드 연결 상태를 확인합니다.
    fn ping(&self) -> impl Future<Output = Result<(), BridgeError>> + Send;

    /// 실행 중인 컨테이너와 레지스트리 상태를 맞춥니다.
    ///
    /// `force`가 참이면 이미 알고 있는 컨테이너도 다시 등록합니다.
    fn sync(&self, force: bool) -> impl Future<Output = ()> + Send;

    /// 등록된 서비스의 TTL을 갱신합니다.
    fn refresh(&self) -> impl Future<Output = ()> + Send;

    /// 컨테이너의 서비스를 등록합니다.
    fn add(&self, container_id: &str) -> impl Future<Output = ()> + Send;

    /// 종료된 컨테이너의 서비스를 해제 정책에 따라 해제합니다.
    fn remove_on_exit(&self, container_id: &str) -> impl Future<Output = ()> + Send;
}
