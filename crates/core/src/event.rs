//! 컨테이너 생명주기 이벤트
//!
//! 런타임 이벤트 스트림에서 들어온 메시지는 [`LifecycleEvent`]로 변환되어
//! [`EventStream`] 채널을 통해 디스패처로 전달됩니다.
//!
//! # 사용 예시
//! ```
//! use registrator_core::event::{EventStatus, LifecycleEvent};
//!
//! let event = LifecycleEvent::new("abc123def456", "start");
//! assert_eq!(event.status, EventStatus::Start);
//! ```

use std::fmt;
use std::time::SystemTime;

use tokio::sync::mpsc;

use crate::types::short_id;

/// 이벤트 채널 기본 용량
///
/// 채널이 가득 차면 생산자는 대기합니다 (이벤트를 버리지 않음).
pub const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// 구독된 생명주기 이벤트 스트림
pub type EventStream = mpsc::Receiver<LifecycleEvent>;

/// 생명주기 이벤트 생산자 측 핸들
pub type EventSender = mpsc::Sender<LifecycleEvent>;

/// 이벤트 채널을 생성합니다.
pub fn event_channel() -> (EventSender, EventStream) {
    mpsc::channel(EVENT_CHANNEL_CAPACITY)
}

/// 이벤트 상태
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventStatus {
    /// 컨테이너 시작 (`start`)
    Start,
    /// 컨테이너 종료 (`die`)
    Die,
    /// 그 외 상태 (무시됨)
    Other(String),
}

impl EventStatus {
    /// 런타임이 보낸 상태 문자열을 해석합니다.
    pub fn parse(status: &str) -> Self {
        match status {
            "start" => Self::Start,
            "die" => Self::Die,
            other => Self::Other(other.to_owned()),
        }
    }

    /// 메트릭 레이블용 고정 이름
    pub fn label(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Die => "die",
            Self::Other(_) => "other",
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => write!(f, "start"),
            Self::Die => write!(f, "die"),
            Self::Other(status) => write!(f, "{status}"),
        }
    }
}

/// 컨테이너 생명주기 이벤트
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleEvent {
    /// 대상 컨테이너 ID
    pub container_id: String,
    /// 이벤트 상태
    pub status: EventStatus,
    /// 이벤트 수신 시각
    pub received_at: SystemTime,
}

impl LifecycleEvent {
    /// 상태 문자열로부터 이벤트를 생성합니다.
    pub fn new(container_id: impl Into<String>, status: &str) -> Self {
        Self::with_status(container_id, EventStatus::parse(status))
    }

    /// 이미 해석된 상태로 이벤트를 생성합니다.
    pub fn with_status(container_id: impl Into<String>, status: EventStatus) -> Self {
        Self {
            container_id: container_id.into(),
            status,
            received_at: SystemTime::now(),
        }
    }
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "LifecycleEvent container={} status={}",
            short_id(&self.container_id),
            self.status
        )
    }
}
