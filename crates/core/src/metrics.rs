//! 메트릭 상수 및 설명 등록
//!
//! 모든 Prometheus 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 각 크레이트는 이 상수를 사용하여 `metrics::counter!()`, `metrics::gauge!()`
//! 매크로를 호출합니다. 레코더가 설치되지 않았으면 기록은 무시됩니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `registrator_`
//! - 영역: `connection_`, `events_`, `dispatch_`, `periodic_`, `bridge_`, `daemon_`
//! - 접미어: `_total` (counter), 없음 (gauge)
//!
//! # 사용 예시
//!
//! ```ignore
//! use registrator_core::metrics as m;
//!
//! metrics::counter!(m::EVENTS_RECEIVED_TOTAL, m::LABEL_STATUS => "start").increment(1);
//! ```

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 이벤트 상태 레이블 키 (start, die, other)
pub const LABEL_STATUS: &str = "status";

/// 디스패치 액션 레이블 키 (add, remove_on_exit)
pub const LABEL_ACTION: &str = "action";

/// 주기 작업 레이블 키 (refresh, resync)
pub const LABEL_TASK: &str = "task";

/// 결과 레이블 키 (success, failure)
pub const LABEL_RESULT: &str = "result";

// ─── 연결 / 생명주기 ───────────────────────────────────────────────

/// 백엔드 ping 시도 수 (counter, label: result)
pub const CONNECTION_ATTEMPTS_TOTAL: &str = "registrator_connection_attempts_total";

/// 현재 생명주기 상태 (gauge, `LifecycleState` 순번)
pub const LIFECYCLE_STATE: &str = "registrator_lifecycle_state";

/// 이벤트 스트림 종료 횟수 (counter)
pub const EVENT_STREAM_CLOSED_TOTAL: &str = "registrator_event_stream_closed_total";

// ─── 이벤트 / 디스패치 ─────────────────────────────────────────────

/// 수신된 생명주기 이벤트 수 (counter, label: status)
pub const EVENTS_RECEIVED_TOTAL: &str = "registrator_events_received_total";

/// 브리지로 디스패치된 액션 수 (counter, label: action)
pub const DISPATCH_ACTIONS_TOTAL: &str = "registrator_dispatch_actions_total";

/// 주기 작업 실행 수 (counter, label: task)
pub const PERIODIC_TICKS_TOTAL: &str = "registrator_periodic_ticks_total";

// ─── 브리지 ────────────────────────────────────────────────────────

/// 등록된 서비스 레코드 수 (gauge)
pub const BRIDGE_SERVICES_REGISTERED: &str = "registrator_bridge_services_registered";

/// 레지스트리 등록 연산 수 (counter, label: result)
pub const BRIDGE_REGISTRATIONS_TOTAL: &str = "registrator_bridge_registrations_total";

/// 레지스트리 해제 연산 수 (counter, label: result)
pub const BRIDGE_DEREGISTRATIONS_TOTAL: &str = "registrator_bridge_deregistrations_total";

// ─── Daemon ────────────────────────────────────────────────────────

/// Daemon: 가동 시간 (gauge, 초)
pub const DAEMON_UPTIME_SECONDS: &str = "registrator_daemon_uptime_seconds";

/// Daemon: 빌드 정보 (gauge, 항상 1, label: version)
pub const DAEMON_BUILD_INFO: &str = "registrator_daemon_build_info";

/// 모든 메트릭의 설명(description)을 등록합니다.
///
/// 전역 레코더 설치 직후 한 번 호출합니다.
pub fn describe_all() {
    use metrics::{describe_counter, describe_gauge};

    describe_counter!(
        CONNECTION_ATTEMPTS_TOTAL,
        "Backend ping attempts made while establishing the connection"
    );
    describe_gauge!(
        LIFECYCLE_STATE,
        "Current lifecycle state (0=connecting 1=subscribing 2=syncing 3=running 4=closed 5=stopped)"
    );
    describe_counter!(
        EVENT_STREAM_CLOSED_TOTAL,
        "Number of times the container event stream closed"
    );
    describe_counter!(
        EVENTS_RECEIVED_TOTAL,
        "Container lifecycle events received, by status"
    );
    describe_counter!(
        DISPATCH_ACTIONS_TOTAL,
        "Bridge actions dispatched from lifecycle events, by action"
    );
    describe_counter!(
        PERIODIC_TICKS_TOTAL,
        "Periodic task invocations, by task"
    );
    describe_gauge!(
        BRIDGE_SERVICES_REGISTERED,
        "Number of service records currently tracked by the bridge"
    );
    describe_counter!(
        BRIDGE_REGISTRATIONS_TOTAL,
        "Service registrations sent to the registry, by result"
    );
    describe_counter!(
        BRIDGE_DEREGISTRATIONS_TOTAL,
        "Service deregistrations sent to the registry, by result"
    );
    describe_gauge!(DAEMON_UPTIME_SECONDS, "Registrator daemon uptime in seconds");
    describe_gauge!(
        DAEMON_BUILD_INFO,
        "Build information (always 1, with version label)"
    );
}
