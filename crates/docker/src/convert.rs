//! bollard 응답 모델 → 도메인 타입 변환
//!
//! Docker API 응답은 대부분의 필드가 `Option`이므로, 빠진 값은 빈 문자열이나
//! `None`으로 정규화합니다.

use bollard::models::{
    ContainerInspectResponse, EventMessage, EventMessageTypeEnum, NetworkSettings, PortMap,
};
use registrator_core::event::LifecycleEvent;
use registrator_core::types::{ContainerInfo, PortBinding};

/// `docker inspect` 응답을 [`ContainerInfo`]로 변환합니다.
pub fn container_from_inspect(details: ContainerInspectResponse) -> ContainerInfo {
    let id = details.id.unwrap_or_default();
    let name = details
        .name
        .map(|n| n.trim_start_matches('/').to_owned())
        .unwrap_or_default();
    let image = details.config.and_then(|c| c.image).unwrap_or_default();

    let (running, exit_code) = match details.state {
        Some(state) => {
            let running = state.running.unwrap_or(false);
            // 실행 중인 컨테이너의 exit_code는 의미 없음
            let exit_code = if running { None } else { state.exit_code };
            (running, exit_code)
        }
        None => (false, None),
    };

    let (ip_address, global_ipv6_address, ports) = match details.network_settings {
        Some(settings) => network_addresses(settings),
        None => (String::new(), String::new(), Vec::new()),
    };

    ContainerInfo {
        id,
        name,
        image,
        running,
        exit_code,
        ip_address,
        global_ipv6_address,
        ports,
    }
}

/// 기본 네트워크 주소를 고릅니다.
///
/// 최상위 필드가 비어 있으면 (사용자 정의 네트워크) 이름순 첫 네트워크의 주소를 씁니다.
fn network_addresses(settings: NetworkSettings) -> (String, String, Vec<PortBinding>) {
    let mut ip_address = settings.ip_address.unwrap_or_default();
    let mut global_ipv6_address = settings.global_ipv6_address.unwrap_or_default();

    if let Some(networks) = settings.networks {
        let mut names: Vec<&String> = networks.keys().collect();
        names.sort();
        if let Some(endpoint) = names.first().and_then(|name| networks.get(*name)) {
            if ip_address.is_empty() {
                ip_address = endpoint.ip_address.clone().unwrap_or_default();
            }
            if global_ipv6_address.is_empty() {
                global_ipv6_address = endpoint.global_ipv6_address.clone().unwrap_or_default();
            }
        }
    }

    let ports = settings.ports.as_ref().map(ports_from_map).unwrap_or_default();
    (ip_address, global_ipv6_address, ports)
}

/// `"80/tcp"` 형식의 포트 키를 (포트, 프로토콜)로 나눕니다.
///
/// 프로토콜이 생략되면 `tcp`로 간주합니다.
pub fn parse_port_key(key: &str) -> Option<(u16, String)> {
    let (port, protocol) = match key.split_once('/') {
        Some((port, protocol)) => (port, protocol),
        None => (key, "tcp"),
    };
    let port = port.parse::<u16>().ok()?;
    Some((port, protocol.to_ascii_lowercase()))
}

/// Docker 포트 맵을 바인딩 목록으로 변환합니다.
///
/// 게시되지 않은 노출 포트는 `host_port: None` 항목 하나로 표현합니다.
/// 결과는 (컨테이너 포트, 프로토콜, 호스트 포트) 순으로 정렬됩니다.
pub fn ports_from_map(map: &PortMap) -> Vec<PortBinding> {
    let mut result = Vec::new();

    for (key, bindings) in map {
        let Some((container_port, protocol)) = parse_port_key(key) else {
            continue;
        };

        let published: Vec<_> = bindings.iter().flatten().collect();
        if published.is_empty() {
            result.push(PortBinding {
                container_port,
                protocol,
                host_ip: String::new(),
                host_port: None,
            });
            continue;
        }

        for binding in published {
            result.push(PortBinding {
                container_port,
                protocol: protocol.clone(),
                host_ip: binding.host_ip.clone().unwrap_or_default(),
                host_port: binding
                    .host_port
                    .as_deref()
                    .and_then(|p| p.parse::<u16>().ok()),
            });
        }
    }

    result.sort_by(|a, b| {
        (a.container_port, &a.protocol, a.host_port, &a.host_ip).cmp(&(
            b.container_port,
            &b.protocol,
            b.host_port,
            &b.host_ip,
        ))
    });
    result
}

/// Docker 이벤트 메시지를 생명주기 이벤트로 변환합니다.
///
/// 컨테이너 이벤트가 아니거나 ID/액션이 없으면 `None`.
pub fn lifecycle_event(message: EventMessage) -> Option<LifecycleEvent> {
    if let Some(typ) = message.typ {
        if typ != EventMessageTypeEnum::CONTAINER {
            return None;
        }
    }

    let id = message.actor.and_then(|a| a.id).filter(|id| !id.is_empty())?;
    let action = message.action.filter(|a| !a.is_empty())?;
    Some(LifecycleEvent::new(id, &action))
}
