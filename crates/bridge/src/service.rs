//! 컨테이너 → 서비스 레코드 변환
//!
//! 컨테이너 포트 하나당 레코드 하나를 만듭니다. 광고 주소는 [`AddressMode`]에 따라
//! 결정됩니다.
//!
//! | 모드        | 주소                               | 포트           |
//! |-------------|------------------------------------|----------------|
//! | `Published` | `host_ip` 설정 또는 바인딩 주소    | 호스트 포트    |
//! | `Internal`  | 컨테이너 IPv4                      | 컨테이너 포트  |
//! | `Global`    | 컨테이너 global IPv6               | 컨테이너 포트  |
//!
//! 게시되지 않은 포트는 `Published` 모드에서 건너뜁니다.

use std::collections::HashSet;

use registrator_core::types::{AddressMode, ContainerInfo, PortBinding, ServiceRecord};

use crate::settings::BridgeSettings;

/// 컨테이너의 서비스 레코드를 생성합니다.
///
/// 같은 ID가 두 번 나오면 (예: IPv4/IPv6 이중 바인딩) 첫 번째만 남깁니다.
pub fn services_for(container: &ContainerInfo, settings: &BridgeSettings) -> Vec<ServiceRecord> {
    let candidates: Vec<(&PortBinding, String, u16)> = container
        .ports
        .iter()
        .filter_map(|port| {
            advertised_address(container, port, settings).map(|(ip, p)| (port, ip, p))
        })
        .collect();

    let distinct_ports: HashSet<(u16, &str)> = candidates
        .iter()
        .map(|(port, _, _)| (port.container_port, port.protocol.as_str()))
        .collect();
    let multi_port = distinct_ports.len() > 1;

    let base_name = service_base_name(container);
    let mut seen = HashSet::new();
    let mut services = Vec::with_capacity(candidates.len());

    for (port, ip, advertised_port) in candidates {
        let id = service_id(&settings.node, &container.name, port);
        if !seen.insert(id.clone()) {
            continue;
        }

        let name = if multi_port {
            format!("{base_name}-{}", port.container_port)
        } else {
            base_name.clone()
        };

        services.push(ServiceRecord {
            id,
            name,
            container_id: container.id.clone(),
            ip,
            port: advertised_port,
            protocol: port.protocol.clone(),
            tags: settings.tags.clone(),
            ttl: settings.ttl,
            node: settings.node.clone(),
        });
    }

    services
}

fn advertised_address(
    container: &ContainerInfo,
    port: &PortBinding,
    settings: &BridgeSettings,
) -> Option<(String, u16)> {
    match settings.address_mode {
        AddressMode::Published => {
            let host_port = port.host_port?;
            let ip = settings
                .host_ip
                .clone()
                .unwrap_or_else(|| port.host_ip.clone());
            Some((ip, host_port))
        }
        AddressMode::Internal => non_empty(&container.ip_address).map(|ip| (ip, port.container_port)),
        AddressMode::Global => {
            non_empty(&container.global_ipv6_address).map(|ip| (ip, port.container_port))
        }
    }
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_owned())
}

/// `node:container-name:port[:udp]`
pub fn service_id(node: &str, container_name: &str, port: &PortBinding) -> String {
    if port.protocol == "tcp" {
        format!("{node}:{container_name}:{}", port.container_port)
    } else {
        format!(
            "{node}:{container_name}:{}:{}",
            port.container_port, port.protocol
        )
    }
}

/// 이미지 이름에서 레지스트리 경로와 태그/다이제스트를 떼어낸 이름
///
/// 이미지가 비어 있으면 컨테이너 이름을 씁니다.
pub fn service_base_name(container: &ContainerInfo) -> String {
    let image = container.image.split('@').next().unwrap_or_default();
    let last = image.rsplit('/').next().unwrap_or_default();
    let name = last.split(':').next().unwrap_or_default();

    if name.is_empty() {
        container.name.clone()
    } else {
        name.to_owned()
    }
}
