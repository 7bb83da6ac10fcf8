//! Conversions from k8s-openapi objects to k8sx records

use k8s_openapi::api::core::v1::{Namespace, Pod, Service};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;

use k8sx_types::{NamespaceInfo, PodInfo, PodStatus, ServiceInfo, ServicePortInfo, ServiceType};

/// Convert a k8s Namespace to NamespaceInfo
pub fn namespace_to_info(ns: Namespace) -> NamespaceInfo {
    let name = ns.metadata.name.unwrap_or_default();
    let status = ns
        .status
        .and_then(|s| s.phase)
        .unwrap_or_else(|| "Unknown".to_string());
    NamespaceInfo::new(name, status)
}

/// Convert a k8s Pod to PodInfo
///
/// Owner kind/name come from the first owner reference and stay empty when
/// the pod has none.
pub fn pod_to_info(pod: Pod) -> PodInfo {
    let name = pod.metadata.name.unwrap_or_default();
    let namespace = pod.metadata.namespace.unwrap_or_default();
    let mut info = PodInfo::new(name, namespace);

    if let Some(owner) = pod
        .metadata
        .owner_references
        .as_ref()
        .and_then(|owners| owners.first())
    {
        info.owner_kind = owner.kind.clone();
        info.owner_name = owner.name.clone();
    }

    info.labels = pod.metadata.labels.unwrap_or_default();
    info.annotations = pod.metadata.annotations.unwrap_or_default();

    if let Some(spec) = &pod.spec {
        info.node_name = spec.node_name.clone();
    }

    if let Some(status) = pod.status {
        info.pod_ip = status.pod_ip.unwrap_or_default();
        info.host_ip = status.host_ip.unwrap_or_default();
        info.status = status
            .phase
            .as_deref()
            .map(PodStatus::from)
            .unwrap_or(PodStatus::Unknown);
    }

    info
}

/// Convert a k8s Service to ServiceInfo
pub fn service_to_info(svc: Service) -> ServiceInfo {
    let name = svc.metadata.name.unwrap_or_default();
    let namespace = svc.metadata.namespace.unwrap_or_default();
    let mut info = ServiceInfo::new(name, namespace);

    if let Some(spec) = svc.spec {
        info.cluster_ip = spec.cluster_ip.unwrap_or_default();
        info.external_ips = spec.external_ips.unwrap_or_default();
        info.service_type = spec
            .type_
            .as_deref()
            .map(ServiceType::from)
            .unwrap_or_default();
        info.selector = spec.selector.unwrap_or_default();
        info.ports = spec
            .ports
            .unwrap_or_default()
            .into_iter()
            .map(|p| {
                let target = p.target_port.map(|t| match t {
                    IntOrString::Int(n) => n.to_string(),
                    IntOrString::String(s) => s,
                });
                let mut port =
                    ServicePortInfo::new(p.port, target, p.protocol.unwrap_or_else(|| "TCP".into()));
                port.name = p.name;
                port
            })
            .collect();
    }

    info.load_balancer_ips = svc
        .status
        .and_then(|s| s.load_balancer)
        .and_then(|lb| lb.ingress)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|ingress| ingress.ip)
        .collect();

    info
}
