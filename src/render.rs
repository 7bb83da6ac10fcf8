//! Table and JSON output

use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, Table};

use k8sx_search::Query;
use k8sx_types::{Access, ContextInfo, NamespaceAccess, PodInfo, SearchReport, ServiceInfo};

fn new_table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(header.to_vec());
    table
}

/// Owner column: the ReplicaSet plus its Deployment when known
fn owner_display(pod: &PodInfo) -> String {
    match &pod.workload {
        Some(deployment) => format!("{} (Deployment: {})", pod.owner_name, deployment),
        None => pod.owner_name.clone(),
    }
}

fn pods_table(pods: &[PodInfo]) -> Table {
    let mut table = new_table(&["Pod Name", "Pod IP", "Host IP", "Owner Kind", "Owner Name"]);
    for pod in pods {
        table.add_row(vec![
            pod.name.clone(),
            pod.pod_ip.clone(),
            pod.host_ip.clone(),
            pod.owner_kind.clone(),
            owner_display(pod),
        ]);
    }
    table
}

fn services_table(services: &[ServiceInfo]) -> Table {
    let mut table = new_table(&[
        "Service Name",
        "Type",
        "Cluster IP",
        "External IPs",
        "Ports",
        "Selector",
    ]);
    for svc in services {
        let ports: Vec<String> = svc.ports.iter().map(ToString::to_string).collect();
        let selector: Vec<String> = svc
            .selector
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();

        table.add_row(vec![
            svc.name.clone(),
            svc.service_type.to_string(),
            svc.cluster_ip.clone(),
            svc.external_ips.join(", "),
            ports.join(", "),
            selector.join(", "),
        ]);
    }
    table
}

/// Human-readable rendering of a search report
pub fn search_report(report: &SearchReport, query: &Query) -> String {
    let mut out = String::new();

    if report.is_empty() {
        let what = if query.is_ip() {
            format!("No resources found for IP: {}", query.as_str())
        } else {
            format!("No pods found with name containing: {}", query.as_str())
        };
        out.push_str(&what);
        out.push('\n');
    }

    for result in &report.results {
        if !result.pods.is_empty() {
            out.push_str(&format!(
                "\n=== Pods in Context: {}, Namespace: {} ===\n",
                result.context, result.namespace
            ));
            out.push_str(&pods_table(&result.pods).to_string());
            out.push('\n');
        }

        if !result.services.is_empty() {
            out.push_str(&format!(
                "\n=== Services in Context: {}, Namespace: {} ===\n",
                result.context, result.namespace
            ));
            out.push_str(&services_table(&result.services).to_string());
            out.push('\n');
        }
    }

    let stats = &report.stats;
    out.push_str("\n=== Summary ===\n");
    out.push_str(&format!("Scopes with matches: {}\n", report.results.len()));
    out.push_str(&format!("Total pods found: {}\n", report.pod_count()));
    if query.is_ip() {
        out.push_str(&format!("Total services found: {}\n", report.service_count()));
    }
    out.push_str(&format!(
        "Contexts searched: {} (skipped: {})\n",
        stats.contexts_searched, stats.contexts_skipped
    ));
    if stats.scopes_failed > 0 {
        out.push_str(&format!("Scopes failed: {}\n", stats.scopes_failed));
    }
    if stats.cancelled {
        out.push_str("Search stopped early; results are partial\n");
    }

    out
}

/// Context list with the current context marked
pub fn contexts(contexts: &[ContextInfo]) -> String {
    if contexts.is_empty() {
        return "No contexts found in kubeconfig\n".to_string();
    }

    let mut table = new_table(&["Context Name", "Cluster", "Current"]);
    for ctx in contexts {
        table.add_row(vec![
            ctx.name.clone(),
            ctx.cluster.clone(),
            if ctx.is_current { "*" } else { "" }.to_string(),
        ]);
    }
    format!("{}\n", table)
}

/// Namespace access report for one context
pub fn namespace_access(context: &str, rows: &[NamespaceAccess]) -> String {
    let mut out = format!("Listing namespaces from context: {}\n\n", context);

    if rows.is_empty() {
        out.push_str("No namespaces found\n");
        return out;
    }

    let mut table = new_table(&["Namespace", "Status", "Access", "Notes"]);
    for row in rows {
        let (access, notes) = match &row.access {
            Access::Allowed => (Cell::new("✓ Allowed").fg(Color::Green), String::new()),
            Access::Denied(reason) => (Cell::new("✗ Denied").fg(Color::Red), reason.clone()),
        };
        table.add_row(vec![
            Cell::new(&row.namespace.name),
            Cell::new(&row.namespace.status),
            access,
            Cell::new(notes),
        ]);
    }
    out.push_str(&table.to_string());
    out.push('\n');

    let accessible: Vec<&str> = rows
        .iter()
        .filter(|r| r.is_allowed())
        .map(|r| r.namespace.name.as_str())
        .collect();

    out.push_str("\n=== Summary ===\n");
    out.push_str(&format!("Total namespaces: {}\n", rows.len()));
    out.push_str(&format!("Accessible: {}\n", accessible.len()));
    out.push_str(&format!("Denied: {}\n", rows.len() - accessible.len()));

    if !accessible.is_empty() {
        out.push_str("\nAccessible namespaces (for use with --namespaces flag):\n");
        out.push_str(&accessible.join(","));
        out.push('\n');
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8sx_types::{
        NamespaceInfo, Scope, ScopedResult, SearchStats, ServicePortInfo, ServiceType,
    };
    use std::collections::BTreeMap;

    fn report() -> SearchReport {
        let mut result = ScopedResult::new(&Scope::new("prod", "web"));

        let mut pod = PodInfo::new("web-5d8f-x".to_string(), "web".to_string());
        pod.pod_ip = "10.0.0.1".to_string();
        pod.owner_kind = "ReplicaSet".to_string();
        pod.owner_name = "web-5d8f".to_string();
        pod.workload = Some("web".to_string());
        result.pods.push(pod);

        let mut svc = ServiceInfo::new("web".to_string(), "web".to_string());
        svc.cluster_ip = "10.0.0.1".to_string();
        svc.service_type = ServiceType::ClusterIP;
        svc.ports = vec![ServicePortInfo::new(80, Some("http".to_string()), "TCP".to_string())];
        svc.selector = BTreeMap::from([
            ("tier".to_string(), "frontend".to_string()),
            ("app".to_string(), "web".to_string()),
        ]);
        result.services.push(svc);

        SearchReport::new(vec![result], SearchStats::default())
    }

    #[test]
    fn test_owner_display() {
        let mut pod = PodInfo::new("x".to_string(), "ns".to_string());
        pod.owner_name = "rs-A".to_string();
        assert_eq!(owner_display(&pod), "rs-A");

        pod.workload = Some("dep-A".to_string());
        assert_eq!(owner_display(&pod), "rs-A (Deployment: dep-A)");
    }

    #[test]
    fn test_search_report_sections() {
        let query = Query::parse("10.0.0.1").unwrap();
        let out = search_report(&report(), &query);

        assert!(out.contains("=== Pods in Context: prod, Namespace: web ==="));
        assert!(out.contains("=== Services in Context: prod, Namespace: web ==="));
        assert!(out.contains("web-5d8f (Deployment: web)"));
        assert!(out.contains("80:http/TCP"));
        assert!(out.contains("app=web, tier=frontend"));
        assert!(out.contains("Total services found: 1"));
        assert!(!out.contains("partial"));
    }

    #[test]
    fn test_empty_report_message() {
        let query = Query::parse("nginx").unwrap();
        let stats = SearchStats {
            cancelled: true,
            ..Default::default()
        };
        let out = search_report(&SearchReport::new(Vec::new(), stats), &query);

        assert!(out.contains("No pods found with name containing: nginx"));
        assert!(!out.contains("Total services found"));
        assert!(out.contains("results are partial"));
    }

    #[test]
    fn test_namespace_access_summary() {
        let rows = vec![
            NamespaceAccess {
                namespace: NamespaceInfo::new("default".to_string(), "Active".to_string()),
                access: Access::Allowed,
            },
            NamespaceAccess {
                namespace: NamespaceInfo::new("kube-system".to_string(), "Active".to_string()),
                access: Access::Denied("Permission Denied".to_string()),
            },
            NamespaceAccess {
                namespace: NamespaceInfo::new("team-a".to_string(), "Active".to_string()),
                access: Access::Allowed,
            },
        ];

        let out = namespace_access("prod", &rows);
        assert!(out.starts_with("Listing namespaces from context: prod"));
        assert!(out.contains("Accessible: 2"));
        assert!(out.contains("Denied: 1"));
        assert!(out.ends_with("default,team-a\n"));
    }

    #[test]
    fn test_contexts_marks_current() {
        let mut current = ContextInfo::named("staging");
        current.is_current = true;
        let out = contexts(&[ContextInfo::named("prod"), current]);
        assert!(out.contains("prod"));
        assert!(out.contains("*"));
        assert_eq!(contexts(&[]), "No contexts found in kubeconfig\n");
    }
}
