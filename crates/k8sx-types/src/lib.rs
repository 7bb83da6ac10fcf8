//! Shared types for k8sx
//!
//! This crate contains the data model produced by a search and consumed by
//! the renderers: contexts, namespaces, pod and service records, and the
//! per-scope result groups.

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

// ============================================================================
// Kubeconfig Types
// ============================================================================

/// Kubernetes context information
#[derive(Clone, Debug, Serialize)]
pub struct ContextInfo {
    pub name: String,
    pub cluster: String,
    pub user: String,
    pub namespace: Option<String>,
    pub is_current: bool,
}

impl ContextInfo {
    pub fn new(
        name: String,
        cluster: String,
        user: String,
        namespace: Option<String>,
        is_current: bool,
    ) -> Self {
        Self {
            name,
            cluster,
            user,
            namespace,
            is_current,
        }
    }

    /// Context with only a name, used when the kubeconfig details don't matter
    pub fn named(name: impl Into<String>) -> Self {
        Self::new(name.into(), String::new(), String::new(), None, false)
    }
}

/// Namespace information
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NamespaceInfo {
    pub name: String,
    pub status: String,
}

impl NamespaceInfo {
    pub fn new(name: String, status: String) -> Self {
        Self { name, status }
    }
}

/// One (context, namespace) pair under search
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Scope {
    pub context: String,
    pub namespace: String,
}

impl Scope {
    pub fn new(context: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            namespace: namespace.into(),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.context, self.namespace)
    }
}

// ============================================================================
// Resource Records
// ============================================================================

/// Pod information
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PodInfo {
    pub name: String,
    pub namespace: String,
    pub pod_ip: String,
    pub host_ip: String,
    /// Kind of the first owner reference, empty when the pod has none
    pub owner_kind: String,
    /// Name of the first owner reference, empty when the pod has none
    pub owner_name: String,
    /// Deployment behind the owning ReplicaSet, when it could be resolved
    pub workload: Option<String>,
    pub status: PodStatus,
    pub node_name: Option<String>,
    pub labels: BTreeMap<String, String>,
    pub annotations: BTreeMap<String, String>,
}

impl PodInfo {
    pub fn new(name: String, namespace: String) -> Self {
        Self {
            name,
            namespace,
            pod_ip: String::new(),
            host_ip: String::new(),
            owner_kind: String::new(),
            owner_name: String::new(),
            workload: None,
            status: PodStatus::Unknown,
            node_name: None,
            labels: BTreeMap::new(),
            annotations: BTreeMap::new(),
        }
    }

    /// Whether the pod is controlled by a ReplicaSet (and so may belong to a Deployment)
    pub fn is_replica_set_owned(&self) -> bool {
        self.owner_kind == "ReplicaSet" && !self.owner_name.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum PodStatus {
    Pending,
    Running,
    Succeeded,
    Failed,
    Unknown,
}

impl From<&str> for PodStatus {
    fn from(s: &str) -> Self {
        match s {
            "Pending" => Self::Pending,
            "Running" => Self::Running,
            "Succeeded" => Self::Succeeded,
            "Failed" => Self::Failed,
            _ => Self::Unknown,
        }
    }
}

/// Service type, keeping values this build doesn't know about
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum ServiceType {
    #[default]
    ClusterIP,
    NodePort,
    LoadBalancer,
    ExternalName,
    Other(String),
}

impl ServiceType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::ClusterIP => "ClusterIP",
            Self::NodePort => "NodePort",
            Self::LoadBalancer => "LoadBalancer",
            Self::ExternalName => "ExternalName",
            Self::Other(s) => s,
        }
    }
}

impl From<&str> for ServiceType {
    fn from(s: &str) -> Self {
        match s {
            "ClusterIP" => Self::ClusterIP,
            "NodePort" => Self::NodePort,
            "LoadBalancer" => Self::LoadBalancer,
            "ExternalName" => Self::ExternalName,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ServiceType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A single service port descriptor
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ServicePortInfo {
    pub name: Option<String>,
    pub port: i32,
    /// Numeric or named target port, `None` when the API left it unset
    pub target_port: Option<String>,
    pub protocol: String,
}

impl ServicePortInfo {
    pub fn new(port: i32, target_port: Option<String>, protocol: String) -> Self {
        Self {
            name: None,
            port,
            target_port,
            protocol,
        }
    }
}

impl fmt::Display for ServicePortInfo {
    /// Formats as `port:target/protocol`; an unset target defaults to the port itself
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.target_port {
            Some(target) => write!(f, "{}:{}/{}", self.port, target, self.protocol),
            None => write!(f, "{}:{}/{}", self.port, self.port, self.protocol),
        }
    }
}

/// Service information
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ServiceInfo {
    pub name: String,
    pub namespace: String,
    pub cluster_ip: String,
    pub external_ips: Vec<String>,
    /// Ingress IPs reported in the load balancer status
    pub load_balancer_ips: Vec<String>,
    pub service_type: ServiceType,
    pub ports: Vec<ServicePortInfo>,
    pub selector: BTreeMap<String, String>,
}

impl ServiceInfo {
    pub fn new(name: String, namespace: String) -> Self {
        Self {
            name,
            namespace,
            cluster_ip: String::new(),
            external_ips: Vec::new(),
            load_balancer_ips: Vec::new(),
            service_type: ServiceType::default(),
            ports: Vec::new(),
            selector: BTreeMap::new(),
        }
    }
}

// ============================================================================
// Search Results
// ============================================================================

/// Matches found within exactly one (context, namespace) pair
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScopedResult {
    pub context: String,
    pub namespace: String,
    pub pods: Vec<PodInfo>,
    pub services: Vec<ServiceInfo>,
}

impl ScopedResult {
    pub fn new(scope: &Scope) -> Self {
        Self {
            context: scope.context.clone(),
            namespace: scope.namespace.clone(),
            pods: Vec::new(),
            services: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pods.is_empty() && self.services.is_empty()
    }

    pub fn scope(&self) -> Scope {
        Scope::new(self.context.clone(), self.namespace.clone())
    }
}

/// Counters describing how a search went, independent of what it found
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SearchStats {
    /// Contexts whose client could be built and whose scopes were resolved
    pub contexts_searched: usize,
    /// Contexts skipped because the client or namespace discovery failed
    pub contexts_skipped: usize,
    pub scopes_searched: usize,
    /// Scopes whose listing failed with a non-permission error
    pub scopes_failed: usize,
    /// The deadline or a cancellation stopped the search before every context finished
    pub cancelled: bool,
}

/// Aggregate output of a cross-context search
#[derive(Clone, Debug, Serialize)]
pub struct SearchReport {
    pub generated_at: DateTime<Utc>,
    pub results: Vec<ScopedResult>,
    pub stats: SearchStats,
}

impl SearchReport {
    pub fn new(results: Vec<ScopedResult>, stats: SearchStats) -> Self {
        Self {
            generated_at: Utc::now(),
            results,
            stats,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn pod_count(&self) -> usize {
        self.results.iter().map(|r| r.pods.len()).sum()
    }

    pub fn service_count(&self) -> usize {
        self.results.iter().map(|r| r.services.len()).sum()
    }
}

// ============================================================================
// Namespace Access
// ============================================================================

/// Whether the current credentials can list pods in a namespace
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum Access {
    Allowed,
    Denied(String),
}

/// One row of the namespace access report
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NamespaceAccess {
    pub namespace: NamespaceInfo,
    pub access: Access,
}

impl NamespaceAccess {
    pub fn is_allowed(&self) -> bool {
        matches!(self.access, Access::Allowed)
    }
}
