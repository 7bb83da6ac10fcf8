//! In-memory cluster used by the search tests

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use k8s_openapi::api::apps::v1::ReplicaSet;
use k8s_openapi::api::core::v1::{
    LoadBalancerIngress, LoadBalancerStatus, Pod, PodStatus, Service, ServiceSpec, ServiceStatus,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, OwnerReference};

use k8sx_k8s::{ApiError, ClientFactory, ClusterApi};
use k8sx_types::NamespaceInfo;

/// Canned answer for one list call
#[derive(Clone, Debug)]
pub enum Listing<T> {
    Items(Vec<T>),
    Forbidden,
    Broken,
    /// Never answers
    Hang,
}

impl<T: Clone> Listing<T> {
    async fn answer(&self) -> Result<Vec<T>, ApiError> {
        match self {
            Self::Items(items) => Ok(items.clone()),
            Self::Forbidden => Err(ApiError::Forbidden("access denied".to_string())),
            Self::Broken => Err(ApiError::Api {
                code: 500,
                message: "internal error".to_string(),
            }),
            Self::Hang => std::future::pending().await,
        }
    }
}

#[derive(Clone)]
pub struct FakeCluster {
    namespaces: Listing<String>,
    pods: HashMap<String, Listing<Pod>>,
    services: HashMap<String, Listing<Service>>,
    replica_sets: HashMap<(String, String), ReplicaSet>,
    replica_set_gets: Arc<AtomicUsize>,
}

impl FakeCluster {
    pub fn new(namespaces: &[&str]) -> Self {
        Self {
            namespaces: Listing::Items(namespaces.iter().map(|n| n.to_string()).collect()),
            pods: HashMap::new(),
            services: HashMap::new(),
            replica_sets: HashMap::new(),
            replica_set_gets: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn namespace_listing(mut self, listing: Listing<String>) -> Self {
        self.namespaces = listing;
        self
    }

    pub fn pods(mut self, namespace: &str, listing: Listing<Pod>) -> Self {
        self.pods.insert(namespace.to_string(), listing);
        self
    }

    pub fn services(mut self, namespace: &str, listing: Listing<Service>) -> Self {
        self.services.insert(namespace.to_string(), listing);
        self
    }

    pub fn replica_set(mut self, rs: ReplicaSet) -> Self {
        let key = (
            rs.metadata.namespace.clone().unwrap_or_default(),
            rs.metadata.name.clone().unwrap_or_default(),
        );
        self.replica_sets.insert(key, rs);
        self
    }

    pub fn replica_set_gets(&self) -> usize {
        self.replica_set_gets.load(Ordering::SeqCst)
    }

    fn pod_listing(&self, namespace: &str) -> Listing<Pod> {
        self.pods
            .get(namespace)
            .cloned()
            .unwrap_or(Listing::Items(Vec::new()))
    }
}

impl ClusterApi for FakeCluster {
    async fn list_namespaces(&self) -> Result<Vec<NamespaceInfo>, ApiError> {
        let names = self.namespaces.answer().await?;
        Ok(names
            .into_iter()
            .map(|name| NamespaceInfo::new(name, "Active".to_string()))
            .collect())
    }

    async fn probe_pods(&self, namespace: &str) -> Result<(), ApiError> {
        self.pod_listing(namespace).answer().await.map(|_| ())
    }

    async fn list_pods(&self, namespace: &str) -> Result<Vec<Pod>, ApiError> {
        self.pod_listing(namespace).answer().await
    }

    async fn list_services(&self, namespace: &str) -> Result<Vec<Service>, ApiError> {
        self.services
            .get(namespace)
            .cloned()
            .unwrap_or(Listing::Items(Vec::new()))
            .answer()
            .await
    }

    async fn get_replica_set(&self, namespace: &str, name: &str) -> Result<ReplicaSet, ApiError> {
        self.replica_set_gets.fetch_add(1, Ordering::SeqCst);
        self.replica_sets
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("replicasets \"{}\" not found", name)))
    }
}

/// Hands out clones of preconfigured clusters; unknown contexts fail to connect
#[derive(Default)]
pub struct FakeFactory {
    clusters: HashMap<String, FakeCluster>,
}

impl FakeFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cluster(mut self, context: &str, cluster: FakeCluster) -> Self {
        self.clusters.insert(context.to_string(), cluster);
        self
    }
}

impl ClientFactory for FakeFactory {
    type Api = FakeCluster;

    async fn connect(&self, context: &str) -> Result<FakeCluster, ApiError> {
        self.clusters
            .get(context)
            .cloned()
            .ok_or_else(|| ApiError::Client {
                context: context.to_string(),
                message: "cluster unreachable".to_string(),
            })
    }
}

fn owner_ref(kind: &str, name: &str) -> OwnerReference {
    OwnerReference {
        api_version: "apps/v1".to_string(),
        kind: kind.to_string(),
        name: name.to_string(),
        uid: format!("uid-{}", name),
        ..Default::default()
    }
}

pub fn pod(name: &str, namespace: &str, pod_ip: &str, host_ip: &str) -> Pod {
    Pod {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            labels: Some(BTreeMap::from([("app".to_string(), name.to_string())])),
            ..Default::default()
        },
        spec: None,
        status: Some(PodStatus {
            pod_ip: Some(pod_ip.to_string()),
            host_ip: Some(host_ip.to_string()),
            phase: Some("Running".to_string()),
            ..Default::default()
        }),
    }
}

pub fn owned_pod(name: &str, namespace: &str, pod_ip: &str, kind: &str, owner: &str) -> Pod {
    let mut pod = pod(name, namespace, pod_ip, "192.168.0.1");
    pod.metadata.owner_references = Some(vec![owner_ref(kind, owner)]);
    pod
}

pub fn service(name: &str, namespace: &str, service_type: &str, cluster_ip: &str) -> Service {
    Service {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        },
        spec: Some(ServiceSpec {
            cluster_ip: Some(cluster_ip.to_string()),
            type_: Some(service_type.to_string()),
            ..Default::default()
        }),
        status: None,
    }
}

pub fn with_ingress(mut svc: Service, ips: &[&str]) -> Service {
    svc.status = Some(ServiceStatus {
        load_balancer: Some(LoadBalancerStatus {
            ingress: Some(
                ips.iter()
                    .map(|ip| LoadBalancerIngress {
                        ip: Some(ip.to_string()),
                        ..Default::default()
                    })
                    .collect(),
            ),
        }),
        ..Default::default()
    });
    svc
}

pub fn replica_set(name: &str, namespace: &str, owners: &[(&str, &str)]) -> ReplicaSet {
    ReplicaSet {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            owner_references: Some(owners.iter().map(|(k, n)| owner_ref(k, n)).collect()),
            ..Default::default()
        },
        ..Default::default()
    }
}
