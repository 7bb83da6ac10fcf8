//! Read-only cluster capability used by the search engine

use k8s_openapi::api::apps::v1::ReplicaSet;
use k8s_openapi::api::core::v1::{Namespace, Pod, Service};
use kube::Api;
use kube::api::ListParams;

use k8sx_types::NamespaceInfo;

use crate::convert::namespace_to_info;
use crate::error::ApiError;

/// List/get operations against one cluster context
///
/// Every call may fail with a permission error (`ApiError::is_permission`)
/// or with anything else; callers decide which of the two to tolerate.
///
/// Futures returned by these methods are awaited in place, never spawned,
/// so no `Send` bound is declared.
#[allow(async_fn_in_trait)]
pub trait ClusterApi {
    /// All namespaces visible to the credentials, in API order
    async fn list_namespaces(&self) -> Result<Vec<NamespaceInfo>, ApiError>;

    /// Try to list a single pod, to find out whether pods in `namespace` are readable
    async fn probe_pods(&self, namespace: &str) -> Result<(), ApiError>;

    async fn list_pods(&self, namespace: &str) -> Result<Vec<Pod>, ApiError>;

    async fn list_services(&self, namespace: &str) -> Result<Vec<Service>, ApiError>;

    async fn get_replica_set(&self, namespace: &str, name: &str) -> Result<ReplicaSet, ApiError>;
}

/// Builds a `ClusterApi` bound to a kubeconfig context
#[allow(async_fn_in_trait)]
pub trait ClientFactory {
    type Api: ClusterApi;

    async fn connect(&self, context: &str) -> Result<Self::Api, ApiError>;
}

/// `ClusterApi` backed by a `kube::Client`
#[derive(Clone)]
pub struct KubeApi {
    client: kube::Client,
}

impl KubeApi {
    pub fn new(client: kube::Client) -> Self {
        Self { client }
    }
}

impl ClusterApi for KubeApi {
    async fn list_namespaces(&self) -> Result<Vec<NamespaceInfo>, ApiError> {
        let namespaces: Api<Namespace> = Api::all(self.client.clone());
        let list = namespaces.list(&ListParams::default()).await?;
        Ok(list.items.into_iter().map(namespace_to_info).collect())
    }

    async fn probe_pods(&self, namespace: &str) -> Result<(), ApiError> {
        let pods: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        pods.list(&ListParams::default().limit(1)).await?;
        Ok(())
    }

    async fn list_pods(&self, namespace: &str) -> Result<Vec<Pod>, ApiError> {
        let pods: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        Ok(pods.list(&ListParams::default()).await?.items)
    }

    async fn list_services(&self, namespace: &str) -> Result<Vec<Service>, ApiError> {
        let services: Api<Service> = Api::namespaced(self.client.clone(), namespace);
        Ok(services.list(&ListParams::default()).await?.items)
    }

    async fn get_replica_set(&self, namespace: &str, name: &str) -> Result<ReplicaSet, ApiError> {
        let replica_sets: Api<ReplicaSet> = Api::namespaced(self.client.clone(), namespace);
        Ok(replica_sets.get(name).await?)
    }
}
