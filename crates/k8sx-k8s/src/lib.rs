//! Kubernetes client for k8sx
//!
//! This crate loads kubeconfig contexts, builds per-context API clients and
//! exposes the small read-only capability the search engine needs: list
//! namespaces, pods and services, and fetch ReplicaSets.

mod api;
mod client;
mod convert;
mod error;

pub use api::{ClientFactory, ClusterApi, KubeApi};
pub use client::KubeClient;
pub use convert::{namespace_to_info, pod_to_info, service_to_info};
pub use error::{ApiError, ListOutcome};

// Re-export the resource types that appear in the ClusterApi signatures
pub use k8s_openapi::api::apps::v1::ReplicaSet;
pub use k8s_openapi::api::core::v1::{Pod, Service};

// Re-export types that are used in our public API
pub use k8sx_types::{ContextInfo, NamespaceInfo, PodInfo, ServiceInfo};
