use k8sx_k8s::ApiError;
use thiserror::Error;

/// Conditions that make a search fail as a whole
///
/// All but `NoSearchableScope` are caught before any cluster is contacted.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("invalid IP address: {0}")]
    InvalidIp(String),

    #[error("query cannot be empty")]
    EmptyQuery,

    #[error("context '{0}' not found in kubeconfig")]
    UnknownContext(String),

    #[error("no contexts found in kubeconfig")]
    NoContexts,

    #[error("nothing to search: all {0} context(s) were unreachable or could not list namespaces")]
    NoSearchableScope(usize),
}

/// Why a ReplicaSet could not be traced back to a Deployment
#[derive(Debug, Error)]
pub enum OwnerError {
    #[error("replicaset {0} not found")]
    NotFound(String),

    #[error("replicaset {0} has no owner")]
    NoOwner(String),

    #[error("no deployment found for replicaset {0}")]
    NoDeployment(String),

    #[error(transparent)]
    Api(#[from] ApiError),
}
