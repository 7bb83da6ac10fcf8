//! Best-effort lookup of the workload behind a pod's controller

use std::collections::HashMap;

use tracing::debug;

use k8sx_k8s::ClusterApi;
use k8sx_types::ScopedResult;

use crate::error::OwnerError;

const DEPLOYMENT_KIND: &str = "Deployment";

/// Name of the Deployment that owns `replica_set`
pub async fn resolve_deployment<A: ClusterApi>(
    api: &A,
    namespace: &str,
    replica_set: &str,
) -> Result<String, OwnerError> {
    let rs = api
        .get_replica_set(namespace, replica_set)
        .await
        .map_err(|e| {
            if e.is_not_found() {
                OwnerError::NotFound(replica_set.to_string())
            } else {
                OwnerError::Api(e)
            }
        })?;

    let owners = rs.metadata.owner_references.unwrap_or_default();
    if owners.is_empty() {
        return Err(OwnerError::NoOwner(replica_set.to_string()));
    }

    owners
        .into_iter()
        .find(|owner| owner.kind == DEPLOYMENT_KIND)
        .map(|owner| owner.name)
        .ok_or_else(|| OwnerError::NoDeployment(replica_set.to_string()))
}

/// Fill `PodInfo::workload` for ReplicaSet-owned pods of one scope
///
/// Each ReplicaSet is fetched at most once. Failures leave the pod as is.
pub(crate) async fn enrich_owners<A: ClusterApi>(api: &A, result: &mut ScopedResult) {
    let mut resolved: HashMap<String, Option<String>> = HashMap::new();

    for pod in result.pods.iter_mut().filter(|p| p.is_replica_set_owned()) {
        if !resolved.contains_key(&pod.owner_name) {
            let deployment = match resolve_deployment(api, &pod.namespace, &pod.owner_name).await {
                Ok(name) => Some(name),
                Err(e) => {
                    debug!(
                        namespace = %pod.namespace,
                        replica_set = %pod.owner_name,
                        error = %e,
                        "Owner not resolved"
                    );
                    None
                }
            };
            resolved.insert(pod.owner_name.clone(), deployment);
        }

        pod.workload = resolved.get(&pod.owner_name).cloned().flatten();
    }
}
