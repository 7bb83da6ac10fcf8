//! Search within a single (context, namespace) scope

use tracing::debug;

use k8sx_k8s::{ApiError, ClusterApi, ListOutcome, pod_to_info, service_to_info};
use k8sx_types::{Scope, ScopedResult};

use crate::matcher::Matches;

/// Pods and services in `scope` whose IPs equal `ip`
///
/// A forbidden listing skips that resource kind; any other failure is
/// returned as the scope's error.
pub async fn search_ip<A: ClusterApi>(
    api: &A,
    scope: &Scope,
    ip: &str,
) -> Result<ScopedResult, ApiError> {
    let mut result = ScopedResult::new(scope);

    match ListOutcome::from(api.list_pods(&scope.namespace).await) {
        ListOutcome::Ok(pods) => {
            result.pods = pods
                .into_iter()
                .map(pod_to_info)
                .filter(|pod| pod.matches_ip(ip))
                .collect();
        }
        ListOutcome::Forbidden => {
            debug!(scope = %scope, "Skipping pods: permission denied");
        }
        ListOutcome::Failed(e) => return Err(e),
    }

    match ListOutcome::from(api.list_services(&scope.namespace).await) {
        ListOutcome::Ok(services) => {
            result.services = services
                .into_iter()
                .map(service_to_info)
                .filter(|svc| svc.matches_ip(ip))
                .collect();
        }
        ListOutcome::Forbidden => {
            debug!(scope = %scope, "Skipping services: permission denied");
        }
        ListOutcome::Failed(e) => return Err(e),
    }

    Ok(result)
}

/// Pods in `scope` whose name contains `name`
pub async fn search_name<A: ClusterApi>(
    api: &A,
    scope: &Scope,
    name: &str,
) -> Result<ScopedResult, ApiError> {
    let mut result = ScopedResult::new(scope);

    match ListOutcome::from(api.list_pods(&scope.namespace).await) {
        ListOutcome::Ok(pods) => {
            result.pods = pods
                .into_iter()
                .map(pod_to_info)
                .filter(|pod| pod.matches_name(name))
                .collect();
        }
        ListOutcome::Forbidden => {
            debug!(scope = %scope, "Skipping pods: permission denied");
        }
        ListOutcome::Failed(e) => return Err(e),
    }

    Ok(result)
}
