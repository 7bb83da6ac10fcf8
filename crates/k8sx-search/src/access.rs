//! Namespace access report for one context

use futures::{StreamExt, stream};

use k8sx_k8s::{ApiError, ClusterApi};
use k8sx_types::{Access, NamespaceAccess};

/// Every namespace of the context, marked with whether its pods can be listed
///
/// Unlike discovery, a failure to list the namespaces themselves is an
/// error here: there is nothing to report without them.
pub async fn namespace_access<A: ClusterApi>(
    api: &A,
    probe_concurrency: usize,
) -> Result<Vec<NamespaceAccess>, ApiError> {
    let namespaces = api.list_namespaces().await?;

    Ok(stream::iter(namespaces)
        .map(|namespace| async move {
            let access = match api.probe_pods(&namespace.name).await {
                Ok(()) => Access::Allowed,
                Err(e) if e.is_permission() => Access::Denied("Permission Denied".to_string()),
                Err(e) => Access::Denied(e.to_string()),
            };
            NamespaceAccess { namespace, access }
        })
        .buffered(probe_concurrency.max(1))
        .collect()
        .await)
}
