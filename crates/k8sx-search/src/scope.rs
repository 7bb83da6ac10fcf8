//! Which (context, namespace) pairs a search visits

use futures::{StreamExt, stream};
use tracing::{debug, warn};

use k8sx_k8s::{ApiError, ClientFactory, ClusterApi};
use k8sx_types::{ContextInfo, Scope};

/// Namespaces of one context whose pods the credentials can list
///
/// Every namespace known to the API gets a one-pod list probe; only the
/// ones that answer are kept, in API listing order. Failing to list the
/// namespaces themselves is returned as an error.
pub async fn accessible_namespaces<A: ClusterApi>(
    api: &A,
    probe_concurrency: usize,
) -> Result<Vec<String>, ApiError> {
    let namespaces = api.list_namespaces().await?;

    let probes: Vec<(String, Result<(), ApiError>)> = stream::iter(namespaces)
        .map(|ns| async move {
            let probe = api.probe_pods(&ns.name).await;
            (ns.name, probe)
        })
        .buffered(probe_concurrency.max(1))
        .collect()
        .await;

    Ok(probes
        .into_iter()
        .filter_map(|(namespace, probe)| match probe {
            Ok(()) => Some(namespace),
            Err(e) => {
                debug!(namespace = %namespace, error = %e, "Namespace not accessible");
                None
            }
        })
        .collect())
}

/// Namespaces to search in one context
///
/// An explicit list is used as is, without probing. Otherwise the
/// accessible namespaces are discovered; `None` means the context can't be
/// searched at all.
pub async fn namespaces_for_context<A: ClusterApi>(
    api: &A,
    context: &str,
    explicit: &[String],
    probe_concurrency: usize,
) -> Option<Vec<String>> {
    if !explicit.is_empty() {
        return Some(explicit.to_vec());
    }

    match accessible_namespaces(api, probe_concurrency).await {
        Ok(namespaces) => {
            debug!(
                context = %context,
                accessible = namespaces.len(),
                "Discovered accessible namespaces"
            );
            Some(namespaces)
        }
        Err(e) => {
            warn!(context = %context, error = %e, "Skipping context: cannot list namespaces");
            None
        }
    }
}

/// Scopes of one connected context, in namespace order
///
/// `None` means the context can't be searched at all.
pub async fn context_scopes<A: ClusterApi>(
    api: &A,
    context: &str,
    explicit: &[String],
    probe_concurrency: usize,
) -> Option<Vec<Scope>> {
    let namespaces = namespaces_for_context(api, context, explicit, probe_concurrency).await?;
    Some(
        namespaces
            .into_iter()
            .map(|ns| Scope::new(context, ns))
            .collect(),
    )
}

/// Ordered scopes for a set of contexts
///
/// Contexts keep their given order and namespaces their listing order. A
/// context that can't be reached, or whose namespaces can't be listed,
/// contributes nothing.
pub async fn resolve_scopes<F: ClientFactory>(
    factory: &F,
    contexts: &[ContextInfo],
    explicit: &[String],
    probe_concurrency: usize,
) -> Vec<Scope> {
    let mut scopes = Vec::new();

    for context in contexts {
        let api = match factory.connect(&context.name).await {
            Ok(api) => api,
            Err(e) => {
                warn!(context = %context.name, error = %e, "Skipping context: failed to create client");
                continue;
            }
        };

        if let Some(found) = context_scopes(&api, &context.name, explicit, probe_concurrency).await {
            scopes.extend(found);
        }
    }

    scopes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::{FakeCluster, FakeFactory, Listing, pod};

    fn contexts(names: &[&str]) -> Vec<ContextInfo> {
        names.iter().map(|n| ContextInfo::named(*n)).collect()
    }

    #[tokio::test]
    async fn test_discovery_keeps_only_probed_namespaces() {
        let cluster = FakeCluster::new(&["default", "kube-system", "team-a", "team-b"])
            .pods("kube-system", Listing::Forbidden)
            .pods("team-a", Listing::Items(vec![pod("a", "team-a", "10.0.0.1", "")]))
            .pods("team-b", Listing::Broken);

        let namespaces = accessible_namespaces(&cluster, 2).await.unwrap();
        assert_eq!(namespaces, vec!["default".to_string(), "team-a".to_string()]);
    }

    #[tokio::test]
    async fn test_discovery_fails_when_namespaces_cannot_be_listed() {
        let cluster = FakeCluster::new(&[]).namespace_listing(Listing::Forbidden);
        let result = accessible_namespaces(&cluster, 4).await;
        assert!(matches!(result, Err(e) if e.is_permission()));

        assert!(namespaces_for_context(&cluster, "prod", &[], 4).await.is_none());
    }

    #[tokio::test]
    async fn test_explicit_namespaces_are_not_probed() {
        let cluster = FakeCluster::new(&[])
            .namespace_listing(Listing::Forbidden)
            .pods("secret", Listing::Forbidden);
        let explicit = vec!["secret".to_string(), "web".to_string()];

        let namespaces = namespaces_for_context(&cluster, "prod", &explicit, 4).await;
        assert_eq!(namespaces, Some(explicit));
    }

    #[tokio::test]
    async fn test_explicit_namespaces_pair_with_every_context() {
        let factory = FakeFactory::new()
            .cluster("prod", FakeCluster::new(&[]))
            .cluster("dev", FakeCluster::new(&[]).namespace_listing(Listing::Forbidden));
        let explicit = vec!["web".to_string(), "db".to_string()];

        let scopes = resolve_scopes(
            &factory,
            &contexts(&["prod", "gone", "dev"]),
            &explicit,
            4,
        )
        .await;
        assert_eq!(
            scopes,
            vec![
                Scope::new("prod", "web"),
                Scope::new("prod", "db"),
                Scope::new("dev", "web"),
                Scope::new("dev", "db"),
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_contexts_contribute_no_scopes() {
        let factory = FakeFactory::new()
            .cluster("locked", FakeCluster::new(&[]).namespace_listing(Listing::Forbidden))
            .cluster("open", FakeCluster::new(&["default", "apps"]));

        let scopes = resolve_scopes(
            &factory,
            &contexts(&["unreachable", "locked", "open"]),
            &[],
            4,
        )
        .await;
        assert_eq!(
            scopes,
            vec![Scope::new("open", "default"), Scope::new("open", "apps")]
        );
    }

    #[tokio::test]
    async fn test_context_scopes_for_one_context() {
        let cluster = FakeCluster::new(&["default", "kube-system"])
            .pods("kube-system", Listing::Forbidden);

        let scopes = context_scopes(&cluster, "prod", &[], 4).await;
        assert_eq!(scopes, Some(vec![Scope::new("prod", "default")]));

        let locked = FakeCluster::new(&[]).namespace_listing(Listing::Broken);
        assert_eq!(context_scopes(&locked, "prod", &[], 4).await, None);
    }
}
