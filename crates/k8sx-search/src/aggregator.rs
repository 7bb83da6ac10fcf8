//! Fan a search out over every context and merge what comes back
//!
//! Each context is one unit of work: it builds its own client, resolves
//! its namespaces and searches them in order. Contexts run concurrently
//! up to `SearchOptions::concurrency`. Everything a worker learns is sent
//! to a single collector, so results that arrived before the deadline (or
//! a cancellation) survive it.

use std::time::Instant;

use futures::{StreamExt, stream};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use k8sx_k8s::{ClientFactory, ClusterApi};
use k8sx_types::{ContextInfo, Scope, ScopedResult, SearchReport, SearchStats};

use crate::error::SearchError;
use crate::matcher::Query;
use crate::options::SearchOptions;
use crate::owner::enrich_owners;
use crate::scope::context_scopes;
use crate::searcher::{search_ip, search_name};

/// Progress reported by context workers to the collector
enum Event {
    ContextSearched,
    ContextSkipped,
    Searched(ScopedResult),
    ScopeFailed,
}

/// Search every context for pods and services with IP `ip`
pub async fn search_all_ip<F: ClientFactory>(
    factory: &F,
    contexts: &[ContextInfo],
    options: &SearchOptions,
    ip: &str,
) -> Result<SearchReport, SearchError> {
    let query = Query::ip(ip)?;
    search_all(factory, contexts, options, &query, CancellationToken::new()).await
}

/// Search every context for pods whose name contains `name`
pub async fn search_all_name<F: ClientFactory>(
    factory: &F,
    contexts: &[ContextInfo],
    options: &SearchOptions,
    name: &str,
) -> Result<SearchReport, SearchError> {
    let query = Query::name(name)?;
    search_all(factory, contexts, options, &query, CancellationToken::new()).await
}

/// Run `query` across `contexts` until done, `options.timeout` elapses or `cancel` fires
///
/// Only non-empty scope results are kept. Results are ordered by context
/// position, then namespace order within a context.
///
/// Fails with `SearchError::NoSearchableScope` when every context was
/// skipped, unless the search was cut short first.
pub async fn search_all<F: ClientFactory>(
    factory: &F,
    contexts: &[ContextInfo],
    options: &SearchOptions,
    query: &Query,
    cancel: CancellationToken,
) -> Result<SearchReport, SearchError> {
    let start = Instant::now();
    let (tx, mut rx) = mpsc::unbounded_channel::<(usize, Event)>();

    let cancelled = {
        let tx = &tx;
        let workers = stream::iter(contexts.iter().enumerate())
            .map(|(index, context)| search_context(factory, index, context, options, query, tx))
            .buffer_unordered(options.concurrency.max(1))
            .collect::<Vec<()>>();

        tokio::select! {
            _ = workers => false,
            _ = cancel.cancelled() => {
                warn!("Search cancelled, returning partial results");
                true
            }
            _ = tokio::time::sleep(options.timeout) => {
                warn!(timeout_secs = options.timeout.as_secs(), "Search deadline reached, returning partial results");
                true
            }
        }
    };
    drop(tx);

    let mut stats = SearchStats {
        cancelled,
        ..Default::default()
    };
    let mut collected: Vec<(usize, ScopedResult)> = Vec::new();

    while let Some((index, event)) = rx.recv().await {
        match event {
            Event::ContextSearched => stats.contexts_searched += 1,
            Event::ContextSkipped => stats.contexts_skipped += 1,
            Event::ScopeFailed => stats.scopes_failed += 1,
            Event::Searched(result) => {
                stats.scopes_searched += 1;
                if !result.is_empty() {
                    collected.push((index, result));
                }
            }
        }
    }

    if stats.contexts_searched == 0 && stats.contexts_skipped > 0 && !stats.cancelled {
        return Err(SearchError::NoSearchableScope(stats.contexts_skipped));
    }

    // Stable, so namespace order inside a context is kept
    collected.sort_by_key(|(index, _)| *index);
    let results: Vec<ScopedResult> = collected.into_iter().map(|(_, r)| r).collect();

    info!(
        query = %query.as_str(),
        contexts = contexts.len(),
        scopes = stats.scopes_searched,
        matches = results.len(),
        elapsed_ms = start.elapsed().as_millis(),
        "Search complete"
    );

    Ok(SearchReport::new(results, stats))
}

/// Search all scopes of one context, reporting each outcome to `tx`
async fn search_context<F: ClientFactory>(
    factory: &F,
    index: usize,
    context: &ContextInfo,
    options: &SearchOptions,
    query: &Query,
    tx: &mpsc::UnboundedSender<(usize, Event)>,
) {
    let start = Instant::now();
    let report = |event: Event| {
        // The collector only goes away once the search is over
        let _ = tx.send((index, event));
    };

    let api = match factory.connect(&context.name).await {
        Ok(api) => api,
        Err(e) => {
            warn!(context = %context.name, error = %e, "Skipping context: failed to create client");
            report(Event::ContextSkipped);
            return;
        }
    };

    let Some(scopes) = context_scopes(
        &api,
        &context.name,
        &options.namespaces,
        options.probe_concurrency,
    )
    .await
    else {
        report(Event::ContextSkipped);
        return;
    };
    report(Event::ContextSearched);

    for scope in scopes {
        match search_scope(&api, &scope, query, options.resolve_owners).await {
            Ok(result) => report(Event::Searched(result)),
            Err(e) => {
                warn!(scope = %scope, error = %e, "Scope search failed");
                report(Event::ScopeFailed);
            }
        }
    }

    debug!(
        context = %context.name,
        elapsed_ms = start.elapsed().as_millis(),
        "Context searched"
    );
}

async fn search_scope<A: ClusterApi>(
    api: &A,
    scope: &Scope,
    query: &Query,
    resolve_owners: bool,
) -> Result<ScopedResult, k8sx_k8s::ApiError> {
    let mut result = match query {
        Query::Ip(ip) => search_ip(api, scope, ip).await?,
        Query::Name(name) => search_name(api, scope, name).await?,
    };

    if resolve_owners {
        enrich_owners(api, &mut result).await;
    }

    Ok(result)
}
