use std::time::Duration;

use k8sx_types::ContextInfo;

use crate::error::SearchError;

/// Overall time budget for one search
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Contexts searched at the same time
const DEFAULT_CONCURRENCY: usize = 4;

/// Namespace probes in flight per context during discovery
const DEFAULT_PROBE_CONCURRENCY: usize = 8;

/// Inputs of a cross-context search, resolved by the caller
#[derive(Clone, Debug)]
pub struct SearchOptions {
    /// Namespaces to search in every context; empty means discover accessible ones
    pub namespaces: Vec<String>,
    pub timeout: Duration,
    pub concurrency: usize,
    pub probe_concurrency: usize,
    /// Look up the Deployment behind ReplicaSet-owned pods
    pub resolve_owners: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            namespaces: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
            concurrency: DEFAULT_CONCURRENCY,
            probe_concurrency: DEFAULT_PROBE_CONCURRENCY,
            resolve_owners: true,
        }
    }
}

impl SearchOptions {
    /// Set the namespace allow-list, dropping blanks and duplicates
    pub fn with_namespaces<I, S>(mut self, namespaces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.namespaces.clear();
        for ns in namespaces {
            let ns = ns.as_ref().trim();
            if !ns.is_empty() && !self.namespaces.iter().any(|n| n == ns) {
                self.namespaces.push(ns.to_string());
            }
        }
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_owner_resolution(mut self, enabled: bool) -> Self {
        self.resolve_owners = enabled;
        self
    }
}

/// Narrow the kubeconfig contexts down to the requested ones
///
/// An empty request selects every context. Requested names keep their
/// order; a name missing from the kubeconfig is an error.
pub fn select_contexts(
    available: Vec<ContextInfo>,
    requested: &[String],
) -> Result<Vec<ContextInfo>, SearchError> {
    if available.is_empty() {
        return Err(SearchError::NoContexts);
    }

    if requested.is_empty() {
        return Ok(available);
    }

    let mut selected: Vec<ContextInfo> = Vec::with_capacity(requested.len());
    for name in requested {
        if selected.iter().any(|c| &c.name == name) {
            continue;
        }
        let context = available
            .iter()
            .find(|c| &c.name == name)
            .ok_or_else(|| SearchError::UnknownContext(name.clone()))?;
        selected.push(context.clone());
    }

    Ok(selected)
}
