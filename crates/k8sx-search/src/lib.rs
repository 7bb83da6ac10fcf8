//! Search engine for k8sx
//!
//! This crate finds pods and services by IP or name across every
//! (context, namespace) scope reachable from a kubeconfig, tolerating
//! scopes the credentials can't read.

mod access;
mod aggregator;
mod error;
mod matcher;
mod options;
mod owner;
mod scope;
mod searcher;

#[cfg(test)]
mod fake;

pub use access::namespace_access;
pub use aggregator::{search_all, search_all_ip, search_all_name};
pub use error::{OwnerError, SearchError};
pub use matcher::{Matches, Query, is_ip_query};
pub use options::{SearchOptions, select_contexts};
pub use owner::resolve_deployment;
pub use scope::{accessible_namespaces, context_scopes, namespaces_for_context, resolve_scopes};
pub use searcher::{search_ip, search_name};

// Re-export types used in our public API
pub use k8sx_types::{Scope, ScopedResult, SearchReport, SearchStats};
