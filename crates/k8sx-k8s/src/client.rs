//! Kubeconfig loading and per-context client construction

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use kube::config::{KubeConfigOptions, Kubeconfig};
use tracing::debug;

use k8sx_types::ContextInfo;

use crate::api::{ClientFactory, KubeApi};
use crate::error::ApiError;

/// Timeout for connecting to a cluster API server
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeout for reading a single API response
const READ_TIMEOUT: Duration = Duration::from_secs(30);

/// Kubernetes client wrapper
///
/// Holds the parsed kubeconfig and hands out one fresh client per context.
pub struct KubeClient {
    kubeconfig: Kubeconfig,
    current_context: Option<String>,
    connect_timeout: Duration,
    read_timeout: Duration,
}

impl KubeClient {
    /// Load the kubeconfig from `path`, or from `KUBECONFIG` / `~/.kube/config` when `None`
    pub fn new(path: Option<&Path>) -> Result<Self> {
        let kubeconfig = match path {
            Some(path) => Kubeconfig::read_from(path)
                .with_context(|| format!("Failed to read kubeconfig at {}", path.display()))?,
            None => Kubeconfig::read().context("Failed to read kubeconfig. Is kubectl configured?")?,
        };

        Ok(Self::from_kubeconfig(kubeconfig))
    }

    pub fn from_kubeconfig(kubeconfig: Kubeconfig) -> Self {
        let current_context = kubeconfig.current_context.clone();

        Self {
            kubeconfig,
            current_context,
            connect_timeout: CONNECT_TIMEOUT,
            read_timeout: READ_TIMEOUT,
        }
    }

    /// Get all available contexts from kubeconfig, in file order
    pub fn get_contexts(&self) -> Vec<ContextInfo> {
        self.kubeconfig
            .contexts
            .iter()
            .map(|ctx| {
                let context = ctx.context.as_ref();
                ContextInfo::new(
                    ctx.name.clone(),
                    context.map(|c| c.cluster.clone()).unwrap_or_default(),
                    context.and_then(|c| c.user.clone()).unwrap_or_default(),
                    context.and_then(|c| c.namespace.clone()),
                    Some(&ctx.name) == self.current_context.as_ref(),
                )
            })
            .collect()
    }

    /// Get the current context name
    pub fn current_context(&self) -> Option<&str> {
        self.current_context.as_deref()
    }
}

impl ClientFactory for KubeClient {
    type Api = KubeApi;

    /// Create a client for a specific context
    async fn connect(&self, context_name: &str) -> Result<KubeApi, ApiError> {
        let client_error = |message: String| ApiError::Client {
            context: context_name.to_string(),
            message,
        };

        let mut config = kube::Config::from_custom_kubeconfig(
            self.kubeconfig.clone(),
            &KubeConfigOptions {
                context: Some(context_name.to_string()),
                ..Default::default()
            },
        )
        .await
        .map_err(|e| client_error(e.to_string()))?;

        config.connect_timeout = Some(self.connect_timeout);
        config.read_timeout = Some(self.read_timeout);

        let client = kube::Client::try_from(config).map_err(|e| client_error(e.to_string()))?;
        debug!(context = %context_name, "Created client");

        Ok(KubeApi::new(client))
    }
}
