//! Context-scoped Kubernetes API client acquisition (`spec.md` §4.3).
//!
//! Grounded in the `kube`/`k8s-openapi` usage pattern shown by
//! `examples/other_examples/31c715f8_wseaton-dagrun__src-k8s.rs.rs`
//! (`kube::Config`, `kube::config::Kubeconfig`, `kube::Client`).

use std::sync::Arc;

use dashmap::DashMap;
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::error::ProviderError;

/// `provider_type ∈ {auto, kubeconfig, in_cluster}` (`spec.md` §4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProviderType {
    #[default]
    Auto,
    Kubeconfig,
    InCluster,
}

/// Enumerated configuration options from `spec.md` §4.3.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub provider_type: ProviderType,
    pub kubeconfig_path: Option<std::path::PathBuf>,
    pub default_context: Option<String>,
    pub qps: f32,
    pub burst: u32,
    pub request_timeout_seconds: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider_type: ProviderType::Auto,
            kubeconfig_path: None,
            default_context: None,
            qps: 100.0,
            burst: 200,
            request_timeout_seconds: 30,
        }
    }
}

impl ProviderConfig {
    /// Build from the environment variables enumerated in `spec.md` §6.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(v) = std::env::var("MCP_K8S_PROVIDER") {
            cfg.provider_type = match v.as_str() {
                "kubeconfig" => ProviderType::Kubeconfig,
                "in_cluster" => ProviderType::InCluster,
                _ => ProviderType::Auto,
            };
        }
        if let Ok(v) = std::env::var("MCP_K8S_KUBECONFIG").or_else(|_| std::env::var("KUBECONFIG")) {
            cfg.kubeconfig_path = Some(std::path::PathBuf::from(v));
        }
        if let Ok(v) = std::env::var("MCP_K8S_CONTEXT") {
            cfg.default_context = Some(v);
        }
        if let Ok(v) = std::env::var("MCP_K8S_QPS").and_then(|s| s.parse().map_err(|_| std::env::VarError::NotPresent)) {
            cfg.qps = v;
        }
        if let Ok(v) = std::env::var("MCP_K8S_BURST").and_then(|s| s.parse().map_err(|_| std::env::VarError::NotPresent)) {
            cfg.burst = v;
        }
        if let Ok(v) = std::env::var("MCP_K8S_TIMEOUT").and_then(|s| s.parse().map_err(|_| std::env::VarError::NotPresent)) {
            cfg.request_timeout_seconds = v;
        }
        cfg
    }

    fn resolved_kubeconfig_path(&self) -> std::path::PathBuf {
        self.kubeconfig_path.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| std::path::PathBuf::from("."))
                .join(".kube")
                .join("config")
        })
    }
}

/// Identity of a target cluster (`spec.md` §3).
#[derive(Debug, Clone, serde::Serialize)]
pub struct ClusterContext {
    pub name: String,
    pub cluster: String,
    pub user: String,
    pub namespace: Option<String>,
    pub is_active: bool,
}

/// Cached per-context client (`spec.md` §3). Holds the generic `kube::Client`;
/// individual handlers build typed `kube::Api<K>` views from it on demand.
#[derive(Clone)]
pub struct ApiClientHandle {
    pub client: Client,
    pub context: String,
}

/// The sole entry point for Kubernetes REST access (`spec.md` §4.3).
/// Handlers never read kubeconfig directly.
pub struct Provider {
    config: ProviderConfig,
    // Empty-string key is the sentinel for "current/in-cluster" (spec.md §3).
    cache: DashMap<String, Arc<OnceCell<Result<ApiClientHandle, String>>>>,
}

impl Provider {
    pub fn new(config: ProviderConfig) -> Self {
        Self { config, cache: DashMap::new() }
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// `list_contexts() → [ClusterContext]` (`spec.md` §4.3).
    pub async fn list_contexts(&self) -> Result<Vec<ClusterContext>, ProviderError> {
        if matches!(self.config.provider_type, ProviderType::InCluster) || running_in_cluster() {
            return Ok(vec![ClusterContext {
                name: String::new(),
                cluster: "in-cluster".into(),
                user: "in-cluster".into(),
                namespace: current_namespace_from_serviceaccount(),
                is_active: true,
            }]);
        }

        let path = self.config.resolved_kubeconfig_path();
        let kubeconfig = Kubeconfig::read_from(&path).map_err(|source| ProviderError::KubeconfigRead {
            path: path.display().to_string(),
            source,
        })?;

        let current = kubeconfig.current_context.clone();
        let mut contexts = Vec::with_capacity(kubeconfig.contexts.len());
        for named in &kubeconfig.contexts {
            let Some(ctx) = named.context.clone() else { continue };
            contexts.push(ClusterContext {
                name: named.name.clone(),
                cluster: ctx.cluster,
                user: ctx.user,
                namespace: ctx.namespace,
                is_active: current.as_deref() == Some(named.name.as_str()),
            });
        }
        Ok(contexts)
    }

    /// `current_context() → name|nil` (`spec.md` §4.3).
    pub async fn current_context(&self) -> Result<Option<String>, ProviderError> {
        if let Some(ctx) = &self.config.default_context {
            return Ok(Some(ctx.clone()));
        }
        let path = self.config.resolved_kubeconfig_path();
        match Kubeconfig::read_from(&path) {
            Ok(kc) => Ok(kc.current_context),
            Err(_) if running_in_cluster() => Ok(Some(String::new())),
            Err(source) => Err(ProviderError::KubeconfigRead { path: path.display().to_string(), source }),
        }
    }

    /// `validate_context(name) → ok|UnknownContext` (`spec.md` §4.3).
    pub async fn validate_context(&self, name: &str) -> Result<(), ProviderError> {
        if name.is_empty() {
            return Ok(());
        }
        let contexts = self.list_contexts().await?;
        if contexts.iter().any(|c| c.name == name) {
            Ok(())
        } else {
            Err(ProviderError::UnknownContext(name.to_string()))
        }
    }

    /// `api_client(context) → ApiClientHandle`. Lazy, cached, and safe
    /// under concurrent first use for the same context (`spec.md` §5):
    /// the `DashMap` only ever holds one `OnceCell` per key, so two
    /// concurrent callers race on `get_or_init`, not on client construction.
    pub async fn api_client(&self, context: &str) -> Result<ApiClientHandle, ProviderError> {
        let cell = self
            .cache
            .entry(context.to_string())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone();

        let result = cell
            .get_or_init(|| async { self.build_client(context).await.map_err(|e| e.to_string()) })
            .await;

        result.clone().map_err(ProviderError::Cached)
    }

    async fn build_client(&self, context: &str) -> Result<ApiClientHandle, ProviderError> {
        let use_in_cluster = matches!(self.config.provider_type, ProviderType::InCluster)
            || (matches!(self.config.provider_type, ProviderType::Auto) && context.is_empty() && running_in_cluster());

        let client = if use_in_cluster {
            info!("using in-cluster service account credentials");
            Client::try_default().await.map_err(ProviderError::ClientBuild)?
        } else {
            let path = self.config.resolved_kubeconfig_path();
            let kubeconfig = Kubeconfig::read_from(&path).map_err(|source| ProviderError::KubeconfigRead {
                path: path.display().to_string(),
                source,
            })?;

            let chosen_context = if !context.is_empty() {
                Some(context.to_string())
            } else {
                self.config.default_context.clone()
            };

            let options = KubeConfigOptions {
                context: chosen_context.clone(),
                ..Default::default()
            };

            if let Some(name) = &chosen_context {
                if !kubeconfig.contexts.iter().any(|c| &c.name == name) {
                    return Err(ProviderError::UnknownContext(name.clone()));
                }
            }

            debug!(context = ?chosen_context, "loading kubeconfig client configuration");
            let mut client_config = Config::from_custom_kubeconfig(kubeconfig, &options)
                .await
                .map_err(ProviderError::ClientBuild)?;
            client_config.read_timeout = Some(std::time::Duration::from_secs(self.config.request_timeout_seconds));
            client_config.write_timeout = Some(std::time::Duration::from_secs(self.config.request_timeout_seconds));
            Client::try_from(client_config).map_err(ProviderError::ClientBuild)?
        };

        Ok(ApiClientHandle { client, context: context.to_string() })
    }
}

fn running_in_cluster() -> bool {
    std::path::Path::new("/var/run/secrets/kubernetes.io/serviceaccount/token").exists()
}

fn current_namespace_from_serviceaccount() -> Option<String> {
    std::fs::read_to_string("/var/run/secrets/kubernetes.io/serviceaccount/namespace").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_spec_defaults() {
        let cfg = ProviderConfig::default();
        assert_eq!(cfg.qps, 100.0);
        assert_eq!(cfg.burst, 200);
        assert_eq!(cfg.request_timeout_seconds, 30);
        assert_eq!(cfg.provider_type, ProviderType::Auto);
    }
}
