//! Top-level `Server`: owns every shared component and runs the
//! configured transport until a shutdown signal arrives (`spec.md` §4,
//! §5), following the teacher's pattern of a `Server` holding its
//! registry/config/dispatcher rather than a global (`spec.md` §9).

use std::sync::Arc;

use kubectl_mcp_k8s::{Provider, SubprocessRunner};
use tracing::info;

use crate::config::{ServerConfig, TransportKind};
use crate::dispatcher::Dispatcher;
use crate::handlers::HandlerContext;
use crate::prompts::PromptCatalog;
use crate::registry::ToolRegistry;
use crate::safety::SafetyPolicy;
use crate::transport::{http, stdio};

pub struct Server {
    config: ServerConfig,
    dispatcher: Arc<Dispatcher>,
    safety: Arc<SafetyPolicy>,
}

impl Server {
    pub fn new(config: ServerConfig) -> Self {
        let registry = Arc::new(ToolRegistry::with_default_tools());
        let safety = Arc::new(SafetyPolicy::new(config.safety_mode));
        let prompts = Arc::new(PromptCatalog::with_default_prompts());
        let provider = Arc::new(Provider::new(config.provider.clone()));
        let runner = Arc::new(SubprocessRunner::new());
        let handler_ctx = HandlerContext::new(provider, runner);

        let dispatcher = Arc::new(Dispatcher::new(
            registry,
            safety.clone(),
            prompts,
            handler_ctx,
            config.server_name.clone(),
            config.server_version.clone(),
        ));

        Self { config, dispatcher, safety }
    }

    pub fn safety(&self) -> &Arc<SafetyPolicy> {
        &self.safety
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    /// Runs until the transport loop ends (stdio EOF) or a shutdown
    /// signal is received (HTTP), bounded by
    /// `ServerConfig.shutdown_grace_period_secs` (`spec.md` §5).
    pub async fn run(self) -> anyhow::Result<()> {
        match self.config.transport {
            TransportKind::Stdio => {
                info!("starting stdio transport");
                stdio::run(self.dispatcher).await?;
                Ok(())
            }
            TransportKind::Http => {
                info!(host = %self.config.host, port = self.config.port, "starting HTTP/SSE transport");
                let serve = http::run(self.dispatcher, &self.config.host, self.config.port);
                tokio::select! {
                    result = serve => result,
                    _ = shutdown_signal() => {
                        info!(
                            grace_period_secs = self.config.shutdown_grace_period_secs,
                            "shutdown signal received, draining in-flight requests"
                        );
                        tokio::time::sleep(std::time::Duration::from_secs(self.config.shutdown_grace_period_secs)).await;
                        Ok(())
                    }
                }
            }
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        let Ok(mut signal) = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) else {
            return;
        };
        signal.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::safety::SafetyMode;

    #[test]
    fn new_server_wires_configured_safety_mode() {
        let config = ServerConfig { safety_mode: SafetyMode::ReadOnly, ..ServerConfig::default() };
        let server = Server::new(config);
        assert_eq!(server.safety().mode(), SafetyMode::ReadOnly);
    }
}
