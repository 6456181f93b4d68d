//! Server configuration, built from environment variables and overridden
//! by CLI flags (`spec.md` §6), following the teacher's
//! `ServerConfigBuilder` pattern (`crates/turbomcp-server/src/config.rs`).

use kubectl_mcp_k8s::ProviderConfig;

use crate::safety::SafetyMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    Stdio,
    Http,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub transport: TransportKind,
    pub host: String,
    pub port: u16,
    pub safety_mode: SafetyMode,
    pub provider: ProviderConfig,
    pub server_name: String,
    pub server_version: String,
    pub shutdown_grace_period_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            transport: TransportKind::Stdio,
            host: "0.0.0.0".to_string(),
            port: 8000,
            safety_mode: SafetyMode::Normal,
            provider: ProviderConfig::from_env(),
            server_name: "kubectl-mcp-server".to_string(),
            server_version: env!("CARGO_PKG_VERSION").to_string(),
            shutdown_grace_period_secs: 5,
        }
    }
}

impl ServerConfig {
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::default()
    }
}

#[derive(Default)]
pub struct ServerConfigBuilder {
    transport: Option<TransportKind>,
    host: Option<String>,
    port: Option<u16>,
    safety_mode: Option<SafetyMode>,
}

impl ServerConfigBuilder {
    #[must_use]
    pub fn transport(mut self, t: TransportKind) -> Self {
        self.transport = Some(t);
        self
    }

    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    #[must_use]
    pub fn safety_mode(mut self, mode: SafetyMode) -> Self {
        self.safety_mode = Some(mode);
        self
    }

    #[must_use]
    pub fn build(self) -> ServerConfig {
        let defaults = ServerConfig::default();
        ServerConfig {
            transport: self.transport.unwrap_or(defaults.transport),
            host: self.host.unwrap_or(defaults.host),
            port: self.port.unwrap_or(defaults.port),
            safety_mode: self.safety_mode.unwrap_or(defaults.safety_mode),
            ..defaults
        }
    }
}
