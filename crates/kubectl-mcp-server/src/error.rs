//! Server-level errors (`spec.md` §7), following the teacher's
//! `crates/turbomcp-server/src/error.rs` shape: one `thiserror` enum with
//! `#[from]` conversions at the crate boundary.

use kubectl_mcp_protocol::ErrorKind;

pub type ServerResult<T> = Result<T, ServerError>;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("tool '{0}' not found")]
    ToolNotFound(String),

    #[error("prompt '{0}' not found")]
    PromptNotFound(String),

    #[error("invalid params: {0}")]
    InvalidParams(String),

    #[error("server not initialized")]
    NotInitialized,

    #[error("registry error: {0}")]
    Registry(String),

    #[error("provider error: {0}")]
    Provider(#[from] kubectl_mcp_k8s::ProviderError),

    #[error("subprocess error: {0}")]
    Runner(#[from] kubectl_mcp_k8s::RunnerError),

    #[error("Kubernetes API error: {0}")]
    Api(#[from] kube::Error),

    #[error("{0}")]
    CommandFailed(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ServerError {
    /// Maps a handler-boundary failure onto the `error_kind` taxonomy
    /// (`spec.md` §7) for inclusion in a `ToolResult`.
    pub fn error_kind(&self) -> ErrorKind {
        match self {
            Self::ToolNotFound(_) | Self::PromptNotFound(_) => ErrorKind::MethodNotFound,
            Self::InvalidParams(_) => ErrorKind::InvalidParams,
            Self::NotInitialized => ErrorKind::NotInitialized,
            Self::Registry(_) => ErrorKind::Internal,
            Self::Provider(kubectl_mcp_k8s::ProviderError::UnknownContext(_)) => ErrorKind::Config,
            Self::Provider(kubectl_mcp_k8s::ProviderError::NoCredentials) => ErrorKind::Config,
            Self::Provider(kubectl_mcp_k8s::ProviderError::KubeconfigRead { .. }) => ErrorKind::Config,
            Self::Provider(_) => ErrorKind::Api,
            Self::Runner(kubectl_mcp_k8s::RunnerError::Timeout(_)) => ErrorKind::Timeout,
            Self::Runner(kubectl_mcp_k8s::RunnerError::Unavailable(_)) => ErrorKind::Unavailable,
            Self::Runner(_) => ErrorKind::Internal,
            Self::Api(_) => ErrorKind::Api,
            Self::CommandFailed(_) => ErrorKind::Api,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }
}
