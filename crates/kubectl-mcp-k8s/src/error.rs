//! Errors for the provider and subprocess runner.

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("no kubeconfig found and no in-cluster credentials available")]
    NoCredentials,

    #[error("unknown context '{0}'")]
    UnknownContext(String),

    #[error("failed to read kubeconfig at {path}: {source}")]
    KubeconfigRead {
        path: String,
        #[source]
        source: kube::config::KubeconfigError,
    },

    #[error("failed to build API client: {0}")]
    ClientBuild(#[source] kube::Error),

    #[error("Kubernetes API request failed: {0}")]
    Api(#[source] kube::Error),

    /// A client build that failed on a previous concurrent call; replayed
    /// from the provider's cache without re-attempting the original I/O.
    #[error("{0}")]
    Cached(String),
}

#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error("binary '{0}' is not available on PATH")]
    Unavailable(String),

    #[error("command timed out after {0} seconds")]
    Timeout(u64),

    #[error("failed to spawn '{binary}': {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },
}
