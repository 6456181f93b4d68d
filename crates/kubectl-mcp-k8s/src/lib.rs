//! Kubernetes API client provider (C3) and `kubectl`/`helm`/`kind`
//! subprocess runner (C4) — `spec.md` §4.3, §4.4.

pub mod error;
pub mod process;
pub mod provider;

pub use error::{ProviderError, RunnerError};
pub use process::{CommandOutput, SubprocessRunner};
pub use provider::{ApiClientHandle, ClusterContext, Provider, ProviderConfig, ProviderType};
