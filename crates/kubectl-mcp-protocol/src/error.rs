//! Error taxonomy shared across the crate (`spec.md` §7).

use serde::{Deserialize, Serialize};

/// Discriminator carried on `ToolResult.error_kind` and used internally
/// to pick a JSON-RPC error code when a fault happens before a tool's
/// handler body runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Parse,
    InvalidRequest,
    InvalidParams,
    MethodNotFound,
    NotInitialized,
    Policy,
    Timeout,
    Unavailable,
    Config,
    Api,
    Internal,
}

impl ErrorKind {
    /// The JSON-RPC code a protocol-level occurrence of this kind maps to.
    /// Kinds that only ever surface inside a `ToolResult` (policy, timeout,
    /// unavailable, config, api) have no JSON-RPC code of their own; callers
    /// should not reach for this in that case.
    pub fn jsonrpc_code(self) -> Option<i32> {
        use crate::jsonrpc::codes;
        match self {
            Self::Parse => Some(codes::PARSE_ERROR),
            Self::InvalidRequest => Some(codes::INVALID_REQUEST),
            Self::InvalidParams => Some(codes::INVALID_PARAMS),
            Self::MethodNotFound => Some(codes::METHOD_NOT_FOUND),
            Self::NotInitialized => Some(codes::NOT_INITIALIZED),
            Self::Internal => Some(codes::INTERNAL_ERROR),
            Self::Policy | Self::Timeout | Self::Unavailable | Self::Config | Self::Api => None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("malformed JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("invalid params for '{method}': {reason}")]
    InvalidParams { method: String, reason: String },
}
