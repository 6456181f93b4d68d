//! JSON-RPC 2.0 envelopes used on both the stdio and HTTP/SSE transports.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Request/response identifier. JSON-RPC allows numbers or strings; we
/// echo whichever shape the client sent verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    Number(i64),
    String(String),
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{s}"),
        }
    }
}

/// A raw, not-yet-classified incoming message. Notifications (no `id`)
/// and requests share this shape; the dispatcher decides which based on
/// `id.is_none()`.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcIncoming {
    #[serde(default)]
    pub jsonrpc: Option<String>,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
    #[serde(default)]
    pub id: Option<RequestId>,
}

/// A fully-formed outgoing response or notification.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcOutgoing {
    pub jsonrpc: &'static str,
    #[serde(flatten)]
    pub payload: JsonRpcPayload,
    /// `None` is only valid for parse errors (id unknown) and notifications.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RequestId>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum JsonRpcPayload {
    Result { result: Value },
    Error { error: JsonRpcErrorBody },
}

#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcErrorBody {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcOutgoing {
    pub fn success(id: RequestId, result: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            payload: JsonRpcPayload::Result { result },
            id: Some(id),
        }
    }

    pub fn error(id: Option<RequestId>, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0",
            payload: JsonRpcPayload::Error {
                error: JsonRpcErrorBody {
                    code,
                    message: message.into(),
                    data: None,
                },
            },
            id,
        }
    }

    /// Serialize to a single line, suitable for the stdio framer which
    /// appends its own trailing `\n`.
    pub fn to_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Standard JSON-RPC / MCP error codes (`spec.md` §6).
pub mod codes {
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;
    pub const NOT_INITIALIZED: i32 = -32002;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_id_roundtrips_numbers_and_strings() {
        let n: RequestId = serde_json::from_str("42").unwrap();
        assert_eq!(n, RequestId::Number(42));
        let s: RequestId = serde_json::from_str("\"abc\"").unwrap();
        assert_eq!(s, RequestId::String("abc".into()));
    }

    #[test]
    fn error_response_has_no_result_field() {
        let resp = JsonRpcOutgoing::error(Some(RequestId::Number(1)), codes::METHOD_NOT_FOUND, "nope");
        let v = serde_json::to_value(&resp).unwrap();
        assert!(v.get("result").is_none());
        assert!(v.get("error").is_some());
    }
}
