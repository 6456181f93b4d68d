//! Request dispatcher (`spec.md` §4.6, C6): JSON-RPC 2.0 parse, method
//! routing, parameter binding, error envelope, secret masking of outputs.
//!
//! One `Dispatcher` is shared across every session and transport
//! connection (`spec.md` §9 "one `Server` struct owning the registry,
//! provider, safety policy, and transport"); per-connection state lives
//! in [`crate::session::Session`], passed in on every call.

use std::sync::Arc;

use kubectl_mcp_protocol::jsonrpc::codes;
use kubectl_mcp_protocol::{JsonRpcIncoming, JsonRpcOutgoing, RequestId, ToolResult};
use serde_json::{json, Value};
use tracing::{error, warn};

use crate::binding;
use crate::error::ServerError;
use crate::handlers::HandlerContext;
use crate::masker;
use crate::prompts::PromptCatalog;
use crate::registry::ToolRegistry;
use crate::safety::SafetyPolicy;
use crate::session::{ClientInfo, Session};

/// Maximum accepted message size on any transport (`spec.md` §5, mirrors
/// the teacher's `LineTransportRunner::MAX_MESSAGE_SIZE` guard).
pub const MAX_MESSAGE_SIZE: usize = 10 * 1024 * 1024;

pub struct Dispatcher {
    registry: Arc<ToolRegistry>,
    safety: Arc<SafetyPolicy>,
    prompts: Arc<PromptCatalog>,
    handler_ctx: HandlerContext,
    server_name: String,
    server_version: String,
}

impl Dispatcher {
    pub fn new(
        registry: Arc<ToolRegistry>,
        safety: Arc<SafetyPolicy>,
        prompts: Arc<PromptCatalog>,
        handler_ctx: HandlerContext,
        server_name: impl Into<String>,
        server_version: impl Into<String>,
    ) -> Self {
        Self {
            registry,
            safety,
            prompts,
            handler_ctx,
            server_name: server_name.into(),
            server_version: server_version.into(),
        }
    }

    /// Parse one transport-level frame. Malformed JSON never reaches
    /// [`Self::dispatch`] — the transport reports `-32700` directly with
    /// `id: null` (`spec.md` §4.6, §8), since a frame with unparseable
    /// JSON has no `id` to preserve.
    pub fn parse(line: &str) -> Result<JsonRpcIncoming, JsonRpcOutgoing> {
        serde_json::from_str(line)
            .map_err(|e| JsonRpcOutgoing::error(None, codes::PARSE_ERROR, format!("Parse error: {e}")))
    }

    /// Route one already-parsed message. Returns `None` for notifications
    /// (no `id`), which produce no response (`spec.md` §3, §4.6).
    pub async fn dispatch(&self, session: &Session, incoming: JsonRpcIncoming) -> Option<JsonRpcOutgoing> {
        let id = incoming.id.clone();

        if let Some(version) = &incoming.jsonrpc {
            if version != "2.0" {
                return respond(id, Err((codes::INVALID_REQUEST, "Invalid Request: jsonrpc must be \"2.0\"".to_string())));
            }
        }

        let method = incoming.method.as_str();
        let params = incoming.params.clone().unwrap_or(Value::Null);

        // `initialize` is the only method valid before the session is
        // initialized; every other method requires it (`spec.md` §4.6).
        if method != "mcp.initialize" && !session.is_initialized() {
            warn!(method, "rejected method call before session initialization");
            return respond(id, Err((codes::NOT_INITIALIZED, "Server not initialized".to_string())));
        }

        let result = match method {
            "mcp.initialize" => self.handle_initialize(session, &params),
            "mcp.tool.discovery" | "mcp.tools.list" => self.handle_tool_discovery(),
            "mcp.tool.call" => self.handle_tool_call(&params).await,
            "mcp.prompts.list" => self.handle_prompts_list(),
            "mcp.prompts.get" => self.handle_prompts_get(&params),
            "mcp.shutdown" => self.handle_shutdown(session),
            other => Err((codes::METHOD_NOT_FOUND, format!("Method not found: {other}"))),
        };

        respond(id, result)
    }

    fn handle_initialize(&self, session: &Session, params: &Value) -> Result<Value, (i32, String)> {
        let client_info = params
            .get("client_info")
            .or_else(|| params.get("clientInfo"))
            .cloned()
            .unwrap_or(Value::Null);
        let name = client_info.get("name").and_then(Value::as_str).unwrap_or("unknown").to_string();
        let version = client_info.get("version").and_then(Value::as_str).unwrap_or("0").to_string();

        if !session.initialize(ClientInfo { name, version }) {
            return Err((codes::INVALID_REQUEST, "Session is already initialized".to_string()));
        }

        Ok(json!({
            "name": self.server_name,
            "version": self.server_version,
            "capabilities": {
                "tools": { "supported": true },
                "prompts": { "supported": true },
            },
            "server_info": {
                "name": self.server_name,
                "version": self.server_version,
            },
        }))
    }

    fn handle_tool_discovery(&self) -> Result<Value, (i32, String)> {
        let tools: Vec<Value> = self
            .registry
            .list()
            .into_iter()
            .map(|d| {
                json!({
                    "name": d.name,
                    "description": d.description,
                    "input_schema": d.input_schema,
                    "annotations": d.annotations,
                    "category": d.category.as_str(),
                })
            })
            .collect();
        Ok(json!({ "tools": tools }))
    }

    async fn handle_tool_call(&self, params: &Value) -> Result<Value, (i32, String)> {
        let name = params.get("name").and_then(Value::as_str).unwrap_or_default();
        let input = params.get("input").cloned().unwrap_or(Value::Null);

        // Step 1: lookup.
        let Some(entry) = self.registry.lookup(name) else {
            return Err((codes::METHOD_NOT_FOUND, format!("Tool not found: {name}")));
        };

        // Step 2: safety gate, before the handler is ever reached
        // (`spec.md` §4.1).
        if self.safety.is_blocked(&entry.descriptor.annotations) {
            let mode = self.safety.mode();
            let result = ToolResult::blocked(mode.description());
            return Ok(masker::mask_value(&serde_json::to_value(result).expect("ToolResult serializes")));
        }

        // Step 3: bind and validate input against the declared schema.
        let bound = match binding::bind(&entry.descriptor.input_schema, &input) {
            Ok(bound) => bound,
            Err(reason) => return Err((codes::INVALID_PARAMS, format!("Invalid params for '{name}': {reason}"))),
        };

        // Step 4: invoke; any error is caught here, never propagated out
        // of the dispatcher (`spec.md` §4.8, §7).
        let tool_result = match entry.handler.call(bound, &self.handler_ctx).await {
            Ok(outcome) => match outcome.command {
                Some(command) => ToolResult::ok_with_command(outcome.value, command),
                None => ToolResult::ok(outcome.value),
            },
            Err(err) => {
                error!(tool = name, error = %err, "tool handler failed");
                ToolResult::err(err.to_string(), err.error_kind())
            }
        };

        // Step 5: mask secrets before the envelope ever gets serialized
        // for the client (`spec.md` §4.2).
        let masked = masker::mask_value(&serde_json::to_value(tool_result).expect("ToolResult serializes"));

        // Step 6: wrapped in the JSON-RPC `result` by `respond`.
        Ok(masked)
    }

    fn handle_prompts_list(&self) -> Result<Value, (i32, String)> {
        let prompts: Vec<Value> = self
            .prompts
            .list()
            .into_iter()
            .map(|d| json!({ "name": d.name, "description": d.description, "parameters": d.parameters }))
            .collect();
        Ok(json!({ "prompts": prompts }))
    }

    fn handle_prompts_get(&self, params: &Value) -> Result<Value, (i32, String)> {
        let name = params.get("name").and_then(Value::as_str).unwrap_or_default();
        let arguments = params.get("parameters").or_else(|| params.get("arguments")).cloned().unwrap_or(Value::Null);
        match self.prompts.get(name, &arguments) {
            Ok(markdown) => Ok(json!({ "name": name, "content": markdown })),
            Err(ServerError::PromptNotFound(name)) => {
                Err((codes::METHOD_NOT_FOUND, format!("Prompt not found: {name}")))
            }
            Err(ServerError::InvalidParams(reason)) => {
                Err((codes::INVALID_PARAMS, format!("Invalid params for prompt '{name}': {reason}")))
            }
            Err(other) => Err((codes::INTERNAL_ERROR, other.to_string())),
        }
    }

    fn handle_shutdown(&self, session: &Session) -> Result<Value, (i32, String)> {
        session.shutdown();
        Ok(json!({}))
    }
}

fn respond(id: Option<RequestId>, result: Result<Value, (i32, String)>) -> Option<JsonRpcOutgoing> {
    match result {
        Ok(value) => {
            let id = id?;
            Some(JsonRpcOutgoing::success(id, value))
        }
        Err((code, message)) => Some(JsonRpcOutgoing::error(id, code, message)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ToolRegistry;
    use crate::safety::{SafetyMode, SafetyPolicy};
    use kubectl_mcp_k8s::{Provider, ProviderConfig, SubprocessRunner};
    use serde_json::json;

    fn test_dispatcher() -> Dispatcher {
        let registry = Arc::new(ToolRegistry::with_default_tools());
        let safety = Arc::new(SafetyPolicy::new(SafetyMode::Normal));
        let prompts = Arc::new(PromptCatalog::with_default_prompts());
        let provider = Arc::new(Provider::new(ProviderConfig::default()));
        let runner = Arc::new(SubprocessRunner::new());
        let ctx = HandlerContext::new(provider, runner);
        Dispatcher::new(registry, safety, prompts, ctx, "kubectl-mcp-server", "0.1.0")
    }

    fn incoming(id: Option<i64>, method: &str, params: Value) -> JsonRpcIncoming {
        JsonRpcIncoming {
            jsonrpc: Some("2.0".to_string()),
            method: method.to_string(),
            params: Some(params),
            id: id.map(RequestId::Number),
        }
    }

    fn incoming_with_string_id(id: &str, method: &str, params: Value) -> JsonRpcIncoming {
        JsonRpcIncoming {
            jsonrpc: Some("2.0".to_string()),
            method: method.to_string(),
            params: Some(params),
            id: Some(RequestId::String(id.to_string())),
        }
    }

    #[tokio::test]
    async fn initialize_returns_capabilities() {
        let dispatcher = test_dispatcher();
        let session = Session::new();
        let resp = dispatcher
            .dispatch(&session, incoming(Some(1), "mcp.initialize", json!({ "client_info": { "name": "test", "version": "1" } })))
            .await
            .unwrap();
        let value = serde_json::to_value(&resp).unwrap();
        assert_eq!(value["result"]["name"], "kubectl-mcp-server");
        assert_eq!(value["result"]["capabilities"]["tools"]["supported"], true);
    }

    #[tokio::test]
    async fn tool_call_before_initialize_is_rejected() {
        let dispatcher = test_dispatcher();
        let session = Session::new();
        let resp = dispatcher
            .dispatch(&session, incoming(Some(1), "mcp.tool.call", json!({ "name": "get_pods", "input": {} })))
            .await
            .unwrap();
        let value = serde_json::to_value(&resp).unwrap();
        assert_eq!(value["error"]["code"], codes::NOT_INITIALIZED);
    }

    #[tokio::test]
    async fn unknown_tool_returns_method_not_found() {
        let dispatcher = test_dispatcher();
        let session = Session::new();
        session.initialize(ClientInfo { name: "t".into(), version: "1".into() });
        let resp = dispatcher
            .dispatch(&session, incoming_with_string_id("x", "mcp.tool.call", json!({ "name": "no_such_tool", "input": {} })))
            .await
            .unwrap();
        let value = serde_json::to_value(&resp).unwrap();
        assert_eq!(value["error"]["code"], codes::METHOD_NOT_FOUND);
        assert!(value["error"]["message"].as_str().unwrap().contains("no_such_tool"));
    }

    #[tokio::test]
    async fn read_only_mode_blocks_destructive_tool_without_reaching_handler() {
        let registry = Arc::new(ToolRegistry::with_default_tools());
        let safety = Arc::new(SafetyPolicy::new(SafetyMode::ReadOnly));
        let prompts = Arc::new(PromptCatalog::with_default_prompts());
        let provider = Arc::new(Provider::new(ProviderConfig::default()));
        let runner = Arc::new(SubprocessRunner::new());
        let ctx = HandlerContext::new(provider, runner);
        let dispatcher = Dispatcher::new(registry, safety, prompts, ctx, "s", "1");

        let session = Session::new();
        session.initialize(ClientInfo { name: "t".into(), version: "1".into() });
        let resp = dispatcher
            .dispatch(&session, incoming(Some(1), "mcp.tool.call", json!({ "name": "kind_delete_cluster_tool", "input": { "cluster_name": "kind" } })))
            .await
            .unwrap();
        let value = serde_json::to_value(&resp).unwrap();
        assert_eq!(value["result"]["success"], false);
        let message = value["result"]["error"].as_str().unwrap();
        assert!(message.contains("read-only") || message.contains("non-destructive") || message.to_lowercase().contains("read"));
    }

    #[tokio::test]
    async fn notifications_produce_no_response() {
        let dispatcher = test_dispatcher();
        let session = Session::new();
        let resp = dispatcher
            .dispatch(&session, JsonRpcIncoming { jsonrpc: Some("2.0".into()), method: "mcp.initialize".into(), params: Some(json!({})), id: None })
            .await;
        assert!(resp.is_none());
    }

    #[tokio::test]
    async fn shutdown_then_call_is_rejected() {
        let dispatcher = test_dispatcher();
        let session = Session::new();
        session.initialize(ClientInfo { name: "t".into(), version: "1".into() });
        dispatcher.dispatch(&session, incoming(Some(1), "mcp.shutdown", Value::Null)).await;
        let resp = dispatcher
            .dispatch(&session, incoming(Some(2), "mcp.tool.discovery", Value::Null))
            .await
            .unwrap();
        let value = serde_json::to_value(&resp).unwrap();
        assert_eq!(value["error"]["code"], codes::NOT_INITIALIZED);
    }
}
