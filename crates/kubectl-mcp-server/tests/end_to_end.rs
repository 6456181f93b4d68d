//! The six literal end-to-end scenarios plus the transport ordering
//! invariants.

use std::sync::Arc;

use kubectl_mcp_k8s::{Provider, ProviderConfig, SubprocessRunner};
use kubectl_mcp_protocol::{JsonRpcIncoming, RequestId};
use kubectl_mcp_server::dispatcher::Dispatcher;
use kubectl_mcp_server::handlers::HandlerContext;
use kubectl_mcp_server::prompts::PromptCatalog;
use kubectl_mcp_server::registry::ToolRegistry;
use kubectl_mcp_server::safety::{SafetyMode, SafetyPolicy};
use kubectl_mcp_server::session::{ClientInfo, Session};
use kubectl_mcp_server::transport::stdio;
use serde_json::{json, Value};

fn dispatcher_with_mode(mode: SafetyMode) -> Arc<Dispatcher> {
    let registry = Arc::new(ToolRegistry::with_default_tools());
    let safety = Arc::new(SafetyPolicy::new(mode));
    let prompts = Arc::new(PromptCatalog::with_default_prompts());
    let provider = Arc::new(Provider::new(ProviderConfig::default()));
    let runner = Arc::new(SubprocessRunner::new());
    let ctx = HandlerContext::new(provider, runner);
    Arc::new(Dispatcher::new(registry, safety, prompts, ctx, "kubectl-mcp-server", "0.1.0"))
}

fn raw(jsonrpc_line: &Value) -> JsonRpcIncoming {
    serde_json::from_value(jsonrpc_line.clone()).unwrap()
}

#[tokio::test]
async fn scenario_1_initialize() {
    let dispatcher = dispatcher_with_mode(SafetyMode::Normal);
    let session = Session::new();
    let incoming = raw(&json!({
        "jsonrpc": "2.0",
        "id": "i1",
        "method": "mcp.initialize",
        "params": { "capabilities": { "tools": { "supported": true } }, "client_info": { "name": "test", "version": "1" } }
    }));
    let response = dispatcher.dispatch(&session, incoming).await.unwrap();
    let value = serde_json::to_value(&response).unwrap();
    assert_eq!(value["result"]["name"], "kubectl-mcp-server");
    assert_eq!(value["result"]["capabilities"]["tools"]["supported"], true);
    assert_eq!(value["id"], "i1");
}

#[tokio::test]
async fn scenario_2_tool_discovery_after_init() {
    let dispatcher = dispatcher_with_mode(SafetyMode::Normal);
    let session = Session::new();
    session.initialize(ClientInfo { name: "t".into(), version: "1".into() });

    let incoming = raw(&json!({ "jsonrpc": "2.0", "id": "d1", "method": "mcp.tool.discovery" }));
    let response = dispatcher.dispatch(&session, incoming).await.unwrap();
    let value = serde_json::to_value(&response).unwrap();

    let tools = value["result"]["tools"].as_array().unwrap();
    assert!(tools.len() >= 100, "expected ~120 tools, found {}", tools.len());
    let names: Vec<&str> = tools.iter().map(|t| t["name"].as_str().unwrap()).collect();
    assert!(names.contains(&"get_pods"));
    assert!(names.contains(&"kind_detect_tool"));
}

#[tokio::test]
async fn scenario_3_tool_call_before_init() {
    let dispatcher = dispatcher_with_mode(SafetyMode::Normal);
    let session = Session::new();
    let incoming = raw(&json!({
        "jsonrpc": "2.0", "id": "x", "method": "mcp.tool.call",
        "params": { "name": "get_pods", "input": {} }
    }));
    let response = dispatcher.dispatch(&session, incoming).await.unwrap();
    let value = serde_json::to_value(&response).unwrap();
    assert_eq!(value["error"]["code"], -32002);
}

#[tokio::test]
async fn scenario_4_read_only_mode_blocks_destructive_write() {
    let dispatcher = dispatcher_with_mode(SafetyMode::ReadOnly);
    let session = Session::new();
    session.initialize(ClientInfo { name: "t".into(), version: "1".into() });

    let incoming = raw(&json!({
        "jsonrpc": "2.0", "id": "k", "method": "mcp.tool.call",
        "params": { "name": "kind_delete_cluster_tool", "input": { "cluster_name": "kind" } }
    }));
    let response = dispatcher.dispatch(&session, incoming).await.unwrap();
    let value = serde_json::to_value(&response).unwrap();
    assert_eq!(value["result"]["success"], false);
    let error = value["result"]["error"].as_str().unwrap().to_lowercase();
    assert!(error.contains("non-destructive") || error.contains("read-only") || error.contains("read_only"));
}

#[tokio::test]
async fn scenario_5_unknown_tool() {
    let dispatcher = dispatcher_with_mode(SafetyMode::Normal);
    let session = Session::new();
    session.initialize(ClientInfo { name: "t".into(), version: "1".into() });

    let incoming = JsonRpcIncoming {
        jsonrpc: Some("2.0".to_string()),
        method: "mcp.tool.call".to_string(),
        params: Some(json!({ "name": "no_such_tool", "input": {} })),
        id: Some(RequestId::String("u".to_string())),
    };
    let response = dispatcher.dispatch(&session, incoming).await.unwrap();
    let value = serde_json::to_value(&response).unwrap();
    assert_eq!(value["error"]["code"], -32601);
    assert!(value["error"]["message"].as_str().unwrap().contains("no_such_tool"));
}

#[tokio::test]
async fn scenario_6_malformed_json_on_stdio_reader_continues() {
    let dispatcher = dispatcher_with_mode(SafetyMode::Normal);
    let input = "{ not json\n{\"jsonrpc\":\"2.0\",\"id\":\"i2\",\"method\":\"mcp.initialize\",\"params\":{\"client_info\":{\"name\":\"t\",\"version\":\"1\"}}}\n";
    let reader = std::io::Cursor::new(input.to_string());
    let mut output = Vec::new();
    stdio::run_io(dispatcher, reader, &mut output).await.unwrap();

    let lines: Vec<Value> = std::str::from_utf8(&output)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 2);

    // Per-request concurrent dispatch means the two responses may arrive in
    // either order; both must be present regardless.
    assert!(lines.iter().any(|v| v["error"]["code"] == -32700 && (v.get("id").is_none() || v["id"].is_null())));
    assert!(lines.iter().any(|v| v["id"] == "i2" && v.get("result").is_some()));
}
