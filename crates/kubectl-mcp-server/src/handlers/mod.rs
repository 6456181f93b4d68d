//! Tool handlers (C8, `spec.md` §4.8).
//!
//! Per `spec.md` §1 the ~120 handler *bodies* are an external, uniform
//! contract, not individually specified business logic: most tools are a
//! mechanical `resource kind + name + namespace + flags` mapping onto a
//! `kubectl`/`helm`/`kind` argv, executed through the uniform
//! [`CliPassthrough`] handler. A small set of read handlers that need
//! structured output (`get_pods`, `get_logs`, the RBAC/PSA audits) talk to
//! the typed Kubernetes client directly via [`TypedHandler`]. Both kinds
//! share the same [`ToolHandler`] trait and the same [`HandlerOutcome`]
//! envelope, so the registry and dispatcher don't need to know which is
//! which.

pub mod cluster;
pub mod context;
pub mod core_resources;
pub mod cost;
pub mod diagnostics;
pub mod helm;
pub mod kind;
pub mod networking;
pub mod operations;
pub mod pods;
pub mod security;
pub mod storage;
pub mod workloads;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

pub use context::HandlerContext;

use crate::error::{ServerError, ServerResult};

/// `(binary, args)` the uniform wrapper formats into `ToolResult.command`
/// (`SPEC_FULL.md` §3 `CommandOutline`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binary {
    Kubectl,
    Helm,
    Kind,
}

impl Binary {
    pub fn program(self) -> &'static str {
        match self {
            Self::Kubectl => "kubectl",
            Self::Helm => "helm",
            Self::Kind => "kind",
        }
    }
}

/// What a handler produces before the uniform wrapper turns it into a
/// `ToolResult`.
pub struct HandlerOutcome {
    pub value: Value,
    pub command: Option<String>,
}

impl HandlerOutcome {
    pub fn new(value: Value) -> Self {
        Self { value, command: None }
    }

    pub fn with_command(value: Value, command: impl Into<String>) -> Self {
        Self { value, command: Some(command.into()) }
    }
}

#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn call(&self, input: Value, ctx: &HandlerContext) -> ServerResult<HandlerOutcome>;
}

type ArgsBuilder = Arc<dyn Fn(&Value) -> ServerResult<Vec<String>> + Send + Sync>;

/// The uniform subprocess-backed handler: bind input → argv → run → wrap.
pub struct CliPassthrough {
    binary: Binary,
    timeout_seconds: u64,
    build_args: ArgsBuilder,
}

impl CliPassthrough {
    pub fn new(
        binary: Binary,
        timeout_seconds: u64,
        build_args: impl Fn(&Value) -> ServerResult<Vec<String>> + Send + Sync + 'static,
    ) -> Self {
        Self { binary, timeout_seconds, build_args: Arc::new(build_args) }
    }
}

#[async_trait]
impl ToolHandler for CliPassthrough {
    async fn call(&self, input: Value, ctx: &HandlerContext) -> ServerResult<HandlerOutcome> {
        let args = (self.build_args)(&input)?;
        let command = format!("{} {}", self.binary.program(), args.join(" "));
        let output = ctx.runner.run(self.binary.program(), &args, self.timeout_seconds).await?;
        if output.success {
            Ok(HandlerOutcome::with_command(
                Value::String(output.stdout),
                command,
            ))
        } else {
            Err(ServerError::CommandFailed(format!(
                "{command} failed (exit {:?}): {}",
                output.exit_code, output.stderr
            )))
        }
    }
}

/// Append `-n <namespace>` when the bound input names one, matching the
/// original tool's convention of an optional namespace parameter
/// (`kubectl_mcp_tool/tools/_cli_utils.py`).
pub fn push_namespace(args: &mut Vec<String>, input: &Value) {
    if let Some(ns) = input.get("namespace").and_then(Value::as_str) {
        if !ns.is_empty() {
            args.push("-n".into());
            args.push(ns.to_string());
        }
    }
}

pub fn push_context(args: &mut Vec<String>, input: &Value) {
    if let Some(ctx) = input.get("context").and_then(Value::as_str) {
        if !ctx.is_empty() {
            args.push("--context".into());
            args.push(ctx.to_string());
        }
    }
}

pub fn require_str<'a>(input: &'a Value, key: &str) -> ServerResult<&'a str> {
    input
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ServerError::InvalidParams(format!("missing required parameter '{key}'")))
}

use kubectl_mcp_protocol::{InputSchema, ParamSpec, ToolAnnotations, ToolCategory, ToolDescriptor};

/// Build a `ToolDescriptor`, deriving its display title from the name the
/// way the category modules all want it (`get_pods` → `Get Pods`).
pub fn descriptor(
    name: &str,
    description: &str,
    category: ToolCategory,
    read_only: bool,
    destructive: bool,
    schema: InputSchema,
) -> ToolDescriptor {
    ToolDescriptor {
        name: name.to_string(),
        description: description.to_string(),
        input_schema: schema,
        annotations: ToolAnnotations { title: title_case(name), read_only, destructive },
        category,
    }
}

fn title_case(name: &str) -> String {
    name.split('_')
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Convenience for the common `{namespace?, context?}` schema shared by
/// most read handlers.
pub fn schema(fields: Vec<(&str, ParamSpec)>) -> InputSchema {
    fields.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

pub fn namespace_param() -> (&'static str, ParamSpec) {
    (
        "namespace",
        ParamSpec::optional(
            kubectl_mcp_protocol::ParamType::String,
            serde_json::Value::String(String::new()),
            "Kubernetes namespace; empty means all accessible namespaces or the context default",
        ),
    )
}

pub fn context_param() -> (&'static str, ParamSpec) {
    (
        "context",
        ParamSpec::optional(
            kubectl_mcp_protocol::ParamType::String,
            serde_json::Value::String(String::new()),
            "kubeconfig context name; empty means current/in-cluster",
        ),
    )
}
