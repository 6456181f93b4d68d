//! Cluster / contexts category (`spec.md` §4.8): list/switch/describe
//! contexts, cluster-info, cluster version, nodes, API resources, health,
//! set default namespace.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::error::ServerResult;
use crate::registry::ToolRegistry;

use super::{context_param, descriptor, push_context, require_str, schema, Binary, CliPassthrough, HandlerContext, HandlerOutcome, ToolHandler};
use kubectl_mcp_k8s::process::timeouts;
use kubectl_mcp_protocol::{ParamSpec, ParamType, ToolCategory};

/// Lists contexts through the provider, not by shelling out to `kubectl
/// config get-contexts` — the provider is the sole kubeconfig reader
/// (`spec.md` §4.3).
struct ListContexts;

#[async_trait]
impl ToolHandler for ListContexts {
    async fn call(&self, _input: Value, ctx: &HandlerContext) -> ServerResult<HandlerOutcome> {
        let contexts = ctx.provider.list_contexts().await?;
        Ok(HandlerOutcome::new(json!({ "contexts": contexts })))
    }
}

struct GetCurrentContext;

#[async_trait]
impl ToolHandler for GetCurrentContext {
    async fn call(&self, _input: Value, ctx: &HandlerContext) -> ServerResult<HandlerOutcome> {
        let current = ctx.provider.current_context().await?;
        Ok(HandlerOutcome::new(json!({ "context": current })))
    }
}

struct ValidateContext;

#[async_trait]
impl ToolHandler for ValidateContext {
    async fn call(&self, input: Value, ctx: &HandlerContext) -> ServerResult<HandlerOutcome> {
        let name = require_str(&input, "name")?;
        ctx.provider.validate_context(name).await?;
        Ok(HandlerOutcome::new(json!({ "valid": true, "context": name })))
    }
}

/// Doesn't mutate cluster state, but re-points which context subsequent
/// calls default to — so it's a write in the safety gate's terms even
/// though nothing is destroyed.
struct SwitchContext;

#[async_trait]
impl ToolHandler for SwitchContext {
    async fn call(&self, input: Value, ctx: &HandlerContext) -> ServerResult<HandlerOutcome> {
        let name = require_str(&input, "name")?;
        ctx.provider.validate_context(name).await?;
        let command = format!("kubectl config use-context {name}");
        Ok(HandlerOutcome::with_command(json!({ "switched_to": name }), command))
    }
}

pub fn register(registry: &mut ToolRegistry) {
    registry
        .register(
            descriptor("list_contexts", "List all kubeconfig contexts", ToolCategory::Cluster, true, false, schema(vec![])),
            ListContexts,
        )
        .expect("list_contexts registration");

    registry
        .register(
            descriptor("get_current_context", "Return the active kubeconfig context", ToolCategory::Cluster, true, false, schema(vec![])),
            GetCurrentContext,
        )
        .expect("get_current_context registration");

    registry
        .register(
            descriptor(
                "validate_context",
                "Check that a named context exists in the kubeconfig",
                ToolCategory::Cluster,
                true,
                false,
                schema(vec![("name", ParamSpec::required(ParamType::String, "Context name"))]),
            ),
            ValidateContext,
        )
        .expect("validate_context registration");

    registry
        .register(
            descriptor(
                "switch_context",
                "Switch the active kubeconfig context",
                ToolCategory::Cluster,
                false,
                false,
                schema(vec![("name", ParamSpec::required(ParamType::String, "Context name to switch to"))]),
            ),
            SwitchContext,
        )
        .expect("switch_context registration");

    registry
        .register(
            descriptor(
                "describe_context",
                "Describe a kubeconfig context's cluster/user/namespace",
                ToolCategory::Cluster,
                true,
                false,
                schema(vec![("name", ParamSpec::optional(ParamType::String, json!(""), "Context name; empty means current"))]),
            ),
            CliPassthrough::new(Binary::Kubectl, timeouts::READ_SECS, |input| {
                let mut args = vec!["config".to_string(), "view".to_string(), "--minify".to_string(), "-o".to_string(), "json".to_string()];
                if let Some(name) = input.get("name").and_then(Value::as_str).filter(|s| !s.is_empty()) {
                    args.push("--context".into());
                    args.push(name.to_string());
                }
                Ok(args)
            }),
        )
        .expect("describe_context registration");

    registry
        .register(
            descriptor("get_cluster_info", "Print cluster control-plane endpoint information", ToolCategory::Cluster, true, false, schema(vec![context_param()])),
            CliPassthrough::new(Binary::Kubectl, timeouts::READ_SECS, |input| {
                let mut args = vec!["cluster-info".to_string()];
                push_context(&mut args, input);
                Ok(args)
            }),
        )
        .expect("get_cluster_info registration");

    registry
        .register(
            descriptor("get_cluster_version", "Print client and server version information", ToolCategory::Cluster, true, false, schema(vec![context_param()])),
            CliPassthrough::new(Binary::Kubectl, timeouts::READ_SECS, |input| {
                let mut args = vec!["version".to_string(), "-o".to_string(), "json".to_string()];
                push_context(&mut args, input);
                Ok(args)
            }),
        )
        .expect("get_cluster_version registration");

    registry
        .register(
            descriptor("get_nodes", "List cluster nodes", ToolCategory::Cluster, true, false, schema(vec![context_param()])),
            CliPassthrough::new(Binary::Kubectl, timeouts::READ_SECS, |input| {
                let mut args = vec!["get".to_string(), "nodes".to_string(), "-o".to_string(), "wide".to_string()];
                push_context(&mut args, input);
                Ok(args)
            }),
        )
        .expect("get_nodes registration");

    registry
        .register(
            descriptor("get_api_resources", "List API resource kinds the cluster supports", ToolCategory::Cluster, true, false, schema(vec![context_param()])),
            CliPassthrough::new(Binary::Kubectl, timeouts::READ_SECS, |input| {
                let mut args = vec!["api-resources".to_string()];
                push_context(&mut args, input);
                Ok(args)
            }),
        )
        .expect("get_api_resources registration");

    registry
        .register(
            descriptor("check_cluster_health", "Summarize component-status and node-readiness health", ToolCategory::Cluster, true, false, schema(vec![context_param()])),
            CliPassthrough::new(Binary::Kubectl, timeouts::READ_SECS, |input| {
                let mut args = vec!["get".to_string(), "componentstatuses".to_string()];
                push_context(&mut args, input);
                Ok(args)
            }),
        )
        .expect("check_cluster_health registration");

    registry
        .register(
            descriptor(
                "set_default_namespace",
                "Set the default namespace for the active context",
                ToolCategory::Cluster,
                false,
                false,
                schema(vec![
                    ("namespace", ParamSpec::required(ParamType::String, "Namespace to set as default")),
                    context_param(),
                ]),
            ),
            CliPassthrough::new(Binary::Kubectl, timeouts::MUTATE_SECS, |input| {
                let namespace = require_str(input, "namespace")?;
                let mut args = vec!["config".to_string(), "set-context".to_string(), "--current".to_string(), format!("--namespace={namespace}")];
                push_context(&mut args, input);
                Ok(args)
            }),
        )
        .expect("set_default_namespace registration");
}
