//! Pods category (`spec.md` §4.8): list, logs, events, exec, health,
//! crash diagnosis, pending detection, evicted listing, previous-instance
//! logs, condition dump, cleanup.

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Pod;
use kube::api::{Api, ListParams, LogParams};
use kube::ResourceExt;
use serde_json::{json, Value};

use crate::error::ServerResult;
use crate::registry::ToolRegistry;

use super::{
    context_param, descriptor, namespace_param, push_context, push_namespace, require_str, schema,
    Binary, CliPassthrough, HandlerContext, HandlerOutcome, ToolHandler,
};
use kubectl_mcp_protocol::{ParamSpec, ParamType, ToolCategory};

/// Talks to the typed client directly: a representative, non-CLI handler
/// for the registry's single most-used read tool.
struct GetPods;

#[async_trait]
impl ToolHandler for GetPods {
    async fn call(&self, input: Value, ctx: &HandlerContext) -> ServerResult<HandlerOutcome> {
        let context_name = input.get("context").and_then(Value::as_str).unwrap_or("");
        let handle = ctx.provider.api_client(context_name).await?;
        let namespace = input.get("namespace").and_then(Value::as_str).unwrap_or("");

        let api: Api<Pod> = if namespace.is_empty() {
            Api::all(handle.client)
        } else {
            Api::namespaced(handle.client, namespace)
        };

        let pods = api.list(&ListParams::default()).await?;
        let summaries: Vec<Value> = pods
            .items
            .iter()
            .map(|p| {
                let phase = p.status.as_ref().and_then(|s| s.phase.clone()).unwrap_or_default();
                let ready = p
                    .status
                    .as_ref()
                    .and_then(|s| s.container_statuses.as_ref())
                    .map(|cs| cs.iter().filter(|c| c.ready).count())
                    .unwrap_or(0);
                let total = p
                    .status
                    .as_ref()
                    .and_then(|s| s.container_statuses.as_ref())
                    .map(Vec::len)
                    .unwrap_or(0);
                json!({
                    "name": p.name_any(),
                    "namespace": p.namespace().unwrap_or_default(),
                    "phase": phase,
                    "ready": format!("{ready}/{total}"),
                    "node": p.spec.as_ref().and_then(|s| s.node_name.clone()),
                })
            })
            .collect();

        let command = if namespace.is_empty() {
            "kubectl get pods --all-namespaces".to_string()
        } else {
            format!("kubectl get pods -n {namespace}")
        };
        Ok(HandlerOutcome::with_command(json!({ "pods": summaries }), command))
    }
}

pub fn register(registry: &mut ToolRegistry) {
    registry
        .register(
            descriptor(
                "get_pods",
                "List pods, optionally scoped to a namespace",
                ToolCategory::Pods,
                true,
                false,
                schema(vec![namespace_param(), context_param()]),
            ),
            GetPods,
        )
        .expect("get_pods registration");

    registry
        .register(
            descriptor(
                "get_logs",
                "Fetch the current logs of a pod/container",
                ToolCategory::Pods,
                true,
                false,
                schema(vec![
                    ("pod_name", ParamSpec::required(ParamType::String, "Pod name")),
                    ("container", ParamSpec::optional(ParamType::String, json!(""), "Container name, defaults to the only/first container")),
                    ("tail_lines", ParamSpec::optional(ParamType::Integer, json!(200), "Number of trailing lines to return")),
                    namespace_param(),
                    context_param(),
                ]),
            ),
            CliPassthrough::new(Binary::Kubectl, kubectl_mcp_k8s::process::timeouts::LOG_READ_SECS, |input| {
                let pod = require_str(input, "pod_name")?;
                let mut args = vec!["logs".to_string(), pod.to_string()];
                if let Some(c) = input.get("container").and_then(Value::as_str).filter(|s| !s.is_empty()) {
                    args.push("-c".into());
                    args.push(c.to_string());
                }
                let tail = input.get("tail_lines").and_then(Value::as_i64).unwrap_or(200);
                args.push("--tail".into());
                args.push(tail.to_string());
                push_namespace(&mut args, input);
                push_context(&mut args, input);
                Ok(args)
            }),
        )
        .expect("get_logs registration");

    registry
        .register(
            descriptor(
                "get_previous_logs",
                "Fetch the logs of a pod/container's previous (crashed) instance",
                ToolCategory::Pods,
                true,
                false,
                schema(vec![
                    ("pod_name", ParamSpec::required(ParamType::String, "Pod name")),
                    ("container", ParamSpec::optional(ParamType::String, json!(""), "Container name")),
                    namespace_param(),
                    context_param(),
                ]),
            ),
            CliPassthrough::new(Binary::Kubectl, kubectl_mcp_k8s::process::timeouts::LOG_READ_SECS, |input| {
                let pod = require_str(input, "pod_name")?;
                let mut args = vec!["logs".to_string(), pod.to_string(), "--previous".to_string()];
                if let Some(c) = input.get("container").and_then(Value::as_str).filter(|s| !s.is_empty()) {
                    args.push("-c".into());
                    args.push(c.to_string());
                }
                push_namespace(&mut args, input);
                push_context(&mut args, input);
                Ok(args)
            }),
        )
        .expect("get_previous_logs registration");

    registry
        .register(
            descriptor(
                "get_pod_events",
                "List events scoped to a specific pod",
                ToolCategory::Pods,
                true,
                false,
                schema(vec![
                    ("pod_name", ParamSpec::required(ParamType::String, "Pod name")),
                    namespace_param(),
                    context_param(),
                ]),
            ),
            CliPassthrough::new(Binary::Kubectl, kubectl_mcp_k8s::process::timeouts::READ_SECS, |input| {
                let pod = require_str(input, "pod_name")?;
                let mut args = vec![
                    "get".into(), "events".into(),
                    "--field-selector".into(), format!("involvedObject.name={pod}"),
                ];
                push_namespace(&mut args, input);
                push_context(&mut args, input);
                Ok(args)
            }),
        )
        .expect("get_pod_events registration");

    registry
        .register(
            descriptor(
                "exec_in_pod",
                "Execute a command inside a running pod's container",
                ToolCategory::Pods,
                false,
                false,
                schema(vec![
                    ("pod_name", ParamSpec::required(ParamType::String, "Pod name")),
                    ("command", ParamSpec::required(ParamType::String, "Command to run inside the container")),
                    ("container", ParamSpec::optional(ParamType::String, json!(""), "Container name")),
                    namespace_param(),
                    context_param(),
                ]),
            ),
            CliPassthrough::new(Binary::Kubectl, kubectl_mcp_k8s::process::timeouts::READ_SECS, |input| {
                let pod = require_str(input, "pod_name")?;
                let command = require_str(input, "command")?;
                let mut args = vec!["exec".to_string(), pod.to_string()];
                if let Some(c) = input.get("container").and_then(Value::as_str).filter(|s| !s.is_empty()) {
                    args.push("-c".into());
                    args.push(c.to_string());
                }
                push_namespace(&mut args, input);
                push_context(&mut args, input);
                args.push("--".into());
                args.extend(command.split_whitespace().map(str::to_string));
                Ok(args)
            }),
        )
        .expect("exec_in_pod registration");

    registry
        .register(
            descriptor(
                "health_check_pod",
                "Summarize a pod's readiness/liveness probe status",
                ToolCategory::Pods,
                true,
                false,
                schema(vec![
                    ("pod_name", ParamSpec::required(ParamType::String, "Pod name")),
                    namespace_param(),
                    context_param(),
                ]),
            ),
            CliPassthrough::new(Binary::Kubectl, kubectl_mcp_k8s::process::timeouts::READ_SECS, |input| {
                let pod = require_str(input, "pod_name")?;
                let mut args = vec!["get".to_string(), "pod".to_string(), pod.to_string(), "-o".to_string(), "json".to_string()];
                push_namespace(&mut args, input);
                push_context(&mut args, input);
                Ok(args)
            }),
        )
        .expect("health_check_pod registration");

    registry
        .register(
            descriptor(
                "diagnose_crashloop",
                "Inspect a pod for CrashLoopBackOff and summarize the likely cause",
                ToolCategory::Pods,
                true,
                false,
                schema(vec![
                    ("pod_name", ParamSpec::required(ParamType::String, "Pod name")),
                    namespace_param(),
                    context_param(),
                ]),
            ),
            CliPassthrough::new(Binary::Kubectl, kubectl_mcp_k8s::process::timeouts::READ_SECS, |input| {
                let pod = require_str(input, "pod_name")?;
                let mut args = vec!["describe".to_string(), "pod".to_string(), pod.to_string()];
                push_namespace(&mut args, input);
                push_context(&mut args, input);
                Ok(args)
            }),
        )
        .expect("diagnose_crashloop registration");

    registry
        .register(
            descriptor(
                "detect_pending_pods",
                "List pods stuck in Pending state with their scheduling events",
                ToolCategory::Pods,
                true,
                false,
                schema(vec![namespace_param(), context_param()]),
            ),
            CliPassthrough::new(Binary::Kubectl, kubectl_mcp_k8s::process::timeouts::READ_SECS, |input| {
                let mut args = vec![
                    "get".into(), "pods".into(),
                    "--field-selector".into(), "status.phase=Pending".into(),
                ];
                push_namespace(&mut args, input);
                push_context(&mut args, input);
                Ok(args)
            }),
        )
        .expect("detect_pending_pods registration");

    registry
        .register(
            descriptor(
                "list_evicted_pods",
                "List pods evicted by the kubelet",
                ToolCategory::Pods,
                true,
                false,
                schema(vec![namespace_param(), context_param()]),
            ),
            CliPassthrough::new(Binary::Kubectl, kubectl_mcp_k8s::process::timeouts::READ_SECS, |input| {
                let mut args = vec![
                    "get".into(), "pods".into(),
                    "--field-selector".into(), "status.phase=Failed".into(),
                    "-o".into(), "json".into(),
                ];
                push_namespace(&mut args, input);
                push_context(&mut args, input);
                Ok(args)
            }),
        )
        .expect("list_evicted_pods registration");

    registry
        .register(
            descriptor(
                "describe_pod_conditions",
                "Dump a pod's status.conditions array",
                ToolCategory::Pods,
                true,
                false,
                schema(vec![
                    ("pod_name", ParamSpec::required(ParamType::String, "Pod name")),
                    namespace_param(),
                    context_param(),
                ]),
            ),
            CliPassthrough::new(Binary::Kubectl, kubectl_mcp_k8s::process::timeouts::READ_SECS, |input| {
                let pod = require_str(input, "pod_name")?;
                let mut args = vec![
                    "get".into(), "pod".into(), pod.to_string(),
                    "-o".into(), "jsonpath={.status.conditions}".into(),
                ];
                push_namespace(&mut args, input);
                push_context(&mut args, input);
                Ok(args)
            }),
        )
        .expect("describe_pod_conditions registration");

    registry
        .register(
            descriptor(
                "cleanup_failed_pods",
                "Delete all Failed/Evicted pods in a namespace",
                ToolCategory::Pods,
                false,
                true,
                schema(vec![namespace_param(), context_param()]),
            ),
            CliPassthrough::new(Binary::Kubectl, kubectl_mcp_k8s::process::timeouts::MUTATE_SECS, |input| {
                let mut args = vec![
                    "delete".into(), "pods".into(),
                    "--field-selector".into(), "status.phase=Failed".into(),
                ];
                push_namespace(&mut args, input);
                push_context(&mut args, input);
                Ok(args)
            }),
        )
        .expect("cleanup_failed_pods registration");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers_eleven_pod_tools() {
        let mut registry = ToolRegistry::new();
        register(&mut registry);
        let pods: Vec<_> = registry
            .list()
            .into_iter()
            .filter(|d| matches!(d.category, ToolCategory::Pods))
            .collect();
        assert_eq!(pods.len(), 11);
    }
}
