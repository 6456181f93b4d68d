//! Kind category (`spec.md` §4.8): detect/version/list/get-nodes/
//! get-kubeconfig/export-logs/cluster-info/node-labels as reads;
//! create/delete/delete-all/load-image/load-image-archive/
//! build-node-image/set-kubeconfig as writes.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::error::ServerResult;
use crate::registry::ToolRegistry;

use super::{
    context_param, descriptor, require_str, schema, Binary, CliPassthrough, HandlerContext,
    HandlerOutcome, ToolHandler,
};
use kubectl_mcp_k8s::process::timeouts;
use kubectl_mcp_protocol::{ParamSpec, ParamType, ToolCategory};

fn cluster_name_param() -> (&'static str, ParamSpec) {
    ("cluster_name", ParamSpec::optional(ParamType::String, json!("kind"), "kind cluster name"))
}

fn push_cluster_name(args: &mut Vec<String>, input: &Value) {
    let name = input.get("cluster_name").and_then(Value::as_str).filter(|s| !s.is_empty()).unwrap_or("kind");
    args.push("--name".into());
    args.push(name.to_string());
}

/// Reports whether the `kind` binary is on `PATH` without running any
/// cluster operation — the registry's one handler that queries the
/// runner's probe cache directly instead of shelling a `kubectl`/`helm`/
/// `kind` subcommand.
struct DetectKind;

#[async_trait]
impl ToolHandler for DetectKind {
    async fn call(&self, _input: Value, ctx: &HandlerContext) -> ServerResult<HandlerOutcome> {
        let available = ctx.runner.available("kind").await;
        let version = ctx.runner.version("kind").await;
        Ok(HandlerOutcome::new(json!({ "available": available, "version": version })))
    }
}

pub fn register(registry: &mut ToolRegistry) {
    registry
        .register(
            descriptor("kind_detect_tool", "Detect whether the kind binary is installed and its version", ToolCategory::Kind, true, false, schema(vec![])),
            DetectKind,
        )
        .expect("kind_detect_tool registration");

    registry
        .register(
            descriptor("kind_version", "Print the kind CLI version", ToolCategory::Kind, true, false, schema(vec![])),
            CliPassthrough::new(Binary::Kind, timeouts::READ_SECS, |_input| Ok(vec!["version".to_string()])),
        )
        .expect("kind_version registration");

    registry
        .register(
            descriptor("kind_list_clusters", "List kind clusters on this host", ToolCategory::Kind, true, false, schema(vec![])),
            CliPassthrough::new(Binary::Kind, timeouts::READ_SECS, |_input| Ok(vec!["get".to_string(), "clusters".to_string()])),
        )
        .expect("kind_list_clusters registration");

    registry
        .register(
            descriptor("kind_get_nodes", "List a kind cluster's container nodes", ToolCategory::Kind, true, false, schema(vec![cluster_name_param()])),
            CliPassthrough::new(Binary::Kind, timeouts::READ_SECS, |input| {
                let mut args = vec!["get".to_string(), "nodes".to_string()];
                push_cluster_name(&mut args, input);
                Ok(args)
            }),
        )
        .expect("kind_get_nodes registration");

    registry
        .register(
            descriptor("kind_get_kubeconfig", "Print the kubeconfig for a kind cluster", ToolCategory::Kind, true, false, schema(vec![cluster_name_param()])),
            CliPassthrough::new(Binary::Kind, timeouts::READ_SECS, |input| {
                let mut args = vec!["get".to_string(), "kubeconfig".to_string()];
                push_cluster_name(&mut args, input);
                Ok(args)
            }),
        )
        .expect("kind_get_kubeconfig registration");

    registry
        .register(
            descriptor(
                "kind_export_logs",
                "Export a kind cluster's node logs to a local directory",
                ToolCategory::Kind,
                true,
                false,
                schema(vec![
                    ("output_dir", ParamSpec::required(ParamType::String, "Local directory to write logs into")),
                    cluster_name_param(),
                ]),
            ),
            CliPassthrough::new(Binary::Kind, timeouts::READ_SECS, |input| {
                let output_dir = require_str(input, "output_dir")?;
                let mut args = vec!["export".to_string(), "logs".to_string(), output_dir.to_string()];
                push_cluster_name(&mut args, input);
                Ok(args)
            }),
        )
        .expect("kind_export_logs registration");

    registry
        .register(
            descriptor("kind_cluster_info", "Print a kind cluster's control-plane endpoint", ToolCategory::Kind, true, false, schema(vec![context_param()])),
            CliPassthrough::new(Binary::Kubectl, timeouts::READ_SECS, |input| {
                let mut args = vec!["cluster-info".to_string(), "--context".to_string()];
                let ctx = input.get("context").and_then(Value::as_str).filter(|s| !s.is_empty()).unwrap_or("kind-kind");
                args.push(ctx.to_string());
                Ok(args)
            }),
        )
        .expect("kind_cluster_info registration");

    registry
        .register(
            descriptor("kind_node_labels", "Print the labels kind applied to each node", ToolCategory::Kind, true, false, schema(vec![context_param()])),
            CliPassthrough::new(Binary::Kubectl, timeouts::READ_SECS, |input| {
                let mut args = vec!["get".to_string(), "nodes".to_string(), "--show-labels".to_string()];
                if let Some(c) = input.get("context").and_then(Value::as_str).filter(|s| !s.is_empty()) {
                    args.push("--context".into());
                    args.push(c.to_string());
                }
                Ok(args)
            }),
        )
        .expect("kind_node_labels registration");

    registry
        .register(
            descriptor(
                "kind_create_cluster_tool",
                "Create a new kind cluster",
                ToolCategory::Kind,
                false,
                false,
                schema(vec![
                    ("config_file", ParamSpec::optional(ParamType::String, json!(""), "Path to a kind config file")),
                    ("image", ParamSpec::optional(ParamType::String, json!(""), "Node image override")),
                    cluster_name_param(),
                ]),
            ),
            CliPassthrough::new(Binary::Kind, timeouts::KIND_CREATE_SECS, |input| {
                let mut args = vec!["create".to_string(), "cluster".to_string()];
                push_cluster_name(&mut args, input);
                if let Some(f) = input.get("config_file").and_then(Value::as_str).filter(|s| !s.is_empty()) {
                    args.push("--config".into());
                    args.push(f.to_string());
                }
                if let Some(i) = input.get("image").and_then(Value::as_str).filter(|s| !s.is_empty()) {
                    args.push("--image".into());
                    args.push(i.to_string());
                }
                Ok(args)
            }),
        )
        .expect("kind_create_cluster_tool registration");

    registry
        .register(
            descriptor("kind_delete_cluster_tool", "Delete a kind cluster", ToolCategory::Kind, false, true, schema(vec![cluster_name_param()])),
            CliPassthrough::new(Binary::Kind, timeouts::MUTATE_SECS, |input| {
                let mut args = vec!["delete".to_string(), "cluster".to_string()];
                push_cluster_name(&mut args, input);
                Ok(args)
            }),
        )
        .expect("kind_delete_cluster_tool registration");

    registry
        .register(
            descriptor("kind_delete_all_clusters", "Delete every kind cluster on this host", ToolCategory::Kind, false, true, schema(vec![])),
            CliPassthrough::new(Binary::Kind, timeouts::MUTATE_SECS, |_input| Ok(vec!["delete".to_string(), "clusters".to_string(), "--all".to_string()])),
        )
        .expect("kind_delete_all_clusters registration");

    registry
        .register(
            descriptor(
                "kind_load_image_tool",
                "Load a local Docker image into a kind cluster's nodes",
                ToolCategory::Kind,
                false,
                false,
                schema(vec![
                    ("image", ParamSpec::required(ParamType::String, "Image reference to load")),
                    cluster_name_param(),
                ]),
            ),
            CliPassthrough::new(Binary::Kind, timeouts::MUTATE_SECS, |input| {
                let image = require_str(input, "image")?;
                let mut args = vec!["load".to_string(), "docker-image".to_string(), image.to_string()];
                push_cluster_name(&mut args, input);
                Ok(args)
            }),
        )
        .expect("kind_load_image_tool registration");

    registry
        .register(
            descriptor(
                "kind_load_image_archive",
                "Load a tarball image archive into a kind cluster's nodes",
                ToolCategory::Kind,
                false,
                false,
                schema(vec![
                    ("archive_path", ParamSpec::required(ParamType::String, "Path to the image tarball")),
                    cluster_name_param(),
                ]),
            ),
            CliPassthrough::new(Binary::Kind, timeouts::MUTATE_SECS, |input| {
                let archive_path = require_str(input, "archive_path")?;
                let mut args = vec!["load".to_string(), "image-archive".to_string(), archive_path.to_string()];
                push_cluster_name(&mut args, input);
                Ok(args)
            }),
        )
        .expect("kind_load_image_archive registration");

    registry
        .register(
            descriptor(
                "kind_build_node_image_tool",
                "Build a kind node image from a Kubernetes source tree",
                ToolCategory::Kind,
                false,
                false,
                schema(vec![("image_name", ParamSpec::optional(ParamType::String, json!(""), "Tag for the built image"))]),
            ),
            CliPassthrough::new(Binary::Kind, timeouts::KIND_BUILD_NODE_IMAGE_SECS, |input| {
                let mut args = vec!["build".to_string(), "node-image".to_string()];
                if let Some(name) = input.get("image_name").and_then(Value::as_str).filter(|s| !s.is_empty()) {
                    args.push("--image".into());
                    args.push(name.to_string());
                }
                Ok(args)
            }),
        )
        .expect("kind_build_node_image_tool registration");

    registry
        .register(
            descriptor(
                "kind_set_kubeconfig",
                "Merge a kind cluster's kubeconfig into the default kubeconfig file",
                ToolCategory::Kind,
                false,
                false,
                schema(vec![cluster_name_param()]),
            ),
            CliPassthrough::new(Binary::Kind, timeouts::MUTATE_SECS, |input| {
                let mut args = vec!["export".to_string(), "kubeconfig".to_string()];
                push_cluster_name(&mut args, input);
                Ok(args)
            }),
        )
        .expect("kind_set_kubeconfig registration");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers_fifteen_kind_tools() {
        let mut registry = ToolRegistry::new();
        register(&mut registry);
        let tools: Vec<_> = registry
            .list()
            .into_iter()
            .filter(|d| matches!(d.category, ToolCategory::Kind))
            .collect();
        assert_eq!(tools.len(), 15);
    }
}
