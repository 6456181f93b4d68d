//! Operations category (`spec.md` §4.8): apply, describe, patch, rollout,
//! create, delete, cp, backup, label, annotate, taint, wait, node
//! management, a generic passthrough escape hatch, and explain.

use serde_json::json;

use crate::error::ServerError;
use crate::registry::ToolRegistry;

use super::{context_param, descriptor, namespace_param, push_context, push_namespace, require_str, schema, Binary, CliPassthrough};
use kubectl_mcp_k8s::process::timeouts;
use kubectl_mcp_protocol::{ParamSpec, ParamType, ToolCategory};

pub fn register(registry: &mut ToolRegistry) {
    registry
        .register(
            descriptor(
                "apply_manifest",
                "Apply a manifest file or inline YAML/JSON",
                ToolCategory::Operations,
                false,
                false,
                schema(vec![
                    ("file", ParamSpec::required(ParamType::String, "Path to the manifest, or '-' with inline content")),
                    namespace_param(),
                    context_param(),
                ]),
            ),
            CliPassthrough::new(Binary::Kubectl, timeouts::MUTATE_SECS, |input| {
                let file = require_str(input, "file")?;
                let mut args = vec!["apply".to_string(), "-f".to_string(), file.to_string()];
                push_namespace(&mut args, input);
                push_context(&mut args, input);
                Ok(args)
            }),
        )
        .expect("apply_manifest registration");

    registry
        .register(
            descriptor(
                "describe_resource",
                "Describe any resource kind/name",
                ToolCategory::Operations,
                true,
                false,
                schema(vec![
                    ("kind", ParamSpec::required(ParamType::String, "Resource kind, e.g. pod, deployment")),
                    ("name", ParamSpec::required(ParamType::String, "Resource name")),
                    namespace_param(),
                    context_param(),
                ]),
            ),
            CliPassthrough::new(Binary::Kubectl, timeouts::READ_SECS, |input| {
                let kind = require_str(input, "kind")?;
                let name = require_str(input, "name")?;
                let mut args = vec!["describe".to_string(), kind.to_string(), name.to_string()];
                push_namespace(&mut args, input);
                push_context(&mut args, input);
                Ok(args)
            }),
        )
        .expect("describe_resource registration");

    registry
        .register(
            descriptor(
                "patch_resource",
                "Apply a strategic-merge or JSON patch to a resource",
                ToolCategory::Operations,
                false,
                false,
                schema(vec![
                    ("kind", ParamSpec::required(ParamType::String, "Resource kind")),
                    ("name", ParamSpec::required(ParamType::String, "Resource name")),
                    ("patch", ParamSpec::required(ParamType::String, "Patch document (JSON or YAML)")),
                    ("patch_type", ParamSpec::optional(ParamType::String, json!("strategic"), "merge, json, or strategic")),
                    namespace_param(),
                    context_param(),
                ]),
            ),
            CliPassthrough::new(Binary::Kubectl, timeouts::MUTATE_SECS, |input| {
                let kind = require_str(input, "kind")?;
                let name = require_str(input, "name")?;
                let patch = require_str(input, "patch")?;
                let patch_type = input.get("patch_type").and_then(serde_json::Value::as_str).unwrap_or("strategic");
                let mut args = vec![
                    "patch".to_string(), kind.to_string(), name.to_string(),
                    "--type".to_string(), patch_type.to_string(),
                    "-p".to_string(), patch.to_string(),
                ];
                push_namespace(&mut args, input);
                push_context(&mut args, input);
                Ok(args)
            }),
        )
        .expect("patch_resource registration");

    registry
        .register(
            descriptor(
                "rollout_status",
                "Watch a rollout's status until it completes or the timeout elapses",
                ToolCategory::Operations,
                true,
                false,
                schema(vec![
                    ("kind", ParamSpec::optional(ParamType::String, json!("deployment"), "Workload kind")),
                    ("name", ParamSpec::required(ParamType::String, "Workload name")),
                    namespace_param(),
                    context_param(),
                ]),
            ),
            CliPassthrough::new(Binary::Kubectl, timeouts::MUTATE_SECS, |input| {
                let kind = input.get("kind").and_then(serde_json::Value::as_str).filter(|s| !s.is_empty()).unwrap_or("deployment");
                let name = require_str(input, "name")?;
                let mut args = vec!["rollout".to_string(), "status".to_string(), format!("{kind}/{name}")];
                push_namespace(&mut args, input);
                push_context(&mut args, input);
                Ok(args)
            }),
        )
        .expect("rollout_status registration");

    registry
        .register(
            descriptor(
                "create_resource",
                "Create a resource from a manifest file",
                ToolCategory::Operations,
                false,
                false,
                schema(vec![
                    ("file", ParamSpec::required(ParamType::String, "Path to the manifest")),
                    namespace_param(),
                    context_param(),
                ]),
            ),
            CliPassthrough::new(Binary::Kubectl, timeouts::MUTATE_SECS, |input| {
                let file = require_str(input, "file")?;
                let mut args = vec!["create".to_string(), "-f".to_string(), file.to_string()];
                push_namespace(&mut args, input);
                push_context(&mut args, input);
                Ok(args)
            }),
        )
        .expect("create_resource registration");

    registry
        .register(
            descriptor(
                "delete_resource",
                "Delete a resource by kind and name",
                ToolCategory::Operations,
                false,
                true,
                schema(vec![
                    ("kind", ParamSpec::required(ParamType::String, "Resource kind")),
                    ("name", ParamSpec::required(ParamType::String, "Resource name")),
                    namespace_param(),
                    context_param(),
                ]),
            ),
            CliPassthrough::new(Binary::Kubectl, timeouts::MUTATE_SECS, |input| {
                let kind = require_str(input, "kind")?;
                let name = require_str(input, "name")?;
                let mut args = vec!["delete".to_string(), kind.to_string(), name.to_string()];
                push_namespace(&mut args, input);
                push_context(&mut args, input);
                Ok(args)
            }),
        )
        .expect("delete_resource registration");

    registry
        .register(
            descriptor(
                "copy_files",
                "Copy files between a local path and a pod",
                ToolCategory::Operations,
                false,
                false,
                schema(vec![
                    ("source", ParamSpec::required(ParamType::String, "Source path, local or pod:path")),
                    ("destination", ParamSpec::required(ParamType::String, "Destination path, local or pod:path")),
                    namespace_param(),
                    context_param(),
                ]),
            ),
            CliPassthrough::new(Binary::Kubectl, timeouts::MUTATE_SECS, |input| {
                let source = require_str(input, "source")?;
                let destination = require_str(input, "destination")?;
                let mut args = vec!["cp".to_string(), source.to_string(), destination.to_string()];
                push_namespace(&mut args, input);
                push_context(&mut args, input);
                Ok(args)
            }),
        )
        .expect("copy_files registration");

    registry
        .register(
            descriptor(
                "backup_resource",
                "Dump a resource's manifest to a file for backup",
                ToolCategory::Operations,
                true,
                false,
                schema(vec![
                    ("kind", ParamSpec::required(ParamType::String, "Resource kind")),
                    ("name", ParamSpec::required(ParamType::String, "Resource name")),
                    namespace_param(),
                    context_param(),
                ]),
            ),
            CliPassthrough::new(Binary::Kubectl, timeouts::READ_SECS, |input| {
                let kind = require_str(input, "kind")?;
                let name = require_str(input, "name")?;
                let mut args = vec!["get".to_string(), kind.to_string(), name.to_string(), "-o".to_string(), "yaml".to_string()];
                push_namespace(&mut args, input);
                push_context(&mut args, input);
                Ok(args)
            }),
        )
        .expect("backup_resource registration");

    registry
        .register(
            descriptor(
                "label_resource",
                "Add or update labels on a resource",
                ToolCategory::Operations,
                false,
                false,
                schema(vec![
                    ("kind", ParamSpec::required(ParamType::String, "Resource kind")),
                    ("name", ParamSpec::required(ParamType::String, "Resource name")),
                    ("labels", ParamSpec::required(ParamType::String, "Comma-separated key=value pairs")),
                    namespace_param(),
                    context_param(),
                ]),
            ),
            CliPassthrough::new(Binary::Kubectl, timeouts::MUTATE_SECS, |input| {
                let kind = require_str(input, "kind")?;
                let name = require_str(input, "name")?;
                let labels = require_str(input, "labels")?;
                let mut args = vec!["label".to_string(), kind.to_string(), name.to_string(), "--overwrite".to_string()];
                args.extend(labels.split(',').map(str::to_string));
                push_namespace(&mut args, input);
                push_context(&mut args, input);
                Ok(args)
            }),
        )
        .expect("label_resource registration");

    registry
        .register(
            descriptor(
                "annotate_resource",
                "Add or update annotations on a resource",
                ToolCategory::Operations,
                false,
                false,
                schema(vec![
                    ("kind", ParamSpec::required(ParamType::String, "Resource kind")),
                    ("name", ParamSpec::required(ParamType::String, "Resource name")),
                    ("annotations", ParamSpec::required(ParamType::String, "Comma-separated key=value pairs")),
                    namespace_param(),
                    context_param(),
                ]),
            ),
            CliPassthrough::new(Binary::Kubectl, timeouts::MUTATE_SECS, |input| {
                let kind = require_str(input, "kind")?;
                let name = require_str(input, "name")?;
                let annotations = require_str(input, "annotations")?;
                let mut args = vec!["annotate".to_string(), kind.to_string(), name.to_string(), "--overwrite".to_string()];
                args.extend(annotations.split(',').map(str::to_string));
                push_namespace(&mut args, input);
                push_context(&mut args, input);
                Ok(args)
            }),
        )
        .expect("annotate_resource registration");

    // A NoExecute taint evicts every non-tolerating pod on the node and
    // can't be undone by a read; annotations are static per tool, so this
    // is marked destructive regardless of which effect is passed.
    registry
        .register(
            descriptor(
                "taint_node",
                "Add or remove a taint on a node",
                ToolCategory::Operations,
                false,
                true,
                schema(vec![
                    ("node_name", ParamSpec::required(ParamType::String, "Node name")),
                    ("taint", ParamSpec::required(ParamType::String, "key=value:effect, optionally suffixed with '-' to remove")),
                    context_param(),
                ]),
            ),
            CliPassthrough::new(Binary::Kubectl, timeouts::MUTATE_SECS, |input| {
                let node = require_str(input, "node_name")?;
                let taint = require_str(input, "taint")?;
                let mut args = vec!["taint".to_string(), "node".to_string(), node.to_string(), taint.to_string()];
                push_context(&mut args, input);
                Ok(args)
            }),
        )
        .expect("taint_node registration");

    registry
        .register(
            descriptor(
                "wait_for_condition",
                "Block until a resource meets a condition or the timeout elapses",
                ToolCategory::Operations,
                true,
                false,
                schema(vec![
                    ("kind", ParamSpec::required(ParamType::String, "Resource kind")),
                    ("name", ParamSpec::required(ParamType::String, "Resource name")),
                    ("condition", ParamSpec::optional(ParamType::String, json!("Ready"), "Condition to wait for, e.g. condition=Ready")),
                    ("timeout_seconds", ParamSpec::optional(ParamType::Integer, json!(60), "Wait timeout in seconds")),
                    namespace_param(),
                    context_param(),
                ]),
            ),
            CliPassthrough::new(Binary::Kubectl, timeouts::MUTATE_SECS, |input| {
                let kind = require_str(input, "kind")?;
                let name = require_str(input, "name")?;
                let condition = input.get("condition").and_then(serde_json::Value::as_str).filter(|s| !s.is_empty()).unwrap_or("Ready");
                let timeout = input.get("timeout_seconds").and_then(serde_json::Value::as_i64).unwrap_or(60);
                let mut args = vec![
                    "wait".to_string(), format!("{kind}/{name}"),
                    format!("--for=condition={condition}"),
                    format!("--timeout={timeout}s"),
                ];
                push_namespace(&mut args, input);
                push_context(&mut args, input);
                Ok(args)
            }),
        )
        .expect("wait_for_condition registration");

    // `action=drain` evicts every pod on the node; cordon/uncordon are
    // reversible, but the annotation is static, so this is marked
    // destructive across all three actions rather than splitting drain
    // into its own tool.
    registry
        .register(
            descriptor(
                "manage_node",
                "Cordon, uncordon, or drain a node",
                ToolCategory::Operations,
                false,
                true,
                schema(vec![
                    ("node_name", ParamSpec::required(ParamType::String, "Node name")),
                    ("action", ParamSpec::required(ParamType::String, "cordon, uncordon, or drain")),
                    context_param(),
                ]),
            ),
            CliPassthrough::new(Binary::Kubectl, timeouts::MUTATE_SECS, |input| {
                let node = require_str(input, "node_name")?;
                let action = require_str(input, "action")?;
                if !matches!(action, "cordon" | "uncordon" | "drain") {
                    return Err(ServerError::InvalidParams(format!("unknown node action '{action}'")));
                }
                let mut args = vec![action.to_string(), node.to_string()];
                if action == "drain" {
                    args.push("--ignore-daemonsets".into());
                    args.push("--delete-emptydir-data".into());
                }
                push_context(&mut args, input);
                Ok(args)
            }),
        )
        .expect("manage_node registration");

    registry
        .register(
            descriptor(
                "run_kubectl_command",
                "Run an arbitrary kubectl subcommand not covered by a dedicated tool",
                ToolCategory::Operations,
                false,
                false,
                schema(vec![
                    ("args", ParamSpec::required(ParamType::String, "Space-separated kubectl arguments, not including the 'kubectl' program name")),
                    context_param(),
                ]),
            ),
            CliPassthrough::new(Binary::Kubectl, timeouts::MUTATE_SECS, |input| {
                let raw = require_str(input, "args")?;
                let mut args: Vec<String> = raw.split_whitespace().map(str::to_string).collect();
                push_context(&mut args, input);
                Ok(args)
            }),
        )
        .expect("run_kubectl_command registration");

    registry
        .register(
            descriptor(
                "explain_resource",
                "Print the documentation for a resource kind/field path",
                ToolCategory::Operations,
                true,
                false,
                schema(vec![
                    ("field_path", ParamSpec::required(ParamType::String, "Resource kind or dotted field path, e.g. pod.spec.containers")),
                    context_param(),
                ]),
            ),
            CliPassthrough::new(Binary::Kubectl, timeouts::READ_SECS, |input| {
                let field_path = require_str(input, "field_path")?;
                let mut args = vec!["explain".to_string(), field_path.to_string()];
                push_context(&mut args, input);
                Ok(args)
            }),
        )
        .expect("explain_resource registration");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers_fifteen_operations_tools() {
        let mut registry = ToolRegistry::new();
        register(&mut registry);
        let tools: Vec<_> = registry
            .list()
            .into_iter()
            .filter(|d| matches!(d.category, ToolCategory::Operations))
            .collect();
        assert_eq!(tools.len(), 15);
    }
}
