//! Deployments & controllers category (`spec.md` §4.8): deployments,
//! statefulsets, daemonsets, replicasets, jobs/cronjobs, HPAs, PDBs;
//! create/scale/restart for deployments.

use serde_json::json;

use crate::registry::ToolRegistry;

use super::{
    context_param, descriptor, namespace_param, push_context, push_namespace, require_str, schema,
    Binary, CliPassthrough,
};
use kubectl_mcp_k8s::process::timeouts;
use kubectl_mcp_protocol::{ParamSpec, ParamType, ToolCategory};

fn get_resource_tool(registry: &mut ToolRegistry, name: &'static str, resource: &'static str, description: &str) {
    registry
        .register(
            descriptor(name, description, ToolCategory::Deployments, true, false, schema(vec![namespace_param(), context_param()])),
            CliPassthrough::new(Binary::Kubectl, timeouts::READ_SECS, move |input| {
                let mut args = vec!["get".to_string(), resource.to_string(), "-o".to_string(), "wide".to_string()];
                push_namespace(&mut args, input);
                push_context(&mut args, input);
                Ok(args)
            }),
        )
        .unwrap_or_else(|e| panic!("{name} registration: {e}"));
}

pub fn register(registry: &mut ToolRegistry) {
    get_resource_tool(registry, "get_deployments", "deployments", "List deployments");
    get_resource_tool(registry, "get_statefulsets", "statefulsets", "List statefulsets");
    get_resource_tool(registry, "get_daemonsets", "daemonsets", "List daemonsets");
    get_resource_tool(registry, "get_replicasets", "replicasets", "List replicasets");
    get_resource_tool(registry, "get_jobs", "jobs", "List jobs");
    get_resource_tool(registry, "get_cronjobs", "cronjobs", "List cronjobs");
    get_resource_tool(registry, "get_hpas", "horizontalpodautoscalers", "List horizontal pod autoscalers");
    get_resource_tool(registry, "get_pdbs", "poddisruptionbudgets", "List pod disruption budgets");

    registry
        .register(
            descriptor(
                "create_deployment",
                "Create a deployment from an image",
                ToolCategory::Deployments,
                false,
                false,
                schema(vec![
                    ("name", ParamSpec::required(ParamType::String, "Deployment name")),
                    ("image", ParamSpec::required(ParamType::String, "Container image")),
                    ("replicas", ParamSpec::optional(ParamType::Integer, json!(1), "Initial replica count")),
                    namespace_param(),
                    context_param(),
                ]),
            ),
            CliPassthrough::new(Binary::Kubectl, timeouts::MUTATE_SECS, |input| {
                let name = require_str(input, "name")?;
                let image = require_str(input, "image")?;
                let replicas = input.get("replicas").and_then(serde_json::Value::as_i64).unwrap_or(1);
                let mut args = vec![
                    "create".into(), "deployment".into(), name.to_string(),
                    "--image".into(), image.to_string(),
                    "--replicas".into(), replicas.to_string(),
                ];
                push_namespace(&mut args, input);
                push_context(&mut args, input);
                Ok(args)
            }),
        )
        .expect("create_deployment registration");

    registry
        .register(
            descriptor(
                "scale_deployment",
                "Scale a deployment to a target replica count",
                ToolCategory::Deployments,
                false,
                false,
                schema(vec![
                    ("name", ParamSpec::required(ParamType::String, "Deployment name")),
                    ("replicas", ParamSpec::required(ParamType::Integer, "Target replica count")),
                    namespace_param(),
                    context_param(),
                ]),
            ),
            CliPassthrough::new(Binary::Kubectl, timeouts::MUTATE_SECS, |input| {
                let name = require_str(input, "name")?;
                let replicas = input
                    .get("replicas")
                    .and_then(serde_json::Value::as_i64)
                    .ok_or_else(|| crate::error::ServerError::InvalidParams("missing required parameter 'replicas'".into()))?;
                let mut args = vec!["scale".into(), "deployment".into(), name.to_string(), format!("--replicas={replicas}")];
                push_namespace(&mut args, input);
                push_context(&mut args, input);
                Ok(args)
            }),
        )
        .expect("scale_deployment registration");

    registry
        .register(
            descriptor(
                "restart_deployment",
                "Trigger a rolling restart of a deployment",
                ToolCategory::Deployments,
                false,
                false,
                schema(vec![
                    ("name", ParamSpec::required(ParamType::String, "Deployment name")),
                    namespace_param(),
                    context_param(),
                ]),
            ),
            CliPassthrough::new(Binary::Kubectl, timeouts::MUTATE_SECS, |input| {
                let name = require_str(input, "name")?;
                let mut args = vec!["rollout".into(), "restart".into(), format!("deployment/{name}")];
                push_namespace(&mut args, input);
                push_context(&mut args, input);
                Ok(args)
            }),
        )
        .expect("restart_deployment registration");
}
