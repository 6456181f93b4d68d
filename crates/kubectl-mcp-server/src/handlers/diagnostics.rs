//! Diagnostics category (`spec.md` §4.8): namespace comparison, pod
//! metrics, node metrics.

use crate::registry::ToolRegistry;

use super::{context_param, descriptor, namespace_param, push_context, push_namespace, require_str, schema, Binary, CliPassthrough};
use kubectl_mcp_k8s::process::timeouts;
use kubectl_mcp_protocol::{ParamSpec, ParamType, ToolCategory};

pub fn register(registry: &mut ToolRegistry) {
    registry
        .register(
            descriptor(
                "compare_namespaces",
                "Diff the resources present in two namespaces",
                ToolCategory::Diagnostics,
                true,
                false,
                schema(vec![
                    ("namespace_a", ParamSpec::required(ParamType::String, "First namespace")),
                    ("namespace_b", ParamSpec::required(ParamType::String, "Second namespace")),
                    context_param(),
                ]),
            ),
            CliPassthrough::new(Binary::Kubectl, timeouts::READ_SECS, |input| {
                let _a = require_str(input, "namespace_a")?;
                let _b = require_str(input, "namespace_b")?;
                // Dumps every namespace's resources in one call; the caller
                // diffs the two namespaces' slices of the JSON client-side
                // (kubectl has no "list these two namespaces" selector).
                let mut args = vec![
                    "get".to_string(), "all,configmaps,secrets".to_string(),
                    "-o".to_string(), "json".to_string(), "--all-namespaces".to_string(),
                ];
                push_context(&mut args, input);
                Ok(args)
            }),
        )
        .expect("compare_namespaces registration");

    registry
        .register(
            descriptor(
                "get_pod_metrics",
                "Report per-pod CPU/memory usage from the metrics API",
                ToolCategory::Diagnostics,
                true,
                false,
                schema(vec![namespace_param(), context_param()]),
            ),
            CliPassthrough::new(Binary::Kubectl, timeouts::READ_SECS, |input| {
                let mut args = vec!["top".to_string(), "pods".to_string()];
                push_namespace(&mut args, input);
                push_context(&mut args, input);
                Ok(args)
            }),
        )
        .expect("get_pod_metrics registration");

    registry
        .register(
            descriptor(
                "get_node_metrics",
                "Report per-node CPU/memory usage from the metrics API",
                ToolCategory::Diagnostics,
                true,
                false,
                schema(vec![context_param()]),
            ),
            CliPassthrough::new(Binary::Kubectl, timeouts::READ_SECS, |input| {
                let mut args = vec!["top".to_string(), "nodes".to_string()];
                push_context(&mut args, input);
                Ok(args)
            }),
        )
        .expect("get_node_metrics registration");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers_three_diagnostics_tools() {
        let mut registry = ToolRegistry::new();
        register(&mut registry);
        let tools: Vec<_> = registry
            .list()
            .into_iter()
            .filter(|d| matches!(d.category, ToolCategory::Diagnostics))
            .collect();
        assert_eq!(tools.len(), 3);
    }
}
