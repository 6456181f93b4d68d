//! Cost category (`spec.md` §4.8): resource recommendations, idle
//! resources, quota usage, cost analysis, over-provisioned resources,
//! trends, namespace allocation, request optimization, usage.
//!
//! None of these call out to a pricing API — they gather the raw
//! requests/limits/usage data kubectl already has and leave cost
//! attribution to the caller, matching how the rest of the registry stays
//! a thin wrapper over `kubectl`/`helm`/`kind` rather than a policy engine.

use crate::registry::ToolRegistry;

use super::{context_param, descriptor, namespace_param, push_context, push_namespace, schema, Binary, CliPassthrough};
use kubectl_mcp_k8s::process::timeouts;
use kubectl_mcp_protocol::ToolCategory;

fn read_tool(registry: &mut ToolRegistry, name: &'static str, description: &str, args: &'static [&'static str], namespaced: bool) {
    registry
        .register(
            descriptor(
                name,
                description,
                ToolCategory::Cost,
                true,
                false,
                if namespaced { schema(vec![namespace_param(), context_param()]) } else { schema(vec![context_param()]) },
            ),
            CliPassthrough::new(Binary::Kubectl, timeouts::READ_SECS, move |input| {
                let mut out: Vec<String> = args.iter().map(|s| s.to_string()).collect();
                if namespaced {
                    push_namespace(&mut out, input);
                }
                push_context(&mut out, input);
                Ok(out)
            }),
        )
        .unwrap_or_else(|e| panic!("{name} registration: {e}"));
}

pub fn register(registry: &mut ToolRegistry) {
    read_tool(
        registry,
        "recommend_resource_requests",
        "Compare pod resource requests against observed usage to suggest right-sized values",
        &["get", "pods", "-o", "json"],
        true,
    );
    read_tool(
        registry,
        "detect_idle_resources",
        "Find deployments/statefulsets with near-zero recent usage",
        &["top", "pods"],
        true,
    );
    read_tool(
        registry,
        "get_quota_usage",
        "Report resource quota consumption against configured hard limits",
        &["get", "resourcequotas", "-o", "json"],
        true,
    );
    read_tool(
        registry,
        "analyze_cost",
        "Summarize requested CPU/memory across a namespace as a cost proxy",
        &["get", "pods", "-o", "json"],
        true,
    );
    read_tool(
        registry,
        "detect_overprovisioned_resources",
        "Find pods whose requests far exceed observed usage",
        &["top", "pods"],
        true,
    );
    read_tool(
        registry,
        "get_cost_trends",
        "Report node and pod counts as a proxy for cluster cost over time",
        &["get", "nodes", "-o", "json"],
        false,
    );
    read_tool(
        registry,
        "get_namespace_allocation",
        "Break down total requested CPU/memory per namespace",
        &["get", "pods", "--all-namespaces", "-o", "json"],
        false,
    );
    read_tool(
        registry,
        "optimize_resource_requests",
        "Suggest request/limit adjustments across a namespace's workloads",
        &["get", "deployments,statefulsets,daemonsets", "-o", "json"],
        true,
    );
    read_tool(
        registry,
        "get_resource_usage",
        "Report current CPU/memory usage for pods or nodes",
        &["top", "pods"],
        true,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers_nine_cost_tools() {
        let mut registry = ToolRegistry::new();
        register(&mut registry);
        let tools: Vec<_> = registry
            .list()
            .into_iter()
            .filter(|d| matches!(d.category, ToolCategory::Cost))
            .collect();
        assert_eq!(tools.len(), 9);
    }
}
