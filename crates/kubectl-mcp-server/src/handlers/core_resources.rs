//! Core resources category (`spec.md` §4.8): namespaces, configmaps,
//! secrets, events, resource quotas, limit ranges.
//!
//! `get_secrets`'s output passes through the masker like every other
//! tool (`spec.md` §4.2) — the dispatcher doesn't special-case it — but
//! the masker itself special-cases `Secret.data`/`stringData` regardless
//! of what pattern-matching alone would catch.

use crate::registry::ToolRegistry;

use super::{context_param, descriptor, namespace_param, push_context, push_namespace};
use kubectl_mcp_k8s::process::timeouts;
use kubectl_mcp_protocol::ToolCategory;
use super::{schema, Binary, CliPassthrough};

fn list_tool(registry: &mut ToolRegistry, name: &'static str, resource: &'static str, description: &str, output: &'static str) {
    registry
        .register(
            descriptor(name, description, ToolCategory::Core, true, false, schema(vec![namespace_param(), context_param()])),
            CliPassthrough::new(Binary::Kubectl, timeouts::READ_SECS, move |input| {
                let mut args = vec!["get".to_string(), resource.to_string(), "-o".to_string(), output.to_string()];
                push_namespace(&mut args, input);
                push_context(&mut args, input);
                Ok(args)
            }),
        )
        .unwrap_or_else(|e| panic!("{name} registration: {e}"));
}

pub fn register(registry: &mut ToolRegistry) {
    list_tool(registry, "get_namespaces", "namespaces", "List namespaces", "wide");
    list_tool(registry, "get_configmaps", "configmaps", "List configmaps", "wide");
    // Raw output; the dispatcher's masker scrubs Secret.data before the
    // client ever sees it (spec.md §4.2).
    list_tool(registry, "get_secrets", "secrets", "List secrets (values masked before returning to the client)", "json");
    list_tool(registry, "get_events", "events", "List recent events", "wide");
    list_tool(registry, "get_resource_quotas", "resourcequotas", "List resource quotas", "wide");
    list_tool(registry, "get_limit_ranges", "limitranges", "List limit ranges", "wide");
}
