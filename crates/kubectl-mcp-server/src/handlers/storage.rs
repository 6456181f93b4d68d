//! Storage category (`spec.md` §4.8): persistent volumes, persistent
//! volume claims, storage classes.

use crate::registry::ToolRegistry;

use super::{context_param, descriptor, namespace_param, push_context, push_namespace, schema, Binary, CliPassthrough};
use kubectl_mcp_k8s::process::timeouts;
use kubectl_mcp_protocol::ToolCategory;

fn list_tool(registry: &mut ToolRegistry, name: &'static str, resource: &'static str, description: &str, namespaced: bool) {
    registry
        .register(
            descriptor(
                name,
                description,
                ToolCategory::Storage,
                true,
                false,
                if namespaced { schema(vec![namespace_param(), context_param()]) } else { schema(vec![context_param()]) },
            ),
            CliPassthrough::new(Binary::Kubectl, timeouts::READ_SECS, move |input| {
                let mut args = vec!["get".to_string(), resource.to_string(), "-o".to_string(), "wide".to_string()];
                if namespaced {
                    push_namespace(&mut args, input);
                }
                push_context(&mut args, input);
                Ok(args)
            }),
        )
        .unwrap_or_else(|e| panic!("{name} registration: {e}"));
}

pub fn register(registry: &mut ToolRegistry) {
    list_tool(registry, "get_persistent_volumes", "pv", "List persistent volumes (cluster-scoped)", false);
    list_tool(registry, "get_persistent_volume_claims", "pvc", "List persistent volume claims", true);
    list_tool(registry, "get_storage_classes", "storageclasses", "List storage classes (cluster-scoped)", false);
}
