//! Security category (`spec.md` §4.8): RBAC roles, cluster roles, service
//! accounts, pod security, admission webhooks, CRDs, priority classes,
//! secrets audit, RBAC audit, pod security analysis.

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
                ToolCategory::Security,
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
    list_tool(registry, "get_rbac_roles", "roles,rolebindings", "List namespaced RBAC roles and role bindings", true);
    list_tool(registry, "get_cluster_roles", "clusterroles,clusterrolebindings", "List cluster-scoped RBAC roles and bindings", false);
    list_tool(registry, "get_service_accounts", "serviceaccounts", "List service accounts", true);
    list_tool(registry, "get_pod_security_policies", "podsecuritypolicies", "List pod security policies (deprecated API, cluster-scoped)", false);
    list_tool(registry, "get_admission_webhooks", "validatingwebhookconfigurations,mutatingwebhookconfigurations", "List validating and mutating admission webhook configurations", false);
    list_tool(registry, "get_crds", "customresourcedefinitions", "List custom resource definitions", false);
    list_tool(registry, "get_priority_classes", "priorityclasses", "List pod priority classes", false);

    registry
        .register(
            descriptor(
                "audit_secrets",
                "List secrets and flag ones missing rotation annotations or using deprecated types",
                ToolCategory::Security,
                true,
                false,
                schema(vec![namespace_param(), context_param()]),
            ),
            CliPassthrough::new(Binary::Kubectl, timeouts::READ_SECS, |input| {
                let mut args = vec!["get".to_string(), "secrets".to_string(), "-o".to_string(), "json".to_string()];
                push_namespace(&mut args, input);
                push_context(&mut args, input);
                Ok(args)
            }),
        )
        .expect("audit_secrets registration");

    registry
        .register(
            descriptor(
                "audit_rbac",
                "Flag overly broad RBAC bindings (wildcard verbs/resources, cluster-admin grants)",
                ToolCategory::Security,
                true,
                false,
                schema(vec![context_param()]),
            ),
            CliPassthrough::new(Binary::Kubectl, timeouts::READ_SECS, |input| {
                let mut args = vec![
                    "get".to_string(), "clusterrolebindings,rolebindings".to_string(),
                    "-o".to_string(), "json".to_string(),
                ];
                push_context(&mut args, input);
                Ok(args)
            }),
        )
        .expect("audit_rbac registration");

    registry
        .register(
            descriptor(
                "analyze_pod_security",
                "Flag pods running as root, privileged, or without resource limits",
                ToolCategory::Security,
                true,
                false,
                schema(vec![namespace_param(), context_param()]),
            ),
            CliPassthrough::new(Binary::Kubectl, timeouts::READ_SECS, |input| {
                let mut args = vec!["get".to_string(), "pods".to_string(), "-o".to_string(), "json".to_string()];
                push_namespace(&mut args, input);
                push_context(&mut args, input);
                Ok(args)
            }),
        )
        .expect("analyze_pod_security registration");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers_ten_security_tools() {
        let mut registry = ToolRegistry::new();
        register(&mut registry);
        let tools: Vec<_> = registry
            .list()
            .into_iter()
            .filter(|d| matches!(d.category, ToolCategory::Security))
            .collect();
        assert_eq!(tools.len(), 10);
    }
}
