//! Prompt catalog (`spec.md` §3, §4.9, C9): 8 parameterized Markdown
//! playbooks returned by name. The server renders the Markdown; it never
//! executes the steps itself — that's left to the MCP client driving the
//! tool calls the playbook names.

use std::collections::BTreeMap;

use kubectl_mcp_protocol::{InputSchema, ParamSpec, ParamType, PromptDescriptor};
use serde_json::Value;

use crate::binding;
use crate::error::{ServerError, ServerResult};

type Renderer = fn(&Value) -> String;

struct PromptEntry {
    descriptor: PromptDescriptor,
    render: Renderer,
}

/// Built once at startup alongside the tool registry; immutable
/// thereafter (`spec.md` §3 lifecycle summary).
pub struct PromptCatalog {
    entries: Vec<PromptEntry>,
}

impl PromptCatalog {
    pub fn list(&self) -> Vec<&PromptDescriptor> {
        self.entries.iter().map(|e| &e.descriptor).collect()
    }

    pub fn get(&self, name: &str, params: &Value) -> ServerResult<String> {
        let entry = self
            .entries
            .iter()
            .find(|e| e.descriptor.name == name)
            .ok_or_else(|| ServerError::PromptNotFound(name.to_string()))?;
        let bound = binding::bind(&entry.descriptor.parameters, params)
            .map_err(ServerError::InvalidParams)?;
        Ok((entry.render)(&bound))
    }

    pub fn with_default_prompts() -> Self {
        Self {
            entries: vec![
                entry("troubleshoot_workload", "Step through diagnosing a misbehaving workload", troubleshoot_workload_schema(), render_troubleshoot_workload),
                entry("deploy_application", "Plan and execute a new application rollout", deploy_application_schema(), render_deploy_application),
                entry("security_audit", "Audit RBAC, pod security, and secret hygiene across a namespace", namespace_scope_schema("all"), render_security_audit),
                entry("cost_optimization", "Find over-provisioned and idle workloads", namespace_scope_schema("all"), render_cost_optimization),
                entry("disaster_recovery", "Checklist for backing up and restoring cluster state", disaster_recovery_schema(), render_disaster_recovery),
                entry("debug_networking", "Trace connectivity to a service end to end", debug_networking_schema(), render_debug_networking),
                entry("scale_application", "Safely scale a workload to a target replica count", scale_application_schema(), render_scale_application),
                entry("upgrade_cluster", "Plan a cluster version upgrade", upgrade_cluster_schema(), render_upgrade_cluster),
            ],
        }
    }
}

fn entry(name: &str, description: &str, parameters: InputSchema, render: Renderer) -> PromptEntry {
    PromptEntry {
        descriptor: PromptDescriptor { name: name.to_string(), description: description.to_string(), parameters },
        render,
    }
}

fn schema(fields: Vec<(&str, ParamSpec)>) -> InputSchema {
    fields.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

fn namespace_scope_schema(default: &str) -> InputSchema {
    schema(vec![(
        "namespace",
        ParamSpec::optional(ParamType::String, Value::String(default.to_string()), "Namespace to scope the audit to, or 'all'"),
    )])
}

fn str_param(bound: &Value, key: &str) -> String {
    bound.get(key).and_then(Value::as_str).unwrap_or_default().to_string()
}

fn int_param(bound: &Value, key: &str) -> i64 {
    bound.get(key).and_then(Value::as_i64).unwrap_or_default()
}

// --- troubleshoot_workload(workload, namespace?) ---

fn troubleshoot_workload_schema() -> InputSchema {
    schema(vec![
        ("workload", ParamSpec::required(ParamType::String, "Name of the deployment/statefulset/pod to troubleshoot")),
        ("namespace", ParamSpec::optional(ParamType::String, Value::String(String::new()), "Namespace the workload lives in")),
    ])
}

fn render_troubleshoot_workload(bound: &Value) -> String {
    let workload = str_param(bound, "workload");
    let namespace = str_param(bound, "namespace");
    let ns_clause = if namespace.is_empty() { String::new() } else { format!(" `namespace=\"{namespace}\"`") };
    format!(
        r#"# Troubleshoot workload `{workload}`{ns_clause}

1. Confirm the workload exists and inspect its rollout state with `get_deployments` / `get_statefulsets` / `get_pods`.
2. Check for pods stuck pending with `detect_pending_pods`, and for crash-looping containers with `diagnose_crashloop`.
3. Pull recent events for the workload's pods with `get_pod_events`.
4. If a pod has restarted, compare `get_logs` against `get_previous_logs` for the crashed container.
5. Dump full pod conditions with `describe_pod_conditions` to see unready reasons (probes, scheduling, image pulls).
6. If pods were evicted, check `list_evicted_pods` for resource-pressure eviction.
7. Cross-check node health with `get_nodes` and `get_node_metrics` in case the issue is node-level, not workload-level.
8. Once resolved, consider `cleanup_failed_pods` to clear terminal pods left behind by the incident.
"#
    )
}

// --- deploy_application(app_name, namespace?, replicas?=3) ---

fn deploy_application_schema() -> InputSchema {
    schema(vec![
        ("app_name", ParamSpec::required(ParamType::String, "Name for the new deployment")),
        ("namespace", ParamSpec::optional(ParamType::String, Value::String(String::new()), "Target namespace")),
        ("replicas", ParamSpec::optional(ParamType::Integer, Value::from(3), "Initial replica count")),
    ])
}

fn render_deploy_application(bound: &Value) -> String {
    let app_name = str_param(bound, "app_name");
    let namespace = str_param(bound, "namespace");
    let replicas = int_param(bound, "replicas");
    let ns_clause = if namespace.is_empty() { "the current default namespace".to_string() } else { format!("namespace `{namespace}`") };
    format!(
        r#"# Deploy `{app_name}`

Target: {ns_clause}, starting at {replicas} replica(s).

1. Verify the target namespace exists with `get_namespaces`, creating it via `create_resource` if needed.
2. Create the deployment with `create_deployment` (`replicas={replicas}`).
3. Watch the rollout with `rollout_status`, and confirm pods come up with `get_pods`.
4. Expose the workload if it needs traffic: check `get_services` / `get_ingresses` or create them with `apply_manifest`.
5. Validate health with `health_check_pod` and tail startup logs with `get_logs`.
6. If something fails partway, `rollout_status` plus `diagnose_crashloop` will usually explain why before you `scale_deployment` or `restart_deployment` to recover.
"#
    )
}

// --- security_audit(namespace?=all) ---

fn render_security_audit(bound: &Value) -> String {
    let namespace = str_param(bound, "namespace");
    format!(
        r#"# Security audit (namespace: `{namespace}`)

1. Enumerate RBAC with `get_rbac_roles`, `get_cluster_roles`, and `get_service_accounts`; flag any binding to `cluster-admin` for `audit_rbac`.
2. Run `audit_rbac` for a structured over-privilege report.
3. Inspect `get_pod_security_policies` / `analyze_pod_security` for containers running privileged, as root, or without a read-only root filesystem.
4. Check `get_admission_webhooks` to confirm mutating/validating webhooks are the ones you expect.
5. Run `audit_secrets` to find secrets with broad RBAC exposure; remember every value returned anywhere in this session is already masked.
6. Review `get_crds` for controllers with cluster-wide reach that weren't part of the original threat model.
7. Check `get_priority_classes` for workloads that could starve system-critical pods.
"#
    )
}

// --- cost_optimization(namespace?=all) ---

fn render_cost_optimization(bound: &Value) -> String {
    let namespace = str_param(bound, "namespace");
    format!(
        r#"# Cost optimization (namespace: `{namespace}`)

1. Get a baseline with `get_resource_usage` and `get_namespace_allocation`.
2. Find idle workloads with `detect_idle_resources` and over-provisioned ones with `detect_overprovisioned_resources`.
3. Run `recommend_resource_requests` and `optimize_resource_requests` for concrete request/limit deltas.
4. Check `get_quota_usage` so any reduction still leaves headroom under the namespace's `ResourceQuota`.
5. Use `analyze_cost` for a namespace-level cost proxy and `get_cost_trends` to see whether usage is trending up or down before committing to a change.
6. Apply changes with `patch_resource`, then re-run `get_resource_usage` to confirm the adjustment didn't starve the workload.
"#
    )
}

// --- disaster_recovery(scope?=cluster) ---

fn disaster_recovery_schema() -> InputSchema {
    schema(vec![(
        "scope",
        ParamSpec::optional(ParamType::String, Value::String("cluster".to_string()), "Recovery scope: 'cluster' or a namespace name"),
    )])
}

fn render_disaster_recovery(bound: &Value) -> String {
    let scope = str_param(bound, "scope");
    format!(
        r#"# Disaster recovery checklist (scope: `{scope}`)

1. Snapshot current state with `backup_resource` for every critical resource kind in scope (deployments, configmaps, secrets, PVCs).
2. Record the current Helm release set with `helm_list_releases` and `helm_get_all` for each release so charts can be reinstalled at the same revision.
3. Confirm `get_persistent_volumes` / `get_persistent_volume_claims` bindings so storage can be re-attached after restore.
4. Capture RBAC and namespace topology with `get_rbac_roles`, `get_service_accounts`, and `get_namespaces`.
5. To restore: recreate namespaces, `helm_install`/`helm_upgrade` releases back to the recorded chart+values, then `apply_manifest` any resources not owned by Helm.
6. Verify with `get_pods`, `rollout_status`, and `check_cluster_health` before declaring recovery complete.
"#
    )
}

// --- debug_networking(service_name, namespace?) ---

fn debug_networking_schema() -> InputSchema {
    schema(vec![
        ("service_name", ParamSpec::required(ParamType::String, "Service to trace connectivity to")),
        ("namespace", ParamSpec::optional(ParamType::String, Value::String(String::new()), "Namespace the service lives in")),
    ])
}

fn render_debug_networking(bound: &Value) -> String {
    let service_name = str_param(bound, "service_name");
    let namespace = str_param(bound, "namespace");
    format!(
        r#"# Debug networking to `{service_name}` (namespace: `{namespace}`)

1. Confirm the service and its endpoints exist with `get_services` and `get_endpoints` — no endpoints means the selector doesn't match any ready pod.
2. Check DNS resolution from inside the cluster with `check_dns_resolution`.
3. Trace the full service chain (ingress → service → pod) with `trace_service_chain`.
4. Run `diagnose_connectivity` for a pod-to-service reachability probe.
5. Review `analyze_network_policies` in case a `NetworkPolicy` is silently dropping the traffic.
6. If the service fronts an `Ingress`, check `get_ingresses` for host/path rules and TLS configuration.
7. As a last resort, `port_forward` directly to a backing pod to isolate whether the problem is the service layer or the application itself.
"#
    )
}

// --- scale_application(app_name, target_replicas) ---

fn scale_application_schema() -> InputSchema {
    schema(vec![
        ("app_name", ParamSpec::required(ParamType::String, "Deployment to scale")),
        ("target_replicas", ParamSpec::required(ParamType::Integer, "Desired replica count")),
    ])
}

fn render_scale_application(bound: &Value) -> String {
    let app_name = str_param(bound, "app_name");
    let target_replicas = int_param(bound, "target_replicas");
    format!(
        r#"# Scale `{app_name}` to {target_replicas} replicas

1. Check current state with `get_deployments` and `get_hpas` — if an `HorizontalPodAutoscaler` targets this deployment, a manual scale will be overridden on its next reconcile.
2. Confirm headroom with `get_quota_usage` and `get_resource_usage` before scaling up.
3. Apply the change with `scale_deployment` (`replicas={target_replicas}`).
4. Watch the rollout with `rollout_status` and `get_pods` until all replicas are ready.
5. If scaling down, check `get_pdbs` first so the `PodDisruptionBudget` doesn't block the eviction of surplus pods.
"#
    )
}

// --- upgrade_cluster(current_version, target_version) ---

fn upgrade_cluster_schema() -> InputSchema {
    schema(vec![
        ("current_version", ParamSpec::required(ParamType::String, "Current cluster version")),
        ("target_version", ParamSpec::required(ParamType::String, "Target cluster version")),
    ])
}

fn render_upgrade_cluster(bound: &Value) -> String {
    let current_version = str_param(bound, "current_version");
    let target_version = str_param(bound, "target_version");
    format!(
        r#"# Upgrade cluster from `{current_version}` to `{target_version}`

1. Confirm the current version with `get_cluster_version` and cross-check every node's kubelet version with `get_nodes`.
2. Review `get_api_resources` for API versions that are deprecated or removed between `{current_version}` and `{target_version}`.
3. Back up critical state first — follow the `disaster_recovery` playbook before touching the control plane.
4. For a `kind` cluster used in CI, stage the new node image with `kind_build_node_image_tool` and validate with `kind_create_cluster_tool` on a throwaway cluster before touching anything long-lived.
5. After the control plane is upgraded, roll nodes one at a time, re-running `check_cluster_health` and `get_nodes` between each.
6. Re-run `helm_list_releases` and `get_crds` afterward to confirm installed charts and CRDs are still compatible with `{target_version}`.
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn catalog_has_eight_prompts() {
        let catalog = PromptCatalog::with_default_prompts();
        assert_eq!(catalog.list().len(), 8);
    }

    #[test]
    fn troubleshoot_workload_requires_workload_param() {
        let catalog = PromptCatalog::with_default_prompts();
        assert!(catalog.get("troubleshoot_workload", &json!({})).is_err());
        let rendered = catalog.get("troubleshoot_workload", &json!({ "workload": "api" })).unwrap();
        assert!(rendered.contains("api"));
    }

    #[test]
    fn security_audit_defaults_namespace_to_all() {
        let catalog = PromptCatalog::with_default_prompts();
        let rendered = catalog.get("security_audit", &json!({})).unwrap();
        assert!(rendered.contains("all"));
    }

    #[test]
    fn unknown_prompt_is_an_error() {
        let catalog = PromptCatalog::with_default_prompts();
        assert!(catalog.get("no_such_prompt", &json!({})).is_err());
    }

    #[test]
    fn scale_application_requires_both_params() {
        let catalog = PromptCatalog::with_default_prompts();
        assert!(catalog.get("scale_application", &json!({ "app_name": "api" })).is_err());
        let rendered = catalog
            .get("scale_application", &json!({ "app_name": "api", "target_replicas": 5 }))
            .unwrap();
        assert!(rendered.contains("5 replicas"));
    }
}
