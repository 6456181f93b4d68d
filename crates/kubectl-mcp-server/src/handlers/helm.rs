//! Helm category (`spec.md` §4.8) — the largest category: release
//! inspection, repo management, install/upgrade/uninstall/rollback,
//! templating, chart authoring, dependency management, version/env.

use serde_json::json;

use crate::registry::ToolRegistry;

use super::{context_param, descriptor, namespace_param, push_context, push_namespace, require_str, schema, Binary, CliPassthrough};
use kubectl_mcp_k8s::process::timeouts;
use kubectl_mcp_protocol::{ParamSpec, ParamType, ToolCategory};

fn release_param() -> (&'static str, ParamSpec) {
    ("release_name", ParamSpec::required(ParamType::String, "Helm release name"))
}

fn chart_param() -> (&'static str, ParamSpec) {
    ("chart", ParamSpec::required(ParamType::String, "Chart reference, e.g. repo/name or a local path"))
}

/// Registers a read-only `helm get <sub> <release_name>` tool.
fn get_subcommand_tool(registry: &mut ToolRegistry, name: &'static str, sub: &'static str, description: &str) {
    registry
        .register(
            descriptor(name, description, ToolCategory::Helm, true, false, schema(vec![release_param(), namespace_param(), context_param()])),
            CliPassthrough::new(Binary::Helm, timeouts::READ_SECS, move |input| {
                let release = require_str(input, "release_name")?;
                let mut args = vec!["get".to_string(), sub.to_string(), release.to_string()];
                push_namespace(&mut args, input);
                push_context(&mut args, input);
                Ok(args)
            }),
        )
        .unwrap_or_else(|e| panic!("{name} registration: {e}"));
}

/// Registers a read-only `helm show <sub> <chart>` tool.
fn show_subcommand_tool(registry: &mut ToolRegistry, name: &'static str, sub: &'static str, description: &str) {
    registry
        .register(
            descriptor(name, description, ToolCategory::Helm, true, false, schema(vec![chart_param()])),
            CliPassthrough::new(Binary::Helm, timeouts::READ_SECS, move |input| {
                let chart = require_str(input, "chart")?;
                Ok(vec!["show".to_string(), sub.to_string(), chart.to_string()])
            }),
        )
        .unwrap_or_else(|e| panic!("{name} registration: {e}"));
}

pub fn register(registry: &mut ToolRegistry) {
    registry
        .register(
            descriptor("helm_list_releases", "List installed Helm releases", ToolCategory::Helm, true, false, schema(vec![namespace_param(), context_param()])),
            CliPassthrough::new(Binary::Helm, timeouts::READ_SECS, |input| {
                let mut args = vec!["list".to_string(), "-o".to_string(), "json".to_string()];
                push_namespace(&mut args, input);
                push_context(&mut args, input);
                Ok(args)
            }),
        )
        .expect("helm_list_releases registration");

    registry
        .register(
            descriptor("helm_release_status", "Show the status of a release", ToolCategory::Helm, true, false, schema(vec![release_param(), namespace_param(), context_param()])),
            CliPassthrough::new(Binary::Helm, timeouts::READ_SECS, |input| {
                let release = require_str(input, "release_name")?;
                let mut args = vec!["status".to_string(), release.to_string(), "-o".to_string(), "json".to_string()];
                push_namespace(&mut args, input);
                push_context(&mut args, input);
                Ok(args)
            }),
        )
        .expect("helm_release_status registration");

    registry
        .register(
            descriptor("helm_release_history", "Show a release's revision history", ToolCategory::Helm, true, false, schema(vec![release_param(), namespace_param(), context_param()])),
            CliPassthrough::new(Binary::Helm, timeouts::READ_SECS, |input| {
                let release = require_str(input, "release_name")?;
                let mut args = vec!["history".to_string(), release.to_string(), "-o".to_string(), "json".to_string()];
                push_namespace(&mut args, input);
                push_context(&mut args, input);
                Ok(args)
            }),
        )
        .expect("helm_release_history registration");

    get_subcommand_tool(registry, "helm_get_values", "values", "Get the computed values of a release");
    get_subcommand_tool(registry, "helm_get_manifest", "manifest", "Get the rendered manifest of a release");
    get_subcommand_tool(registry, "helm_get_notes", "notes", "Get the NOTES.txt output of a release");
    get_subcommand_tool(registry, "helm_get_hooks", "hooks", "Get the hook manifests of a release");
    get_subcommand_tool(registry, "helm_get_all", "all", "Get all information about a release");

    show_subcommand_tool(registry, "helm_show_chart", "chart", "Show a chart's Chart.yaml");
    show_subcommand_tool(registry, "helm_show_values", "values", "Show a chart's default values.yaml");
    show_subcommand_tool(registry, "helm_show_readme", "readme", "Show a chart's README");
    show_subcommand_tool(registry, "helm_show_crds", "crds", "Show a chart's bundled CRDs");
    show_subcommand_tool(registry, "helm_show_all", "all", "Show all information about a chart");

    registry
        .register(
            descriptor(
                "helm_search_repo",
                "Search added repos for a chart",
                ToolCategory::Helm,
                true,
                false,
                schema(vec![("keyword", ParamSpec::required(ParamType::String, "Search term"))]),
            ),
            CliPassthrough::new(Binary::Helm, timeouts::READ_SECS, |input| {
                let keyword = require_str(input, "keyword")?;
                Ok(vec!["search".to_string(), "repo".to_string(), keyword.to_string(), "-o".to_string(), "json".to_string()])
            }),
        )
        .expect("helm_search_repo registration");

    registry
        .register(
            descriptor(
                "helm_search_hub",
                "Search Artifact Hub for a chart",
                ToolCategory::Helm,
                true,
                false,
                schema(vec![("keyword", ParamSpec::required(ParamType::String, "Search term"))]),
            ),
            CliPassthrough::new(Binary::Helm, timeouts::READ_SECS, |input| {
                let keyword = require_str(input, "keyword")?;
                Ok(vec!["search".to_string(), "hub".to_string(), keyword.to_string(), "-o".to_string(), "json".to_string()])
            }),
        )
        .expect("helm_search_hub registration");

    registry
        .register(
            descriptor(
                "helm_repo_add",
                "Add a chart repository",
                ToolCategory::Helm,
                false,
                false,
                schema(vec![
                    ("repo_name", ParamSpec::required(ParamType::String, "Local name for the repo")),
                    ("url", ParamSpec::required(ParamType::String, "Repo URL")),
                ]),
            ),
            CliPassthrough::new(Binary::Helm, timeouts::MUTATE_SECS, |input| {
                let repo_name = require_str(input, "repo_name")?;
                let url = require_str(input, "url")?;
                Ok(vec!["repo".to_string(), "add".to_string(), repo_name.to_string(), url.to_string()])
            }),
        )
        .expect("helm_repo_add registration");

    registry
        .register(
            descriptor(
                "helm_repo_remove",
                "Remove a chart repository",
                ToolCategory::Helm,
                false,
                false,
                schema(vec![("repo_name", ParamSpec::required(ParamType::String, "Repo name to remove"))]),
            ),
            CliPassthrough::new(Binary::Helm, timeouts::MUTATE_SECS, |input| {
                let repo_name = require_str(input, "repo_name")?;
                Ok(vec!["repo".to_string(), "remove".to_string(), repo_name.to_string()])
            }),
        )
        .expect("helm_repo_remove registration");

    registry
        .register(
            descriptor("helm_repo_list", "List added chart repositories", ToolCategory::Helm, true, false, schema(vec![])),
            CliPassthrough::new(Binary::Helm, timeouts::READ_SECS, |_input| Ok(vec!["repo".to_string(), "list".to_string(), "-o".to_string(), "json".to_string()])),
        )
        .expect("helm_repo_list registration");

    registry
        .register(
            descriptor("helm_repo_update", "Refresh local chart repo indexes", ToolCategory::Helm, false, false, schema(vec![])),
            CliPassthrough::new(Binary::Helm, timeouts::MUTATE_SECS, |_input| Ok(vec!["repo".to_string(), "update".to_string()])),
        )
        .expect("helm_repo_update registration");

    registry
        .register(
            descriptor(
                "helm_install",
                "Install a chart as a new release",
                ToolCategory::Helm,
                false,
                false,
                schema(vec![
                    release_param(),
                    chart_param(),
                    ("values_file", ParamSpec::optional(ParamType::String, json!(""), "Path to a values file")),
                    namespace_param(),
                    context_param(),
                ]),
            ),
            CliPassthrough::new(Binary::Helm, timeouts::MUTATE_SECS, |input| {
                let release = require_str(input, "release_name")?;
                let chart = require_str(input, "chart")?;
                let mut args = vec!["install".to_string(), release.to_string(), chart.to_string()];
                if let Some(f) = input.get("values_file").and_then(serde_json::Value::as_str).filter(|s| !s.is_empty()) {
                    args.push("-f".into());
                    args.push(f.to_string());
                }
                push_namespace(&mut args, input);
                push_context(&mut args, input);
                Ok(args)
            }),
        )
        .expect("helm_install registration");

    registry
        .register(
            descriptor(
                "helm_upgrade",
                "Upgrade an existing release, installing it if absent",
                ToolCategory::Helm,
                false,
                false,
                schema(vec![
                    release_param(),
                    chart_param(),
                    ("values_file", ParamSpec::optional(ParamType::String, json!(""), "Path to a values file")),
                    ("install", ParamSpec::optional(ParamType::Boolean, json!(true), "Install the release if it does not already exist")),
                    namespace_param(),
                    context_param(),
                ]),
            ),
            CliPassthrough::new(Binary::Helm, timeouts::MUTATE_SECS, |input| {
                let release = require_str(input, "release_name")?;
                let chart = require_str(input, "chart")?;
                let mut args = vec!["upgrade".to_string(), release.to_string(), chart.to_string()];
                if input.get("install").and_then(serde_json::Value::as_bool).unwrap_or(true) {
                    args.push("--install".into());
                }
                if let Some(f) = input.get("values_file").and_then(serde_json::Value::as_str).filter(|s| !s.is_empty()) {
                    args.push("-f".into());
                    args.push(f.to_string());
                }
                push_namespace(&mut args, input);
                push_context(&mut args, input);
                Ok(args)
            }),
        )
        .expect("helm_upgrade registration");

    registry
        .register(
            descriptor("helm_uninstall", "Uninstall a release", ToolCategory::Helm, false, true, schema(vec![release_param(), namespace_param(), context_param()])),
            CliPassthrough::new(Binary::Helm, timeouts::MUTATE_SECS, |input| {
                let release = require_str(input, "release_name")?;
                let mut args = vec!["uninstall".to_string(), release.to_string()];
                push_namespace(&mut args, input);
                push_context(&mut args, input);
                Ok(args)
            }),
        )
        .expect("helm_uninstall registration");

    registry
        .register(
            descriptor(
                "helm_rollback",
                "Roll a release back to a prior revision",
                ToolCategory::Helm,
                false,
                false,
                schema(vec![
                    release_param(),
                    ("revision", ParamSpec::required(ParamType::Integer, "Revision number to roll back to")),
                    namespace_param(),
                    context_param(),
                ]),
            ),
            CliPassthrough::new(Binary::Helm, timeouts::MUTATE_SECS, |input| {
                let release = require_str(input, "release_name")?;
                let revision = input
                    .get("revision")
                    .and_then(serde_json::Value::as_i64)
                    .ok_or_else(|| crate::error::ServerError::InvalidParams("missing required parameter 'revision'".into()))?;
                let mut args = vec!["rollback".to_string(), release.to_string(), revision.to_string()];
                push_namespace(&mut args, input);
                push_context(&mut args, input);
                Ok(args)
            }),
        )
        .expect("helm_rollback registration");

    registry
        .register(
            descriptor("helm_test", "Run a release's Helm test hooks", ToolCategory::Helm, false, false, schema(vec![release_param(), namespace_param(), context_param()])),
            CliPassthrough::new(Binary::Helm, timeouts::MUTATE_SECS, |input| {
                let release = require_str(input, "release_name")?;
                let mut args = vec!["test".to_string(), release.to_string()];
                push_namespace(&mut args, input);
                push_context(&mut args, input);
                Ok(args)
            }),
        )
        .expect("helm_test registration");

    registry
        .register(
            descriptor(
                "helm_template",
                "Render a chart's manifests locally without installing",
                ToolCategory::Helm,
                true,
                false,
                schema(vec![
                    release_param(),
                    chart_param(),
                    ("values_file", ParamSpec::optional(ParamType::String, json!(""), "Path to a values file")),
                    namespace_param(),
                ]),
            ),
            CliPassthrough::new(Binary::Helm, timeouts::READ_SECS, |input| {
                let release = require_str(input, "release_name")?;
                let chart = require_str(input, "chart")?;
                let mut args = vec!["template".to_string(), release.to_string(), chart.to_string()];
                if let Some(f) = input.get("values_file").and_then(serde_json::Value::as_str).filter(|s| !s.is_empty()) {
                    args.push("-f".into());
                    args.push(f.to_string());
                }
                push_namespace(&mut args, input);
                Ok(args)
            }),
        )
        .expect("helm_template registration");

    registry
        .register(
            descriptor(
                "helm_template_apply",
                "Render a chart and apply the result with kubectl",
                ToolCategory::Helm,
                false,
                false,
                schema(vec![release_param(), chart_param(), namespace_param(), context_param()]),
            ),
            CliPassthrough::new(Binary::Helm, timeouts::MUTATE_SECS, |input| {
                let release = require_str(input, "release_name")?;
                let chart = require_str(input, "chart")?;
                // `helm template | kubectl apply -f -` isn't representable as a
                // single argv; `upgrade --install` achieves the same effect
                // through Helm's own apply logic instead of a shell pipeline.
                let mut args = vec!["upgrade".to_string(), "--install".to_string(), release.to_string(), chart.to_string()];
                push_namespace(&mut args, input);
                push_context(&mut args, input);
                Ok(args)
            }),
        )
        .expect("helm_template_apply registration");

    registry
        .register(
            descriptor(
                "helm_create",
                "Scaffold a new chart directory",
                ToolCategory::Helm,
                false,
                false,
                schema(vec![("name", ParamSpec::required(ParamType::String, "New chart name"))]),
            ),
            CliPassthrough::new(Binary::Helm, timeouts::MUTATE_SECS, |input| {
                let name = require_str(input, "name")?;
                Ok(vec!["create".to_string(), name.to_string()])
            }),
        )
        .expect("helm_create registration");

    registry
        .register(
            descriptor("helm_lint", "Lint a chart for common mistakes", ToolCategory::Helm, true, false, schema(vec![chart_param()])),
            CliPassthrough::new(Binary::Helm, timeouts::READ_SECS, |input| {
                let chart = require_str(input, "chart")?;
                Ok(vec!["lint".to_string(), chart.to_string()])
            }),
        )
        .expect("helm_lint registration");

    registry
        .register(
            descriptor("helm_package", "Package a chart directory into a .tgz archive", ToolCategory::Helm, false, false, schema(vec![chart_param()])),
            CliPassthrough::new(Binary::Helm, timeouts::MUTATE_SECS, |input| {
                let chart = require_str(input, "chart")?;
                Ok(vec!["package".to_string(), chart.to_string()])
            }),
        )
        .expect("helm_package registration");

    registry
        .register(
            descriptor("helm_pull", "Download a chart from a repo without installing it", ToolCategory::Helm, false, false, schema(vec![chart_param()])),
            CliPassthrough::new(Binary::Helm, timeouts::MUTATE_SECS, |input| {
                let chart = require_str(input, "chart")?;
                Ok(vec!["pull".to_string(), chart.to_string()])
            }),
        )
        .expect("helm_pull registration");

    registry
        .register(
            descriptor("helm_dependency_list", "List a chart's dependencies", ToolCategory::Helm, true, false, schema(vec![chart_param()])),
            CliPassthrough::new(Binary::Helm, timeouts::READ_SECS, |input| {
                let chart = require_str(input, "chart")?;
                Ok(vec!["dependency".to_string(), "list".to_string(), chart.to_string()])
            }),
        )
        .expect("helm_dependency_list registration");

    registry
        .register(
            descriptor("helm_dependency_update", "Download a chart's missing dependencies", ToolCategory::Helm, false, false, schema(vec![chart_param()])),
            CliPassthrough::new(Binary::Helm, timeouts::MUTATE_SECS, |input| {
                let chart = require_str(input, "chart")?;
                Ok(vec!["dependency".to_string(), "update".to_string(), chart.to_string()])
            }),
        )
        .expect("helm_dependency_update registration");

    registry
        .register(
            descriptor("helm_dependency_build", "Rebuild a chart's dependencies from Chart.lock", ToolCategory::Helm, false, false, schema(vec![chart_param()])),
            CliPassthrough::new(Binary::Helm, timeouts::MUTATE_SECS, |input| {
                let chart = require_str(input, "chart")?;
                Ok(vec!["dependency".to_string(), "build".to_string(), chart.to_string()])
            }),
        )
        .expect("helm_dependency_build registration");

    registry
        .register(
            descriptor("helm_version", "Print the Helm client version", ToolCategory::Helm, true, false, schema(vec![])),
            CliPassthrough::new(Binary::Helm, timeouts::READ_SECS, |_input| Ok(vec!["version".to_string(), "--short".to_string()])),
        )
        .expect("helm_version registration");

    registry
        .register(
            descriptor("helm_env", "Print Helm's resolved environment configuration", ToolCategory::Helm, true, false, schema(vec![])),
            CliPassthrough::new(Binary::Helm, timeouts::READ_SECS, |_input| Ok(vec!["env".to_string()])),
        )
        .expect("helm_env registration");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers_thirty_five_helm_tools() {
        let mut registry = ToolRegistry::new();
        register(&mut registry);
        let tools: Vec<_> = registry
            .list()
            .into_iter()
            .filter(|d| matches!(d.category, ToolCategory::Helm))
            .collect();
        assert_eq!(tools.len(), 35);
    }
}
