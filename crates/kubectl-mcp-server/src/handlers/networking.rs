//! Networking category (`spec.md` §4.8): services, endpoints, ingress,
//! port-forward, DNS check, service-chain trace, connectivity diagnosis,
//! network-policy analysis.

use crate::registry::ToolRegistry;

use super::{
    context_param, descriptor, namespace_param, push_context, push_namespace, require_str, schema,
    Binary, CliPassthrough,
};
use kubectl_mcp_k8s::process::timeouts;
use kubectl_mcp_protocol::{ParamSpec, ParamType, ToolCategory};

fn list_tool(registry: &mut ToolRegistry, name: &'static str, resource: &'static str, description: &str) {
    registry
        .register(
            descriptor(name, description, ToolCategory::Networking, true, false, schema(vec![namespace_param(), context_param()])),
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
    list_tool(registry, "get_services", "services", "List services");
    list_tool(registry, "get_endpoints", "endpoints", "List endpoints");
    list_tool(registry, "get_ingresses", "ingress", "List ingress resources");

    registry
        .register(
            descriptor(
                "port_forward",
                "Forward a local port to a pod or service port",
                ToolCategory::Networking,
                false,
                false,
                schema(vec![
                    ("target", ParamSpec::required(ParamType::String, "pod/<name> or svc/<name>")),
                    ("ports", ParamSpec::required(ParamType::String, "local:remote port mapping, e.g. 8080:80")),
                    namespace_param(),
                    context_param(),
                ]),
            ),
            CliPassthrough::new(Binary::Kubectl, timeouts::READ_SECS, |input| {
                let target = require_str(input, "target")?;
                let ports = require_str(input, "ports")?;
                let mut args = vec!["port-forward".to_string(), target.to_string(), ports.to_string()];
                push_namespace(&mut args, input);
                push_context(&mut args, input);
                Ok(args)
            }),
        )
        .expect("port_forward registration");

    registry
        .register(
            descriptor(
                "check_dns_resolution",
                "Run a DNS lookup from inside the cluster using a throwaway debug pod",
                ToolCategory::Networking,
                true,
                false,
                schema(vec![
                    ("hostname", ParamSpec::required(ParamType::String, "Hostname to resolve")),
                    namespace_param(),
                    context_param(),
                ]),
            ),
            CliPassthrough::new(Binary::Kubectl, timeouts::READ_SECS, |input| {
                let hostname = require_str(input, "hostname")?;
                let mut args = vec![
                    "run".into(), "dns-check-tmp".into(),
                    "--rm".into(), "-i".into(), "--restart=Never".into(),
                    "--image=busybox".into(), "--".into(),
                    "nslookup".into(), hostname.to_string(),
                ];
                push_namespace(&mut args, input);
                push_context(&mut args, input);
                Ok(args)
            }),
        )
        .expect("check_dns_resolution registration");

    registry
        .register(
            descriptor(
                "trace_service_chain",
                "Walk a service's selector down to its backing endpoints and pods",
                ToolCategory::Networking,
                true,
                false,
                schema(vec![
                    ("service_name", ParamSpec::required(ParamType::String, "Service name")),
                    namespace_param(),
                    context_param(),
                ]),
            ),
            CliPassthrough::new(Binary::Kubectl, timeouts::READ_SECS, |input| {
                let service = require_str(input, "service_name")?;
                let mut args = vec![
                    "get".into(), "endpoints".into(), service.to_string(),
                    "-o".into(), "json".into(),
                ];
                push_namespace(&mut args, input);
                push_context(&mut args, input);
                Ok(args)
            }),
        )
        .expect("trace_service_chain registration");

    registry
        .register(
            descriptor(
                "diagnose_connectivity",
                "Summarize likely causes for a pod-to-service connectivity failure",
                ToolCategory::Networking,
                true,
                false,
                schema(vec![
                    ("source_pod", ParamSpec::required(ParamType::String, "Pod initiating the connection")),
                    ("target", ParamSpec::required(ParamType::String, "host:port or service name being reached")),
                    namespace_param(),
                    context_param(),
                ]),
            ),
            CliPassthrough::new(Binary::Kubectl, timeouts::READ_SECS, |input| {
                let source_pod = require_str(input, "source_pod")?;
                let target = require_str(input, "target")?;
                let mut args = vec![
                    "exec".into(), source_pod.to_string(), "--".into(),
                    "wget".into(), "-q".into(), "-O-".into(), "--timeout=2".into(), target.to_string(),
                ];
                push_namespace(&mut args, input);
                push_context(&mut args, input);
                Ok(args)
            }),
        )
        .expect("diagnose_connectivity registration");

    registry
        .register(
            descriptor(
                "analyze_network_policies",
                "List network policies applying to a namespace and summarize their scope",
                ToolCategory::Networking,
                true,
                false,
                schema(vec![namespace_param(), context_param()]),
            ),
            CliPassthrough::new(Binary::Kubectl, timeouts::READ_SECS, |input| {
                let mut args = vec!["get".to_string(), "networkpolicies".to_string(), "-o".to_string(), "json".to_string()];
                push_namespace(&mut args, input);
                push_context(&mut args, input);
                Ok(args)
            }),
        )
        .expect("analyze_network_policies registration");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers_eight_networking_tools() {
        let mut registry = ToolRegistry::new();
        register(&mut registry);
        let tools: Vec<_> = registry
            .list()
            .into_iter()
            .filter(|d| matches!(d.category, ToolCategory::Networking))
            .collect();
        assert_eq!(tools.len(), 8);
    }
}
