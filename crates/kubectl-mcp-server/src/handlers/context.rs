//! Shared context handed to every tool handler.

use std::sync::Arc;

use kubectl_mcp_k8s::{Provider, SubprocessRunner};

/// Everything a handler needs to reach the cluster. Handlers never read
/// kubeconfig or spawn processes directly — only through this context
/// (`spec.md` §4.8).
#[derive(Clone)]
pub struct HandlerContext {
    pub provider: Arc<Provider>,
    pub runner: Arc<SubprocessRunner>,
}

impl HandlerContext {
    pub fn new(provider: Arc<Provider>, runner: Arc<SubprocessRunner>) -> Self {
        Self { provider, runner }
    }
}

/// Pull a string field out of the bound input, falling back to a default.
pub fn str_field<'a>(input: &'a serde_json::Value, key: &str, default: &'a str) -> String {
    input.get(key).and_then(|v| v.as_str()).unwrap_or(default).to_string()
}

pub fn opt_str_field(input: &serde_json::Value, key: &str) -> Option<String> {
    input.get(key).and_then(|v| v.as_str()).map(str::to_string)
}

pub fn bool_field(input: &serde_json::Value, key: &str, default: bool) -> bool {
    input.get(key).and_then(|v| v.as_bool()).unwrap_or(default)
}

pub fn i64_field(input: &serde_json::Value, key: &str, default: i64) -> i64 {
    input.get(key).and_then(|v| v.as_i64()).unwrap_or(default)
}
