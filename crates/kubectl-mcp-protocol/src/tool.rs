//! Tool descriptors and the uniform result envelope (`spec.md` §3, §4.5).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ErrorKind;

/// One parameter in a tool's input schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamSpec {
    #[serde(rename = "type")]
    pub ty: ParamType,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    pub description: String,
}

impl ParamSpec {
    pub fn required(ty: ParamType, description: impl Into<String>) -> Self {
        Self { ty, required: true, default: None, description: description.into() }
    }

    pub fn optional(ty: ParamType, default: Value, description: impl Into<String>) -> Self {
        Self { ty, required: false, default: Some(default), description: description.into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamType {
    String,
    Integer,
    Boolean,
    Object,
    Array,
}

/// `mapping from parameter name to {type, required?, default, description}` (`spec.md` §3).
pub type InputSchema = BTreeMap<String, ParamSpec>;

/// `{read_only, destructive, title}` plus the category used for discovery
/// grouping (`spec.md` §3, §4.5).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolAnnotations {
    pub title: String,
    #[serde(rename = "readOnlyHint")]
    pub read_only: bool,
    #[serde(rename = "destructiveHint")]
    pub destructive: bool,
}

impl ToolAnnotations {
    /// `destructive ⇒ ¬read_only` (`spec.md` §3 invariant).
    pub fn is_valid(&self) -> bool {
        !(self.destructive && self.read_only)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolCategory {
    Pods,
    Deployments,
    Core,
    Cluster,
    Networking,
    Storage,
    Security,
    Helm,
    Operations,
    Diagnostics,
    Cost,
    Kind,
    Prompt,
}

impl ToolCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pods => "pods",
            Self::Deployments => "deployments",
            Self::Core => "core",
            Self::Cluster => "cluster",
            Self::Networking => "networking",
            Self::Storage => "storage",
            Self::Security => "security",
            Self::Helm => "helm",
            Self::Operations => "operations",
            Self::Diagnostics => "diagnostics",
            Self::Cost => "cost",
            Self::Kind => "kind",
            Self::Prompt => "prompt",
        }
    }
}

/// Static metadata for one exposed operation. The `handler` field lives
/// outside this struct (in the registry entry) so `ToolDescriptor` stays
/// `Serialize` for the `tools.list` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub input_schema: InputSchema,
    pub annotations: ToolAnnotations,
    pub category: ToolCategory,
}

/// The uniform envelope every handler returns (`spec.md` §3). Exactly one
/// of `result`/`error` is populated — enforced by the constructors, not
/// by the type (the wire shape needs both fields optional so a single
/// struct round-trips through JSON-RPC `result`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "error_kind")]
    pub error_kind: Option<ErrorKind>,
}

impl ToolResult {
    pub fn ok(result: Value) -> Self {
        Self { success: true, result: Some(result), command: None, error: None, error_kind: None }
    }

    pub fn ok_with_command(result: Value, command: impl Into<String>) -> Self {
        Self {
            success: true,
            result: Some(result),
            command: Some(command.into()),
            error: None,
            error_kind: None,
        }
    }

    pub fn err(error: impl Into<String>, kind: ErrorKind) -> Self {
        Self {
            success: false,
            result: None,
            command: None,
            error: Some(error.into()),
            error_kind: Some(kind),
        }
    }

    pub fn blocked(mode: &str) -> Self {
        Self::err(format!("Blocked: {mode}"), ErrorKind::Policy)
    }

    /// Invariant from `spec.md` §8: exactly one of `result`/`error` populated.
    pub fn is_well_formed(&self) -> bool {
        self.result.is_some() != self.error.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn destructive_and_read_only_is_invalid() {
        let bad = ToolAnnotations { title: "x".into(), read_only: true, destructive: true };
        assert!(!bad.is_valid());
    }

    #[test]
    fn tool_result_variants_are_well_formed() {
        assert!(ToolResult::ok(Value::Null).is_well_formed());
        assert!(ToolResult::err("boom", ErrorKind::Internal).is_well_formed());
    }
}
