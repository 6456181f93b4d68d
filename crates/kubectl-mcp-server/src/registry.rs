//! In-memory tool registry (`spec.md` §4.5, C5).
//!
//! Populated once, in a fixed deterministic order, by the category
//! modules under `handlers::*`; read-only thereafter.

use std::sync::Arc;

use kubectl_mcp_protocol::{ToolAnnotations, ToolDescriptor};

use crate::handlers::ToolHandler;

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("tool '{0}' is already registered")]
    DuplicateName(String),

    #[error("tool '{0}' has an invalid annotation set: destructive tools cannot be read-only")]
    InvalidAnnotations(String),
}

pub struct RegistryEntry {
    pub descriptor: ToolDescriptor,
    pub handler: Arc<dyn ToolHandler>,
}

/// Build-time API (`spec.md` §4.5). Insertion order is preserved per
/// category so `list()` can present a stable category-then-name ordering
/// without an extra sort pass on every call.
#[derive(Default)]
pub struct ToolRegistry {
    entries: Vec<RegistryEntry>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// `register(ToolDescriptor)` — rejects duplicate names and
    /// descriptors violating the destructive/read-only invariant.
    pub fn register(
        &mut self,
        descriptor: ToolDescriptor,
        handler: impl ToolHandler + 'static,
    ) -> Result<(), RegistryError> {
        if !descriptor.annotations.is_valid() {
            return Err(RegistryError::InvalidAnnotations(descriptor.name));
        }
        if self.entries.iter().any(|e| e.descriptor.name == descriptor.name) {
            return Err(RegistryError::DuplicateName(descriptor.name));
        }
        self.entries.push(RegistryEntry { descriptor, handler: Arc::new(handler) });
        Ok(())
    }

    /// `list() → [ToolDescriptor]` — stable ordering by category then name.
    pub fn list(&self) -> Vec<&ToolDescriptor> {
        let mut out: Vec<&ToolDescriptor> = self.entries.iter().map(|e| &e.descriptor).collect();
        out.sort_by(|a, b| a.category.cmp(&b.category).then_with(|| a.name.cmp(&b.name)));
        out
    }

    /// `lookup(name) → ToolDescriptor|nil`.
    pub fn lookup(&self, name: &str) -> Option<&RegistryEntry> {
        self.entries.iter().find(|e| e.descriptor.name == name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn all_annotations(&self) -> Vec<(String, ToolAnnotations)> {
        self.entries
            .iter()
            .map(|e| (e.descriptor.name.clone(), e.descriptor.annotations.clone()))
            .collect()
    }

    /// Populate the registry in the fixed order required by `spec.md` §4.5,
    /// covering every category in `spec.md` §4.8.
    pub fn with_default_tools() -> Self {
        let mut registry = Self::new();
        crate::handlers::pods::register(&mut registry);
        crate::handlers::workloads::register(&mut registry);
        crate::handlers::core_resources::register(&mut registry);
        crate::handlers::cluster::register(&mut registry);
        crate::handlers::networking::register(&mut registry);
        crate::handlers::storage::register(&mut registry);
        crate::handlers::security::register(&mut registry);
        crate::handlers::helm::register(&mut registry);
        crate::handlers::operations::register(&mut registry);
        crate::handlers::diagnostics::register(&mut registry);
        crate::handlers::cost::register(&mut registry);
        crate::handlers::kind::register(&mut registry);
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_has_no_duplicate_names() {
        let registry = ToolRegistry::with_default_tools();
        let mut names: Vec<&str> = registry.list().iter().map(|d| d.name.as_str()).collect();
        let before = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(before, names.len(), "duplicate tool name registered");
    }

    #[test]
    fn default_registry_satisfies_annotation_invariant() {
        let registry = ToolRegistry::with_default_tools();
        for descriptor in registry.list() {
            assert!(
                descriptor.annotations.is_valid(),
                "tool '{}' violates destructive/read_only invariant",
                descriptor.name
            );
        }
    }

    #[test]
    fn default_registry_has_roughly_120_tools() {
        let registry = ToolRegistry::with_default_tools();
        assert!(
            registry.len() >= 100,
            "expected ~120 tools, found {}",
            registry.len()
        );
    }

    #[test]
    fn known_tools_are_present() {
        let registry = ToolRegistry::with_default_tools();
        assert!(registry.lookup("get_pods").is_some());
        assert!(registry.lookup("kind_detect_tool").is_some());
    }
}
