//! Process-wide safety/authorization gate (`spec.md` §4.1, C1).
//!
//! Mirrors the teacher's read-mostly config pattern
//! (`crates/turbomcp-server/src/config.rs::ServerConfig`) rather than the
//! source's module-global safety flag (`spec.md` §9): one `SafetyPolicy`
//! is owned by the `Server` and handed to the dispatcher.

use std::sync::atomic::{AtomicU8, Ordering};

use kubectl_mcp_protocol::ToolAnnotations;
use serde::{Deserialize, Serialize};

/// Process-wide mode (`spec.md` §3). Mutually exclusive per the source's
/// behavior (Open Question in `spec.md` §9 resolved: `normal`,
/// `read_only`, and `disable_destructive` never co-exist).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SafetyMode {
    Normal,
    ReadOnly,
    DisableDestructive,
}

impl SafetyMode {
    fn as_u8(self) -> u8 {
        match self {
            Self::Normal => 0,
            Self::ReadOnly => 1,
            Self::DisableDestructive => 2,
        }
    }

    fn from_u8(v: u8) -> Self {
        match v {
            1 => Self::ReadOnly,
            2 => Self::DisableDestructive,
            _ => Self::Normal,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Normal => "all operations permitted",
            Self::ReadOnly => "only read-only tools may be called",
            Self::DisableDestructive => "destructive tools are blocked; writes are otherwise permitted",
        }
    }
}

/// `is_blocked(tool_name) → bool` realized as a pure function over
/// annotations, so the gate and the registry can't disagree about what a
/// tool is (`spec.md` §4.1).
fn mode_blocks(mode: SafetyMode, annotations: &ToolAnnotations) -> bool {
    match mode {
        SafetyMode::Normal => false,
        SafetyMode::DisableDestructive => annotations.destructive,
        SafetyMode::ReadOnly => !annotations.read_only,
    }
}

/// Set once at startup; mutable only through an explicit admin operation.
pub struct SafetyPolicy {
    mode: AtomicU8,
}

impl SafetyPolicy {
    pub fn new(mode: SafetyMode) -> Self {
        Self { mode: AtomicU8::new(mode.as_u8()) }
    }

    pub fn mode(&self) -> SafetyMode {
        SafetyMode::from_u8(self.mode.load(Ordering::Acquire))
    }

    pub fn set_mode(&self, mode: SafetyMode) {
        self.mode.store(mode.as_u8(), Ordering::Release);
    }

    pub fn is_blocked(&self, annotations: &ToolAnnotations) -> bool {
        mode_blocks(self.mode(), annotations)
    }

    /// `mode_info() → {mode, description, blocked_operations:[name,…]}`.
    pub fn mode_info(&self, all_tools: &[(String, ToolAnnotations)]) -> ModeInfo {
        let mode = self.mode();
        let blocked_operations = all_tools
            .iter()
            .filter(|(_, a)| mode_blocks(mode, a))
            .map(|(name, _)| name.clone())
            .collect();
        ModeInfo { mode, description: mode.description().to_string(), blocked_operations }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ModeInfo {
    pub mode: SafetyMode,
    pub description: String,
    pub blocked_operations: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn annotations(read_only: bool, destructive: bool) -> ToolAnnotations {
        ToolAnnotations { title: "t".into(), read_only, destructive }
    }

    #[test]
    fn normal_mode_blocks_nothing() {
        let p = SafetyPolicy::new(SafetyMode::Normal);
        assert!(!p.is_blocked(&annotations(false, true)));
        assert!(!p.is_blocked(&annotations(true, false)));
    }

    #[test]
    fn read_only_mode_blocks_iff_not_read_only() {
        let p = SafetyPolicy::new(SafetyMode::ReadOnly);
        assert!(!p.is_blocked(&annotations(true, false)));
        assert!(p.is_blocked(&annotations(false, false)));
        assert!(p.is_blocked(&annotations(false, true)));
    }

    #[test]
    fn disable_destructive_mode_blocks_iff_destructive() {
        let p = SafetyPolicy::new(SafetyMode::DisableDestructive);
        assert!(!p.is_blocked(&annotations(false, false)));
        assert!(p.is_blocked(&annotations(false, true)));
    }

    #[test]
    fn set_mode_takes_effect_immediately() {
        let p = SafetyPolicy::new(SafetyMode::Normal);
        p.set_mode(SafetyMode::ReadOnly);
        assert!(p.is_blocked(&annotations(false, false)));
    }
}
