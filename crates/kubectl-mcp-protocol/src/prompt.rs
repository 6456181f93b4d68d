//! Prompt catalog wire types (`spec.md` §3, §4.9).

use serde::{Deserialize, Serialize};

use crate::tool::InputSchema;

/// Static description of one prompt, as returned by `mcp.prompts.list`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptDescriptor {
    pub name: String,
    pub description: String,
    pub parameters: InputSchema,
}
