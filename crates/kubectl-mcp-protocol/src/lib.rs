//! Wire types for the kubectl MCP server.
//!
//! This crate is the single source of truth for everything that crosses
//! the JSON-RPC boundary: request/response envelopes, tool descriptors,
//! the `ToolResult` envelope, and the shared error-kind taxonomy. It has
//! no knowledge of Kubernetes, subprocesses, or transports — those live
//! in `kubectl-mcp-k8s` and `kubectl-mcp-server`.

pub mod error;
pub mod jsonrpc;
pub mod prompt;
pub mod tool;

pub use error::ErrorKind;
pub use jsonrpc::{JsonRpcIncoming, JsonRpcOutgoing, RequestId};
pub use prompt::PromptDescriptor;
pub use tool::{InputSchema, ParamSpec, ParamType, ToolAnnotations, ToolCategory, ToolDescriptor, ToolResult};
