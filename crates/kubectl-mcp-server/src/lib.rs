//! kubectl MCP server library: the tool registry, safety gate, secret
//! masker, prompt catalog, request dispatcher, and transports that
//! `kubectl-mcp-cli` wires together into a running process.

pub mod binding;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod handlers;
pub mod masker;
pub mod prompts;
pub mod registry;
pub mod safety;
pub mod server;
pub mod session;
pub mod transport;

pub use config::{ServerConfig, TransportKind};
pub use dispatcher::Dispatcher;
pub use error::{ServerError, ServerResult};
pub use registry::ToolRegistry;
pub use safety::{SafetyMode, SafetyPolicy};
pub use server::Server;
pub use session::{ClientInfo, Session, SessionState};
