//! Transports (`spec.md` §4.7, C7): stdio (newline-delimited JSON) and
//! HTTP/SSE. Both drive the same [`crate::dispatcher::Dispatcher`] against
//! a per-connection [`crate::session::Session`] — neither transport knows
//! anything about tool handlers or Kubernetes.

pub mod http;
pub mod stdio;
