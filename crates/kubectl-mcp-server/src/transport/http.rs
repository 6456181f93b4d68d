//! HTTP/SSE transport (`spec.md` §4.7): `POST /mcp` for request/response
//! JSON-RPC, `GET /mcp/sse` for a server-push event stream correlated by
//! an `Mcp-Session-Id` header (grounded on the teacher's
//! `transport/http.rs` `SessionManager`/`CleanupStream` pattern, with
//! `tokio-stream`'s `BroadcastStream` standing in for `async-stream`).

use std::collections::HashMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{DefaultBodyLimit, State};
use axum::http::{HeaderName, HeaderValue};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use futures::stream::Stream;
use futures::StreamExt;
use kubectl_mcp_protocol::{JsonRpcIncoming, JsonRpcOutgoing};
use tokio::sync::{broadcast, RwLock};
use tokio_stream::wrappers::BroadcastStream;
use uuid::Uuid;

use crate::dispatcher::Dispatcher;
use crate::session::Session;

const MAX_BODY_SIZE: usize = 10 * 1024 * 1024;
const SSE_KEEP_ALIVE_SECS: u64 = 30;

/// Tracks the broadcast sender for every open SSE connection, keyed by the
/// `Mcp-Session-Id` the server handed out (`spec.md` §4.7).
#[derive(Clone, Default)]
pub struct SessionManager {
    channels: Arc<RwLock<HashMap<String, broadcast::Sender<String>>>>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self) -> (String, broadcast::Receiver<String>) {
        let id = Uuid::new_v4().to_string();
        let (tx, rx) = broadcast::channel(100);
        self.channels.write().await.insert(id.clone(), tx);
        (id, rx)
    }

    pub async fn remove(&self, id: &str) {
        self.channels.write().await.remove(id);
    }

    #[cfg(test)]
    pub async fn count(&self) -> usize {
        self.channels.read().await.len()
    }
}

#[derive(Clone)]
struct AppState {
    dispatcher: Arc<Dispatcher>,
    session: Arc<Session>,
    sse_sessions: SessionManager,
}

pub fn router(dispatcher: Arc<Dispatcher>) -> Router {
    let state = AppState {
        dispatcher,
        session: Arc::new(Session::new()),
        sse_sessions: SessionManager::new(),
    };

    Router::new()
        .route("/mcp", post(handle_rpc))
        .route("/mcp/sse", get(handle_sse))
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
        .with_state(state)
}

pub async fn run(dispatcher: Arc<Dispatcher>, host: &str, port: u16) -> anyhow::Result<()> {
    let app = router(dispatcher);
    let addr: SocketAddr = format!("{host}:{port}").parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "listening (POST /mcp, GET /mcp/sse)");
    axum::serve(listener, app).await?;
    Ok(())
}

/// One request/response pair against the shared session. The HTTP
/// transport never notifies; a request with no `id` gets a `204` instead
/// of a body, since there is nothing to return to an HTTP client for a
/// notification.
async fn handle_rpc(
    State(state): State<AppState>,
    Json(request): Json<JsonRpcIncoming>,
) -> impl IntoResponse {
    match state.dispatcher.dispatch(&state.session, request).await {
        Some(response) => Json(response).into_response(),
        None => axum::http::StatusCode::NO_CONTENT.into_response(),
    }
}

async fn handle_sse(State(state): State<AppState>) -> impl IntoResponse {
    let (session_id, rx) = state.sse_sessions.create().await;
    let header_value = HeaderValue::from_str(&session_id).expect("uuid is a valid header value");

    let connected = futures::stream::once(async move {
        Ok::<_, Infallible>(
            Event::default()
                .event("connected")
                .data(format!(r#"{{"sessionId":"{session_id}"}}"#)),
        )
    });

    let messages = BroadcastStream::new(rx).filter_map(|item| async move {
        match item {
            Ok(message) => Some(Ok::<_, Infallible>(Event::default().event("message").data(message))),
            Err(tokio_stream::wrappers::errors::BroadcastStreamRecvError::Lagged(n)) => {
                tracing::warn!(missed = n, "SSE client lagged");
                None
            }
        }
    });

    let stream = CleanupStream {
        inner: Box::pin(connected.chain(messages)),
        sessions: state.sse_sessions.clone(),
        session_id: header_value.to_str().unwrap_or_default().to_string(),
    };

    let sse = Sse::new(stream).keep_alive(
        KeepAlive::new().interval(Duration::from_secs(SSE_KEEP_ALIVE_SECS)).text("keep-alive"),
    );

    ([(HeaderName::from_static("mcp-session-id"), header_value)], sse)
}

/// Removes the SSE session from [`SessionManager`] once the connection
/// drops (client disconnect, server shutdown), mirroring the teacher's
/// `CleanupStream`.
struct CleanupStream<S> {
    inner: std::pin::Pin<Box<S>>,
    sessions: SessionManager,
    session_id: String,
}

impl<S: Stream<Item = Result<Event, Infallible>>> Stream for CleanupStream<S> {
    type Item = Result<Event, Infallible>;

    fn poll_next(
        mut self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

impl<S> Drop for CleanupStream<S> {
    fn drop(&mut self) {
        let sessions = self.sessions.clone();
        let session_id = self.session_id.clone();
        tokio::spawn(async move {
            sessions.remove(&session_id).await;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::HandlerContext;
    use crate::prompts::PromptCatalog;
    use crate::registry::ToolRegistry;
    use crate::safety::{SafetyMode, SafetyPolicy};
    use axum::body::Body;
    use axum::http::Request;
    use kubectl_mcp_k8s::{Provider, ProviderConfig, SubprocessRunner};
    use tower::ServiceExt;

    fn test_dispatcher() -> Arc<Dispatcher> {
        let registry = Arc::new(ToolRegistry::with_default_tools());
        let safety = Arc::new(SafetyPolicy::new(SafetyMode::Normal));
        let prompts = Arc::new(PromptCatalog::with_default_prompts());
        let provider = Arc::new(Provider::new(ProviderConfig::default()));
        let runner = Arc::new(SubprocessRunner::new());
        let ctx = HandlerContext::new(provider, runner);
        Arc::new(Dispatcher::new(registry, safety, prompts, ctx, "kubectl-mcp-server", "0.1.0"))
    }

    #[tokio::test]
    async fn post_mcp_initializes_session() {
        let app = router(test_dispatcher());
        let body = r#"{"jsonrpc":"2.0","id":1,"method":"mcp.initialize","params":{"client_info":{"name":"t","version":"1"}}}"#;
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/mcp")
                    .header("content-type", "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), axum::http::StatusCode::OK);
    }

    #[tokio::test]
    async fn session_manager_tracks_and_removes_sessions() {
        let manager = SessionManager::new();
        let (id, _rx) = manager.create().await;
        assert_eq!(manager.count().await, 1);
        manager.remove(&id).await;
        assert_eq!(manager.count().await, 0);
    }
}
