//! Newline-delimited JSON over stdio (`spec.md` §4.7).
//!
//! One [`Session`] per process. Each line is parsed and dispatched on its
//! own task so a slow tool call never blocks the next request from being
//! read; a single writer task drains an mpsc channel so concurrent
//! responses never interleave mid-line on the wire (grounded on the
//! teacher's `LineTransportRunner`, simplified: this server never issues
//! requests back to the client, so there is no pending-request table).

use std::io;
use std::sync::Arc;

use kubectl_mcp_protocol::jsonrpc::codes;
use kubectl_mcp_protocol::JsonRpcOutgoing;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::dispatcher::{Dispatcher, MAX_MESSAGE_SIZE};
use crate::session::Session;

pub async fn run(dispatcher: Arc<Dispatcher>) -> io::Result<()> {
    run_io(dispatcher, tokio::io::stdin(), tokio::io::stdout()).await
}

pub async fn run_io<R, W>(dispatcher: Arc<Dispatcher>, reader: R, mut writer: W) -> io::Result<()>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    let session = Arc::new(Session::new());
    let (tx, mut rx) = mpsc::channel::<String>(128);

    let writer_task = tokio::spawn(async move {
        while let Some(line) = rx.recv().await {
            if writer.write_all(line.as_bytes()).await.is_err() {
                break;
            }
            if writer.write_all(b"\n").await.is_err() {
                break;
            }
            if writer.flush().await.is_err() {
                break;
            }
        }
    });

    let mut buf_reader = BufReader::new(reader);
    let mut line = String::new();
    loop {
        line.clear();
        let bytes_read = buf_reader.read_line(&mut line).await?;
        if bytes_read == 0 {
            debug!("stdio reader reached EOF, ending session");
            break;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if trimmed.len() > MAX_MESSAGE_SIZE {
            warn!(len = trimmed.len(), "rejected oversized message");
            let resp = JsonRpcOutgoing::error(
                None,
                codes::INVALID_REQUEST,
                format!("Message exceeds maximum size of {MAX_MESSAGE_SIZE} bytes"),
            );
            send(&tx, &resp).await;
            continue;
        }

        let dispatcher = dispatcher.clone();
        let session = session.clone();
        let tx = tx.clone();
        let text = trimmed.to_string();
        tokio::spawn(async move {
            match Dispatcher::parse(&text) {
                Ok(incoming) => {
                    if let Some(response) = dispatcher.dispatch(&session, incoming).await {
                        send(&tx, &response).await;
                    }
                }
                Err(parse_error) => send(&tx, &parse_error).await,
            }
        });
    }

    drop(tx);
    let _ = writer_task.await;
    Ok(())
}

async fn send(tx: &mpsc::Sender<String>, response: &JsonRpcOutgoing) {
    match response.to_line() {
        Ok(line) => {
            let _ = tx.send(line).await;
        }
        Err(err) => warn!(%err, "failed to serialize response"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::HandlerContext;
    use crate::prompts::PromptCatalog;
    use crate::registry::ToolRegistry;
    use crate::safety::{SafetyMode, SafetyPolicy};
    use kubectl_mcp_k8s::{Provider, ProviderConfig, SubprocessRunner};
    use std::io::Cursor;

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
    async fn initialize_round_trips_over_stdio() {
        let dispatcher = test_dispatcher();
        let input = r#"{"jsonrpc":"2.0","id":1,"method":"mcp.initialize","params":{"client_info":{"name":"t","version":"1"}}}"#;
        let reader = Cursor::new(format!("{input}\n"));
        let mut output = Vec::new();
        run_io(dispatcher, reader, &mut output).await.unwrap();
        let output_str = String::from_utf8(output).unwrap();
        assert!(output_str.contains("\"result\""));
        assert!(output_str.contains("kubectl-mcp-server"));
    }

    #[tokio::test]
    async fn malformed_json_gets_parse_error_and_session_continues() {
        let dispatcher = test_dispatcher();
        let input = "not json at all\n{\"jsonrpc\":\"2.0\",\"id\":2,\"method\":\"mcp.initialize\",\"params\":{}}\n";
        let reader = Cursor::new(input.to_string());
        let mut output = Vec::new();
        run_io(dispatcher, reader, &mut output).await.unwrap();
        let output_str = String::from_utf8(output).unwrap();
        assert!(output_str.contains("-32700"));
        assert!(output_str.contains("\"id\":2"));
    }

    #[tokio::test]
    async fn blank_lines_produce_no_output() {
        let dispatcher = test_dispatcher();
        let reader = Cursor::new("\n\n\n".to_string());
        let mut output = Vec::new();
        run_io(dispatcher, reader, &mut output).await.unwrap();
        assert!(output.is_empty());
    }
}
