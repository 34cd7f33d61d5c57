//! Stdio transport: reads JSON-RPC from stdin, writes to stdout.
//!
//! Works over any async reader/writer pair. Every line is dispatched on its
//! own task so slow tools do not hold up the connection, but responses are
//! written strictly in the order their requests arrived.

use std::sync::Arc;

use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::context::SessionContext;
use crate::protocol::{ProtocolHandler, Reply};
use crate::session::SessionId;
use crate::types::{McpError, McpResult, RequestId};

use super::framing;

/// A response slot, queued in arrival order.
enum Pending {
    Ready(Option<Value>),
    Running(JoinHandle<Reply>),
}

/// Stdio transport for desktop MCP clients.
pub struct StdioTransport {
    handler: Arc<ProtocolHandler>,
}

impl StdioTransport {
    pub fn new(handler: Arc<ProtocolHandler>) -> Self {
        Self { handler }
    }

    /// Run the transport loop: reads from stdin, writes to stdout.
    pub async fn run(&self) -> McpResult<()> {
        tracing::info!("Stdio transport started");
        serve(self.handler.clone(), tokio::io::stdin(), tokio::io::stdout()).await
    }
}

/// Serve one connection until the reader hits EOF.
///
/// Lines are read as raw bytes; a line that is not UTF-8 JSON is answered
/// with a parse error and the connection stays open.
///
/// An `initialize` frame is handled inline before the next line is read, so
/// the session it creates is bound for every line that follows. Sessions
/// created on this connection are detached when it closes.
pub async fn serve<R, W>(handler: Arc<ProtocolHandler>, reader: R, writer: W) -> McpResult<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();
    let writer_task = tokio::spawn(write_loop(rx, writer));

    let mut ctx = SessionContext::default();
    let mut created: Vec<SessionId> = Vec::new();
    let mut reader = BufReader::new(reader);
    let mut line = Vec::new();

    let read_result = loop {
        line.clear();
        match reader.read_until(b'\n', &mut line).await {
            Ok(0) => {
                tracing::info!("EOF on input, closing connection");
                break Ok(());
            }
            Ok(_) => {}
            Err(e) => break Err(McpError::Io(e)),
        }

        if line.iter().all(u8::is_ascii_whitespace) {
            continue;
        }

        let pending = match serde_json::from_slice::<Value>(&line) {
            Err(_) => Pending::Ready(handler.handle_raw(&line, &ctx).await.body),
            Ok(frame) if framing::is_barrier(&frame) => {
                let reply = handler.handle_value(frame, &ctx).await;
                if let Some(session_id) = reply.session {
                    tracing::debug!("Connection bound to session {session_id}");
                    ctx.session_id = Some(session_id.clone());
                    created.push(session_id);
                }
                Pending::Ready(reply.body)
            }
            Ok(frame) => {
                let handler = handler.clone();
                let ctx = ctx.clone();
                Pending::Running(tokio::spawn(async move {
                    handler.handle_value(frame, &ctx).await
                }))
            }
        };

        if tx.send(pending).is_err() {
            break Err(McpError::Transport("output closed".to_string()));
        }
    };

    drop(tx);
    let write_result = match writer_task.await {
        Ok(result) => result,
        Err(e) => Err(McpError::Transport(e.to_string())),
    };

    for session_id in &created {
        handler.server().sessions.detach(session_id);
    }

    read_result.and(write_result)
}

async fn write_loop<W>(mut rx: mpsc::UnboundedReceiver<Pending>, mut writer: W) -> McpResult<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(pending) = rx.recv().await {
        let body = match pending {
            Pending::Ready(body) => body,
            Pending::Running(task) => match task.await {
                Ok(reply) => reply.body,
                Err(e) => {
                    tracing::error!("Request task failed: {e}");
                    serde_json::to_value(
                        McpError::InternalError(e.to_string()).to_json_rpc_error(RequestId::Null),
                    )
                    .ok()
                }
            },
        };

        if let Some(body) = body {
            let framed = framing::frame_message(&body)?;
            writer
                .write_all(framed.as_bytes())
                .await
                .map_err(McpError::Io)?;
            writer.flush().await.map_err(McpError::Io)?;
        }
    }
    Ok(())
}
