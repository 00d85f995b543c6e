use std::sync::Arc;
use std::time::Duration;

use futures_util::{Sink, SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio_tungstenite::{connect_async, tungstenite::Message as WsMessage};
use tracing::{debug, info, warn};

use crate::context::AppContext;
use crate::error::{AppError, AppResult};
use crate::handlers;
use crate::infra::slack::SlackClient;

const HELLO: &str = "hello";
const DISCONNECT: &str = "disconnect";

#[derive(Debug, Deserialize)]
struct SocketEnvelope {
    #[serde(default)]
    envelope_id: Option<String>,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    payload: Value,
    #[serde(default)]
    reason: Option<String>,
}

#[derive(Debug, PartialEq, Eq)]
enum SessionEnd {
    Shutdown,
    Reconnect,
}

/// Keeps a Socket Mode connection open and feeds every envelope to the
/// handlers. Runs until Ctrl-C.
pub struct SocketModeRunner {
    slack: Arc<SlackClient>,
    ctx: Arc<AppContext>,
    reconnect_delay: Duration,
}

impl SocketModeRunner {
    pub fn new(slack: Arc<SlackClient>, ctx: Arc<AppContext>, reconnect_delay: Duration) -> Self {
        Self {
            slack,
            ctx,
            reconnect_delay,
        }
    }

    pub async fn run(&self) -> AppResult<()> {
        loop {
            match self.slack.open_socket_connection().await {
                Ok(url) => {
                    info!("socket mode connected");
                    match self.run_session(&url).await {
                        Ok(SessionEnd::Shutdown) => {
                            info!("shutdown requested");
                            return Ok(());
                        }
                        Ok(SessionEnd::Reconnect) => info!("socket session ended"),
                        Err(err) => warn!(error = %err, "socket session failed"),
                    }
                }
                Err(err) => warn!(error = %err, "failed to open socket connection"),
            }

            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    info!("shutdown requested");
                    return Ok(());
                }
                _ = tokio::time::sleep(self.reconnect_delay) => {
                    info!(delay_secs = self.reconnect_delay.as_secs(), "reconnecting");
                }
            }
        }
    }

    async fn run_session(&self, socket_url: &str) -> AppResult<SessionEnd> {
        let (stream, _response) = connect_async(socket_url)
            .await
            .map_err(|err| AppError::Chat(format!("failed to connect socket: {err}")))?;
        let (mut sink, mut source) = stream.split();

        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => return Ok(SessionEnd::Shutdown),
                next = source.next() => {
                    let Some(message) = next else {
                        return Ok(SessionEnd::Reconnect);
                    };
                    let message = message
                        .map_err(|err| AppError::Chat(format!("failed reading socket: {err}")))?;
                    if let WsMessage::Close(frame) = &message {
                        info!(frame = ?frame, "socket closed by server");
                        return Ok(SessionEnd::Reconnect);
                    }
                    let envelope = match parse_socket_envelope(message) {
                        Ok(Some(envelope)) => envelope,
                        Ok(None) => continue,
                        Err(err) => {
                            warn!(error = %err, "dropping unreadable envelope");
                            continue;
                        }
                    };
                    if let Some(envelope_id) = &envelope.envelope_id {
                        ack_envelope(&mut sink, envelope_id).await?;
                    }
                    if self.route(envelope) == Some(SessionEnd::Reconnect) {
                        return Ok(SessionEnd::Reconnect);
                    }
                }
            }
        }
    }

    /// Hands the envelope to its handler on a separate task so the read loop
    /// keeps acknowledging.
    fn route(&self, envelope: SocketEnvelope) -> Option<SessionEnd> {
        match envelope.kind.as_str() {
            HELLO => {
                info!("socket mode handshake complete");
                None
            }
            DISCONNECT => {
                info!(reason = ?envelope.reason, "server requested reconnect");
                Some(SessionEnd::Reconnect)
            }
            _ => {
                debug!(kind = %envelope.kind, "envelope received");
                let ctx = Arc::clone(&self.ctx);
                tokio::spawn(async move {
                    handlers::dispatch(&ctx, &envelope.kind, envelope.payload).await;
                });
                None
            }
        }
    }
}

async fn ack_envelope<S>(sink: &mut S, envelope_id: &str) -> AppResult<()>
where
    S: Sink<WsMessage> + Unpin,
    S::Error: std::fmt::Display,
{
    sink.send(ack_frame(envelope_id))
        .await
        .map_err(|err| AppError::Chat(format!("failed to acknowledge envelope: {err}")))
}

fn ack_frame(envelope_id: &str) -> WsMessage {
    WsMessage::Text(json!({ "envelope_id": envelope_id }).to_string().into())
}

fn parse_socket_envelope(message: WsMessage) -> AppResult<Option<SocketEnvelope>> {
    match message {
        WsMessage::Text(text) => {
            let envelope = serde_json::from_str::<SocketEnvelope>(&text)
                .map_err(|err| AppError::Payload(format!("socket envelope: {err}")))?;
            Ok(Some(envelope))
        }
        WsMessage::Binary(bytes) => {
            let text = String::from_utf8(bytes.to_vec())
                .map_err(|err| AppError::Payload(format!("socket envelope is not utf-8: {err}")))?;
            let envelope = serde_json::from_str::<SocketEnvelope>(&text)
                .map_err(|err| AppError::Payload(format!("socket envelope: {err}")))?;
            Ok(Some(envelope))
        }
        WsMessage::Ping(_) | WsMessage::Pong(_) => Ok(None),
        WsMessage::Close(_) => Ok(None),
        WsMessage::Frame(_) => Ok(None),
    }
}
