use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::AUTHORIZATION;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::Message;

use crate::config::ClientConfig;
use crate::constants::{INBOUND_QUEUE_SIZE, OUTBOUND_QUEUE_SIZE};
use crate::diagnostics::{LogEvent, LogLevel, SharedSink};
use crate::error::{Result, SdkError};

#[derive(Clone, Debug, PartialEq)]
pub enum OutboundMessage {
    Text(String),
    Close { reason: String },
}

pub struct Connection {
    pub inbound: mpsc::Receiver<String>,
    pub outbound: mpsc::Sender<OutboundMessage>,
    reader: Option<JoinHandle<()>>,
}

impl Connection {
    pub fn new(inbound: mpsc::Receiver<String>, outbound: mpsc::Sender<OutboundMessage>) -> Self {
        Self {
            inbound,
            outbound,
            reader: None,
        }
    }

    pub fn in_memory() -> (Self, mpsc::Sender<String>, mpsc::Receiver<OutboundMessage>) {
        let (in_tx, in_rx) = mpsc::channel(INBOUND_QUEUE_SIZE);
        let (out_tx, out_rx) = mpsc::channel(OUTBOUND_QUEUE_SIZE);
        (Self::new(in_rx, out_tx), in_tx, out_rx)
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
    }
}

pub async fn connect(config: &ClientConfig, sink: SharedSink) -> Result<Connection> {
    let mut request = config
        .server_url
        .as_str()
        .into_client_request()
        .map_err(|err| SdkError::Config(format!("invalid server url: {err}")))?;
    if let Some(token) = &config.token {
        let value = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|err| SdkError::InvalidHeader(err.to_string()))?;
        request.headers_mut().insert(AUTHORIZATION, value);
    }

    let (socket, _response) = connect_async(request)
        .await
        .map_err(|source| SdkError::Connect {
            url: config.server_url.clone(),
            source,
        })?;
    sink.emit(LogEvent::new(
        LogLevel::Info,
        "transport.connected",
        json!({ "url": config.server_url }),
    ));

    let (mut ws_sender, mut ws_receiver) = socket.split();
    let (out_tx, mut out_rx) = mpsc::channel::<OutboundMessage>(OUTBOUND_QUEUE_SIZE);
    let (in_tx, in_rx) = mpsc::channel::<String>(INBOUND_QUEUE_SIZE);

    let writer_sink = sink.clone();
    tokio::spawn(async move {
        while let Some(outbound) = out_rx.recv().await {
            let should_close = matches!(outbound, OutboundMessage::Close { .. });
            let result = match outbound {
                OutboundMessage::Text(payload) => ws_sender.send(Message::Text(payload.into())).await,
                OutboundMessage::Close { reason } => {
                    let frame = CloseFrame {
                        code: CloseCode::Normal,
                        reason: reason.into(),
                    };
                    ws_sender.send(Message::Close(Some(frame))).await
                }
            };
            if let Err(err) = result {
                writer_sink.emit(LogEvent::new(
                    LogLevel::Warn,
                    "transport.send_failed",
                    json!({ "error": err.to_string() }),
                ));
                break;
            }
            if should_close {
                break;
            }
        }
        let _ = ws_sender.close().await;
    });

    let reader_sink = sink;
    let reader = tokio::spawn(async move {
        while let Some(received) = ws_receiver.next().await {
            let message = match received {
                Ok(message) => message,
                Err(err) => {
                    reader_sink.emit(LogEvent::new(
                        LogLevel::Warn,
                        "transport.receive_failed",
                        json!({ "error": err.to_string() }),
                    ));
                    break;
                }
            };
            let text = match message {
                Message::Text(raw) => raw.as_str().to_string(),
                Message::Binary(raw) => match String::from_utf8(raw.to_vec()) {
                    Ok(text) => text,
                    Err(_) => {
                        reader_sink.emit(LogEvent::new(
                            LogLevel::Warn,
                            "transport.invalid_utf8",
                            json!({ "bytes": raw.len() }),
                        ));
                        continue;
                    }
                },
                Message::Close(_) => break,
                _ => continue,
            };
            if in_tx.send(text).await.is_err() {
                break;
            }
        }
        reader_sink.emit(LogEvent::new(
            LogLevel::Info,
            "transport.closed",
            json!({}),
        ));
    });

    Ok(Connection {
        inbound: in_rx,
        outbound: out_tx,
        reader: Some(reader),
    })
}
