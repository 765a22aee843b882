use anyhow::{Context, Result};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{info, warn};
use url::Url;

use super::messages::{classify, OutboundTurn};
use crate::events::{MessageOutcome, SessionEvent};

/// Normal closure per the WebSocket close-code registry. Every other
/// code is an error condition.
pub const CLOSE_NORMAL: u16 = 1000;

/// Close code reported when the stream ends without a close frame.
const CLOSE_ABNORMAL: u16 = 1006;

/// Connection lifecycle state, owned by `SessionConnection`. The
/// coordinator only observes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Open,
    ClosedNormal,
    ClosedError,
}

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;
type WsSource = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;

/// Duplex channel to the interview service.
///
/// Inbound payloads are parsed and classified on a reader task and
/// delivered to the coordinator as ordered `SessionEvent`s. There is no
/// automatic reconnect; reopening is coordinator-driven.
pub struct SessionConnection {
    state: ConnectionState,
    sink: Option<WsSink>,
    reader: Option<JoinHandle<()>>,

    /// Incremented per connection; tags close events so a close from a
    /// superseded connection is ignored
    epoch: u64,
}

impl SessionConnection {
    pub fn new() -> Self {
        Self {
            state: ConnectionState::ClosedNormal,
            sink: None,
            reader: None,
            epoch: 0,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == ConnectionState::Open
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Open the duplex channel. Any prior live connection is closed
    /// first: no two live connections per session.
    pub async fn open(
        &mut self,
        endpoint: &Url,
        events: mpsc::Sender<SessionEvent>,
    ) -> Result<()> {
        self.shutdown().await;

        self.epoch += 1;
        self.state = ConnectionState::Connecting;
        info!("Connecting to {}", endpoint);

        let (stream, _response) = match connect_async(endpoint.as_str()).await {
            Ok(connected) => connected,
            Err(e) => {
                self.state = ConnectionState::ClosedError;
                return Err(e).context("Failed to open interview connection");
            }
        };

        let (sink, source) = stream.split();
        self.sink = Some(sink);
        self.state = ConnectionState::Open;

        self.reader = Some(tokio::spawn(read_loop(source, events, self.epoch)));

        info!("Interview connection open");
        Ok(())
    }

    /// Serialize and send one turn. The coordinator checks connection
    /// state before calling; a closed socket still fails here rather
    /// than panicking.
    pub async fn send(&mut self, turn: &OutboundTurn) -> Result<()> {
        let sink = self
            .sink
            .as_mut()
            .context("Connection is not open")?;

        let payload = serde_json::to_string(turn).context("Failed to serialize turn")?;

        if let Err(e) = sink.send(Message::Text(payload.into())).await {
            self.state = ConnectionState::ClosedError;
            return Err(e).context("Failed to send turn");
        }

        Ok(())
    }

    /// Record a close observed by the reader. Called by the coordinator
    /// while processing the matching `SocketClosed` event.
    pub async fn handle_closed(&mut self, code: u16) {
        self.state = if code == CLOSE_NORMAL {
            ConnectionState::ClosedNormal
        } else {
            ConnectionState::ClosedError
        };

        self.sink = None;
        if let Some(reader) = self.reader.take() {
            // The reader has already emitted the close event; join it.
            let _ = reader.await;
        }
    }

    /// Tear down any live connection without reporting a close event.
    async fn shutdown(&mut self) {
        if let Some(mut sink) = self.sink.take() {
            let _ = sink.send(Message::Close(None)).await;
            let _ = sink.close().await;
        }

        if let Some(reader) = self.reader.take() {
            // The old reader must not emit events for the successor.
            reader.abort();
            let _ = reader.await;
        }
    }
}

impl Default for SessionConnection {
    fn default() -> Self {
        Self::new()
    }
}

async fn read_loop(mut source: WsSource, events: mpsc::Sender<SessionEvent>, epoch: u64) {
    let _ = events.send(SessionEvent::SocketOpen).await;

    let mut close_code = CLOSE_ABNORMAL;

    while let Some(item) = source.next().await {
        match item {
            Ok(Message::Text(text)) => {
                let outcome = match classify(text.as_str()) {
                    Ok(classified) => MessageOutcome::Classified(classified),
                    Err(e) => {
                        warn!("Failed to parse inbound message: {}", e);
                        MessageOutcome::Malformed(e.to_string())
                    }
                };

                if events
                    .send(SessionEvent::SocketMessage(outcome))
                    .await
                    .is_err()
                {
                    return;
                }
            }
            Ok(Message::Close(frame)) => {
                // 1005: closed without a status code.
                close_code = frame.map(|f| u16::from(f.code)).unwrap_or(1005);
                break;
            }
            Ok(_) => {
                // Ping/pong and binary frames carry no interview traffic.
            }
            Err(e) => {
                warn!("Interview socket error: {}", e);
                break;
            }
        }
    }

    let _ = events
        .send(SessionEvent::SocketClosed {
            code: close_code,
            epoch,
        })
        .await;
}
