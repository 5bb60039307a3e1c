use crate::core::errors::ExchangeError;
use crate::core::kernel::codec::WsCodec;
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

/// WebSocket configuration
#[derive(Debug, Clone)]
pub struct WsConfig {
    /// Connection timeout in milliseconds
    pub connect_timeout_ms: u64,
    /// Capacity of each subscription's event channel
    pub message_buffer_size: usize,
}

impl Default for WsConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: 10_000, // 10 seconds
            message_buffer_size: 1024,
        }
    }
}

/// WebSocket session trait - pure transport layer
#[async_trait]
pub trait WsSession: Send {
    /// Connect to the WebSocket
    async fn connect(&mut self) -> Result<(), ExchangeError>;

    /// Receive the next raw message; `None` once the peer has gone away
    async fn next_raw(&mut self) -> Option<Result<Message, ExchangeError>>;

    /// Close the connection
    async fn close(&mut self) -> Result<(), ExchangeError>;

    /// Check if the connection is alive
    fn is_connected(&self) -> bool;
}

type WsStream = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

/// Tungstenite-based WebSocket session
pub struct TungsteniteWs {
    url: String,
    write: Option<futures_util::stream::SplitSink<WsStream, Message>>,
    read: Option<futures_util::stream::SplitStream<WsStream>>,
    connected: bool,
    exchange_name: String,
    config: WsConfig,
}

impl TungsteniteWs {
    pub fn new(url: String, exchange_name: String) -> Self {
        Self {
            url,
            write: None,
            read: None,
            connected: false,
            exchange_name,
            config: WsConfig::default(),
        }
    }

    /// Set custom WebSocket configuration
    pub fn with_config(mut self, config: WsConfig) -> Self {
        self.config = config;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl WsSession for TungsteniteWs {
    #[instrument(skip(self), fields(exchange = %self.exchange_name, url = %self.url))]
    async fn connect(&mut self) -> Result<(), ExchangeError> {
        let connect_timeout = Duration::from_millis(self.config.connect_timeout_ms);

        let (ws_stream, _) = tokio::time::timeout(connect_timeout, connect_async(&self.url))
            .await
            .map_err(|_| ExchangeError::NetworkError("WebSocket connection timeout".to_string()))?
            .map_err(|e| {
                ExchangeError::NetworkError(format!("WebSocket connection failed: {}", e))
            })?;

        let (write, read) = ws_stream.split();
        self.write = Some(write);
        self.read = Some(read);
        self.connected = true;

        info!("websocket connected");
        Ok(())
    }

    async fn next_raw(&mut self) -> Option<Result<Message, ExchangeError>> {
        loop {
            if !self.connected {
                return Some(Err(ExchangeError::NetworkError(
                    "WebSocket not connected".to_string(),
                )));
            }

            let read = self.read.as_mut()?;

            match read.next().await {
                Some(Ok(Message::Ping(data))) => {
                    // Answer pings at transport level
                    if let Some(write) = self.write.as_mut() {
                        if let Err(e) = write.send(Message::Pong(data)).await {
                            warn!("Failed to send pong response: {}", e);
                        }
                    }
                }
                Some(Ok(Message::Pong(_))) => {}
                Some(Ok(message)) => {
                    if matches!(message, Message::Close(_)) {
                        self.connected = false;
                    }
                    return Some(Ok(message));
                }
                Some(Err(e)) => {
                    self.connected = false;
                    return Some(Err(ExchangeError::NetworkError(format!(
                        "WebSocket error: {}",
                        e
                    ))));
                }
                None => {
                    self.connected = false;
                    return None;
                }
            }
        }
    }

    #[instrument(skip(self), fields(exchange = %self.exchange_name))]
    async fn close(&mut self) -> Result<(), ExchangeError> {
        if let Some(write) = self.write.as_mut() {
            let _ = write.send(Message::Close(None)).await;
        }
        self.connected = false;
        self.write = None;
        self.read = None;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

/// A live push subscription
///
/// `events` yields decoded events in arrival order and closes when the
/// subscription ends. `done` resolves exactly once at that point. Both are
/// closed by the frame loop; consumers only read.
#[derive(Debug)]
pub struct Subscription<E> {
    pub events: mpsc::Receiver<E>,
    pub done: oneshot::Receiver<()>,
}

impl<E> Subscription<E> {
    pub fn into_parts(self) -> (mpsc::Receiver<E>, oneshot::Receiver<()>) {
        (self.events, self.done)
    }
}

#[derive(Debug, PartialEq, Eq)]
enum LoopExit {
    Cancelled,
    PeerClosed,
    ReceiverDropped,
}

/// Run one frame loop on its own task over an already connected session.
///
/// The loop ends on cancellation, peer close, a read error, a fatal decode
/// error, or when the event receiver is dropped. It then closes the session,
/// drops the event sender, and fires `done`.
pub fn spawn_subscription<S, C>(
    mut session: S,
    codec: C,
    cancel: CancellationToken,
    buffer: usize,
) -> Subscription<C::Message>
where
    S: WsSession + 'static,
    C: WsCodec,
{
    let (event_tx, event_rx) = mpsc::channel(buffer.max(1));
    let (done_tx, done_rx) = oneshot::channel();

    tokio::spawn(async move {
        match frame_loop(&mut session, &codec, &cancel, &event_tx).await {
            Ok(exit) => debug!(?exit, "subscription finished"),
            Err(e) => error!(error = %e, "subscription terminated"),
        }

        if let Err(e) = session.close().await {
            debug!(error = %e, "failed to close websocket session");
        }
        drop(event_tx);
        let _ = done_tx.send(());
    });

    Subscription {
        events: event_rx,
        done: done_rx,
    }
}

async fn frame_loop<S, C>(
    session: &mut S,
    codec: &C,
    cancel: &CancellationToken,
    event_tx: &mpsc::Sender<C::Message>,
) -> Result<LoopExit, ExchangeError>
where
    S: WsSession,
    C: WsCodec,
{
    loop {
        let frame = tokio::select! {
            biased;
            () = cancel.cancelled() => return Ok(LoopExit::Cancelled),
            frame = session.next_raw() => frame,
        };

        let message = match frame {
            None | Some(Ok(Message::Close(_))) => return Ok(LoopExit::PeerClosed),
            Some(Err(e)) => return Err(e),
            Some(Ok(message)) => message,
        };

        let Some(event) = codec.decode_message(message)? else {
            continue;
        };

        tokio::select! {
            biased;
            () = cancel.cancelled() => return Ok(LoopExit::Cancelled),
            sent = event_tx.send(event) => {
                if sent.is_err() {
                    return Ok(LoopExit::ReceiverDropped);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use tokio::time::timeout;

    struct ChannelWs {
        frames: mpsc::UnboundedReceiver<Result<Message, ExchangeError>>,
        closed: Arc<AtomicBool>,
    }

    #[async_trait]
    impl WsSession for ChannelWs {
        async fn connect(&mut self) -> Result<(), ExchangeError> {
            Ok(())
        }

        async fn next_raw(&mut self) -> Option<Result<Message, ExchangeError>> {
            self.frames.recv().await
        }

        async fn close(&mut self) -> Result<(), ExchangeError> {
            self.closed.store(true, Ordering::SeqCst);
            Ok(())
        }

        fn is_connected(&self) -> bool {
            !self.closed.load(Ordering::SeqCst)
        }
    }

    struct TextCodec;

    impl WsCodec for TextCodec {
        type Message = String;

        fn decode_message(&self, message: Message) -> Result<Option<String>, ExchangeError> {
            match message {
                Message::Text(text) if text == "skip" => Ok(None),
                Message::Text(text) if text == "bad" => {
                    Err(ExchangeError::decode("frame", "bad frame"))
                }
                Message::Text(text) => Ok(Some(text)),
                _ => Ok(None),
            }
        }
    }

    fn fake_session() -> (
        ChannelWs,
        mpsc::UnboundedSender<Result<Message, ExchangeError>>,
        Arc<AtomicBool>,
    ) {
        let (tx, rx) = mpsc::unbounded_channel();
        let closed = Arc::new(AtomicBool::new(false));
        (
            ChannelWs {
                frames: rx,
                closed: closed.clone(),
            },
            tx,
            closed,
        )
    }

    const WAIT: Duration = Duration::from_secs(2);

    #[tokio::test]
    async fn test_cancel_while_blocked_on_read() {
        let (session, _frames, closed) = fake_session();
        let cancel = CancellationToken::new();
        let mut sub = spawn_subscription(session, TextCodec, cancel.clone(), 8);

        cancel.cancel();

        timeout(WAIT, &mut sub.done).await.unwrap().unwrap();
        assert!(timeout(WAIT, sub.events.recv()).await.unwrap().is_none());
        assert!(closed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_events_arrive_in_order_and_skips_are_dropped() {
        let (session, frames, _closed) = fake_session();
        let mut sub = spawn_subscription(session, TextCodec, CancellationToken::new(), 8);

        for text in ["one", "skip", "two", "three"] {
            frames.send(Ok(Message::Text(text.to_string()))).unwrap();
        }
        frames.send(Ok(Message::Binary(vec![1, 2]))).unwrap();
        drop(frames);

        let mut received = Vec::new();
        while let Some(event) = timeout(WAIT, sub.events.recv()).await.unwrap() {
            received.push(event);
        }
        assert_eq!(received, vec!["one", "two", "three"]);
        timeout(WAIT, sub.done).await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_peer_close_ends_subscription() {
        let (session, frames, closed) = fake_session();
        let mut sub = spawn_subscription(session, TextCodec, CancellationToken::new(), 8);

        frames.send(Ok(Message::Text("first".to_string()))).unwrap();
        frames.send(Ok(Message::Close(None))).unwrap();
        frames.send(Ok(Message::Text("after".to_string()))).unwrap();

        assert_eq!(sub.events.recv().await.as_deref(), Some("first"));
        assert!(timeout(WAIT, sub.events.recv()).await.unwrap().is_none());
        timeout(WAIT, sub.done).await.unwrap().unwrap();
        assert!(closed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_fatal_decode_ends_subscription() {
        let (session, frames, _closed) = fake_session();
        let mut sub = spawn_subscription(session, TextCodec, CancellationToken::new(), 8);

        frames.send(Ok(Message::Text("bad".to_string()))).unwrap();
        frames.send(Ok(Message::Text("never".to_string()))).unwrap();

        assert!(timeout(WAIT, sub.events.recv()).await.unwrap().is_none());
        timeout(WAIT, sub.done).await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_read_error_ends_subscription() {
        let (session, frames, _closed) = fake_session();
        let sub = spawn_subscription(session, TextCodec, CancellationToken::new(), 8);

        frames
            .send(Err(ExchangeError::NetworkError("reset".to_string())))
            .unwrap();

        let (mut events, done) = sub.into_parts();
        timeout(WAIT, done).await.unwrap().unwrap();
        assert!(events.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_cancel_unblocks_stalled_publish() {
        let (session, frames, _closed) = fake_session();
        let cancel = CancellationToken::new();
        let mut sub = spawn_subscription(session, TextCodec, cancel.clone(), 1);

        // Fill the single slot, then leave a second event pending on send.
        frames.send(Ok(Message::Text("a".to_string()))).unwrap();
        frames.send(Ok(Message::Text("b".to_string()))).unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        cancel.cancel();
        timeout(WAIT, &mut sub.done).await.unwrap().unwrap();

        assert_eq!(sub.events.recv().await.as_deref(), Some("a"));
        assert!(sub.events.recv().await.is_none());
    }
}
