use crate::core::errors::ExchangeError;
use tokio_tungstenite::tungstenite::Message;

/// Codec trait for turning raw WebSocket frames into typed events
///
/// Control frames (ping, pong, close) are handled at the transport level and
/// by the frame loop; a codec only ever needs to look at data frames, but must
/// tolerate seeing anything.
pub trait WsCodec: Send + Sync + 'static {
    /// The event type produced by this codec
    type Message: Send + 'static;

    /// Decode a raw WebSocket message into a typed event
    ///
    /// # Returns
    /// - `Ok(Some(event))` - publish the event
    /// - `Ok(None)` - frame is not an event for this stream, skip it
    /// - `Err(error)` - frame is malformed, end the subscription
    fn decode_message(&self, message: Message) -> Result<Option<Self::Message>, ExchangeError>;
}
