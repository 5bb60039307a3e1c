use crate::core::errors::ExchangeError;
use crate::core::kernel::WsCodec;
use crate::core::types::{
    conversion::{enum_from_str, float_from_str, time_from_millis},
    AccountEvent, AggTradeEvent, DepthEvent, Kline, KlineEvent, WsEvent,
};
use crate::exchanges::binance::converters::{
    convert_binance_agg_trade, convert_binance_ws_account, convert_order_book_levels,
};
use crate::exchanges::binance::types::{
    BinanceAggTrade, BinanceEventEnvelope, BinanceKlineData, BinanceWsAccount, BinanceWsDepth,
    BinanceWsKline,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tokio_tungstenite::tungstenite::Message;
use tracing::debug;

pub const DEPTH_UPDATE_EVENT: &str = "depthUpdate";
pub const KLINE_EVENT: &str = "kline";
pub const AGG_TRADE_EVENT: &str = "aggTrade";
pub const ACCOUNT_INFO_EVENT: &str = "outboundAccountInfo";

/// Parse a data frame into JSON. Control frames yield `None`.
fn frame_value(message: Message) -> Result<Option<Value>, ExchangeError> {
    let text = match message {
        Message::Text(text) => text,
        Message::Binary(data) => String::from_utf8(data)
            .map_err(|e| ExchangeError::decode("frame", format!("invalid UTF-8: {}", e)))?,
        _ => return Ok(None),
    };

    serde_json::from_str(&text)
        .map(Some)
        .map_err(|e| ExchangeError::decode("frame", format!("invalid JSON: {}", e)))
}

/// `{"result": null, "id": 1}` style replies carry no event type
fn is_ack(value: &Value) -> bool {
    value.get("e").is_none() && (value.get("result").is_some() || value.get("id").is_some())
}

fn decode_envelope(value: &Value) -> Result<WsEvent, ExchangeError> {
    let envelope = BinanceEventEnvelope::deserialize(value)
        .map_err(|e| ExchangeError::decode("event", e))?;

    Ok(WsEvent {
        time: time_from_millis("event.E", envelope.event_time)?,
        // `s` is numeric on account frames
        symbol: envelope
            .symbol
            .as_ref()
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        event_type: envelope.event_type,
    })
}

/// Envelope plus typed payload for frames of `expected` type
fn decode_event<T: DeserializeOwned>(
    message: Message,
    expected: &str,
) -> Result<Option<(WsEvent, T)>, ExchangeError> {
    let Some(value) = frame_value(message)? else {
        return Ok(None);
    };
    if is_ack(&value) {
        debug!(frame = %value, "skipping subscription reply");
        return Ok(None);
    }

    let event = decode_envelope(&value)?;
    if event.event_type != expected {
        debug!(event_type = %event.event_type, expected, "skipping unrelated event");
        return Ok(None);
    }

    let payload = T::deserialize(value).map_err(|e| ExchangeError::decode(expected, e))?;
    Ok(Some((event, payload)))
}

/// `<symbol>@depth` diff stream
#[derive(Debug, Clone, Copy, Default)]
pub struct DepthCodec;

impl WsCodec for DepthCodec {
    type Message = DepthEvent;

    fn decode_message(&self, message: Message) -> Result<Option<Self::Message>, ExchangeError> {
        let Some((event, raw)) = decode_event::<BinanceWsDepth>(message, DEPTH_UPDATE_EVENT)? else {
            return Ok(None);
        };

        Ok(Some(DepthEvent {
            event,
            first_update_id: raw.first_update_id,
            update_id: raw.final_update_id,
            bids: convert_order_book_levels(&raw.bids)?,
            asks: convert_order_book_levels(&raw.asks)?,
        }))
    }
}

/// `<symbol>@kline_<interval>` candlestick stream
#[derive(Debug, Clone, Copy, Default)]
pub struct KlineCodec;

fn convert_stream_kline(k: &BinanceKlineData) -> Result<Kline, ExchangeError> {
    Ok(Kline {
        open_time: time_from_millis("kline.t", k.open_time)?,
        open: float_from_str("kline.o", &k.open_price)?,
        high: float_from_str("kline.h", &k.high_price)?,
        low: float_from_str("kline.l", &k.low_price)?,
        close: float_from_str("kline.c", &k.close_price)?,
        volume: float_from_str("kline.v", &k.volume)?,
        close_time: time_from_millis("kline.T", k.close_time)?,
        quote_asset_volume: float_from_str("kline.q", &k.quote_asset_volume)?,
        number_of_trades: k.number_of_trades,
        taker_buy_base_asset_volume: float_from_str("kline.V", &k.taker_buy_base_asset_volume)?,
        taker_buy_quote_asset_volume: float_from_str("kline.Q", &k.taker_buy_quote_asset_volume)?,
    })
}

impl WsCodec for KlineCodec {
    type Message = KlineEvent;

    fn decode_message(&self, message: Message) -> Result<Option<Self::Message>, ExchangeError> {
        let Some((event, raw)) = decode_event::<BinanceWsKline>(message, KLINE_EVENT)? else {
            return Ok(None);
        };
        let k = &raw.kline;

        Ok(Some(KlineEvent {
            event,
            interval: enum_from_str("kline.i", &k.interval)?,
            first_trade_id: k.first_trade_id,
            last_trade_id: k.last_trade_id,
            is_final: k.final_bar,
            kline: convert_stream_kline(k)?,
        }))
    }
}

/// `<symbol>@aggTrade` stream
#[derive(Debug, Clone, Copy, Default)]
pub struct AggTradeCodec;

impl WsCodec for AggTradeCodec {
    type Message = AggTradeEvent;

    fn decode_message(&self, message: Message) -> Result<Option<Self::Message>, ExchangeError> {
        let Some((event, raw)) = decode_event::<BinanceAggTrade>(message, AGG_TRADE_EVENT)? else {
            return Ok(None);
        };

        Ok(Some(AggTradeEvent {
            event,
            trade: convert_binance_agg_trade(&raw)?,
        }))
    }
}

/// `<listenKey>` user data stream. Only account snapshots are decoded;
/// execution reports and other event types are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct UserDataCodec;

impl WsCodec for UserDataCodec {
    type Message = AccountEvent;

    fn decode_message(&self, message: Message) -> Result<Option<Self::Message>, ExchangeError> {
        let Some((event, raw)) = decode_event::<BinanceWsAccount>(message, ACCOUNT_INFO_EVENT)?
        else {
            return Ok(None);
        };

        Ok(Some(AccountEvent {
            event,
            account: convert_binance_ws_account(raw)?,
        }))
    }
}
