use crate::core::errors::ExchangeError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Closed wire vocabulary: `as_str`, `Display`, `FromStr` and serde all agree
/// on the exchange's spelling.
macro_rules! wire_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl $name {
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $wire,)+
                }
            }

            pub const fn all() -> &'static [Self] {
                &[$(Self::$variant,)+]
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ExchangeError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok(Self::$variant),)+
                    other => Err(ExchangeError::InvalidParameters(format!(
                        "unknown {} '{}'",
                        stringify!($name),
                        other
                    ))),
                }
            }
        }
    };
}

wire_enum! {
    /// Candlestick interval
    Interval {
        Minute1 => "1m",
        Minutes3 => "3m",
        Minutes5 => "5m",
        Minutes15 => "15m",
        Minutes30 => "30m",
        Hour1 => "1h",
        Hours2 => "2h",
        Hours4 => "4h",
        Hours6 => "6h",
        Hours8 => "8h",
        Hours12 => "12h",
        Day1 => "1d",
        Days3 => "3d",
        Week1 => "1w",
        Month1 => "1M",
    }
}

wire_enum! {
    OrderSide {
        Buy => "BUY",
        Sell => "SELL",
    }
}

wire_enum! {
    OrderType {
        Limit => "LIMIT",
        Market => "MARKET",
        StopLoss => "STOP_LOSS",
        StopLossLimit => "STOP_LOSS_LIMIT",
        TakeProfit => "TAKE_PROFIT",
        TakeProfitLimit => "TAKE_PROFIT_LIMIT",
        LimitMaker => "LIMIT_MAKER",
    }
}

wire_enum! {
    OrderStatus {
        New => "NEW",
        PartiallyFilled => "PARTIALLY_FILLED",
        Filled => "FILLED",
        Canceled => "CANCELED",
        PendingCancel => "PENDING_CANCEL",
        Rejected => "REJECTED",
        Expired => "EXPIRED",
    }
}

wire_enum! {
    TimeInForce {
        GTC => "GTC", // Good Till Canceled
        IOC => "IOC", // Immediate or Cancel
        FOK => "FOK", // Fill or Kill
    }
}

// Market data records

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrderBookLevel {
    pub price: f64,
    pub quantity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBook {
    pub last_update_id: i64,
    pub bids: Vec<OrderBookLevel>,
    pub asks: Vec<OrderBookLevel>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggTrade {
    pub id: i64,
    pub price: f64,
    pub quantity: f64,
    pub first_trade_id: i64,
    pub last_trade_id: i64,
    pub timestamp: DateTime<Utc>,
    pub buyer_maker: bool,
    pub best_price_match: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kline {
    pub open_time: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub close_time: DateTime<Utc>,
    pub quote_asset_volume: f64,
    pub number_of_trades: i64,
    pub taker_buy_base_asset_volume: f64,
    pub taker_buy_quote_asset_volume: f64,
}

/// 24 hour rolling window statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticker24 {
    pub price_change: f64,
    pub price_change_percent: f64,
    pub weighted_avg_price: f64,
    pub prev_close_price: f64,
    pub last_price: f64,
    pub bid_price: f64,
    pub ask_price: f64,
    pub open_price: f64,
    pub high_price: f64,
    pub low_price: f64,
    pub volume: f64,
    pub open_time: DateTime<Utc>,
    pub close_time: DateTime<Utc>,
    pub first_id: i64,
    pub last_id: i64,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceTicker {
    pub symbol: String,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookTicker {
    pub symbol: String,
    pub bid_price: f64,
    pub bid_qty: f64,
    pub ask_price: f64,
    pub ask_qty: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentTrade {
    pub id: i64,
    pub price: f64,
    pub qty: f64,
    pub time: DateTime<Utc>,
    pub is_buyer_maker: bool,
    pub is_best_match: bool,
}

// Trading records

/// Acknowledgement of a freshly placed order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedOrder {
    pub symbol: String,
    pub order_id: i64,
    pub client_order_id: String,
    pub transact_time: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutedOrder {
    pub symbol: String,
    pub order_id: i64,
    pub client_order_id: String,
    pub price: f64,
    pub orig_qty: f64,
    pub executed_qty: f64,
    pub status: OrderStatus,
    pub time_in_force: TimeInForce,
    pub order_type: OrderType,
    pub side: OrderSide,
    pub stop_price: f64,
    pub iceberg_qty: f64,
    pub time: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanceledOrder {
    pub symbol: String,
    pub orig_client_order_id: String,
    pub order_id: i64,
    pub client_order_id: String,
}

// Account records

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    pub asset: String,
    pub free: f64,
    pub locked: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub maker_commission: i64,
    pub taker_commission: i64,
    pub buyer_commission: i64,
    pub seller_commission: i64,
    pub can_trade: bool,
    pub can_withdraw: bool,
    pub can_deposit: bool,
    pub balances: Vec<Balance>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub id: i64,
    pub price: f64,
    pub qty: f64,
    pub commission: f64,
    pub commission_asset: String,
    pub time: DateTime<Utc>,
    pub is_buyer: bool,
    pub is_maker: bool,
    pub is_best_match: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawResult {
    pub success: bool,
    pub msg: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deposit {
    pub insert_time: DateTime<Utc>,
    pub amount: f64,
    pub asset: String,
    pub status: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Withdrawal {
    pub amount: f64,
    pub address: String,
    /// Unset until the withdrawal is broadcast
    pub tx_id: Option<String>,
    pub asset: String,
    pub apply_time: DateTime<Utc>,
    pub status: i64,
}

/// User data stream handle
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Stream {
    pub listen_key: String,
}

// Requests
//
// `None` is never sent. `Some(v)` always is, zero included. Optional strings
// additionally treat `""` as unset. Signed requests default `timestamp` to now.

#[derive(Debug, Clone, Default)]
pub struct OrderBookRequest {
    pub symbol: String,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Default)]
pub struct AggTradesRequest {
    pub symbol: String,
    pub from_id: Option<i64>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct KlinesRequest {
    pub symbol: String,
    pub interval: Interval,
    pub limit: Option<u32>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct TickerRequest {
    pub symbol: String,
}

#[derive(Debug, Clone, Default)]
pub struct RecentTradesRequest {
    pub symbol: String,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct NewOrderRequest {
    pub symbol: String,
    pub side: OrderSide,
    pub order_type: OrderType,
    pub time_in_force: Option<TimeInForce>,
    pub quantity: f64,
    pub price: Option<f64>,
    pub new_client_order_id: Option<String>,
    pub stop_price: Option<f64>,
    pub iceberg_qty: Option<f64>,
    pub recv_window: Option<Duration>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl NewOrderRequest {
    /// Good-till-canceled limit order
    pub fn limit(symbol: impl Into<String>, side: OrderSide, quantity: f64, price: f64) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            order_type: OrderType::Limit,
            time_in_force: Some(TimeInForce::GTC),
            quantity,
            price: Some(price),
            new_client_order_id: None,
            stop_price: None,
            iceberg_qty: None,
            recv_window: None,
            timestamp: None,
        }
    }

    pub fn market(symbol: impl Into<String>, side: OrderSide, quantity: f64) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            order_type: OrderType::Market,
            time_in_force: None,
            quantity,
            price: None,
            new_client_order_id: None,
            stop_price: None,
            iceberg_qty: None,
            recv_window: None,
            timestamp: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct QueryOrderRequest {
    pub symbol: String,
    pub order_id: Option<i64>,
    pub orig_client_order_id: Option<String>,
    pub recv_window: Option<Duration>,
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct CancelOrderRequest {
    pub symbol: String,
    pub order_id: Option<i64>,
    pub orig_client_order_id: Option<String>,
    pub new_client_order_id: Option<String>,
    pub recv_window: Option<Duration>,
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct OpenOrdersRequest {
    pub symbol: String,
    pub recv_window: Option<Duration>,
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct AllOrdersRequest {
    pub symbol: String,
    pub order_id: Option<i64>,
    pub limit: Option<u32>,
    pub recv_window: Option<Duration>,
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct AccountRequest {
    pub recv_window: Option<Duration>,
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct MyTradesRequest {
    pub symbol: String,
    pub limit: Option<u32>,
    pub from_id: Option<i64>,
    pub recv_window: Option<Duration>,
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct WithdrawRequest {
    pub asset: String,
    pub address: String,
    pub amount: f64,
    pub name: Option<String>,
    pub recv_window: Option<Duration>,
    pub timestamp: Option<DateTime<Utc>>,
}

/// Filter for deposit and withdrawal history
#[derive(Debug, Clone, Default)]
pub struct HistoryRequest {
    pub asset: Option<String>,
    pub status: Option<i64>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub recv_window: Option<Duration>,
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct DepthWebsocketRequest {
    pub symbol: String,
}

#[derive(Debug, Clone)]
pub struct KlineWebsocketRequest {
    pub symbol: String,
    pub interval: Interval,
}

#[derive(Debug, Clone, Default)]
pub struct TradeWebsocketRequest {
    pub symbol: String,
}

#[derive(Debug, Clone, Default)]
pub struct UserDataWebsocketRequest {
    pub listen_key: String,
}

// Stream events

/// Envelope carried by every pushed event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WsEvent {
    pub event_type: String,
    pub time: DateTime<Utc>,
    /// Empty for user data events
    pub symbol: String,
}

/// Incremental order book update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepthEvent {
    pub event: WsEvent,
    pub first_update_id: i64,
    pub update_id: i64,
    pub bids: Vec<OrderBookLevel>,
    pub asks: Vec<OrderBookLevel>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KlineEvent {
    pub event: WsEvent,
    pub interval: Interval,
    pub first_trade_id: i64,
    pub last_trade_id: i64,
    pub is_final: bool,
    pub kline: Kline,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggTradeEvent {
    pub event: WsEvent,
    pub trade: AggTrade,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountEvent {
    pub event: WsEvent,
    pub account: Account,
}

/// Conversion primitives for the exchange's wire encodings
///
/// Every failure is a [`ExchangeError::DeserializationError`] naming the field.
/// Nothing here falls back to a default value.
pub mod conversion {
    use crate::core::errors::ExchangeError;
    use chrono::{DateTime, Utc};
    use serde::de::DeserializeOwned;
    use serde_json::{Number, Value};

    /// String-encoded float, e.g. `"0.00012300"`
    pub fn float_from_str(field: &str, raw: &str) -> Result<f64, ExchangeError> {
        raw.parse::<f64>()
            .map_err(|e| ExchangeError::decode(field, format!("'{}' is not a float: {}", raw, e)))
    }

    /// Tuple slot holding a string-encoded float
    pub fn float_from_value(field: &str, value: &Value) -> Result<f64, ExchangeError> {
        match value {
            Value::String(raw) => float_from_str(field, raw),
            other => Err(ExchangeError::decode(
                field,
                format!("expected string-encoded float, got {}", other),
            )),
        }
    }

    /// Tuple slot holding a raw JSON integer
    pub fn int_from_value(field: &str, value: &Value) -> Result<i64, ExchangeError> {
        value
            .as_i64()
            .ok_or_else(|| ExchangeError::decode(field, format!("expected integer, got {}", value)))
    }

    /// Millisecond epoch to absolute time
    pub fn time_from_millis(field: &str, millis: i64) -> Result<DateTime<Utc>, ExchangeError> {
        DateTime::<Utc>::from_timestamp_millis(millis)
            .ok_or_else(|| ExchangeError::decode(field, format!("timestamp {} out of range", millis)))
    }

    /// Millisecond epoch sent as either a JSON integer or a float
    pub fn millis_from_number(field: &str, n: &Number) -> Result<i64, ExchangeError> {
        match n.as_i64() {
            Some(millis) => Ok(millis),
            None => n
                .as_f64()
                .filter(|f| f.is_finite())
                .map(|f| f.trunc() as i64)
                .ok_or_else(|| ExchangeError::decode(field, format!("invalid timestamp {}", n))),
        }
    }

    /// Tuple slot holding a numeric millisecond epoch; strings are rejected
    pub fn time_from_value(field: &str, value: &Value) -> Result<DateTime<Utc>, ExchangeError> {
        match value {
            Value::Number(n) => time_from_millis(field, millis_from_number(field, n)?),
            other => Err(ExchangeError::decode(
                field,
                format!("expected numeric millisecond timestamp, got {}", other),
            )),
        }
    }

    /// Slot `index` of a tuple-shaped payload
    pub fn slot<'a>(field: &str, tuple: &'a [Value], index: usize) -> Result<&'a Value, ExchangeError> {
        tuple.get(index).ok_or_else(|| {
            ExchangeError::decode(
                field,
                format!("missing slot [{}] in tuple of length {}", index, tuple.len()),
            )
        })
    }

    /// Decode an object-shaped body, naming `context` on failure
    pub fn decode_json<T: DeserializeOwned>(context: &str, body: &[u8]) -> Result<T, ExchangeError> {
        serde_json::from_slice(body).map_err(|e| ExchangeError::decode(context, e))
    }

    /// Parse a closed wire enum, reporting a decode error rather than a parameter error
    pub fn enum_from_str<T>(field: &str, raw: &str) -> Result<T, ExchangeError>
    where
        T: std::str::FromStr<Err = ExchangeError>,
    {
        raw.parse::<T>().map_err(|e| ExchangeError::decode(field, e))
    }
}

#[cfg(test)]
mod tests {
    use super::conversion::*;
    use super::*;
    use serde_json::json;

    #[test]
    fn test_enum_wire_names() {
        assert_eq!(Interval::Month1.as_str(), "1M");
        assert_eq!(Interval::Minute1.to_string(), "1m");
        assert_eq!("15m".parse::<Interval>().unwrap(), Interval::Minutes15);
        assert_eq!(OrderType::StopLossLimit.as_str(), "STOP_LOSS_LIMIT");
        assert_eq!(
            serde_json::to_string(&OrderStatus::PartiallyFilled).unwrap(),
            "\"PARTIALLY_FILLED\""
        );
        assert_eq!(
            serde_json::from_str::<TimeInForce>("\"IOC\"").unwrap(),
            TimeInForce::IOC
        );
        assert_eq!(Interval::all().len(), 15);
    }

    #[test]
    fn test_enum_rejects_unknown() {
        assert!(matches!(
            "HOLD".parse::<OrderSide>(),
            Err(ExchangeError::InvalidParameters(_))
        ));
        assert!("2m".parse::<Interval>().is_err());
        assert!(matches!(
            enum_from_str::<OrderStatus>("status", "LOST"),
            Err(ExchangeError::DeserializationError { .. })
        ));
    }

    #[test]
    fn test_float_from_value_requires_string() {
        assert_eq!(float_from_value("price", &json!("0.00012300")).unwrap(), 0.000_123);
        assert!(float_from_value("price", &json!(1.5)).is_err());
        assert!(float_from_value("price", &json!("abc")).is_err());
        assert!(float_from_value("price", &json!(null)).is_err());
    }

    #[test]
    fn test_time_from_value_requires_number() {
        let t = time_from_value("openTime", &json!(1_499_040_000_000_i64)).unwrap();
        assert_eq!(t.timestamp_millis(), 1_499_040_000_000);

        let f = time_from_value("openTime", &json!(1_499_040_000_000.0)).unwrap();
        assert_eq!(f, t);

        assert!(time_from_value("openTime", &json!("1499040000000")).is_err());
    }

    #[test]
    fn test_int_from_value() {
        assert_eq!(int_from_value("trades", &json!(308)).unwrap(), 308);
        assert!(int_from_value("trades", &json!("308")).is_err());
    }

    #[test]
    fn test_slot_names_missing_index() {
        let tuple = vec![json!("1.0")];
        match slot("kline", &tuple, 6) {
            Err(ExchangeError::DeserializationError { field, reason }) => {
                assert_eq!(field, "kline");
                assert!(reason.contains("[6]"));
            }
            other => panic!("Expected DeserializationError, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_json_names_context() {
        let err = decode_json::<Stream>("userDataStream", b"not json").unwrap_err();
        assert!(err.to_string().contains("userDataStream"));
    }
}
