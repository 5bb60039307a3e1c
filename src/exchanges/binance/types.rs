use crate::core::types::conversion::millis_from_number;
use serde::{Deserialize, Deserializer};
use serde_json::{Number, Value};

/// Millisecond epoch sent as an integer or a float, truncated to whole millis
fn epoch_millis<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let n = Number::deserialize(deserializer)?;
    millis_from_number("timestamp", &n).map_err(serde::de::Error::custom)
}

// REST payloads. Numbers the exchange sends as strings stay `String` here and
// are parsed in `converters`.

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinanceServerTime {
    #[serde(deserialize_with = "epoch_millis")]
    pub server_time: i64,
}

/// `bids`/`asks` entries are `[price, quantity, ignored]` tuples
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinanceDepth {
    pub last_update_id: i64,
    pub bids: Vec<Vec<Value>>,
    pub asks: Vec<Vec<Value>>,
}

/// Aggregate trade, shared by the REST history and the `@aggTrade` stream
#[derive(Debug, Clone, Deserialize)]
pub struct BinanceAggTrade {
    #[serde(rename = "a")]
    pub id: i64,
    #[serde(rename = "p")]
    pub price: String,
    #[serde(rename = "q")]
    pub quantity: String,
    #[serde(rename = "f")]
    pub first_trade_id: i64,
    #[serde(rename = "l")]
    pub last_trade_id: i64,
    #[serde(rename = "T", deserialize_with = "epoch_millis")]
    pub timestamp: i64,
    #[serde(rename = "m")]
    pub buyer_maker: bool,
    #[serde(rename = "M")]
    pub best_price_match: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinanceTicker24 {
    pub price_change: String,
    pub price_change_percent: String,
    pub weighted_avg_price: String,
    pub prev_close_price: String,
    pub last_price: String,
    pub bid_price: String,
    pub ask_price: String,
    pub open_price: String,
    pub high_price: String,
    pub low_price: String,
    pub volume: String,
    #[serde(deserialize_with = "epoch_millis")]
    pub open_time: i64,
    #[serde(deserialize_with = "epoch_millis")]
    pub close_time: i64,
    pub first_id: i64,
    pub last_id: i64,
    pub count: i64,
}

#[derive(Debug, Deserialize)]
pub struct BinancePriceTicker {
    pub symbol: String,
    pub price: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinanceBookTicker {
    pub symbol: String,
    pub bid_price: String,
    pub bid_qty: String,
    pub ask_price: String,
    pub ask_qty: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinanceRecentTrade {
    pub id: i64,
    pub price: String,
    pub qty: String,
    #[serde(deserialize_with = "epoch_millis")]
    pub time: i64,
    pub is_buyer_maker: bool,
    pub is_best_match: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinanceProcessedOrder {
    pub symbol: String,
    pub order_id: i64,
    pub client_order_id: String,
    #[serde(deserialize_with = "epoch_millis")]
    pub transact_time: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinanceExecutedOrder {
    pub symbol: String,
    pub order_id: i64,
    pub client_order_id: String,
    pub price: String,
    pub orig_qty: String,
    pub executed_qty: String,
    pub status: String,
    pub time_in_force: String,
    #[serde(rename = "type")]
    pub order_type: String,
    pub side: String,
    pub stop_price: String,
    pub iceberg_qty: String,
    #[serde(deserialize_with = "epoch_millis")]
    pub time: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinanceCanceledOrder {
    pub symbol: String,
    pub orig_client_order_id: String,
    pub order_id: i64,
    pub client_order_id: String,
}

#[derive(Debug, Deserialize)]
pub struct BinanceBalance {
    pub asset: String,
    pub free: String,
    pub locked: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinanceAccountInfo {
    pub maker_commission: i64,
    pub taker_commission: i64,
    pub buyer_commission: i64,
    pub seller_commission: i64,
    pub can_trade: bool,
    pub can_withdraw: bool,
    pub can_deposit: bool,
    pub balances: Vec<BinanceBalance>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinanceTrade {
    pub id: i64,
    pub price: String,
    pub qty: String,
    pub commission: String,
    pub commission_asset: String,
    #[serde(deserialize_with = "epoch_millis")]
    pub time: i64,
    pub is_buyer: bool,
    pub is_maker: bool,
    pub is_best_match: bool,
}

#[derive(Debug, Deserialize)]
pub struct BinanceWithdrawResult {
    pub msg: String,
    pub success: bool,
}

// The wallet endpoints send amounts as JSON numbers, not strings. A rejected
// history call still answers 200, with `success: false`, a `msg` and no list.

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinanceDeposit {
    #[serde(deserialize_with = "epoch_millis")]
    pub insert_time: i64,
    pub amount: f64,
    pub asset: String,
    pub status: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinanceDepositHistory {
    pub deposit_list: Option<Vec<BinanceDeposit>>,
    pub success: bool,
    pub msg: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinanceWithdrawal {
    pub amount: f64,
    pub address: String,
    pub tx_id: Option<String>,
    pub asset: String,
    #[serde(deserialize_with = "epoch_millis")]
    pub apply_time: i64,
    pub status: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinanceWithdrawHistory {
    pub withdraw_list: Option<Vec<BinanceWithdrawal>>,
    pub success: bool,
    pub msg: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinanceListenKey {
    pub listen_key: String,
}

// WebSocket payloads

/// `e`/`E`/`s` envelope. `s` is the symbol on market streams but a
/// commission rate on account frames, so it is kept untyped.
#[derive(Debug, Deserialize)]
pub struct BinanceEventEnvelope {
    #[serde(rename = "e")]
    pub event_type: String,
    #[serde(rename = "E", deserialize_with = "epoch_millis")]
    pub event_time: i64,
    #[serde(rename = "s")]
    pub symbol: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct BinanceWsDepth {
    #[serde(rename = "U")]
    pub first_update_id: i64,
    #[serde(rename = "u")]
    pub final_update_id: i64,
    #[serde(rename = "b")]
    pub bids: Vec<Vec<Value>>,
    #[serde(rename = "a")]
    pub asks: Vec<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
pub struct BinanceWsKline {
    #[serde(rename = "k")]
    pub kline: BinanceKlineData,
}

#[derive(Debug, Deserialize)]
pub struct BinanceKlineData {
    #[serde(rename = "t", deserialize_with = "epoch_millis")]
    pub open_time: i64,
    #[serde(rename = "T", deserialize_with = "epoch_millis")]
    pub close_time: i64,
    #[serde(rename = "i")]
    pub interval: String,
    #[serde(rename = "f")]
    pub first_trade_id: i64,
    #[serde(rename = "L")]
    pub last_trade_id: i64,
    #[serde(rename = "o")]
    pub open_price: String,
    #[serde(rename = "c")]
    pub close_price: String,
    #[serde(rename = "h")]
    pub high_price: String,
    #[serde(rename = "l")]
    pub low_price: String,
    #[serde(rename = "v")]
    pub volume: String,
    #[serde(rename = "n")]
    pub number_of_trades: i64,
    #[serde(rename = "x")]
    pub final_bar: bool,
    #[serde(rename = "q")]
    pub quote_asset_volume: String,
    #[serde(rename = "V")]
    pub taker_buy_base_asset_volume: String,
    #[serde(rename = "Q")]
    pub taker_buy_quote_asset_volume: String,
}

#[derive(Debug, Deserialize)]
pub struct BinanceWsBalance {
    #[serde(rename = "a")]
    pub asset: String,
    #[serde(rename = "f")]
    pub free: String,
    #[serde(rename = "l")]
    pub locked: String,
}

/// `outboundAccountInfo` frame
#[derive(Debug, Deserialize)]
pub struct BinanceWsAccount {
    #[serde(rename = "m")]
    pub maker_commission: i64,
    #[serde(rename = "t")]
    pub taker_commission: i64,
    #[serde(rename = "b")]
    pub buyer_commission: i64,
    #[serde(rename = "s")]
    pub seller_commission: i64,
    #[serde(rename = "T")]
    pub can_trade: bool,
    #[serde(rename = "W")]
    pub can_withdraw: bool,
    #[serde(rename = "D")]
    pub can_deposit: bool,
    #[serde(rename = "B")]
    pub balances: Vec<BinanceWsBalance>,
}
