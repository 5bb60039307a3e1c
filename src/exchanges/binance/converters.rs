use super::types as binance_types;
use crate::core::errors::ExchangeError;
use crate::core::types::{
    conversion::{
        enum_from_str, float_from_str, float_from_value, int_from_value, slot, time_from_millis,
        time_from_value,
    },
    Account, AggTrade, Balance, BookTicker, CanceledOrder, Deposit, ExecutedOrder, Kline,
    OrderBook, OrderBookLevel, PriceTicker, ProcessedOrder, RecentTrade, Stream, Ticker24, Trade,
    WithdrawResult, Withdrawal,
};
use chrono::{DateTime, Utc};
use serde_json::Value;

/// Decode one `[price, quantity, ...]` level
pub fn convert_order_book_level(tuple: &[Value]) -> Result<OrderBookLevel, ExchangeError> {
    Ok(OrderBookLevel {
        price: float_from_value("level.price", slot("level.price", tuple, 0)?)?,
        quantity: float_from_value("level.quantity", slot("level.quantity", tuple, 1)?)?,
    })
}

pub fn convert_order_book_levels(levels: &[Vec<Value>]) -> Result<Vec<OrderBookLevel>, ExchangeError> {
    levels
        .iter()
        .map(|level| convert_order_book_level(level))
        .collect()
}

pub fn convert_binance_depth(
    depth: binance_types::BinanceDepth,
) -> Result<OrderBook, ExchangeError> {
    Ok(OrderBook {
        last_update_id: depth.last_update_id,
        bids: convert_order_book_levels(&depth.bids)?,
        asks: convert_order_book_levels(&depth.asks)?,
    })
}

pub fn convert_binance_server_time(
    time: &binance_types::BinanceServerTime,
) -> Result<DateTime<Utc>, ExchangeError> {
    time_from_millis("serverTime", time.server_time)
}

pub fn convert_binance_agg_trade(
    trade: &binance_types::BinanceAggTrade,
) -> Result<AggTrade, ExchangeError> {
    Ok(AggTrade {
        id: trade.id,
        price: float_from_str("aggTrade.price", &trade.price)?,
        quantity: float_from_str("aggTrade.quantity", &trade.quantity)?,
        first_trade_id: trade.first_trade_id,
        last_trade_id: trade.last_trade_id,
        timestamp: time_from_millis("aggTrade.timestamp", trade.timestamp)?,
        buyer_maker: trade.buyer_maker,
        best_price_match: trade.best_price_match,
    })
}

/// Decode a REST kline tuple by fixed slot index
///
/// `[0]` open time, `[1..=5]` OHLCV, `[6]` close time, `[7]` quote volume,
/// `[8]` trade count, `[9]` taker base volume, `[10]` taker quote volume.
pub fn convert_binance_rest_kline(tuple: &[Value]) -> Result<Kline, ExchangeError> {
    let float_at = |field: &str, index: usize| float_from_value(field, slot(field, tuple, index)?);
    let time_at = |field: &str, index: usize| time_from_value(field, slot(field, tuple, index)?);

    Ok(Kline {
        open_time: time_at("kline.openTime", 0)?,
        open: float_at("kline.open", 1)?,
        high: float_at("kline.high", 2)?,
        low: float_at("kline.low", 3)?,
        close: float_at("kline.close", 4)?,
        volume: float_at("kline.volume", 5)?,
        close_time: time_at("kline.closeTime", 6)?,
        quote_asset_volume: float_at("kline.quoteAssetVolume", 7)?,
        number_of_trades: int_from_value(
            "kline.numberOfTrades",
            slot("kline.numberOfTrades", tuple, 8)?,
        )?,
        taker_buy_base_asset_volume: float_at("kline.takerBuyBaseAssetVolume", 9)?,
        taker_buy_quote_asset_volume: float_at("kline.takerBuyQuoteAssetVolume", 10)?,
    })
}

pub fn convert_binance_ticker_24(
    ticker: &binance_types::BinanceTicker24,
) -> Result<Ticker24, ExchangeError> {
    Ok(Ticker24 {
        price_change: float_from_str("ticker24.priceChange", &ticker.price_change)?,
        price_change_percent: float_from_str(
            "ticker24.priceChangePercent",
            &ticker.price_change_percent,
        )?,
        weighted_avg_price: float_from_str(
            "ticker24.weightedAvgPrice",
            &ticker.weighted_avg_price,
        )?,
        prev_close_price: float_from_str("ticker24.prevClosePrice", &ticker.prev_close_price)?,
        last_price: float_from_str("ticker24.lastPrice", &ticker.last_price)?,
        bid_price: float_from_str("ticker24.bidPrice", &ticker.bid_price)?,
        ask_price: float_from_str("ticker24.askPrice", &ticker.ask_price)?,
        open_price: float_from_str("ticker24.openPrice", &ticker.open_price)?,
        high_price: float_from_str("ticker24.highPrice", &ticker.high_price)?,
        low_price: float_from_str("ticker24.lowPrice", &ticker.low_price)?,
        volume: float_from_str("ticker24.volume", &ticker.volume)?,
        open_time: time_from_millis("ticker24.openTime", ticker.open_time)?,
        close_time: time_from_millis("ticker24.closeTime", ticker.close_time)?,
        first_id: ticker.first_id,
        last_id: ticker.last_id,
        count: ticker.count,
    })
}

pub fn convert_binance_price_ticker(
    ticker: binance_types::BinancePriceTicker,
) -> Result<PriceTicker, ExchangeError> {
    Ok(PriceTicker {
        price: float_from_str("priceTicker.price", &ticker.price)?,
        symbol: ticker.symbol,
    })
}

pub fn convert_binance_book_ticker(
    ticker: binance_types::BinanceBookTicker,
) -> Result<BookTicker, ExchangeError> {
    Ok(BookTicker {
        bid_price: float_from_str("bookTicker.bidPrice", &ticker.bid_price)?,
        bid_qty: float_from_str("bookTicker.bidQty", &ticker.bid_qty)?,
        ask_price: float_from_str("bookTicker.askPrice", &ticker.ask_price)?,
        ask_qty: float_from_str("bookTicker.askQty", &ticker.ask_qty)?,
        symbol: ticker.symbol,
    })
}

pub fn convert_binance_recent_trade(
    trade: &binance_types::BinanceRecentTrade,
) -> Result<RecentTrade, ExchangeError> {
    Ok(RecentTrade {
        id: trade.id,
        price: float_from_str("recentTrade.price", &trade.price)?,
        qty: float_from_str("recentTrade.qty", &trade.qty)?,
        time: time_from_millis("recentTrade.time", trade.time)?,
        is_buyer_maker: trade.is_buyer_maker,
        is_best_match: trade.is_best_match,
    })
}

pub fn convert_binance_processed_order(
    order: binance_types::BinanceProcessedOrder,
) -> Result<ProcessedOrder, ExchangeError> {
    Ok(ProcessedOrder {
        transact_time: time_from_millis("order.transactTime", order.transact_time)?,
        symbol: order.symbol,
        order_id: order.order_id,
        client_order_id: order.client_order_id,
    })
}

pub fn convert_binance_executed_order(
    order: binance_types::BinanceExecutedOrder,
) -> Result<ExecutedOrder, ExchangeError> {
    Ok(ExecutedOrder {
        price: float_from_str("order.price", &order.price)?,
        orig_qty: float_from_str("order.origQty", &order.orig_qty)?,
        executed_qty: float_from_str("order.executedQty", &order.executed_qty)?,
        status: enum_from_str("order.status", &order.status)?,
        time_in_force: enum_from_str("order.timeInForce", &order.time_in_force)?,
        order_type: enum_from_str("order.type", &order.order_type)?,
        side: enum_from_str("order.side", &order.side)?,
        stop_price: float_from_str("order.stopPrice", &order.stop_price)?,
        iceberg_qty: float_from_str("order.icebergQty", &order.iceberg_qty)?,
        time: time_from_millis("order.time", order.time)?,
        symbol: order.symbol,
        order_id: order.order_id,
        client_order_id: order.client_order_id,
    })
}

pub fn convert_binance_canceled_order(order: binance_types::BinanceCanceledOrder) -> CanceledOrder {
    CanceledOrder {
        symbol: order.symbol,
        orig_client_order_id: order.orig_client_order_id,
        order_id: order.order_id,
        client_order_id: order.client_order_id,
    }
}

fn convert_balance(asset: String, free: &str, locked: &str) -> Result<Balance, ExchangeError> {
    Ok(Balance {
        free: float_from_str("balance.free", free)?,
        locked: float_from_str("balance.locked", locked)?,
        asset,
    })
}

pub fn convert_binance_account(
    account: binance_types::BinanceAccountInfo,
) -> Result<Account, ExchangeError> {
    let balances = account
        .balances
        .into_iter()
        .map(|b| convert_balance(b.asset, &b.free, &b.locked))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Account {
        maker_commission: account.maker_commission,
        taker_commission: account.taker_commission,
        buyer_commission: account.buyer_commission,
        seller_commission: account.seller_commission,
        can_trade: account.can_trade,
        can_withdraw: account.can_withdraw,
        can_deposit: account.can_deposit,
        balances,
    })
}

/// Account snapshot pushed on the user data stream
pub fn convert_binance_ws_account(
    account: binance_types::BinanceWsAccount,
) -> Result<Account, ExchangeError> {
    let balances = account
        .balances
        .into_iter()
        .map(|b| convert_balance(b.asset, &b.free, &b.locked))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Account {
        maker_commission: account.maker_commission,
        taker_commission: account.taker_commission,
        buyer_commission: account.buyer_commission,
        seller_commission: account.seller_commission,
        can_trade: account.can_trade,
        can_withdraw: account.can_withdraw,
        can_deposit: account.can_deposit,
        balances,
    })
}

pub fn convert_binance_trade(trade: binance_types::BinanceTrade) -> Result<Trade, ExchangeError> {
    Ok(Trade {
        id: trade.id,
        price: float_from_str("trade.price", &trade.price)?,
        qty: float_from_str("trade.qty", &trade.qty)?,
        commission: float_from_str("trade.commission", &trade.commission)?,
        commission_asset: trade.commission_asset,
        time: time_from_millis("trade.time", trade.time)?,
        is_buyer: trade.is_buyer,
        is_maker: trade.is_maker,
        is_best_match: trade.is_best_match,
    })
}

pub fn convert_binance_withdraw_result(result: binance_types::BinanceWithdrawResult) -> WithdrawResult {
    WithdrawResult {
        success: result.success,
        msg: result.msg,
    }
}

pub fn convert_binance_deposit(deposit: binance_types::BinanceDeposit) -> Result<Deposit, ExchangeError> {
    Ok(Deposit {
        insert_time: time_from_millis("deposit.insertTime", deposit.insert_time)?,
        amount: deposit.amount,
        asset: deposit.asset,
        status: deposit.status,
    })
}

/// List from a wallet history response. `success: false` is a rejection and
/// a successful response must carry the list.
fn wallet_history_list<T>(
    field: &str,
    success: bool,
    msg: Option<String>,
    list: Option<Vec<T>>,
) -> Result<Vec<T>, ExchangeError> {
    if !success {
        return Err(ExchangeError::RequestRejected {
            message: msg.unwrap_or_default(),
        });
    }
    list.ok_or_else(|| ExchangeError::decode(field, "missing from successful response"))
}

pub fn convert_binance_deposit_history(
    history: binance_types::BinanceDepositHistory,
) -> Result<Vec<Deposit>, ExchangeError> {
    wallet_history_list(
        "depositList",
        history.success,
        history.msg,
        history.deposit_list,
    )?
    .into_iter()
    .map(convert_binance_deposit)
    .collect()
}

pub fn convert_binance_withdraw_history(
    history: binance_types::BinanceWithdrawHistory,
) -> Result<Vec<Withdrawal>, ExchangeError> {
    wallet_history_list(
        "withdrawList",
        history.success,
        history.msg,
        history.withdraw_list,
    )?
    .into_iter()
    .map(convert_binance_withdrawal)
    .collect()
}

pub fn convert_binance_withdrawal(
    withdrawal: binance_types::BinanceWithdrawal,
) -> Result<Withdrawal, ExchangeError> {
    Ok(Withdrawal {
        apply_time: time_from_millis("withdrawal.applyTime", withdrawal.apply_time)?,
        amount: withdrawal.amount,
        address: withdrawal.address,
        tx_id: withdrawal.tx_id,
        asset: withdrawal.asset,
        status: withdrawal.status,
    })
}

pub fn convert_binance_listen_key(key: binance_types::BinanceListenKey) -> Stream {
    Stream {
        listen_key: key.listen_key,
    }
}
