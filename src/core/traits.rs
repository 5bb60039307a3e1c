use crate::core::{
    errors::ExchangeError,
    kernel::ws::Subscription,
    types::{
        Account, AccountEvent, AccountRequest, AggTrade, AggTradeEvent, AggTradesRequest,
        AllOrdersRequest, BookTicker, CancelOrderRequest, CanceledOrder, DepthEvent,
        DepthWebsocketRequest, Deposit, ExecutedOrder, HistoryRequest, Kline, KlineEvent,
        KlineWebsocketRequest, KlinesRequest, MyTradesRequest, NewOrderRequest, OpenOrdersRequest,
        OrderBook, OrderBookRequest, PriceTicker, ProcessedOrder, QueryOrderRequest, RecentTrade,
        RecentTradesRequest, Stream, Ticker24, TickerRequest, Trade, TradeWebsocketRequest,
        UserDataWebsocketRequest, WithdrawRequest, WithdrawResult, Withdrawal,
    },
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Test connectivity
    async fn ping(&self) -> Result<(), ExchangeError>;

    /// Current server time
    async fn time(&self) -> Result<DateTime<Utc>, ExchangeError>;

    async fn order_book(&self, request: OrderBookRequest) -> Result<OrderBook, ExchangeError>;

    /// Compressed/aggregate trade history
    async fn agg_trades(&self, request: AggTradesRequest) -> Result<Vec<AggTrade>, ExchangeError>;

    async fn klines(&self, request: KlinesRequest) -> Result<Vec<Kline>, ExchangeError>;

    async fn ticker_24(&self, request: TickerRequest) -> Result<Ticker24, ExchangeError>;

    /// Latest price for every symbol
    async fn ticker_all_prices(&self) -> Result<Vec<PriceTicker>, ExchangeError>;

    /// Best bid/ask for every symbol
    async fn ticker_all_books(&self) -> Result<Vec<BookTicker>, ExchangeError>;

    async fn recent_trades(
        &self,
        request: RecentTradesRequest,
    ) -> Result<Vec<RecentTrade>, ExchangeError>;
}

#[async_trait]
pub trait OrderPlacer: Send + Sync {
    async fn new_order(&self, request: NewOrderRequest) -> Result<ProcessedOrder, ExchangeError>;

    /// Validate an order without sending it to the matching engine
    async fn new_order_test(&self, request: NewOrderRequest) -> Result<(), ExchangeError>;

    async fn query_order(&self, request: QueryOrderRequest)
        -> Result<ExecutedOrder, ExchangeError>;

    async fn cancel_order(
        &self,
        request: CancelOrderRequest,
    ) -> Result<CanceledOrder, ExchangeError>;

    async fn open_orders(
        &self,
        request: OpenOrdersRequest,
    ) -> Result<Vec<ExecutedOrder>, ExchangeError>;

    async fn all_orders(
        &self,
        request: AllOrdersRequest,
    ) -> Result<Vec<ExecutedOrder>, ExchangeError>;
}

#[async_trait]
pub trait AccountInfo: Send + Sync {
    async fn account(&self, request: AccountRequest) -> Result<Account, ExchangeError>;

    async fn my_trades(&self, request: MyTradesRequest) -> Result<Vec<Trade>, ExchangeError>;

    async fn withdraw(&self, request: WithdrawRequest) -> Result<WithdrawResult, ExchangeError>;

    async fn deposit_history(&self, request: HistoryRequest)
        -> Result<Vec<Deposit>, ExchangeError>;

    async fn withdraw_history(
        &self,
        request: HistoryRequest,
    ) -> Result<Vec<Withdrawal>, ExchangeError>;
}

/// Listen key lifecycle. Keep-alives are the caller's to schedule.
#[async_trait]
pub trait UserDataStream: Send + Sync {
    async fn start_user_data_stream(&self) -> Result<Stream, ExchangeError>;

    async fn keep_alive_user_data_stream(&self, stream: &Stream) -> Result<(), ExchangeError>;

    async fn close_user_data_stream(&self, stream: &Stream) -> Result<(), ExchangeError>;
}

/// Push subscriptions. Each call opens its own connection and frame loop.
#[async_trait]
pub trait StreamSource: Send + Sync {
    async fn depth_websocket(
        &self,
        request: DepthWebsocketRequest,
    ) -> Result<Subscription<DepthEvent>, ExchangeError>;

    async fn kline_websocket(
        &self,
        request: KlineWebsocketRequest,
    ) -> Result<Subscription<KlineEvent>, ExchangeError>;

    async fn trade_websocket(
        &self,
        request: TradeWebsocketRequest,
    ) -> Result<Subscription<AggTradeEvent>, ExchangeError>;

    async fn user_data_websocket(
        &self,
        request: UserDataWebsocketRequest,
    ) -> Result<Subscription<AccountEvent>, ExchangeError>;
}

/// Full service capability set; the facade depends only on this
pub trait Service: MarketDataSource + OrderPlacer + AccountInfo + UserDataStream + StreamSource {}

impl<T> Service for T where
    T: MarketDataSource + OrderPlacer + AccountInfo + UserDataStream + StreamSource
{
}
