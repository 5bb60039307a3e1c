use crate::core::{
    errors::ExchangeError,
    kernel::Subscription,
    traits::Service,
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
use chrono::{DateTime, Utc};

/// Binance client facade
///
/// Every method forwards to the wrapped [`Service`] without validating its
/// input, so anything implementing the capability traits (a recording double
/// in tests, the REST-backed `ApiService` in production) can sit behind it.
pub struct Binance<S: Service> {
    service: S,
}

impl<S: Service> Binance<S> {
    pub fn new(service: S) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn into_inner(self) -> S {
        self.service
    }

    // Market data

    pub async fn ping(&self) -> Result<(), ExchangeError> {
        self.service.ping().await
    }

    pub async fn time(&self) -> Result<DateTime<Utc>, ExchangeError> {
        self.service.time().await
    }

    pub async fn order_book(&self, request: OrderBookRequest) -> Result<OrderBook, ExchangeError> {
        self.service.order_book(request).await
    }

    pub async fn agg_trades(
        &self,
        request: AggTradesRequest,
    ) -> Result<Vec<AggTrade>, ExchangeError> {
        self.service.agg_trades(request).await
    }

    pub async fn klines(&self, request: KlinesRequest) -> Result<Vec<Kline>, ExchangeError> {
        self.service.klines(request).await
    }

    pub async fn ticker_24(&self, request: TickerRequest) -> Result<Ticker24, ExchangeError> {
        self.service.ticker_24(request).await
    }

    pub async fn ticker_all_prices(&self) -> Result<Vec<PriceTicker>, ExchangeError> {
        self.service.ticker_all_prices().await
    }

    pub async fn ticker_all_books(&self) -> Result<Vec<BookTicker>, ExchangeError> {
        self.service.ticker_all_books().await
    }

    pub async fn recent_trades(
        &self,
        request: RecentTradesRequest,
    ) -> Result<Vec<RecentTrade>, ExchangeError> {
        self.service.recent_trades(request).await
    }

    // Orders

    pub async fn new_order(&self, request: NewOrderRequest) -> Result<ProcessedOrder, ExchangeError> {
        self.service.new_order(request).await
    }

    pub async fn new_order_test(&self, request: NewOrderRequest) -> Result<(), ExchangeError> {
        self.service.new_order_test(request).await
    }

    pub async fn query_order(
        &self,
        request: QueryOrderRequest,
    ) -> Result<ExecutedOrder, ExchangeError> {
        self.service.query_order(request).await
    }

    pub async fn cancel_order(
        &self,
        request: CancelOrderRequest,
    ) -> Result<CanceledOrder, ExchangeError> {
        self.service.cancel_order(request).await
    }

    pub async fn open_orders(
        &self,
        request: OpenOrdersRequest,
    ) -> Result<Vec<ExecutedOrder>, ExchangeError> {
        self.service.open_orders(request).await
    }

    pub async fn all_orders(
        &self,
        request: AllOrdersRequest,
    ) -> Result<Vec<ExecutedOrder>, ExchangeError> {
        self.service.all_orders(request).await
    }

    // Account and wallet

    pub async fn account(&self, request: AccountRequest) -> Result<Account, ExchangeError> {
        self.service.account(request).await
    }

    pub async fn my_trades(&self, request: MyTradesRequest) -> Result<Vec<Trade>, ExchangeError> {
        self.service.my_trades(request).await
    }

    pub async fn withdraw(&self, request: WithdrawRequest) -> Result<WithdrawResult, ExchangeError> {
        self.service.withdraw(request).await
    }

    pub async fn deposit_history(
        &self,
        request: HistoryRequest,
    ) -> Result<Vec<Deposit>, ExchangeError> {
        self.service.deposit_history(request).await
    }

    pub async fn withdraw_history(
        &self,
        request: HistoryRequest,
    ) -> Result<Vec<Withdrawal>, ExchangeError> {
        self.service.withdraw_history(request).await
    }

    // User data stream lifecycle

    pub async fn start_user_data_stream(&self) -> Result<Stream, ExchangeError> {
        self.service.start_user_data_stream().await
    }

    pub async fn keep_alive_user_data_stream(&self, stream: &Stream) -> Result<(), ExchangeError> {
        self.service.keep_alive_user_data_stream(stream).await
    }

    pub async fn close_user_data_stream(&self, stream: &Stream) -> Result<(), ExchangeError> {
        self.service.close_user_data_stream(stream).await
    }

    // Subscriptions

    pub async fn depth_websocket(
        &self,
        request: DepthWebsocketRequest,
    ) -> Result<Subscription<DepthEvent>, ExchangeError> {
        self.service.depth_websocket(request).await
    }

    pub async fn kline_websocket(
        &self,
        request: KlineWebsocketRequest,
    ) -> Result<Subscription<KlineEvent>, ExchangeError> {
        self.service.kline_websocket(request).await
    }

    pub async fn trade_websocket(
        &self,
        request: TradeWebsocketRequest,
    ) -> Result<Subscription<AggTradeEvent>, ExchangeError> {
        self.service.trade_websocket(request).await
    }

    pub async fn user_data_websocket(
        &self,
        request: UserDataWebsocketRequest,
    ) -> Result<Subscription<AccountEvent>, ExchangeError> {
        self.service.user_data_websocket(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::OrderSide;
    use crate::exchanges::binance::rest::testing::{service, RecordingRest};
    use reqwest::Method;

    #[tokio::test]
    async fn test_facade_forwards_without_validation() {
        let rest = RecordingRest::ok(r#"{"symbol":"","orderId":0,"clientOrderId":"","transactTime":0}"#);
        let client = Binance::new(service(&rest));

        let order = client
            .new_order(NewOrderRequest::limit("", OrderSide::Buy, 0.0, 0.0))
            .await
            .unwrap();

        assert_eq!(order.order_id, 0);
        let sent = rest.last();
        assert_eq!(sent.method, Method::POST);
        assert_eq!(sent.params["symbol"], "");
        assert_eq!(sent.params["quantity"], "0.0000000000");
    }

    #[tokio::test]
    async fn test_facade_surfaces_service_errors() {
        let rest = RecordingRest::respond(503, "Service Unavailable");
        let client = Binance::new(service(&rest));

        let err = client.ping().await.unwrap_err();
        assert!(matches!(
            err,
            ExchangeError::ErrorResponseMalformed { status: 503, .. }
        ));
    }
}
