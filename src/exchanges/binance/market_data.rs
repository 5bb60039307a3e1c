use crate::core::{
    errors::ExchangeError,
    kernel::{RestClient, SignedRequest},
    traits::MarketDataSource,
    types::{
        AggTrade, AggTradesRequest, BookTicker, Kline, KlinesRequest, OrderBook, OrderBookRequest,
        PriceTicker, RecentTrade, RecentTradesRequest, Ticker24, TickerRequest,
    },
};
use crate::exchanges::binance::{
    converters::{
        convert_binance_agg_trade, convert_binance_book_ticker, convert_binance_depth,
        convert_binance_price_ticker, convert_binance_recent_trade, convert_binance_rest_kline,
        convert_binance_server_time, convert_binance_ticker_24,
    },
    rest::{endpoints, millis, ApiService},
    types::{
        BinanceAggTrade, BinanceBookTicker, BinanceDepth, BinancePriceTicker, BinanceRecentTrade,
        BinanceServerTime, BinanceTicker24,
    },
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::de::IgnoredAny;
use serde_json::Value;
use tracing::instrument;

#[async_trait]
impl<R: RestClient> MarketDataSource for ApiService<R> {
    #[instrument(skip(self), fields(exchange = "binance"))]
    async fn ping(&self) -> Result<(), ExchangeError> {
        self.call::<IgnoredAny>(SignedRequest::new(Method::GET, endpoints::PING))
            .await?;
        Ok(())
    }

    #[instrument(skip(self), fields(exchange = "binance"))]
    async fn time(&self) -> Result<DateTime<Utc>, ExchangeError> {
        let raw: BinanceServerTime = self
            .call(SignedRequest::new(Method::GET, endpoints::TIME))
            .await?;
        convert_binance_server_time(&raw)
    }

    #[instrument(skip(self, request), fields(exchange = "binance", symbol = %request.symbol))]
    async fn order_book(&self, request: OrderBookRequest) -> Result<OrderBook, ExchangeError> {
        let raw: BinanceDepth = self
            .call(
                SignedRequest::new(Method::GET, endpoints::DEPTH)
                    .param("symbol", &request.symbol)
                    .opt_param("limit", request.limit),
            )
            .await?;
        convert_binance_depth(raw)
    }

    #[instrument(skip(self, request), fields(exchange = "binance", symbol = %request.symbol))]
    async fn agg_trades(&self, request: AggTradesRequest) -> Result<Vec<AggTrade>, ExchangeError> {
        let raw: Vec<BinanceAggTrade> = self
            .call(
                SignedRequest::new(Method::GET, endpoints::AGG_TRADES)
                    .param("symbol", &request.symbol)
                    .opt_param("fromId", request.from_id)
                    .opt_param("startTime", millis(request.start_time))
                    .opt_param("endTime", millis(request.end_time))
                    .opt_param("limit", request.limit),
            )
            .await?;
        raw.iter().map(convert_binance_agg_trade).collect()
    }

    #[instrument(
        skip(self, request),
        fields(exchange = "binance", symbol = %request.symbol, interval = %request.interval)
    )]
    async fn klines(&self, request: KlinesRequest) -> Result<Vec<Kline>, ExchangeError> {
        let raw: Vec<Vec<Value>> = self
            .call(
                SignedRequest::new(Method::GET, endpoints::KLINES)
                    .param("symbol", &request.symbol)
                    .param("interval", request.interval)
                    .opt_param("limit", request.limit)
                    .opt_param("startTime", millis(request.start_time))
                    .opt_param("endTime", millis(request.end_time)),
            )
            .await?;
        raw.iter().map(|k| convert_binance_rest_kline(k)).collect()
    }

    #[instrument(skip(self, request), fields(exchange = "binance", symbol = %request.symbol))]
    async fn ticker_24(&self, request: TickerRequest) -> Result<Ticker24, ExchangeError> {
        let raw: BinanceTicker24 = self
            .call(
                SignedRequest::new(Method::GET, endpoints::TICKER_24HR)
                    .param("symbol", &request.symbol),
            )
            .await?;
        convert_binance_ticker_24(&raw)
    }

    #[instrument(skip(self), fields(exchange = "binance"))]
    async fn ticker_all_prices(&self) -> Result<Vec<PriceTicker>, ExchangeError> {
        let raw: Vec<BinancePriceTicker> = self
            .call(SignedRequest::new(Method::GET, endpoints::ALL_PRICES))
            .await?;
        raw.into_iter().map(convert_binance_price_ticker).collect()
    }

    #[instrument(skip(self), fields(exchange = "binance"))]
    async fn ticker_all_books(&self) -> Result<Vec<BookTicker>, ExchangeError> {
        let raw: Vec<BinanceBookTicker> = self
            .call(SignedRequest::new(Method::GET, endpoints::ALL_BOOK_TICKERS))
            .await?;
        raw.into_iter().map(convert_binance_book_ticker).collect()
    }

    #[instrument(skip(self, request), fields(exchange = "binance", symbol = %request.symbol))]
    async fn recent_trades(
        &self,
        request: RecentTradesRequest,
    ) -> Result<Vec<RecentTrade>, ExchangeError> {
        let raw: Vec<BinanceRecentTrade> = self
            .call(
                SignedRequest::new(Method::GET, endpoints::TRADES)
                    .param("symbol", &request.symbol)
                    .opt_param("limit", request.limit),
            )
            .await?;
        raw.iter().map(convert_binance_recent_trade).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Interval;
    use crate::exchanges::binance::rest::testing::{service, RecordingRest};
    use chrono::TimeZone;

    #[tokio::test]
    async fn test_time_is_numeric_millis() {
        let rest = RecordingRest::ok(r#"{"serverTime":1499827319559}"#);
        let time = service(&rest).time().await.unwrap();

        assert_eq!(time.timestamp_millis(), 1_499_827_319_559);
        let request = rest.last();
        assert_eq!(request.method, Method::GET);
        assert_eq!(request.endpoint, "api/v1/time");
        assert!(!request.needs_api_key);
    }

    #[tokio::test]
    async fn test_time_accepts_float_millis() {
        let rest = RecordingRest::ok(r#"{"serverTime":1499827319559.0}"#);
        let time = service(&rest).time().await.unwrap();
        assert_eq!(time.timestamp_millis(), 1_499_827_319_559);
    }

    #[tokio::test]
    async fn test_order_book_error_is_returned() {
        let rest = RecordingRest::respond(400, r#"{"code":-1121,"msg":"Invalid symbol."}"#);
        let err = service(&rest)
            .order_book(OrderBookRequest {
                symbol: "NOPE".to_string(),
                limit: None,
            })
            .await
            .unwrap_err();

        assert_eq!(err.api_code(), Some(-1121));
    }

    #[tokio::test]
    async fn test_klines_params() {
        let rest = RecordingRest::ok(
            r#"[[1499040000000,"0.01634790","0.80000000","0.01575800","0.01577100",
                "148976.11427815",1499644799999,"2434.19055334",308,"1756.87402397",
                "28.46694368","17928899.62484339"]]"#,
        );
        let klines = service(&rest)
            .klines(KlinesRequest {
                symbol: "ETHBTC".to_string(),
                interval: Interval::Minutes15,
                limit: Some(0),
                start_time: None,
                end_time: Some(Utc.timestamp_millis_opt(1_499_644_799_999).unwrap()),
            })
            .await
            .unwrap();

        assert_eq!(klines.len(), 1);
        assert_eq!(klines[0].number_of_trades, 308);

        let params = rest.last().params;
        assert_eq!(params["symbol"], "ETHBTC");
        assert_eq!(params["interval"], "15m");
        assert_eq!(params["limit"], "0");
        assert_eq!(params["endTime"], "1499644799999");
        assert!(!params.contains_key("startTime"));
    }

    #[tokio::test]
    async fn test_agg_trades_omit_unset_filters() {
        let rest = RecordingRest::ok(
            r#"[{"a":26129,"p":"0.01633102","q":"4.70443515","f":27781,"l":27781,
                "T":1498793709153,"m":true,"M":true}]"#,
        );
        let trades = service(&rest)
            .agg_trades(AggTradesRequest {
                symbol: "LTCBTC".to_string(),
                from_id: Some(26129),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(trades[0].id, 26129);
        assert_eq!(trades[0].price, 0.016_331_02);

        let params = rest.last().params;
        assert_eq!(params["fromId"], "26129");
        assert_eq!(params.len(), 2);
    }

    #[tokio::test]
    async fn test_ticker_24_decodes_ids() {
        let rest = RecordingRest::ok(
            r#"{"priceChange":"-94.99999800","priceChangePercent":"-95.960",
                "weightedAvgPrice":"0.29628482","prevClosePrice":"0.10002000",
                "lastPrice":"4.00000200","bidPrice":"4.00000000","askPrice":"4.00000200",
                "openPrice":"99.00000000","highPrice":"100.00000000","lowPrice":"0.10000000",
                "volume":"8913.30000000","openTime":1499783499040,"closeTime":1499869899040,
                "firstId":28385,"lastId":28460,"count":76}"#,
        );
        let ticker = service(&rest)
            .ticker_24(TickerRequest {
                symbol: "BNBBTC".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(ticker.price_change, -94.999_998);
        assert_eq!(ticker.first_id, 28385);
        assert_eq!(ticker.last_id, 28460);
        assert_eq!(ticker.count, 76);
    }

    #[tokio::test]
    async fn test_all_prices_and_ping() {
        let rest = RecordingRest::ok(r#"[{"symbol":"ETHBTC","price":"0.07946600"}]"#);
        let prices = service(&rest).ticker_all_prices().await.unwrap();
        assert_eq!(prices[0].symbol, "ETHBTC");
        assert_eq!(prices[0].price, 0.079_466);

        let rest = RecordingRest::ok("{}");
        service(&rest).ping().await.unwrap();
        assert_eq!(rest.last().endpoint, "api/v1/ping");
    }
}
