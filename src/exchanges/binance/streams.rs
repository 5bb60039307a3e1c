use crate::core::{
    errors::ExchangeError,
    kernel::{spawn_subscription, RestClient, Subscription, TungsteniteWs, WsCodec, WsSession},
    traits::StreamSource,
    types::{
        AccountEvent, AggTradeEvent, DepthEvent, DepthWebsocketRequest, Interval, KlineEvent,
        KlineWebsocketRequest, TradeWebsocketRequest, UserDataWebsocketRequest,
    },
};
use crate::exchanges::binance::{
    codec::{AggTradeCodec, DepthCodec, KlineCodec, UserDataCodec},
    rest::ApiService,
};
use async_trait::async_trait;
use tracing::{info, instrument};

pub fn depth_path(symbol: &str) -> String {
    format!("{}@depth", symbol.to_lowercase())
}

pub fn kline_path(symbol: &str, interval: Interval) -> String {
    format!("{}@kline_{}", symbol.to_lowercase(), interval)
}

pub fn agg_trade_path(symbol: &str) -> String {
    format!("{}@aggTrade", symbol.to_lowercase())
}

impl<R: RestClient> ApiService<R> {
    fn stream_endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.stream_url.trim_end_matches('/'), path)
    }

    /// Dial `path` and hand the connection to a frame loop. Connect failures
    /// are returned here; everything after surfaces through the subscription.
    async fn subscribe<C: WsCodec>(
        &self,
        path: &str,
        codec: C,
    ) -> Result<Subscription<C::Message>, ExchangeError> {
        let url = self.stream_endpoint(path);
        let mut session =
            TungsteniteWs::new(url.clone(), "binance".to_string()).with_config(self.ws_config.clone());

        tokio::select! {
            biased;
            () = self.cancel.cancelled() => return Err(ExchangeError::Cancelled),
            result = session.connect() => result?,
        }
        info!(url = %url, "subscription opened");

        Ok(spawn_subscription(
            session,
            codec,
            self.cancel.child_token(),
            self.ws_config.message_buffer_size,
        ))
    }
}

#[async_trait]
impl<R: RestClient> StreamSource for ApiService<R> {
    #[instrument(skip(self, request), fields(exchange = "binance", symbol = %request.symbol))]
    async fn depth_websocket(
        &self,
        request: DepthWebsocketRequest,
    ) -> Result<Subscription<DepthEvent>, ExchangeError> {
        self.subscribe(&depth_path(&request.symbol), DepthCodec).await
    }

    #[instrument(skip(self, request), fields(exchange = "binance", symbol = %request.symbol))]
    async fn kline_websocket(
        &self,
        request: KlineWebsocketRequest,
    ) -> Result<Subscription<KlineEvent>, ExchangeError> {
        self.subscribe(&kline_path(&request.symbol, request.interval), KlineCodec)
            .await
    }

    #[instrument(skip(self, request), fields(exchange = "binance", symbol = %request.symbol))]
    async fn trade_websocket(
        &self,
        request: TradeWebsocketRequest,
    ) -> Result<Subscription<AggTradeEvent>, ExchangeError> {
        self.subscribe(&agg_trade_path(&request.symbol), AggTradeCodec)
            .await
    }

    #[instrument(skip(self, request), fields(exchange = "binance"))]
    async fn user_data_websocket(
        &self,
        request: UserDataWebsocketRequest,
    ) -> Result<Subscription<AccountEvent>, ExchangeError> {
        self.subscribe(&request.listen_key, UserDataCodec).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchanges::binance::rest::testing::{service, RecordingRest};

    #[test]
    fn test_stream_paths() {
        assert_eq!(depth_path("ETHBTC"), "ethbtc@depth");
        assert_eq!(kline_path("ETHBTC", Interval::Month1), "ethbtc@kline_1M");
        assert_eq!(agg_trade_path("BnbBtc"), "bnbbtc@aggTrade");
    }

    #[test]
    fn test_stream_endpoint_joins_base() {
        let rest = RecordingRest::ok("{}");
        let svc = service(&rest);
        assert_eq!(
            svc.stream_endpoint(&depth_path("ETHBTC")),
            "ws://127.0.0.1:9/ws/ethbtc@depth"
        );
    }

    #[tokio::test]
    async fn test_cancelled_service_refuses_to_subscribe() {
        let rest = RecordingRest::ok("{}");
        let svc = service(&rest);
        svc.cancellation().cancel();

        let err = svc
            .trade_websocket(TradeWebsocketRequest {
                symbol: "BNBBTC".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ExchangeError::Cancelled));
    }

    #[tokio::test]
    async fn test_connect_failure_is_returned() {
        let rest = RecordingRest::ok("{}");
        let err = service(&rest)
            .depth_websocket(DepthWebsocketRequest {
                symbol: "BNBBTC".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ExchangeError::NetworkError(_)));
    }
}
