use crate::core::{
    errors::ExchangeError,
    kernel::{RestClient, SignedRequest},
    traits::OrderPlacer,
    types::{
        AllOrdersRequest, CancelOrderRequest, CanceledOrder, ExecutedOrder, NewOrderRequest,
        OpenOrdersRequest, ProcessedOrder, QueryOrderRequest,
    },
};
use crate::exchanges::binance::{
    converters::{
        convert_binance_canceled_order, convert_binance_executed_order,
        convert_binance_processed_order,
    },
    rest::{endpoints, signed_request, ApiService},
    types::{BinanceCanceledOrder, BinanceExecutedOrder, BinanceProcessedOrder},
};
use async_trait::async_trait;
use reqwest::Method;
use serde::de::IgnoredAny;
use tracing::instrument;

fn new_order_params(endpoint: &str, request: &NewOrderRequest) -> SignedRequest {
    signed_request(
        Method::POST,
        endpoint,
        request.timestamp,
        request.recv_window,
    )
    .param("symbol", &request.symbol)
    .param("side", request.side)
    .param("type", request.order_type)
    .opt_param("timeInForce", request.time_in_force)
    .float_param("quantity", request.quantity)
    .opt_float("price", request.price)
    .opt_str("newClientOrderId", request.new_client_order_id.as_deref())
    .opt_float("stopPrice", request.stop_price)
    .opt_float("icebergQty", request.iceberg_qty)
}

fn executed_orders(raw: Vec<BinanceExecutedOrder>) -> Result<Vec<ExecutedOrder>, ExchangeError> {
    raw.into_iter().map(convert_binance_executed_order).collect()
}

#[async_trait]
impl<R: RestClient> OrderPlacer for ApiService<R> {
    #[instrument(
        skip(self, request),
        fields(exchange = "binance", symbol = %request.symbol, side = %request.side)
    )]
    async fn new_order(&self, request: NewOrderRequest) -> Result<ProcessedOrder, ExchangeError> {
        let raw: BinanceProcessedOrder = self
            .call(new_order_params(endpoints::ORDER, &request))
            .await?;
        convert_binance_processed_order(raw)
    }

    #[instrument(
        skip(self, request),
        fields(exchange = "binance", symbol = %request.symbol, side = %request.side)
    )]
    async fn new_order_test(&self, request: NewOrderRequest) -> Result<(), ExchangeError> {
        self.call::<IgnoredAny>(new_order_params(endpoints::ORDER_TEST, &request))
            .await?;
        Ok(())
    }

    #[instrument(skip(self, request), fields(exchange = "binance", symbol = %request.symbol))]
    async fn query_order(
        &self,
        request: QueryOrderRequest,
    ) -> Result<ExecutedOrder, ExchangeError> {
        let raw: BinanceExecutedOrder = self
            .call(
                signed_request(
                    Method::GET,
                    endpoints::ORDER,
                    request.timestamp,
                    request.recv_window,
                )
                .param("symbol", &request.symbol)
                .opt_param("orderId", request.order_id)
                .opt_str("origClientOrderId", request.orig_client_order_id.as_deref()),
            )
            .await?;
        convert_binance_executed_order(raw)
    }

    #[instrument(skip(self, request), fields(exchange = "binance", symbol = %request.symbol))]
    async fn cancel_order(
        &self,
        request: CancelOrderRequest,
    ) -> Result<CanceledOrder, ExchangeError> {
        let raw: BinanceCanceledOrder = self
            .call(
                signed_request(
                    Method::DELETE,
                    endpoints::ORDER,
                    request.timestamp,
                    request.recv_window,
                )
                .param("symbol", &request.symbol)
                .opt_param("orderId", request.order_id)
                .opt_str("origClientOrderId", request.orig_client_order_id.as_deref())
                .opt_str("newClientOrderId", request.new_client_order_id.as_deref()),
            )
            .await?;
        Ok(convert_binance_canceled_order(raw))
    }

    #[instrument(skip(self, request), fields(exchange = "binance", symbol = %request.symbol))]
    async fn open_orders(
        &self,
        request: OpenOrdersRequest,
    ) -> Result<Vec<ExecutedOrder>, ExchangeError> {
        let raw: Vec<BinanceExecutedOrder> = self
            .call(
                signed_request(
                    Method::GET,
                    endpoints::OPEN_ORDERS,
                    request.timestamp,
                    request.recv_window,
                )
                .param("symbol", &request.symbol),
            )
            .await?;
        executed_orders(raw)
    }

    #[instrument(skip(self, request), fields(exchange = "binance", symbol = %request.symbol))]
    async fn all_orders(
        &self,
        request: AllOrdersRequest,
    ) -> Result<Vec<ExecutedOrder>, ExchangeError> {
        let raw: Vec<BinanceExecutedOrder> = self
            .call(
                signed_request(
                    Method::GET,
                    endpoints::ALL_ORDERS,
                    request.timestamp,
                    request.recv_window,
                )
                .param("symbol", &request.symbol)
                .opt_param("orderId", request.order_id)
                .opt_param("limit", request.limit),
            )
            .await?;
        executed_orders(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{OrderSide, OrderStatus, TimeInForce};
    use crate::exchanges::binance::rest::testing::{service, RecordingRest};
    use chrono::{TimeZone, Utc};
    use std::time::Duration;

    #[tokio::test]
    async fn test_limit_order_params() {
        let rest = RecordingRest::ok(
            r#"{"symbol":"BNBETH","orderId":37,"clientOrderId":"ord-1","transactTime":1507725176595}"#,
        );
        let mut request = NewOrderRequest::limit("BNBETH", OrderSide::Buy, 1.0, 0.1);
        request.new_client_order_id = Some("ord-1".to_string());
        request.recv_window = Some(Duration::from_millis(5000));
        request.timestamp = Some(Utc.timestamp_millis_opt(1_507_725_176_000).unwrap());

        let order = service(&rest).new_order(request).await.unwrap();
        assert_eq!(order.order_id, 37);
        assert_eq!(order.transact_time.timestamp_millis(), 1_507_725_176_595);

        let sent = rest.last();
        assert_eq!(sent.method, Method::POST);
        assert_eq!(sent.endpoint, "api/v3/order");
        assert!(sent.needs_signature);
        assert_eq!(sent.params["side"], "BUY");
        assert_eq!(sent.params["type"], "LIMIT");
        assert_eq!(sent.params["timeInForce"], "GTC");
        assert_eq!(sent.params["quantity"], "1.0000000000");
        assert_eq!(sent.params["price"], "0.1000000000");
        assert_eq!(sent.params["newClientOrderId"], "ord-1");
        assert_eq!(sent.params["recvWindow"], "5000");
        assert_eq!(sent.params["timestamp"], "1507725176000");
        assert!(!sent.params.contains_key("stopPrice"));
        assert!(!sent.params.contains_key("icebergQty"));
    }

    #[tokio::test]
    async fn test_market_order_omits_price_and_time_in_force() {
        let rest = RecordingRest::ok("{}");
        service(&rest)
            .new_order_test(NewOrderRequest::market("BNBETH", OrderSide::Sell, 2.5))
            .await
            .unwrap();

        let sent = rest.last();
        assert_eq!(sent.endpoint, "api/v3/order/test");
        assert_eq!(sent.params["type"], "MARKET");
        assert!(!sent.params.contains_key("price"));
        assert!(!sent.params.contains_key("timeInForce"));
        assert!(sent.params.contains_key("timestamp"));
    }

    #[tokio::test]
    async fn test_new_order_rejection() {
        let rest = RecordingRest::respond(400, r#"{"code":-1105,"msg":"Parameter 'side' was empty."}"#);
        let err = service(&rest)
            .new_order(NewOrderRequest::limit("BNBETH", OrderSide::Buy, 1.0, 0.1))
            .await
            .unwrap_err();

        match err {
            ExchangeError::ApiError { code, message } => {
                assert_eq!(code, -1105);
                assert_eq!(message, "Parameter 'side' was empty.");
            }
            other => panic!("Expected ApiError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_query_order_by_client_id() {
        let rest = RecordingRest::ok(
            r#"{"symbol":"LTCBTC","orderId":1,"clientOrderId":"myOrder1","price":"0.1",
                "origQty":"1.0","executedQty":"0.0","status":"NEW","timeInForce":"GTC",
                "type":"LIMIT","side":"BUY","stopPrice":"0.0","icebergQty":"0.0",
                "time":1499827319559}"#,
        );
        let order = service(&rest)
            .query_order(QueryOrderRequest {
                symbol: "LTCBTC".to_string(),
                orig_client_order_id: Some("myOrder1".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(order.status, OrderStatus::New);
        assert_eq!(order.time_in_force, TimeInForce::GTC);

        let params = rest.last().params;
        assert_eq!(params["origClientOrderId"], "myOrder1");
        assert!(!params.contains_key("orderId"));
    }

    #[tokio::test]
    async fn test_cancel_order_uses_delete() {
        let rest = RecordingRest::ok(
            r#"{"symbol":"LTCBTC","origClientOrderId":"myOrder1","orderId":1,"clientOrderId":"cancelMyOrder1"}"#,
        );
        let canceled = service(&rest)
            .cancel_order(CancelOrderRequest {
                symbol: "LTCBTC".to_string(),
                order_id: Some(1),
                new_client_order_id: Some(String::new()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(canceled.client_order_id, "cancelMyOrder1");
        let sent = rest.last();
        assert_eq!(sent.method, Method::DELETE);
        assert_eq!(sent.params["orderId"], "1");
        assert!(!sent.params.contains_key("newClientOrderId"));
    }

    #[tokio::test]
    async fn test_all_orders_sends_zero_order_id() {
        let rest = RecordingRest::ok("[]");
        let orders = service(&rest)
            .all_orders(AllOrdersRequest {
                symbol: "LTCBTC".to_string(),
                order_id: Some(0),
                ..Default::default()
            })
            .await
            .unwrap();

        assert!(orders.is_empty());
        let params = rest.last().params;
        assert_eq!(params["orderId"], "0");
        assert!(!params.contains_key("limit"));
    }
}
