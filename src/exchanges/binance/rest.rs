use crate::core::errors::{classify_error_response, ExchangeError};
use crate::core::kernel::{RestClient, SignedRequest, WsConfig};
use crate::core::types::conversion::decode_json;
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// REST paths, relative to the configured base URL
pub mod endpoints {
    pub const PING: &str = "api/v1/ping";
    pub const TIME: &str = "api/v1/time";
    pub const DEPTH: &str = "api/v1/depth";
    pub const AGG_TRADES: &str = "api/v1/aggTrades";
    pub const KLINES: &str = "api/v1/klines";
    pub const TICKER_24HR: &str = "api/v1/ticker/24hr";
    pub const ALL_PRICES: &str = "api/v1/ticker/allPrices";
    pub const ALL_BOOK_TICKERS: &str = "api/v1/ticker/allBookTickers";
    pub const TRADES: &str = "api/v1/trades";
    pub const ORDER: &str = "api/v3/order";
    pub const ORDER_TEST: &str = "api/v3/order/test";
    pub const OPEN_ORDERS: &str = "api/v3/openOrders";
    pub const ALL_ORDERS: &str = "api/v3/allOrders";
    pub const ACCOUNT: &str = "api/v3/account";
    pub const MY_TRADES: &str = "api/v3/myTrades";
    pub const WITHDRAW: &str = "wapi/v1/withdraw.html";
    pub const DEPOSIT_HISTORY: &str = "wapi/v1/getDepositHistory.html";
    pub const WITHDRAW_HISTORY: &str = "wapi/v1/getWithdrawHistory.html";
    pub const USER_DATA_STREAM: &str = "api/v1/userDataStream";
}

/// Binance service over a pluggable REST transport
///
/// Implements every capability trait in [`crate::core::traits`]. REST calls go
/// through `rest`; subscriptions dial `stream_url` and are torn down by child
/// tokens of `cancel`.
pub struct ApiService<R: RestClient> {
    pub(super) rest: R,
    pub(super) stream_url: String,
    pub(super) cancel: CancellationToken,
    pub(super) ws_config: WsConfig,
}

impl<R: RestClient> ApiService<R> {
    pub fn new(rest: R, stream_url: impl Into<String>, cancel: CancellationToken) -> Self {
        Self {
            rest,
            stream_url: stream_url.into(),
            cancel,
            ws_config: WsConfig::default(),
        }
    }

    pub fn with_ws_config(mut self, ws_config: WsConfig) -> Self {
        self.ws_config = ws_config;
        self
    }

    pub fn stream_url(&self) -> &str {
        &self.stream_url
    }

    /// Token that tears down in-flight calls and subscriptions
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Execute `request` and decode a 200 body as `T`. Any other status goes
    /// to the error classifier.
    pub(super) async fn call<T: DeserializeOwned>(
        &self,
        request: SignedRequest,
    ) -> Result<T, ExchangeError> {
        let endpoint = request.endpoint.clone();
        let response = self.rest.execute(request).await?;

        if !response.is_success() {
            return Err(classify_error_response(response.status, &response.body));
        }

        decode_json(&endpoint, &response.body)
            .inspect_err(|e| debug!(endpoint = %endpoint, error = %e, "failed to decode response"))
    }
}

/// Signed request carrying `timestamp` (now if unset) and optionally
/// `recvWindow` in milliseconds
pub(super) fn signed_request(
    method: Method,
    endpoint: &str,
    timestamp: Option<DateTime<Utc>>,
    recv_window: Option<Duration>,
) -> SignedRequest {
    let timestamp = timestamp.unwrap_or_else(Utc::now);
    SignedRequest::new(method, endpoint)
        .param("timestamp", timestamp.timestamp_millis())
        .opt_param("recvWindow", recv_window.map(|w| w.as_millis()))
        .signed()
}

/// Millisecond epoch for time filters
pub(super) fn millis(time: Option<DateTime<Utc>>) -> Option<i64> {
    time.map(|t| t.timestamp_millis())
}
