use crate::core::config::ConfigError;
use crate::core::errors::ExchangeError;
use crate::core::kernel::signer::Signer;
use async_trait::async_trait;
use reqwest::{Client, Method};
use secrecy::{ExposeSecret, Secret};
use std::collections::BTreeMap;
use std::fmt::Display;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, trace};
use url::form_urlencoded;

pub const API_KEY_HEADER: &str = "X-MBX-APIKEY";

/// A request ready to be encoded, optionally signed, and sent
///
/// Parameters live in a sorted map, so the encoded query is deterministic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    pub method: Method,
    pub endpoint: String,
    pub params: BTreeMap<String, String>,
    pub needs_api_key: bool,
    pub needs_signature: bool,
}

impl SignedRequest {
    pub fn new(method: Method, endpoint: impl Into<String>) -> Self {
        Self {
            method,
            endpoint: endpoint.into(),
            params: BTreeMap::new(),
            needs_api_key: false,
            needs_signature: false,
        }
    }

    /// Send the API key header
    pub fn with_api_key(mut self) -> Self {
        self.needs_api_key = true;
        self
    }

    /// Send the API key header and sign the query
    pub fn signed(mut self) -> Self {
        self.needs_api_key = true;
        self.needs_signature = true;
        self
    }

    pub fn param(mut self, key: &str, value: impl Display) -> Self {
        self.params.insert(key.to_string(), value.to_string());
        self
    }

    /// Insert the parameter only when a value is present
    pub fn opt_param<T: Display>(mut self, key: &str, value: Option<T>) -> Self {
        if let Some(value) = value {
            self.params.insert(key.to_string(), value.to_string());
        }
        self
    }

    /// Like [`Self::opt_param`], but an empty string also counts as unset
    pub fn opt_str(mut self, key: &str, value: Option<&str>) -> Self {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            self.params.insert(key.to_string(), value.to_string());
        }
        self
    }

    pub fn float_param(self, key: &str, value: f64) -> Self {
        self.param(key, format_float(value))
    }

    pub fn opt_float(self, key: &str, value: Option<f64>) -> Self {
        self.opt_param(key, value.map(format_float))
    }
}

/// Raw HTTP outcome, consumed exactly once by a decoder or the error classifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        self.status == 200
    }
}

/// Fixed-point rendering used for every float parameter
pub fn format_float(value: f64) -> String {
    format!("{:.10}", value)
}

/// `application/x-www-form-urlencoded` rendering of the sorted parameter map
pub fn encode_query(params: &BTreeMap<String, String>) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in params {
        serializer.append_pair(key, value);
    }
    serializer.finish()
}

/// Append `signature=<hex>` computed over exactly `query`
pub fn signed_query(query: &str, signer: &dyn Signer) -> String {
    let signature = signer.sign(query.as_bytes());
    if query.is_empty() {
        format!("signature={}", signature)
    } else {
        format!("{}&signature={}", query, signature)
    }
}

/// REST transport seam
///
/// Implementations turn a [`SignedRequest`] into exactly one HTTP exchange and
/// hand back the raw status and body. No retries.
#[async_trait]
pub trait RestClient: Send + Sync {
    async fn execute(&self, request: SignedRequest) -> Result<RawResponse, ExchangeError>;
}

/// Configuration for the REST client
#[derive(Clone, Debug)]
pub struct RestClientConfig {
    /// Base URL for the API
    pub base_url: String,
    /// Exchange name for logging and tracing
    pub exchange_name: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// User agent string to include in requests
    pub user_agent: String,
}

impl RestClientConfig {
    pub fn new(base_url: String, exchange_name: String) -> Self {
        Self {
            base_url,
            exchange_name,
            timeout_seconds: 30,
            user_agent: "binancex/0.1".to_string(),
        }
    }

    pub fn with_timeout(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }

    pub fn with_user_agent(mut self, user_agent: String) -> Self {
        self.user_agent = user_agent;
        self
    }
}

/// Builder for creating REST client instances
pub struct RestClientBuilder {
    config: RestClientConfig,
    signer: Option<Arc<dyn Signer>>,
    api_key: Option<Secret<String>>,
    cancel: CancellationToken,
}

impl RestClientBuilder {
    pub fn new(config: RestClientConfig) -> Self {
        Self {
            config,
            signer: None,
            api_key: None,
            cancel: CancellationToken::new(),
        }
    }

    /// Set the signer for signed requests
    pub fn with_signer(mut self, signer: Arc<dyn Signer>) -> Self {
        self.signer = Some(signer);
        self
    }

    /// Set the key sent in the API key header
    pub fn with_api_key(mut self, api_key: Secret<String>) -> Self {
        self.api_key = Some(api_key);
        self
    }

    /// In-flight requests fail with [`ExchangeError::Cancelled`] once this fires
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn build(self) -> Result<ReqwestRest, ExchangeError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(self.config.timeout_seconds))
            .user_agent(&self.config.user_agent)
            .build()
            .map_err(|e| {
                ConfigError::InvalidConfiguration(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(ReqwestRest {
            client,
            config: self.config,
            signer: self.signer,
            api_key: self.api_key,
            cancel: self.cancel,
        })
    }
}

/// Implementation of `RestClient` using reqwest
#[derive(Clone)]
pub struct ReqwestRest {
    client: Client,
    config: RestClientConfig,
    signer: Option<Arc<dyn Signer>>,
    api_key: Option<Secret<String>>,
    cancel: CancellationToken,
}

impl std::fmt::Debug for ReqwestRest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestRest")
            .field("config", &self.config)
            .field("has_signer", &self.signer.is_some())
            .field("has_api_key", &self.api_key.is_some())
            .finish_non_exhaustive()
    }
}

impl ReqwestRest {
    fn build_url(&self, endpoint: &str, query: &str) -> String {
        let base = self.config.base_url.trim_end_matches('/');
        if query.is_empty() {
            format!("{}/{}", base, endpoint)
        } else {
            format!("{}/{}?{}", base, endpoint, query)
        }
    }

    fn render_query(&self, request: &SignedRequest) -> Result<String, ExchangeError> {
        let query = encode_query(&request.params);
        if !request.needs_signature {
            return Ok(query);
        }
        let signer = self.signer.as_ref().ok_or_else(|| {
            ExchangeError::AuthError("Signature required but no signer provided".to_string())
        })?;
        Ok(signed_query(&query, signer.as_ref()))
    }

    async fn send(&self, request: SignedRequest) -> Result<RawResponse, ExchangeError> {
        let query = self.render_query(&request)?;
        debug!(query = %query, "sending request");

        let url = self.build_url(&request.endpoint, &query);
        let mut builder = self.client.request(request.method, url);

        if request.needs_api_key {
            let key = self.api_key.as_ref().ok_or_else(|| {
                ExchangeError::AuthError("API key required but none configured".to_string())
            })?;
            builder = builder.header(API_KEY_HEADER, key.expose_secret());
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();

        trace!(status, body = %String::from_utf8_lossy(&body), "response received");

        Ok(RawResponse { status, body })
    }
}

#[async_trait]
impl RestClient for ReqwestRest {
    #[instrument(
        skip(self, request),
        fields(
            exchange = %self.config.exchange_name,
            method = %request.method,
            endpoint = %request.endpoint
        )
    )]
    async fn execute(&self, request: SignedRequest) -> Result<RawResponse, ExchangeError> {
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(ExchangeError::Cancelled),
            result = self.send(request) => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::kernel::signer::HmacSigner;

    #[test]
    fn test_encode_query_is_sorted_and_escaped() {
        let request = SignedRequest::new(Method::GET, "api/v1/depth")
            .param("symbol", "ETHBTC")
            .param("limit", 5)
            .param("note", "a b&c");

        assert_eq!(
            encode_query(&request.params),
            "limit=5&note=a+b%26c&symbol=ETHBTC"
        );
    }

    #[test]
    fn test_signed_query_appends_signature_last() {
        let signer = HmacSigner::new("secret".to_string());
        let query = "symbol=ETHBTC&timestamp=1";
        let signed = signed_query(query, &signer);

        let (prefix, signature) = signed.rsplit_once("&signature=").unwrap();
        assert_eq!(prefix, query);
        assert_eq!(signature, signer.sign(query.as_bytes()));
    }

    #[test]
    fn test_optional_params_are_omitted_when_unset() {
        let request = SignedRequest::new(Method::GET, "api/v3/allOrders")
            .opt_param("orderId", None::<i64>)
            .opt_param("limit", Some(0))
            .opt_str("newClientOrderId", Some(""))
            .opt_str("symbol", Some("LTCBTC"))
            .opt_float("stopPrice", None);

        assert_eq!(encode_query(&request.params), "limit=0&symbol=LTCBTC");
    }

    #[test]
    fn test_float_params_are_fixed_point() {
        let request = SignedRequest::new(Method::POST, "api/v3/order")
            .float_param("price", 0.1)
            .opt_float("icebergQty", Some(2.0));

        assert_eq!(request.params["price"], "0.1000000000");
        assert_eq!(request.params["icebergQty"], "2.0000000000");
    }

    #[test]
    fn test_signed_sets_both_flags() {
        let request = SignedRequest::new(Method::GET, "api/v3/account").signed();
        assert!(request.needs_api_key);
        assert!(request.needs_signature);

        let keyed = SignedRequest::new(Method::PUT, "api/v1/userDataStream").with_api_key();
        assert!(keyed.needs_api_key);
        assert!(!keyed.needs_signature);
    }

    #[tokio::test]
    async fn test_signature_without_signer_is_auth_error() {
        let rest = RestClientBuilder::new(RestClientConfig::new(
            "http://127.0.0.1:9".to_string(),
            "binance".to_string(),
        ))
        .build()
        .unwrap();

        let err = rest
            .execute(SignedRequest::new(Method::GET, "api/v3/account").signed())
            .await
            .unwrap_err();
        assert!(matches!(err, ExchangeError::AuthError(_)));
    }

    #[tokio::test]
    async fn test_cancelled_token_short_circuits() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let rest = RestClientBuilder::new(RestClientConfig::new(
            "http://127.0.0.1:9".to_string(),
            "binance".to_string(),
        ))
        .with_cancellation(cancel)
        .build()
        .unwrap();

        let err = rest
            .execute(SignedRequest::new(Method::GET, "api/v1/ping"))
            .await
            .unwrap_err();
        assert!(matches!(err, ExchangeError::Cancelled));
    }
}
