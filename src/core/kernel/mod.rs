/// Transport kernel
///
/// Exchange-agnostic plumbing shared by every endpoint and stream:
///
/// ## Transport Layer
/// - `RestClient`: one HTTP exchange per `SignedRequest`, raw status and body back
/// - `WsSession`: WebSocket connection management
/// - `spawn_subscription`: frame loop feeding a `Subscription`'s channels
///
/// ## Authentication
/// - `Signer`: pluggable signature interface
/// - `HmacSigner`: HMAC-SHA256, lowercase hex
///
/// ## Message Handling
/// - `WsCodec`: frame to typed event decoding
///
/// # Example
/// ```rust,no_run
/// use binancex::core::kernel::*;
/// use reqwest::Method;
/// use secrecy::Secret;
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let rest = RestClientBuilder::new(RestClientConfig::new(
///     "https://api.binance.com".to_string(),
///     "binance".to_string(),
/// ))
/// .with_signer(Arc::new(HmacSigner::new("secret".to_string())))
/// .with_api_key(Secret::new("key".to_string()))
/// .build()?;
///
/// let request = SignedRequest::new(Method::GET, "api/v3/account")
///     .param("timestamp", 1_499_827_319_559_i64)
///     .signed();
/// let response = rest.execute(request).await?;
/// println!("HTTP {}", response.status);
/// # Ok(())
/// # }
/// ```
pub mod codec;
pub mod rest;
pub mod signer;
pub mod ws;

// Re-export key types for convenience
pub use codec::WsCodec;
pub use rest::{
    encode_query, format_float, signed_query, RawResponse, ReqwestRest, RestClient,
    RestClientBuilder, RestClientConfig, SignedRequest,
};
pub use signer::{HmacSigner, Signer};
pub use ws::{spawn_subscription, Subscription, TungsteniteWs, WsConfig, WsSession};
