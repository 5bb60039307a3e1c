use crate::core::config::ExchangeConfig;
use crate::core::errors::ExchangeError;
use crate::core::kernel::{HmacSigner, ReqwestRest, RestClientBuilder, RestClientConfig, WsConfig};
use crate::exchanges::binance::{client::Binance, rest::ApiService};
use secrecy::Secret;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Build the REST-backed service
///
/// Credentials are optional: without them public endpoints and market
/// streams work, and signed calls fail with [`ExchangeError::AuthError`].
pub fn build_service(
    config: &ExchangeConfig,
    cancel: CancellationToken,
) -> Result<ApiService<ReqwestRest>, ExchangeError> {
    let rest_config = RestClientConfig::new(config.rest_base_url().to_string(), "binance".to_string())
        .with_timeout(config.timeout_seconds);

    let mut rest_builder = RestClientBuilder::new(rest_config).with_cancellation(cancel.clone());

    if config.has_credentials() {
        let signer = Arc::new(HmacSigner::new(config.secret_key().to_string()));
        rest_builder = rest_builder
            .with_signer(signer)
            .with_api_key(Secret::new(config.api_key().to_string()));
    }

    let rest = rest_builder.build()?;

    info!(
        base_url = %config.rest_base_url(),
        stream_url = %config.stream_base_url(),
        authenticated = config.has_credentials(),
        "binance service configured"
    );

    Ok(ApiService::new(rest, config.stream_base_url(), cancel))
}

/// Build the service with custom subscription settings
pub fn build_service_with_ws_config(
    config: &ExchangeConfig,
    cancel: CancellationToken,
    ws_config: WsConfig,
) -> Result<ApiService<ReqwestRest>, ExchangeError> {
    Ok(build_service(config, cancel)?.with_ws_config(ws_config))
}

/// Build the facade over the REST-backed service
pub fn build_client(
    config: &ExchangeConfig,
    cancel: CancellationToken,
) -> Result<Binance<ApiService<ReqwestRest>>, ExchangeError> {
    build_service(config, cancel).map(Binance::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::traits::AccountInfo;
    use crate::core::types::AccountRequest;

    #[test]
    fn test_build_uses_config_urls() {
        let config = ExchangeConfig::read_only()
            .base_url("http://127.0.0.1:9".to_string())
            .stream_url("ws://127.0.0.1:9/ws".to_string());

        let service = build_service(&config, CancellationToken::new()).unwrap();
        assert_eq!(service.stream_url(), "ws://127.0.0.1:9/ws");
    }

    #[tokio::test]
    async fn test_read_only_client_rejects_signed_calls() {
        let config = ExchangeConfig::read_only().base_url("http://127.0.0.1:9".to_string());
        let service = build_service(&config, CancellationToken::new()).unwrap();

        let err = service
            .account(AccountRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ExchangeError::AuthError(_)));
    }

    #[test]
    fn test_build_client_shares_cancellation() {
        let cancel = CancellationToken::new();
        let client = build_client(&ExchangeConfig::read_only(), cancel.clone()).unwrap();

        cancel.cancel();
        assert!(client.service().cancellation().is_cancelled());
    }
}
