use crate::core::{
    errors::ExchangeError,
    kernel::{RestClient, SignedRequest},
    traits::UserDataStream,
    types::Stream,
};
use crate::exchanges::binance::{
    converters::convert_binance_listen_key,
    rest::{endpoints, ApiService},
    types::BinanceListenKey,
};
use async_trait::async_trait;
use reqwest::Method;
use serde::de::IgnoredAny;
use tracing::instrument;

fn listen_key_request(method: Method, stream: &Stream) -> SignedRequest {
    SignedRequest::new(method, endpoints::USER_DATA_STREAM)
        .param("listenKey", &stream.listen_key)
        .with_api_key()
}

// Listen key calls carry the API key header but no signature.
#[async_trait]
impl<R: RestClient> UserDataStream for ApiService<R> {
    #[instrument(skip(self), fields(exchange = "binance"))]
    async fn start_user_data_stream(&self) -> Result<Stream, ExchangeError> {
        let raw: BinanceListenKey = self
            .call(SignedRequest::new(Method::POST, endpoints::USER_DATA_STREAM).with_api_key())
            .await?;
        Ok(convert_binance_listen_key(raw))
    }

    #[instrument(skip(self, stream), fields(exchange = "binance"))]
    async fn keep_alive_user_data_stream(&self, stream: &Stream) -> Result<(), ExchangeError> {
        self.call::<IgnoredAny>(listen_key_request(Method::PUT, stream))
            .await?;
        Ok(())
    }

    #[instrument(skip(self, stream), fields(exchange = "binance"))]
    async fn close_user_data_stream(&self, stream: &Stream) -> Result<(), ExchangeError> {
        self.call::<IgnoredAny>(listen_key_request(Method::DELETE, stream))
            .await?;
        Ok(())
    }
}
