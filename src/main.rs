use anyhow::Context;
use binancex::{
    build_client, ExchangeConfig, OrderBookRequest, TradeWebsocketRequest,
};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Public endpoints work without credentials
    let config = load_config().unwrap_or_else(|e| {
        warn!(error = %e, "no credentials found, running read-only");
        ExchangeConfig::read_only()
    });

    let cancel = CancellationToken::new();
    let client = build_client(&config, cancel.clone()).context("failed to build client")?;

    let server_time = client.time().await.context("failed to fetch server time")?;
    info!(%server_time, "connected");

    let book = client
        .order_book(OrderBookRequest {
            symbol: "BNBBTC".to_string(),
            limit: Some(5),
        })
        .await?;
    for level in &book.bids {
        info!(price = level.price, quantity = level.quantity, "bid");
    }

    let subscription = client
        .trade_websocket(TradeWebsocketRequest {
            symbol: "BNBBTC".to_string(),
        })
        .await
        .context("failed to subscribe")?;
    let (mut events, done) = subscription.into_parts();

    let shutdown = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            shutdown.cancel();
        }
    });

    while let Some(event) = events.recv().await {
        info!(
            symbol = %event.event.symbol,
            price = event.trade.price,
            quantity = event.trade.quantity,
            "aggregate trade"
        );
    }

    let _ = done.await;
    info!("subscription closed");
    Ok(())
}

#[cfg(feature = "env-file")]
fn load_config() -> Result<ExchangeConfig, binancex::core::config::ConfigError> {
    ExchangeConfig::from_env_file("BINANCE")
}

#[cfg(not(feature = "env-file"))]
fn load_config() -> Result<ExchangeConfig, binancex::core::config::ConfigError> {
    ExchangeConfig::from_env("BINANCE")
}
