pub mod core;
pub mod exchanges;

pub use crate::core::{
    config::ExchangeConfig,
    errors::ExchangeError,
    kernel::Subscription,
    traits::{AccountInfo, MarketDataSource, OrderPlacer, Service, StreamSource, UserDataStream},
    types::*,
};
pub use crate::exchanges::binance::{build_client, build_service, ApiService, Binance};
