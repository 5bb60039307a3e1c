pub mod account;
pub mod builder;
pub mod client;
pub mod codec;
pub mod converters;
pub mod market_data;
pub mod rest;
pub mod streams;
pub mod trading;
pub mod types;
pub mod user_stream;

// Re-export main types for easier importing
pub use builder::{build_client, build_service, build_service_with_ws_config};
pub use client::Binance;
pub use codec::{AggTradeCodec, DepthCodec, KlineCodec, UserDataCodec};
pub use rest::ApiService;
