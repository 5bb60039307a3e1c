//! Shared fixtures for the integration tests

use binancex::{build_service, ApiService, ExchangeConfig};
use binancex::core::kernel::ReqwestRest;
use tokio_util::sync::CancellationToken;
use wiremock::MockServer;

#[allow(dead_code)]
pub const API_KEY: &str = "vmPUZE6mv9SD5VNHk4HlWFsOr6aKE2zvsw0MuIgwCIPy6utIco14y7Ju91duEh8A";
#[allow(dead_code)]
pub const SECRET_KEY: &str = "NhqPtmdSJYdKjVHjA7PZj4Mge3R5YNiP1e3UZjInClVN65XAbvqqM6A7H5fATj0j";

#[allow(dead_code)]
pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

#[allow(dead_code)]
pub fn signed_service(server: &MockServer) -> ApiService<ReqwestRest> {
    let config = ExchangeConfig::new(API_KEY.to_string(), SECRET_KEY.to_string())
        .base_url(server.uri());
    build_service(&config, CancellationToken::new()).expect("service should build")
}

#[allow(dead_code)]
pub fn stream_service(stream_url: String, cancel: CancellationToken) -> ApiService<ReqwestRest> {
    let config = ExchangeConfig::read_only()
        .base_url("http://127.0.0.1:9".to_string())
        .stream_url(stream_url);
    build_service(&config, cancel).expect("service should build")
}
