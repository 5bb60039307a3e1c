use crate::core::{
    errors::ExchangeError,
    kernel::{RestClient, SignedRequest},
    traits::AccountInfo,
    types::{
        Account, AccountRequest, Deposit, HistoryRequest, MyTradesRequest, Trade, WithdrawRequest,
        WithdrawResult, Withdrawal,
    },
};
use crate::exchanges::binance::{
    converters::{
        convert_binance_account, convert_binance_deposit_history, convert_binance_trade,
        convert_binance_withdraw_history, convert_binance_withdraw_result,
    },
    rest::{endpoints, millis, signed_request, ApiService},
    types::{
        BinanceAccountInfo, BinanceDepositHistory, BinanceTrade, BinanceWithdrawHistory,
        BinanceWithdrawResult,
    },
};
use async_trait::async_trait;
use reqwest::Method;
use tracing::{instrument, warn};

fn history_params(endpoint: &str, request: &HistoryRequest) -> SignedRequest {
    signed_request(
        Method::POST,
        endpoint,
        request.timestamp,
        request.recv_window,
    )
    .opt_str("asset", request.asset.as_deref())
    .opt_param("status", request.status)
    .opt_param("startTime", millis(request.start_time))
    .opt_param("endTime", millis(request.end_time))
}

#[async_trait]
impl<R: RestClient> AccountInfo for ApiService<R> {
    #[instrument(skip(self, request), fields(exchange = "binance"))]
    async fn account(&self, request: AccountRequest) -> Result<Account, ExchangeError> {
        let raw: BinanceAccountInfo = self
            .call(signed_request(
                Method::GET,
                endpoints::ACCOUNT,
                request.timestamp,
                request.recv_window,
            ))
            .await?;
        convert_binance_account(raw)
    }

    #[instrument(skip(self, request), fields(exchange = "binance", symbol = %request.symbol))]
    async fn my_trades(&self, request: MyTradesRequest) -> Result<Vec<Trade>, ExchangeError> {
        let raw: Vec<BinanceTrade> = self
            .call(
                signed_request(
                    Method::GET,
                    endpoints::MY_TRADES,
                    request.timestamp,
                    request.recv_window,
                )
                .param("symbol", &request.symbol)
                .opt_param("limit", request.limit)
                .opt_param("fromId", request.from_id),
            )
            .await?;
        raw.into_iter().map(convert_binance_trade).collect()
    }

    #[instrument(skip(self, request), fields(exchange = "binance", asset = %request.asset))]
    async fn withdraw(&self, request: WithdrawRequest) -> Result<WithdrawResult, ExchangeError> {
        let raw: BinanceWithdrawResult = self
            .call(
                signed_request(
                    Method::POST,
                    endpoints::WITHDRAW,
                    request.timestamp,
                    request.recv_window,
                )
                .param("asset", &request.asset)
                .param("address", &request.address)
                .float_param("amount", request.amount)
                .opt_str("name", request.name.as_deref()),
            )
            .await?;

        if !raw.success {
            warn!(msg = %raw.msg, "withdrawal was not accepted");
        }
        Ok(convert_binance_withdraw_result(raw))
    }

    #[instrument(skip(self, request), fields(exchange = "binance"))]
    async fn deposit_history(
        &self,
        request: HistoryRequest,
    ) -> Result<Vec<Deposit>, ExchangeError> {
        let raw: BinanceDepositHistory = self
            .call(history_params(endpoints::DEPOSIT_HISTORY, &request))
            .await?;
        convert_binance_deposit_history(raw)
    }

    #[instrument(skip(self, request), fields(exchange = "binance"))]
    async fn withdraw_history(
        &self,
        request: HistoryRequest,
    ) -> Result<Vec<Withdrawal>, ExchangeError> {
        let raw: BinanceWithdrawHistory = self
            .call(history_params(endpoints::WITHDRAW_HISTORY, &request))
            .await?;
        convert_binance_withdraw_history(raw)
    }
}
