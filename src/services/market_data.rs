// src/services/market_data.rs
use std::future::Future;

use reqwest::Client;

use crate::config::AppConfig;
use crate::models::{IncomeStatementFact, MacroInputs, PriceHistoryPoint, TickerProfile};
use crate::services::fmp::FmpClient;
use crate::services::yahoo::YahooClient;

/// Everything the valuation and report code needs from upstream sources.
///
/// Implementations never fail: missing, malformed or unreachable data comes
/// back as `None` (or an empty series) and is logged by the implementation.
pub trait MarketData {
    fn fetch_profile(&self, ticker: &str) -> impl Future<Output = TickerProfile> + Send;

    fn fetch_total_debt(&self, ticker: &str) -> impl Future<Output = Option<f64>> + Send;

    fn fetch_income_facts(&self, ticker: &str)
        -> impl Future<Output = IncomeStatementFact> + Send;

    fn fetch_roic(&self, ticker: &str) -> impl Future<Output = Option<f64>> + Send;

    /// Ascending by date; may be empty.
    fn fetch_price_history(&self, ticker: &str)
        -> impl Future<Output = Vec<PriceHistoryPoint>> + Send;

    fn fetch_shares_outstanding(&self, ticker: &str) -> impl Future<Output = Option<u64>> + Send;

    fn fetch_risk_free_rate(&self) -> impl Future<Output = Option<f64>> + Send;

    fn fetch_market_risk_premium(&self) -> impl Future<Output = Option<f64>> + Send;

    /// Both macro inputs, fetched fresh on every call.
    fn fetch_macro_inputs(&self) -> impl Future<Output = MacroInputs> + Send
    where
        Self: Sync,
    {
        async move {
            let (risk_free_rate, market_risk_premium) =
                tokio::join!(self.fetch_risk_free_rate(), self.fetch_market_risk_premium());
            MacroInputs {
                risk_free_rate,
                market_risk_premium,
            }
        }
    }
}

/// FMP for fundamentals, prices and macro inputs; Yahoo for shares outstanding.
#[derive(Clone)]
pub struct MarketDataClient {
    fmp: FmpClient,
    yahoo: YahooClient,
}

impl MarketDataClient {
    pub fn new(config: &AppConfig) -> Self {
        let client = Client::new();
        MarketDataClient {
            fmp: FmpClient::new(client.clone(), config.fmp_base_url.clone(), config.fmp_api_key.clone()),
            yahoo: YahooClient::new(client, config.yahoo_base_url.clone()),
        }
    }
}

impl MarketData for MarketDataClient {
    async fn fetch_profile(&self, ticker: &str) -> TickerProfile {
        self.fmp.fetch_profile(ticker).await
    }

    async fn fetch_total_debt(&self, ticker: &str) -> Option<f64> {
        self.fmp.fetch_total_debt(ticker).await
    }

    async fn fetch_income_facts(&self, ticker: &str) -> IncomeStatementFact {
        self.fmp.fetch_income_facts(ticker).await
    }

    async fn fetch_roic(&self, ticker: &str) -> Option<f64> {
        self.fmp.fetch_roic(ticker).await
    }

    async fn fetch_price_history(&self, ticker: &str) -> Vec<PriceHistoryPoint> {
        self.fmp.fetch_price_history(ticker).await
    }

    async fn fetch_shares_outstanding(&self, ticker: &str) -> Option<u64> {
        self.yahoo.fetch_shares_outstanding(ticker).await
    }

    async fn fetch_risk_free_rate(&self) -> Option<f64> {
        self.fmp.fetch_risk_free_rate().await
    }

    async fn fetch_market_risk_premium(&self) -> Option<f64> {
        self.fmp.fetch_market_risk_premium().await
    }
}
