// src/services/fmp.rs
use anyhow::{anyhow, bail, Result};
use chrono::{Duration, NaiveDate, Utc};
use log::{error, info, warn};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::models::{IncomeStatementFact, PriceHistoryPoint, TickerProfile};
use crate::services::coerce::{opt_f64, to_text};

/// Days looked back when searching for the latest 10-year treasury yield.
pub const TREASURY_LOOKBACK_DAYS: i64 = 30;

// Wire shapes. Every field stays a raw `Value` until coerced so a single bad
// field never discards the whole entry.

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProfileEntry {
    mkt_cap: Option<Value>,
    price: Option<Value>,
    beta: Option<Value>,
    sector: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BalanceSheetEntry {
    total_debt: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IncomeStatementEntry {
    interest_expense: Option<Value>,
    income_before_tax: Option<Value>,
    income_tax_expense: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct KeyMetricsEntry {
    roic: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct HistoricalPriceResponse {
    #[serde(default)]
    historical: Vec<HistoricalEntry>,
}

#[derive(Debug, Default, Deserialize)]
struct HistoricalEntry {
    date: Option<Value>,
    close: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreasuryEntry {
    pub date: Option<Value>,
    pub ten_year: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MarketRiskPremiumEntry {
    market_risk_premium: Option<Value>,
}

impl From<ProfileEntry> for TickerProfile {
    fn from(entry: ProfileEntry) -> Self {
        TickerProfile {
            market_cap: opt_f64(entry.mkt_cap.as_ref()),
            price: opt_f64(entry.price.as_ref()),
            beta: opt_f64(entry.beta.as_ref()),
            sector: to_text(entry.sector.as_ref()),
        }
    }
}

impl From<IncomeStatementEntry> for IncomeStatementFact {
    fn from(entry: IncomeStatementEntry) -> Self {
        IncomeStatementFact {
            interest_expense: opt_f64(entry.interest_expense.as_ref()),
            income_before_tax: opt_f64(entry.income_before_tax.as_ref()),
            tax_expense: opt_f64(entry.income_tax_expense.as_ref()),
        }
    }
}

/// Read-only client for the Financial Modeling Prep REST API.
#[derive(Clone)]
pub struct FmpClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl FmpClient {
    pub fn new(client: Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        FmpClient {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)?;
        url.path_segments_mut()
            .map_err(|_| anyhow!("FMP base URL cannot take a path: {}", self.base_url))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json(&self, segments: &[&str], query: &[(&str, String)]) -> Result<Value> {
        let url = self.endpoint(segments)?;
        info!("Fetching FMP data from URL: {}", url);

        let response = self
            .client
            .get(url)
            .query(query)
            .query(&[("apikey", self.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            bail!("FMP responded with status {} for /{}", status, segments.join("/"));
        }

        Ok(response.json::<Value>().await?)
    }

    /// GETs a list endpoint and returns its first entry, or `None` when the
    /// call fails, the body is not a list, or the list is empty.
    async fn first_entry<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
        what: &str,
    ) -> Option<T> {
        let body = match self.get_json(segments, query).await {
            Ok(body) => body,
            Err(e) => {
                error!("Failed to fetch {}: {:#}", what, e);
                return None;
            }
        };

        match serde_json::from_value::<Vec<T>>(body) {
            Ok(entries) => {
                let first = entries.into_iter().next();
                if first.is_none() {
                    warn!("Empty {} response", what);
                }
                first
            }
            Err(e) => {
                warn!("Unexpected {} response shape: {}", what, e);
                None
            }
        }
    }

    pub async fn fetch_profile(&self, ticker: &str) -> TickerProfile {
        self.first_entry::<ProfileEntry>(
            &["api", "v3", "profile", ticker],
            &[],
            &format!("[{ticker}] profile"),
        )
        .await
        .map(TickerProfile::from)
        .unwrap_or_default()
    }

    pub async fn fetch_total_debt(&self, ticker: &str) -> Option<f64> {
        let entry = self
            .first_entry::<BalanceSheetEntry>(
                &["api", "v3", "balance-sheet-statement", ticker],
                &[("limit", "1".to_string())],
                &format!("[{ticker}] balance sheet"),
            )
            .await?;
        opt_f64(entry.total_debt.as_ref())
    }

    pub async fn fetch_income_facts(&self, ticker: &str) -> IncomeStatementFact {
        self.first_entry::<IncomeStatementEntry>(
            &["api", "v3", "income-statement", ticker],
            &[("limit", "1".to_string())],
            &format!("[{ticker}] income statement"),
        )
        .await
        .map(IncomeStatementFact::from)
        .unwrap_or_default()
    }

    pub async fn fetch_roic(&self, ticker: &str) -> Option<f64> {
        let entry = self
            .first_entry::<KeyMetricsEntry>(
                &["api", "v3", "key-metrics", ticker],
                &[("limit", "1".to_string())],
                &format!("[{ticker}] key metrics"),
            )
            .await?;
        opt_f64(entry.roic.as_ref())
    }

    /// Daily closes, ascending by date. Empty when unavailable.
    pub async fn fetch_price_history(&self, ticker: &str) -> Vec<PriceHistoryPoint> {
        let body = match self
            .get_json(
                &["api", "v3", "historical-price-full", ticker],
                &[("serietype", "line".to_string())],
            )
            .await
        {
            Ok(body) => body,
            Err(e) => {
                error!("[{}] Failed to fetch price history: {:#}", ticker, e);
                return Vec::new();
            }
        };

        match serde_json::from_value::<HistoricalPriceResponse>(body) {
            Ok(response) => price_points(response.historical),
            Err(e) => {
                warn!("[{}] Unexpected price history response shape: {}", ticker, e);
                Vec::new()
            }
        }
    }

    /// Latest 10-year treasury yield of the trailing window, as a fraction.
    pub async fn fetch_risk_free_rate(&self) -> Option<f64> {
        let (from, to) = treasury_window(Utc::now().date_naive());
        let body = match self
            .get_json(
                &["api", "v4", "treasury"],
                &[("from", from.to_string()), ("to", to.to_string())],
            )
            .await
        {
            Ok(body) => body,
            Err(e) => {
                error!("Failed to fetch treasury yields: {:#}", e);
                return None;
            }
        };

        let entries = match serde_json::from_value::<Vec<TreasuryEntry>>(body) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Unexpected treasury response shape: {}", e);
                return None;
            }
        };

        let rate = latest_ten_year(entries);
        match rate {
            Some(rate) => info!("Found 10-year treasury yield: {}", rate),
            None => warn!("No 10-year treasury yield between {} and {}", from, to),
        }
        rate
    }

    /// Current market risk premium, as a fraction.
    pub async fn fetch_market_risk_premium(&self) -> Option<f64> {
        let entry = self
            .first_entry::<MarketRiskPremiumEntry>(
                &["api", "v4", "market_risk_premium"],
                &[],
                "market risk premium",
            )
            .await?;
        // FMP reports percentage points
        opt_f64(entry.market_risk_premium.as_ref()).map(|premium| premium / 100.0)
    }
}

pub fn treasury_window(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    (today - Duration::days(TREASURY_LOOKBACK_DAYS), today)
}

fn parse_date(value: Option<&Value>) -> Option<NaiveDate> {
    value
        .and_then(Value::as_str)
        .and_then(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok())
}

fn price_points(entries: Vec<HistoricalEntry>) -> Vec<PriceHistoryPoint> {
    let mut points: Vec<PriceHistoryPoint> = entries
        .into_iter()
        .filter_map(|entry| {
            Some(PriceHistoryPoint {
                date: parse_date(entry.date.as_ref())?,
                close: opt_f64(entry.close.as_ref())?,
            })
        })
        .collect();
    points.sort_by_key(|p| p.date);
    points
}

/// Scans most recent first and returns the first usable `tenYear`, converted
/// from percent to a fraction. Undated entries are scanned last.
pub fn latest_ten_year(mut entries: Vec<TreasuryEntry>) -> Option<f64> {
    entries.sort_by_key(|entry| std::cmp::Reverse(parse_date(entry.date.as_ref())));
    entries
        .iter()
        .find_map(|entry| opt_f64(entry.ten_year.as_ref()))
        .map(|percent| percent / 100.0)
}
