// src/services/report.rs
use log::info;

use crate::models::{BalanceSheetFact, ReportRow, TickerProfile, ValuationResult};
use crate::services::market_data::MarketData;
use crate::services::valuation::{compute_cagr, wacc_from_inputs, WaccInputs, CAGR_YEARS};

/// Rendered in place of any value that is absent or could not be computed.
pub const UNAVAILABLE: &str = "unavailable";
/// Rendered when the profile carries no sector.
pub const UNDEFINED_SECTOR: &str = "undefined";

/// Splits a free-text, comma-separated list into upper-cased symbols.
/// Order is kept and duplicates are not removed.
pub fn parse_tickers(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_uppercase)
        .collect()
}

/// `0.1234` -> `"12.34%"`.
pub fn format_percent(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}%", v * 100.0),
        None => UNAVAILABLE.to_string(),
    }
}

pub fn format_value<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| UNAVAILABLE.to_string(), |v| v.to_string())
}

pub fn build_row(
    ticker: &str,
    profile: &TickerProfile,
    valuation: &ValuationResult,
    shares_outstanding: Option<u64>,
) -> ReportRow {
    ReportRow {
        ticker: ticker.to_string(),
        sector: profile
            .sector
            .clone()
            .unwrap_or_else(|| UNDEFINED_SECTOR.to_string()),
        roic: format_percent(valuation.roic),
        wacc: format_percent(valuation.wacc),
        cagr_10y: format_percent(valuation.cagr_10y),
        market_cap: format_value(profile.market_cap),
        price: format_value(profile.price),
        shares_outstanding: format_value(shares_outstanding),
    }
}

/// Gathers every field for one ticker and formats its row. The independent
/// upstream calls run concurrently; macro inputs are fetched afterwards, and
/// only when the WACC inputs pass their gates.
pub async fn build_ticker_row<S>(source: &S, ticker: &str) -> ReportRow
where
    S: MarketData + Sync,
{
    let (profile, total_debt, income, roic, history, shares_outstanding) = tokio::join!(
        source.fetch_profile(ticker),
        source.fetch_total_debt(ticker),
        source.fetch_income_facts(ticker),
        source.fetch_roic(ticker),
        source.fetch_price_history(ticker),
        source.fetch_shares_outstanding(ticker),
    );

    let inputs = WaccInputs::from_facts(&profile, &BalanceSheetFact { total_debt }, &income);
    let valuation = ValuationResult {
        roic,
        wacc: wacc_from_inputs(source, &inputs).await,
        cagr_10y: compute_cagr(&history, CAGR_YEARS),
    };

    build_row(ticker, &profile, &valuation, shares_outstanding)
}

/// Builds one row per ticker, strictly in input order. `on_progress` is called
/// with `(done, total)` after each ticker.
pub async fn build_report<S, F>(source: &S, tickers: &[String], mut on_progress: F) -> Vec<ReportRow>
where
    S: MarketData + Sync,
    F: FnMut(usize, usize),
{
    let total = tickers.len();
    let mut rows = Vec::with_capacity(total);

    for (i, ticker) in tickers.iter().enumerate() {
        info!("Processing {} ({}/{})", ticker, i + 1, total);
        rows.push(build_ticker_row(source, ticker).await);
        on_progress(i + 1, total);
    }

    rows
}
