// src/models.rs
use serde::{Serialize, Deserialize};
use chrono::NaiveDate;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickerProfile {
    pub market_cap: Option<f64>,
    pub price: Option<f64>,
    pub beta: Option<f64>,
    pub sector: Option<String>,
}

/// Latest reporting period only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BalanceSheetFact {
    pub total_debt: Option<f64>,
}

/// Latest reporting period only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IncomeStatementFact {
    pub interest_expense: Option<f64>,
    pub income_before_tax: Option<f64>,
    pub tax_expense: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceHistoryPoint {
    pub date: NaiveDate,
    pub close: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MacroInputs {
    pub risk_free_rate: Option<f64>,
    pub market_risk_premium: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ValuationResult {
    pub roic: Option<f64>,
    pub wacc: Option<f64>,
    pub cagr_10y: Option<f64>,
}

/// One display-formatted line of the report. Field names serialize to the
/// column headers so the JSON and CSV outputs share the spreadsheet layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    #[serde(rename = "Ticker")]
    pub ticker: String,
    #[serde(rename = "Sector")]
    pub sector: String,
    #[serde(rename = "ROIC (%)")]
    pub roic: String,
    #[serde(rename = "WACC (%)")]
    pub wacc: String,
    #[serde(rename = "CAGR 10y (%)")]
    pub cagr_10y: String,
    #[serde(rename = "Market Cap")]
    pub market_cap: String,
    #[serde(rename = "Price")]
    pub price: String,
    #[serde(rename = "Shares Outstanding")]
    pub shares_outstanding: String,
}

impl ReportRow {
    /// Cells in column order, matching `REPORT_HEADERS`.
    pub fn cells(&self) -> [&str; 8] {
        [
            &self.ticker,
            &self.sector,
            &self.roic,
            &self.wacc,
            &self.cagr_10y,
            &self.market_cap,
            &self.price,
            &self.shares_outstanding,
        ]
    }
}

pub const REPORT_HEADERS: [&str; 8] = [
    "Ticker",
    "Sector",
    "ROIC (%)",
    "WACC (%)",
    "CAGR 10y (%)",
    "Market Cap",
    "Price",
    "Shares Outstanding",
];
