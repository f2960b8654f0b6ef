// src/services/valuation.rs
//! WACC and trailing CAGR.
//!
//! Both computations are total: any missing input or failed validity gate
//! yields `None`, never a partial or zero-filled figure.

use chrono::Duration;
use log::{debug, warn};

use crate::models::{
    BalanceSheetFact, IncomeStatementFact, MacroInputs, PriceHistoryPoint, TickerProfile,
};
use crate::services::market_data::MarketData;

/// Used when the 10-year treasury yield cannot be fetched.
pub const DEFAULT_RISK_FREE_RATE: f64 = 0.04;
/// Used when the market risk premium cannot be fetched.
pub const DEFAULT_MARKET_RISK_PREMIUM: f64 = 0.05;
pub const CAGR_YEARS: u32 = 10;

const DAYS_PER_YEAR: i64 = 365;

impl MacroInputs {
    pub fn risk_free_rate_or_default(&self) -> f64 {
        self.risk_free_rate.unwrap_or(DEFAULT_RISK_FREE_RATE)
    }

    pub fn market_risk_premium_or_default(&self) -> f64 {
        self.market_risk_premium.unwrap_or(DEFAULT_MARKET_RISK_PREMIUM)
    }
}

/// Compound annual growth between the last close and the first close inside
/// the trailing `years * 365` day window.
pub fn compute_cagr(history: &[PriceHistoryPoint], years: u32) -> Option<f64> {
    let mut sorted = history.to_vec();
    sorted.sort_by_key(|p| p.date);

    let end = *sorted.last()?;
    let start_limit = end.date - Duration::days(i64::from(years) * DAYS_PER_YEAR);

    let start = sorted.iter().find(|p| p.date >= start_limit)?;

    let actual_years = (end.date - start.date).num_days() as f64 / DAYS_PER_YEAR as f64;
    if actual_years <= 0.0 {
        debug!("No span between {} and {} for CAGR", start.date, end.date);
        return None;
    }

    let cagr = (end.close / start.close).powf(1.0 / actual_years) - 1.0;
    if cagr.is_finite() {
        Some(cagr)
    } else {
        warn!(
            "Non-finite CAGR from closes {} -> {} over {:.2} years",
            start.close, end.close, actual_years
        );
        None
    }
}

/// The six company-level inputs of the WACC formula.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WaccInputs {
    pub market_cap: Option<f64>,
    pub beta: Option<f64>,
    pub total_debt: Option<f64>,
    pub interest_expense: Option<f64>,
    pub income_before_tax: Option<f64>,
    pub tax_expense: Option<f64>,
}

/// Inputs that are all present and passed every validity gate.
#[derive(Debug, Clone, Copy)]
struct GatedInputs {
    equity: f64,
    beta: f64,
    debt: f64,
    interest_expense: f64,
    income_before_tax: f64,
    tax_expense: f64,
}

impl WaccInputs {
    pub fn from_facts(
        profile: &TickerProfile,
        balance_sheet: &BalanceSheetFact,
        income: &IncomeStatementFact,
    ) -> Self {
        WaccInputs {
            market_cap: profile.market_cap,
            beta: profile.beta,
            total_debt: balance_sheet.total_debt,
            interest_expense: income.interest_expense,
            income_before_tax: income.income_before_tax,
            tax_expense: income.tax_expense,
        }
    }

    fn gated(&self) -> Option<GatedInputs> {
        let inputs = GatedInputs {
            equity: self.market_cap?,
            beta: self.beta?,
            debt: self.total_debt?,
            interest_expense: self.interest_expense?,
            income_before_tax: self.income_before_tax?,
            tax_expense: self.tax_expense?,
        };

        // Each gate is checked on its own; market cap sign is never validated
        // so the E + D guard is not implied by the debt gate.
        if inputs.equity + inputs.debt == 0.0 {
            return None;
        }
        if inputs.income_before_tax <= 0.0 {
            return None;
        }
        if inputs.debt <= 0.0 {
            return None;
        }
        Some(inputs)
    }

    /// True when every input is present and every gate passes, i.e. when
    /// fetching macro inputs is worthwhile.
    pub fn is_computable(&self) -> bool {
        self.gated().is_some()
    }
}

/// Weighted average cost of capital. Absent macro inputs fall back to
/// `DEFAULT_RISK_FREE_RATE` and `DEFAULT_MARKET_RISK_PREMIUM`.
pub fn compute_wacc(inputs: &WaccInputs, macro_inputs: &MacroInputs) -> Option<f64> {
    let g = inputs.gated()?;

    let risk_free_rate = macro_inputs.risk_free_rate_or_default();
    let market_risk_premium = macro_inputs.market_risk_premium_or_default();

    let cost_of_equity = risk_free_rate + g.beta * market_risk_premium;
    let cost_of_debt = g.interest_expense.abs() / g.debt;
    // Not clamped: unusual filings may give a negative rate or one above 1.
    let effective_tax_rate = g.tax_expense / g.income_before_tax;

    let total_capital = g.equity + g.debt;
    let wacc = (g.equity / total_capital) * cost_of_equity
        + (g.debt / total_capital) * cost_of_debt * (1.0 - effective_tax_rate);

    wacc.is_finite().then_some(wacc)
}

/// Gates the inputs, then fetches fresh macro inputs and computes WACC.
/// Macro inputs are not requested for inputs that cannot produce a result.
pub async fn wacc_from_inputs<S>(source: &S, inputs: &WaccInputs) -> Option<f64>
where
    S: MarketData + Sync,
{
    if !inputs.is_computable() {
        debug!("WACC inputs incomplete or gated out: {:?}", inputs);
        return None;
    }
    let macro_inputs = source.fetch_macro_inputs().await;
    compute_wacc(inputs, &macro_inputs)
}

/// Fetches every WACC input for `ticker` and computes it.
pub async fn calculate_wacc<S>(source: &S, ticker: &str) -> Option<f64>
where
    S: MarketData + Sync,
{
    let (profile, total_debt, income) = tokio::join!(
        source.fetch_profile(ticker),
        source.fetch_total_debt(ticker),
        source.fetch_income_facts(ticker),
    );
    let inputs = WaccInputs::from_facts(&profile, &BalanceSheetFact { total_debt }, &income);
    wacc_from_inputs(source, &inputs).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn point(y: i32, m: u32, d: u32, close: f64) -> PriceHistoryPoint {
        PriceHistoryPoint {
            date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            close,
        }
    }

    fn worked_example() -> WaccInputs {
        WaccInputs {
            market_cap: Some(1000.0),
            beta: Some(1.2),
            total_debt: Some(500.0),
            interest_expense: Some(-25.0),
            income_before_tax: Some(100.0),
            tax_expense: Some(21.0),
        }
    }

    fn both_macros(rf: f64, mrp: f64) -> MacroInputs {
        MacroInputs {
            risk_free_rate: Some(rf),
            market_risk_premium: Some(mrp),
        }
    }

    #[test]
    fn cagr_of_empty_history_is_absent() {
        assert_eq!(compute_cagr(&[], 10), None);
    }

    #[test]
    fn cagr_doubling_over_ten_years() {
        // 2014-01-03 is exactly 3650 days before 2024-01-01.
        let history = [point(2014, 1, 3, 100.0), point(2024, 1, 1, 200.0)];
        let cagr = compute_cagr(&history, 10).unwrap();
        let expected = 2f64.powf(1.0 / 10.0) - 1.0;
        assert!((cagr - expected).abs() < 1e-9, "cagr = {cagr}");
        assert!((cagr - 0.0718).abs() < 1e-3);
    }

    #[test]
    fn cagr_uses_365_day_years_across_leap_days() {
        // 2014-01-01 -> 2024-01-01 spans 3652 days; with a 3650-day window the
        // first point lies before the limit, so a later point must start it.
        let history = [
            point(2014, 1, 1, 100.0),
            point(2014, 1, 6, 100.0),
            point(2024, 1, 1, 200.0),
        ];
        let cagr = compute_cagr(&history, 10).unwrap();
        let actual_years = 3647.0 / 365.0;
        let expected = 2f64.powf(1.0 / actual_years) - 1.0;
        assert!((cagr - expected).abs() < 1e-12);
    }

    #[test]
    fn cagr_sorts_untrusted_input() {
        let history = [point(2024, 1, 1, 200.0), point(2014, 1, 3, 100.0)];
        let cagr = compute_cagr(&history, 10).unwrap();
        assert!((cagr - (2f64.powf(0.1) - 1.0)).abs() < 1e-9);
    }

    #[test]
    fn cagr_starts_at_first_point_inside_window() {
        let history = [
            point(2010, 6, 1, 10.0),
            point(2019, 1, 5, 50.0),
            point(2020, 1, 1, 100.0),
            point(2024, 1, 1, 100.0),
        ];
        let cagr = compute_cagr(&history, 5).unwrap();
        let years = (NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
            - NaiveDate::from_ymd_opt(2019, 1, 5).unwrap())
        .num_days() as f64
            / 365.0;
        assert!((cagr - (2f64.powf(1.0 / years) - 1.0)).abs() < 1e-12);
    }

    #[test]
    fn cagr_absent_when_only_the_end_point_is_in_window() {
        let history = [point(2000, 1, 1, 10.0), point(2024, 1, 1, 20.0)];
        assert_eq!(compute_cagr(&history, 10), None);
    }

    #[test]
    fn cagr_absent_for_single_point_or_same_day() {
        assert_eq!(compute_cagr(&[point(2024, 1, 1, 20.0)], 10), None);
        let same_day = [point(2024, 1, 1, 20.0), point(2024, 1, 1, 21.0)];
        assert_eq!(compute_cagr(&same_day, 10), None);
    }

    #[test]
    fn cagr_absent_for_zero_start_price() {
        let history = [point(2020, 1, 1, 0.0), point(2024, 1, 1, 20.0)];
        assert_eq!(compute_cagr(&history, 10), None);
    }

    #[test]
    fn wacc_worked_example() {
        let wacc = compute_wacc(&worked_example(), &both_macros(0.04, 0.05)).unwrap();
        let expected = (1000.0 / 1500.0) * 0.10 + (500.0 / 1500.0) * 0.05 * 0.79;
        assert!((wacc - expected).abs() < 1e-12);
        assert!((wacc - 0.0798).abs() < 1e-4);
    }

    #[test]
    fn wacc_absent_when_any_input_missing() {
        let base = worked_example();
        let variants = [
            WaccInputs { market_cap: None, ..base },
            WaccInputs { beta: None, ..base },
            WaccInputs { total_debt: None, ..base },
            WaccInputs { interest_expense: None, ..base },
            WaccInputs { income_before_tax: None, ..base },
            WaccInputs { tax_expense: None, ..base },
        ];
        for inputs in variants {
            assert_eq!(compute_wacc(&inputs, &both_macros(0.04, 0.05)), None, "{inputs:?}");
        }
    }

    #[test]
    fn wacc_absent_without_debt() {
        let inputs = WaccInputs { total_debt: Some(0.0), ..worked_example() };
        assert_eq!(compute_wacc(&inputs, &both_macros(0.04, 0.05)), None);
        let negative = WaccInputs { total_debt: Some(-10.0), ..worked_example() };
        assert_eq!(compute_wacc(&negative, &both_macros(0.04, 0.05)), None);
    }

    #[test]
    fn wacc_absent_for_non_positive_pretax_income() {
        for income in [0.0, -50.0] {
            let inputs = WaccInputs { income_before_tax: Some(income), ..worked_example() };
            assert_eq!(compute_wacc(&inputs, &both_macros(0.04, 0.05)), None);
        }
    }

    #[test]
    fn wacc_absent_when_capital_sums_to_zero() {
        let inputs = WaccInputs { market_cap: Some(-500.0), ..worked_example() };
        assert_eq!(compute_wacc(&inputs, &both_macros(0.04, 0.05)), None);
    }

    #[test]
    fn wacc_falls_back_to_default_macro_inputs() {
        let fetched = compute_wacc(&worked_example(), &both_macros(0.04, 0.05)).unwrap();
        let missing_rf = MacroInputs { risk_free_rate: None, market_risk_premium: Some(0.05) };
        let missing_both = MacroInputs::default();

        assert_eq!(compute_wacc(&worked_example(), &missing_rf), Some(fetched));
        assert_eq!(compute_wacc(&worked_example(), &missing_both), Some(fetched));
    }

    #[test]
    fn wacc_keeps_unclamped_tax_rate() {
        let inputs = WaccInputs { tax_expense: Some(-30.0), ..worked_example() };
        let wacc = compute_wacc(&inputs, &both_macros(0.04, 0.05)).unwrap();
        let expected = (1000.0 / 1500.0) * 0.10 + (500.0 / 1500.0) * 0.05 * 1.3;
        assert!((wacc - expected).abs() < 1e-12);
    }

    #[test]
    fn zero_interest_and_tax_are_present_values() {
        let inputs = WaccInputs {
            interest_expense: Some(0.0),
            tax_expense: Some(0.0),
            ..worked_example()
        };
        let wacc = compute_wacc(&inputs, &both_macros(0.04, 0.05)).unwrap();
        assert!((wacc - (1000.0 / 1500.0) * 0.10).abs() < 1e-12);
    }

    /// Serves fixed WACC inputs and counts macro fetches.
    #[derive(Default)]
    struct FixedSource {
        profile: TickerProfile,
        total_debt: Option<f64>,
        income: IncomeStatementFact,
        risk_free_rate: Option<f64>,
        macro_fetches: AtomicUsize,
    }

    impl MarketData for FixedSource {
        async fn fetch_profile(&self, _ticker: &str) -> TickerProfile {
            self.profile.clone()
        }
        async fn fetch_total_debt(&self, _ticker: &str) -> Option<f64> {
            self.total_debt
        }
        async fn fetch_income_facts(&self, _ticker: &str) -> IncomeStatementFact {
            self.income.clone()
        }
        async fn fetch_roic(&self, _ticker: &str) -> Option<f64> {
            None
        }
        async fn fetch_price_history(&self, _ticker: &str) -> Vec<PriceHistoryPoint> {
            Vec::new()
        }
        async fn fetch_shares_outstanding(&self, _ticker: &str) -> Option<u64> {
            None
        }
        async fn fetch_risk_free_rate(&self) -> Option<f64> {
            self.macro_fetches.fetch_add(1, Ordering::SeqCst);
            self.risk_free_rate
        }
        async fn fetch_market_risk_premium(&self) -> Option<f64> {
            None
        }
    }

    fn example_source(risk_free_rate: Option<f64>) -> FixedSource {
        FixedSource {
            profile: TickerProfile {
                market_cap: Some(1000.0),
                price: Some(10.0),
                beta: Some(1.2),
                sector: None,
            },
            total_debt: Some(500.0),
            income: IncomeStatementFact {
                interest_expense: Some(-25.0),
                income_before_tax: Some(100.0),
                tax_expense: Some(21.0),
            },
            risk_free_rate,
            ..FixedSource::default()
        }
    }

    #[tokio::test]
    async fn calculate_wacc_uses_default_rate_when_fetch_is_absent() {
        let source = example_source(None);
        let wacc = calculate_wacc(&source, "TEST").await.unwrap();
        assert!((wacc - 0.0798).abs() < 1e-4);
        assert_eq!(source.macro_fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn calculate_wacc_uses_fetched_rate() {
        let source = example_source(Some(0.05));
        let wacc = calculate_wacc(&source, "TEST").await.unwrap();
        let expected = (1000.0 / 1500.0) * (0.05 + 1.2 * 0.05) + (500.0 / 1500.0) * 0.05 * 0.79;
        assert!((wacc - expected).abs() < 1e-12);
    }

    #[tokio::test]
    async fn gated_inputs_skip_macro_fetch() {
        let source = FixedSource {
            total_debt: Some(0.0),
            ..example_source(None)
        };
        assert_eq!(calculate_wacc(&source, "TEST").await, None);
        assert_eq!(source.macro_fetches.load(Ordering::SeqCst), 0);
    }
}
