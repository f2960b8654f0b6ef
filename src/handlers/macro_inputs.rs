// src/handlers/macro_inputs.rs
use log::info;
use serde::Serialize;
use std::sync::Arc;
use warp::reply::Json;
use warp::Rejection;

use crate::services::market_data::MarketData;

#[derive(Debug, Serialize)]
struct MacroInputsResponse {
    risk_free_rate: f64,
    market_risk_premium: f64,
    risk_free_rate_fetched: bool,
    market_risk_premium_fetched: bool,
}

/// Macro inputs as the WACC computation would use them right now.
pub async fn get_macro_inputs<S>(source: Arc<S>) -> Result<Json, Rejection>
where
    S: MarketData + Send + Sync,
{
    info!("Handling request to get macro inputs.");
    let inputs = source.fetch_macro_inputs().await;

    let response = MacroInputsResponse {
        risk_free_rate: inputs.risk_free_rate_or_default(),
        market_risk_premium: inputs.market_risk_premium_or_default(),
        risk_free_rate_fetched: inputs.risk_free_rate.is_some(),
        market_risk_premium_fetched: inputs.market_risk_premium.is_some(),
    };

    Ok(warp::reply::json(&response))
}
