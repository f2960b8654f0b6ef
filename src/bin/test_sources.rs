// src/bin/test_sources.rs
use anyhow::Result;
use dotenv::dotenv;
use log::info;
use std::env;

use company_metrics::config::AppConfig;
use company_metrics::services::market_data::{MarketData, MarketDataClient};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    env_logger::init();

    let ticker = env::args()
        .nth(1)
        .map(|t| t.trim().to_uppercase())
        .unwrap_or_else(|| "AAPL".to_string());
    info!("Testing upstream sources for {}...", ticker);

    let config = AppConfig::from_env()?;
    let client = MarketDataClient::new(&config);

    println!("Profile:            {:?}", client.fetch_profile(&ticker).await);
    println!("Total debt:         {:?}", client.fetch_total_debt(&ticker).await);
    println!("Income facts:       {:?}", client.fetch_income_facts(&ticker).await);
    println!("ROIC:               {:?}", client.fetch_roic(&ticker).await);
    let history = client.fetch_price_history(&ticker).await;
    println!(
        "Price history:      {} points ({:?} .. {:?})",
        history.len(),
        history.first().map(|p| p.date),
        history.last().map(|p| p.date)
    );
    println!("Shares outstanding: {:?}", client.fetch_shares_outstanding(&ticker).await);
    println!("Risk-free rate:     {:?}", client.fetch_risk_free_rate().await);
    println!("Market premium:     {:?}", client.fetch_market_risk_premium().await);
    Ok(())
}
