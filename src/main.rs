use anyhow::Result;
use dotenv::dotenv;
use log::info;
use std::net::SocketAddr;
use std::sync::Arc;
use warp::Filter;

use company_metrics::config::AppConfig;
use company_metrics::routes;
use company_metrics::services::market_data::MarketDataClient;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    // Initialize the logger
    env_logger::init();
    info!("Logger initialized. Starting the application...");

    let config = AppConfig::from_env()?;
    info!("Using PORT: {}", config.port);
    info!("FMP base URL: {}", config.fmp_base_url);

    // Bind to 0.0.0.0 so the service is reachable from containers
    let addr: SocketAddr = ([0, 0, 0, 0], config.port).into();
    info!("Will bind to: {}", addr);

    let client = Arc::new(MarketDataClient::new(&config));

    // Set up CORS
    let cors = warp::cors()
        .allow_any_origin()
        .allow_header("content-type")
        .allow_methods(vec!["GET"]);

    // Set up routes
    let api = routes::routes(client).with(cors);
    info!("Routes configured successfully with CORS.");

    // Start the server
    info!("Starting server on {}", addr);
    warp::serve(api)
        .run(addr)
        .await;

    Ok(())
}
