// src/bin/export_report.rs
use anyhow::{bail, Result};
use clap::Parser;
use dotenv::dotenv;
use log::info;
use std::path::PathBuf;

use company_metrics::config::AppConfig;
use company_metrics::services::export::{to_xlsx, XLSX_FILENAME};
use company_metrics::services::market_data::MarketDataClient;
use company_metrics::services::report::{build_report, parse_tickers};
use company_metrics::ui;

/// Fetch fundamentals for a list of tickers and export them to a spreadsheet.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Comma-separated ticker symbols, e.g. "TSLA,GM,F".
    tickers: String,

    /// Where to write the spreadsheet.
    #[arg(short, long, default_value = XLSX_FILENAME)]
    output: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();
    info!("Command line input recorded: {cli:#?}");

    let tickers = parse_tickers(&cli.tickers);
    if tickers.is_empty() {
        bail!("Please enter at least one ticker");
    }

    let config = AppConfig::from_env()?;
    let client = MarketDataClient::new(&config);

    let pb = ui::single_pb(tickers.len() as u64);
    let rows = build_report(&client, &tickers, |done, _total| {
        pb.set_position(done as u64);
    })
    .await;
    pb.finish_with_message("done");

    println!("{}", ui::render_table(&rows));

    let bytes = to_xlsx(&rows)?;
    tokio::fs::write(&cli.output, bytes).await?;
    info!("Wrote {} row(s) to {}", rows.len(), cli.output.display());
    println!("Saved {}", cli.output.display());

    Ok(())
}
