// src/handlers/report.rs
use log::{error, info};
use serde::Deserialize;
use std::sync::Arc;
use warp::http::{header, Response};
use warp::reply::Json;
use warp::Rejection;

use super::error::ApiError;
use crate::models::ReportRow;
use crate::services::export::{self, CSV_FILENAME, CSV_MIME, XLSX_FILENAME, XLSX_MIME};
use crate::services::market_data::MarketData;
use crate::services::report::{build_report, parse_tickers};

pub const NO_TICKERS_MESSAGE: &str = "Please enter at least one ticker";

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    pub tickers: Option<String>,
}

fn requested_tickers(query: &ReportQuery) -> Result<Vec<String>, Rejection> {
    let tickers = parse_tickers(query.tickers.as_deref().unwrap_or_default());
    if tickers.is_empty() {
        return Err(warp::reject::custom(ApiError::bad_request(NO_TICKERS_MESSAGE)));
    }
    Ok(tickers)
}

async fn report_rows<S>(source: &S, query: &ReportQuery) -> Result<Vec<ReportRow>, Rejection>
where
    S: MarketData + Sync,
{
    let tickers = requested_tickers(query)?;
    info!("Building report for {} ticker(s): {}", tickers.len(), tickers.join(","));

    let rows = build_report(source, &tickers, |done, total| {
        info!("Report progress: {}/{} tickers", done, total);
    })
    .await;
    Ok(rows)
}

fn attachment(body: Vec<u8>, mime: &str, filename: &str) -> Result<Response<Vec<u8>>, Rejection> {
    Response::builder()
        .header(header::CONTENT_TYPE, mime)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", filename),
        )
        .body(body)
        .map_err(|e| warp::reject::custom(ApiError::new(e.to_string())))
}

pub async fn get_report<S>(query: ReportQuery, source: Arc<S>) -> Result<Json, Rejection>
where
    S: MarketData + Send + Sync,
{
    let rows = report_rows(source.as_ref(), &query).await?;
    Ok(warp::reply::json(&rows))
}

pub async fn export_xlsx<S>(query: ReportQuery, source: Arc<S>) -> Result<Response<Vec<u8>>, Rejection>
where
    S: MarketData + Send + Sync,
{
    let rows = report_rows(source.as_ref(), &query).await?;
    let bytes = export::to_xlsx(&rows).map_err(|e| {
        error!("Failed to write spreadsheet: {:#}", e);
        warp::reject::custom(ApiError::export_error(e.to_string()))
    })?;
    info!("Exporting {} row(s) as {}", rows.len(), XLSX_FILENAME);
    attachment(bytes, XLSX_MIME, XLSX_FILENAME)
}

pub async fn export_csv<S>(query: ReportQuery, source: Arc<S>) -> Result<Response<Vec<u8>>, Rejection>
where
    S: MarketData + Send + Sync,
{
    let rows = report_rows(source.as_ref(), &query).await?;
    let text = export::to_csv(&rows).map_err(|e| {
        error!("Failed to write CSV: {:#}", e);
        warp::reject::custom(ApiError::export_error(e.to_string()))
    })?;
    info!("Exporting {} row(s) as {}", rows.len(), CSV_FILENAME);
    attachment(text.into_bytes(), CSV_MIME, CSV_FILENAME)
}
