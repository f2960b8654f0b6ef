// src/routes.rs
use std::sync::Arc;
use warp::reject::Rejection;
use crate::handlers::{macro_inputs::get_macro_inputs,
                     report::{export_csv, export_xlsx, get_report, ReportQuery}};
use crate::services::market_data::MarketData;
use log::info;

use std::convert::Infallible;
use warp::http::StatusCode;
use warp::{Filter, Reply};
use crate::handlers::error::ApiError;

// Add recovery handling for our custom errors
async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let code;
    let message;

    if err.is_not_found() {
        code = StatusCode::NOT_FOUND;
        message = "Not Found".to_string();
    } else if let Some(api_error) = err.find::<ApiError>() {
        code = api_error.status;
        message = api_error.message.clone();
    } else if err.find::<warp::reject::InvalidQuery>().is_some() {
        code = StatusCode::BAD_REQUEST;
        message = "Invalid query string".to_string();
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        code = StatusCode::METHOD_NOT_ALLOWED;
        message = "Method Not Allowed".to_string();
    } else {
        code = StatusCode::INTERNAL_SERVER_ERROR;
        message = "Internal Server Error".to_string();
    }

    Ok(warp::reply::with_status(
        warp::reply::json(&serde_json::json!({
            "error": message,
        })),
        code,
    ))
}

pub fn routes<S>(source: Arc<S>) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone
where
    S: MarketData + Send + Sync + 'static,
{
    info!("Configuring routes...");

    let source_filter = warp::any().map(move || source.clone());

    let report_route = warp::path!("api" / "v1" / "report")
        .and(warp::get())
        .and(warp::query::<ReportQuery>())
        .and(source_filter.clone())
        .and_then(get_report::<S>);

    let export_route = warp::path!("api" / "v1" / "report" / "export")
        .and(warp::get())
        .and(warp::query::<ReportQuery>())
        .and(source_filter.clone())
        .and_then(export_xlsx::<S>);

    let csv_route = warp::path!("api" / "v1" / "report" / "csv")
        .and(warp::get())
        .and(warp::query::<ReportQuery>())
        .and(source_filter.clone())
        .and_then(export_csv::<S>);

    let macro_route = warp::path!("api" / "v1" / "macro")
        .and(warp::get())
        .and(source_filter.clone())
        .and_then(get_macro_inputs::<S>);

    info!("All routes configured successfully.");

    report_route
        .or(export_route)
        .or(csv_route)
        .or(macro_route)
        .recover(handle_rejection)
}
