// src/services/mod.rs
pub mod coerce;
pub mod export;
pub mod fmp;
pub mod market_data;
pub mod report;
pub mod valuation;
pub mod yahoo;
