// src/services/yahoo.rs
use anyhow::{anyhow, bail, Result};
use log::{error, info, warn};
use regex::Regex;
use reqwest::{Client, Url};
use scraper::{Html, Selector};

use crate::services::coerce::parse_abbreviated;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Quote source for data FMP does not carry (shares outstanding).
#[derive(Clone)]
pub struct YahooClient {
    client: Client,
    base_url: String,
}

impl YahooClient {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        YahooClient {
            client,
            base_url: base_url.into(),
        }
    }

    pub async fn fetch_shares_outstanding(&self, ticker: &str) -> Option<u64> {
        let page = match self.fetch_statistics_page(ticker).await {
            Ok(page) => page,
            Err(e) => {
                error!("[{}] Failed to fetch Yahoo statistics page: {:#}", ticker, e);
                return None;
            }
        };

        let shares = shares_from_page(&page);
        match shares {
            Some(shares) => info!("[{}] Found shares outstanding: {}", ticker, shares),
            None => warn!("[{}] Shares outstanding not found on Yahoo statistics page", ticker),
        }
        shares
    }

    async fn fetch_statistics_page(&self, ticker: &str) -> Result<String> {
        let mut url = Url::parse(&self.base_url)?;
        url.path_segments_mut()
            .map_err(|_| anyhow!("Yahoo base URL cannot take a path: {}", self.base_url))?
            .pop_if_empty()
            .extend(&["quote", ticker, "key-statistics"]);
        info!("Fetching Yahoo data from URL: {}", url);

        let response = self
            .client
            .get(url)
            .header("User-Agent", USER_AGENT)
            .send()
            .await?;
        if !response.status().is_success() {
            bail!("Yahoo responded with status {}", response.status());
        }
        Ok(response.text().await?)
    }
}

/// Prefers the raw count embedded in the page state, then the rendered
/// statistics table.
pub fn shares_from_page(html: &str) -> Option<u64> {
    embedded_shares(html).or_else(|| table_shares(html))
}

fn embedded_shares(html: &str) -> Option<u64> {
    let re = Regex::new(r#""sharesOutstanding"\s*:\s*\{\s*"raw"\s*:\s*([0-9]+)"#).ok()?;
    re.captures(html)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u64>().ok())
}

fn table_shares(html: &str) -> Option<u64> {
    let document = Html::parse_document(html);
    let row_selector = Selector::parse("tr").ok()?;
    let cell_selector = Selector::parse("td").ok()?;

    document.select(&row_selector).find_map(|row| {
        let cells: Vec<String> = row
            .select(&cell_selector)
            .map(|cell| cell.text().collect::<String>().trim().to_string())
            .collect();
        match cells.as_slice() {
            [label, value, ..] if label.starts_with("Shares Outstanding") => {
                parse_abbreviated(value)
            }
            _ => None,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_raw_count_wins() {
        let html = r#"<script>{"sharesOutstanding":{"raw":3189940000,"fmt":"3.19B"}}</script>
            <table><tr><td>Shares Outstanding</td><td>9.99B</td></tr></table>"#;
        assert_eq!(shares_from_page(html), Some(3_189_940_000));
    }

    #[test]
    fn falls_back_to_statistics_table() {
        let html = r#"<html><body><table>
            <tr><td>Float</td><td>2.8B</td></tr>
            <tr><td>Shares Outstanding <sup>5</sup></td><td>3.19B</td></tr>
        </table></body></html>"#;
        assert_eq!(shares_from_page(html), Some(3_190_000_000));
    }

    #[test]
    fn absent_when_page_has_neither() {
        assert_eq!(shares_from_page("<html><body>Not found</body></html>"), None);
        let html = "<table><tr><td>Shares Outstanding</td><td>N/A</td></tr></table>";
        assert_eq!(shares_from_page(html), None);
    }
}
