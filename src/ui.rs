// src/ui.rs
use indicatif::{ProgressBar, ProgressStyle};

use crate::models::{ReportRow, REPORT_HEADERS};

pub fn single_pb(length: u64) -> ProgressBar {
    let pb = ProgressBar::new(length);
    let style = ProgressStyle::default_bar()
        .template("[{elapsed_precise}] [ {bar:50} ] {pos}/{len} {msg} {spinner}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#|-");
    pb.set_style(style);
    pb
}

/// Plain-text table with every column padded to its widest cell.
pub fn render_table(rows: &[ReportRow]) -> String {
    let mut widths: Vec<usize> = REPORT_HEADERS.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row.cells()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let format_line = |cells: &[&str]| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let mut lines = vec![format_line(&REPORT_HEADERS)];
    lines.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    lines.extend(rows.iter().map(|row| format_line(&row.cells())));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_has_header_rule_and_one_line_per_row() {
        let row = ReportRow {
            ticker: "F".to_string(),
            sector: "undefined".to_string(),
            roic: "unavailable".to_string(),
            wacc: "6.10%".to_string(),
            cagr_10y: "-2.31%".to_string(),
            market_cap: "48000000000".to_string(),
            price: "12.1".to_string(),
            shares_outstanding: "unavailable".to_string(),
        };
        let table = render_table(&[row]);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Ticker | Sector    | ROIC (%)"));
        assert!(lines[1].starts_with("-------+-"));
        assert!(lines[2].starts_with("F      | undefined | unavailable"));
    }
}
