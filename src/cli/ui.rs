use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::core::report::Report;

/// Defines different styles for text elements.
pub enum StyleType {
    Title,
    Success,
    Error,
    Subtle,
}

/// Applies a consistent style to a string.
pub fn style_text(text: &str, style_type: StyleType) -> String {
    let styled = match style_type {
        StyleType::Title => style(text).bold().underlined(),
        StyleType::Success => style(text).green().bold(),
        StyleType::Error => style(text).red(),
        StyleType::Subtle => style(text).dim(),
    };
    styled.to_string()
}

/// Creates a new `comfy_table::Table` with standard styling.
pub fn new_styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Creates a styled header cell for a table.
pub fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

/// Right-aligned cell for numeric values.
pub fn value_cell(text: &str) -> Cell {
    Cell::new(text).set_alignment(CellAlignment::Right)
}

/// Creates a cell for "N/A" values.
pub fn na_cell() -> Cell {
    Cell::new("N/A")
        .fg(Color::DarkGrey)
        .set_alignment(CellAlignment::Right)
}

/// Renders a report as a titled two-column table.
pub fn report_table(report: &Report) -> String {
    let mut table = new_styled_table();
    table.set_header(vec![header_cell("Item"), header_cell("Value")]);
    for line in &report.lines {
        table.add_row(vec![Cell::new(&line.label), value_cell(&line.value)]);
    }

    format!(
        "{}\n{}\n\n{}",
        style_text(&report.subject, StyleType::Title),
        style_text(&format!("Data for {}", report.timestamp), StyleType::Subtle),
        table
    )
}

/// Creates a new `indicatif::ProgressBar` with standard styling.
pub fn new_progress_bar(len: u64, message: &str) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_message(message.to_string());
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} {msg} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len}")
    {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb
}

/// Creates a spinner for work of unknown length.
pub fn new_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::report::ReportLine;

    #[test]
    fn test_report_table_contains_every_line() {
        let report = Report {
            timestamp: "2024-07-15 06:30:00 PDT-0700".to_string(),
            subject: "Financial Data Update".to_string(),
            lines: vec![
                ReportLine {
                    label: "S&P 500 Open".to_string(),
                    value: "5500.12".to_string(),
                },
                ReportLine {
                    label: "Exchange rate for GBP to USD".to_string(),
                    value: "1.3000".to_string(),
                },
            ],
        };

        let rendered = console::strip_ansi_codes(&report_table(&report)).to_string();
        assert!(rendered.contains("Financial Data Update"));
        assert!(rendered.contains("Data for 2024-07-15 06:30:00 PDT-0700"));
        assert!(rendered.contains("S&P 500 Open"));
        assert!(rendered.contains("5500.12"));
        assert!(rendered.contains("1.3000"));
    }

    #[test]
    fn test_progress_bar_carries_message() {
        let pb = new_progress_bar(3, "Sending reports...");
        assert_eq!(pb.length(), Some(3));
        assert_eq!(pb.message(), "Sending reports...");
    }
}
