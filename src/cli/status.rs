use super::ui;
use crate::core::config::AppConfig;
use crate::core::gate::MonthlyGate;
use crate::core::period::Period;
use crate::core::report::{PRICE_DECIMALS, format_fixed};
use crate::core::store::{PeriodValue, ValueStore};
use crate::store::JsonFileStore;
use anyhow::Result;
use chrono::{NaiveDate, Utc};
use comfy_table::Cell;

/// Shows the stored monthly value without touching the network.
pub fn run(config: &AppConfig) -> Result<()> {
    let store = JsonFileStore::new(config.series_store_path()?);
    let today = Utc::now().with_timezone(&config.timezone()?).date_naive();

    println!(
        "{}",
        status_table(&config.monthly_series.label, store.load().as_ref(), today)
    );
    println!(
        "{}",
        ui::style_text(&format!("Store: {}", store.path().display()), ui::StyleType::Subtle)
    );
    Ok(())
}

fn status_table(label: &str, stored: Option<&PeriodValue>, today: NaiveDate) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Series"),
        ui::header_cell("Stored period"),
        ui::header_cell("Value"),
        ui::header_cell("Target period"),
        ui::header_cell("Next run"),
    ]);

    let (period, value) = match stored {
        Some(v) => (
            ui::value_cell(&v.period.to_string()),
            ui::value_cell(&format_fixed(v.value, PRICE_DECIMALS)),
        ),
        None => (ui::na_cell(), ui::na_cell()),
    };
    let next_run = if MonthlyGate::needs_refresh(stored, today) {
        "refresh"
    } else {
        "up to date"
    };

    table.add_row(vec![
        Cell::new(label),
        period,
        value,
        ui::value_cell(&Period::last_completed(&today).to_string()),
        Cell::new(next_run),
    ]);
    table.to_string()
}
