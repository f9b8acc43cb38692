use super::{AppContext, ui};
use crate::core::config::AppConfig;
use anyhow::Result;

/// Composes the report exactly as `send` would and prints it instead of mailing it.
pub async fn run(config: &AppConfig) -> Result<()> {
    let context = AppContext::from_config(config)?;
    let now = context.now();

    let pb = ui::new_spinner("Fetching market data...");
    let result = context.pipeline(config).prepare(&now).await;
    pb.finish_and_clear();

    let prepared = result?;
    println!("{}", ui::report_table(&prepared.report));
    if prepared.gate.refreshed {
        let note = format!(
            "Stored {} value updated for {}",
            config.monthly_series.id, prepared.gate.value.period
        );
        println!("\n{}", ui::style_text(&note, ui::StyleType::Subtle));
    }
    Ok(())
}
