use super::config::{FxPair, Instrument};
use super::currency::CurrencyRateProvider;
use super::error::PipelineError;
use super::price::PriceProvider;
use rust_decimal::Decimal;
use tracing::debug;

/// Opening prices for the configured instruments plus one spot FX rate.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotSet {
    /// `(label, opening price)` in configuration order.
    pub prices: Vec<(String, Decimal)>,
    pub fx_rate: Decimal,
}

/// Fetches every instrument and the FX rate, one request at a time.
///
/// Any missing price aborts the whole snapshot.
pub async fn fetch_snapshot(
    instruments: &[Instrument],
    fx_pair: &FxPair,
    price_provider: &dyn PriceProvider,
    rate_provider: &dyn CurrencyRateProvider,
) -> Result<SnapshotSet, PipelineError> {
    let mut prices = Vec::with_capacity(instruments.len());
    for instrument in instruments {
        let price = price_provider
            .fetch_opening_price(&instrument.symbol)
            .await
            .map_err(|e| {
                PipelineError::unavailable(
                    format!("{} ({})", instrument.label, instrument.symbol),
                    format!("{e:#}"),
                )
            })?;
        debug!(label = %instrument.label, %price, "Fetched opening price");
        prices.push((instrument.label.clone(), price));
    }

    let fx_rate = rate_provider
        .get_rate(&fx_pair.base, &fx_pair.quote)
        .await
        .map_err(|e| PipelineError::unavailable(fx_pair.to_string(), format!("{e:#}")))?;
    debug!(pair = %fx_pair, rate = %fx_rate, "Fetched exchange rate");

    Ok(SnapshotSet { prices, fx_rate })
}
