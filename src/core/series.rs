//! Slow-moving published series (e.g. monthly Treasury yields)

use anyhow::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;

#[async_trait]
pub trait SeriesProvider: Send + Sync {
    /// Latest published value of `series_id`.
    ///
    /// `Ok(None)` means the provider answered but the series holds no usable
    /// observation.
    async fn fetch_latest(&self, series_id: &str) -> Result<Option<Decimal>>;
}
