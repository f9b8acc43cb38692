//! Opening price abstractions

use anyhow::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;

#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// Most recent opening price for `symbol`.
    async fn fetch_opening_price(&self, symbol: &str) -> Result<Decimal>;
}
