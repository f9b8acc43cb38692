//! Persisted monthly value abstractions

use super::period::Period;
use rust_decimal::Decimal;

/// The last known value of the monthly series and the completed month it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodValue {
    pub value: Decimal,
    pub period: Period,
}

/// Single-record store for the monthly series value.
pub trait ValueStore: Send + Sync {
    /// Returns `None` when no record exists or the stored record is unusable.
    fn load(&self) -> Option<PeriodValue>;

    /// Replaces the whole record. Either both fields are written or neither is.
    fn save(&self, value: &PeriodValue) -> std::io::Result<()>;
}
