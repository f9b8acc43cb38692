//! Core business logic abstractions

pub mod config;
pub mod currency;
pub mod error;
pub mod gate;
pub mod log;
pub mod notify;
pub mod period;
pub mod pipeline;
pub mod price;
pub mod report;
pub mod series;
pub mod snapshot;
pub mod store;

// Re-export main types for cleaner imports
pub use currency::CurrencyRateProvider;
pub use error::{DispatchFailure, PipelineError};
pub use gate::{GateOutcome, MonthlyGate};
pub use notify::{DispatchSummary, Notifier};
pub use period::Period;
pub use pipeline::{Collaborators, Pipeline, RunSummary};
pub use price::PriceProvider;
pub use report::{Report, ReportLine, ReportTemplate};
pub use series::SeriesProvider;
pub use snapshot::SnapshotSet;
pub use store::{PeriodValue, ValueStore};
