use super::error::PipelineError;
use super::period::Period;
use super::series::SeriesProvider;
use super::store::{PeriodValue, ValueStore};
use chrono::NaiveDate;
use tracing::{debug, info};

/// Result of evaluating the monthly staleness gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateOutcome {
    pub value: PeriodValue,
    pub refreshed: bool,
}

/// Decides whether the stored monthly value must be refreshed from the
/// provider and returns the value to report either way.
pub struct MonthlyGate<'a> {
    store: &'a dyn ValueStore,
    source: &'a dyn SeriesProvider,
    series_id: &'a str,
}

impl<'a> MonthlyGate<'a> {
    pub fn new(
        store: &'a dyn ValueStore,
        source: &'a dyn SeriesProvider,
        series_id: &'a str,
    ) -> Self {
        Self {
            store,
            source,
            series_id,
        }
    }

    /// True when a call to [`MonthlyGate::resolve`] on `today` would hit the provider.
    pub fn needs_refresh(stored: Option<&PeriodValue>, today: NaiveDate) -> bool {
        let target = Period::last_completed(&today);
        stored.is_none_or(|current| current.period != target)
    }

    pub async fn resolve(&self, today: NaiveDate) -> Result<GateOutcome, PipelineError> {
        let target = Period::last_completed(&today);
        let current = self.store.load();

        if let Some(current) = current.as_ref().filter(|c| c.period == target) {
            info!(series = %self.series_id, period = %target, "Monthly value is up to date");
            return Ok(GateOutcome {
                value: current.clone(),
                refreshed: false,
            });
        }

        debug!(
            series = %self.series_id,
            stored = ?current.as_ref().map(|c| c.period),
            target = %target,
            "Monthly value is stale, refreshing"
        );

        let what = format!("series {}", self.series_id);
        let fetched = self
            .source
            .fetch_latest(self.series_id)
            .await
            .map_err(|e| PipelineError::unavailable(&what, format!("{e:#}")))?
            .ok_or_else(|| PipelineError::unavailable(&what, "series has no observations"))?;

        let value = PeriodValue {
            value: fetched,
            period: target,
        };
        self.store
            .save(&value)
            .map_err(|source| PipelineError::Persistence {
                period: target,
                source,
            })?;

        info!(
            series = %self.series_id,
            period = %target,
            value = %fetched,
            "Updated monthly value"
        );
        Ok(GateOutcome {
            value,
            refreshed: true,
        })
    }
}
