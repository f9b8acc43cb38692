//! Report composition

use super::config::{FxPair, MonthlySeries};
use super::period::Period;
use super::snapshot::SnapshotSet;
use super::store::PeriodValue;
use chrono::{DateTime, TimeZone};
use rust_decimal::{Decimal, RoundingStrategy};
use std::fmt::Display;

pub const PRICE_DECIMALS: u32 = 2;
pub const FX_DECIMALS: u32 = 4;
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S %Z%z";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportLine {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub timestamp: String,
    pub subject: String,
    pub lines: Vec<ReportLine>,
}

impl Report {
    /// Plain-text message body.
    pub fn body(&self) -> String {
        let mut body = format!("Data for {}:\n\n", self.timestamp);
        for line in &self.lines {
            body.push_str(&format!("{}: {}\n", line.label, line.value));
        }
        body
    }
}

/// Rounds half away from zero and pads to exactly `decimals` places.
pub fn format_fixed(value: Decimal, decimals: u32) -> String {
    let mut rounded =
        value.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(decimals);
    rounded.to_string()
}

/// Labels and subject used when composing reports.
#[derive(Debug, Clone)]
pub struct ReportTemplate {
    pub subject: String,
    pub fx_pair: FxPair,
    pub series: MonthlySeries,
}

impl ReportTemplate {
    /// Builds the report for `now`.
    ///
    /// The monthly line is labelled with the last completed month relative to
    /// `now`, never the month `now` falls in.
    pub fn compose<Tz>(
        &self,
        now: &DateTime<Tz>,
        snapshot: &SnapshotSet,
        monthly: &PeriodValue,
    ) -> Report
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let target = Period::last_completed(&now.date_naive());

        let mut lines: Vec<ReportLine> = snapshot
            .prices
            .iter()
            .map(|(label, price)| ReportLine {
                label: format!("{label} Open"),
                value: format_fixed(*price, PRICE_DECIMALS),
            })
            .collect();

        lines.push(ReportLine {
            label: format!(
                "Exchange rate for {} to {}",
                self.fx_pair.base, self.fx_pair.quote
            ),
            value: format_fixed(snapshot.fx_rate, FX_DECIMALS),
        });
        lines.push(ReportLine {
            label: format!("{} for {}", self.series.label, target),
            value: format_fixed(monthly.value, PRICE_DECIMALS),
        });

        Report {
            timestamp: now.format(TIMESTAMP_FORMAT).to_string(),
            subject: self.subject.clone(),
            lines,
        }
    }
}
