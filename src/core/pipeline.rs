//! Sequences one snapshot invocation: fetch, gate, compose, dispatch.

use super::config::Instrument;
use super::currency::CurrencyRateProvider;
use super::error::PipelineError;
use super::gate::{GateOutcome, MonthlyGate};
use super::notify::{DispatchSummary, Notifier, dispatch_all};
use super::price::PriceProvider;
use super::report::{Report, ReportTemplate};
use super::series::SeriesProvider;
use super::snapshot::fetch_snapshot;
use super::store::ValueStore;
use chrono::{DateTime, TimeZone};
use std::fmt::Display;
use std::time::Duration;
use tracing::{info, warn};

/// External collaborators used by one invocation.
pub struct Collaborators<'a> {
    pub prices: &'a dyn PriceProvider,
    pub rates: &'a dyn CurrencyRateProvider,
    pub series: &'a dyn SeriesProvider,
    pub store: &'a dyn ValueStore,
}

pub struct Pipeline<'a> {
    pub instruments: &'a [Instrument],
    pub template: &'a ReportTemplate,
    pub collaborators: Collaborators<'a>,
}

#[derive(Debug, Clone)]
pub struct PreparedReport {
    pub report: Report,
    pub gate: GateOutcome,
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub report: Report,
    pub refreshed: bool,
    pub dispatch: DispatchSummary,
}

impl Pipeline<'_> {
    /// Fetches the snapshot, evaluates the monthly gate and composes the report.
    ///
    /// Nothing is composed when any input is unavailable.
    pub async fn prepare<Tz>(&self, now: &DateTime<Tz>) -> Result<PreparedReport, PipelineError>
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let c = &self.collaborators;
        let snapshot =
            fetch_snapshot(self.instruments, &self.template.fx_pair, c.prices, c.rates).await?;

        let gate = MonthlyGate::new(c.store, c.series, &self.template.series.id)
            .resolve(now.date_naive())
            .await?;

        let report = self.template.compose(now, &snapshot, &gate.value);
        Ok(PreparedReport { report, gate })
    }

    /// Runs a full invocation, delivering the report to every recipient.
    ///
    /// Send failures are collected in the summary and never fail the run.
    pub async fn run<Tz>(
        &self,
        now: &DateTime<Tz>,
        recipients: &[String],
        notifier: &dyn Notifier,
        pacing: Duration,
        on_attempt: &(dyn Fn(&str) + Sync),
    ) -> Result<RunSummary, PipelineError>
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let prepared = self.prepare(now).await?;

        if recipients.is_empty() {
            warn!("No recipients configured, report not sent");
        }
        let dispatch =
            dispatch_all(&prepared.report, recipients, notifier, pacing, on_attempt).await;
        info!(
            attempted = dispatch.attempted,
            delivered = dispatch.delivered.len(),
            failed = dispatch.failures.len(),
            "Dispatch finished"
        );

        if dispatch.all_failed() {
            warn!(
                attempted = dispatch.attempted,
                "Report could not be delivered to any recipient"
            );
        }

        Ok(RunSummary {
            report: prepared.report,
            refreshed: prepared.gate.refreshed,
            dispatch,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{FxPair, MonthlySeries};
    use crate::core::store::PeriodValue;
    use crate::store::memory::MemoryStore;
    use anyhow::{Result, anyhow};
    use async_trait::async_trait;
    use chrono_tz::US::Pacific;
    use rust_decimal::Decimal;
    use std::collections::HashMap;
    use std::str::FromStr;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    struct MockPrices(HashMap<&'static str, &'static str>);

    #[async_trait]
    impl PriceProvider for MockPrices {
        async fn fetch_opening_price(&self, symbol: &str) -> Result<Decimal> {
            self.0
                .get(symbol)
                .map(|p| dec(p))
                .ok_or_else(|| anyhow!("No price data found for symbol: {}", symbol))
        }
    }

    struct MockRate(&'static str);

    #[async_trait]
    impl CurrencyRateProvider for MockRate {
        async fn get_rate(&self, _from: &str, _to: &str) -> Result<Decimal> {
            Ok(dec(self.0))
        }
    }

    struct MockSeries {
        value: &'static str,
        call_count: AtomicUsize,
    }

    #[async_trait]
    impl SeriesProvider for MockSeries {
        async fn fetch_latest(&self, _series_id: &str) -> Result<Option<Decimal>> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            Ok(Some(dec(self.value)))
        }
    }

    struct MockNotifier {
        fail_for: Option<&'static str>,
        sent: Mutex<Vec<(String, String)>>,
    }

    impl MockNotifier {
        fn new(fail_for: Option<&'static str>) -> Self {
            Self {
                fail_for,
                sent: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Notifier for MockNotifier {
        async fn send(&self, report: &Report, recipient: &str) -> Result<()> {
            self.sent
                .lock()
                .unwrap()
                .push((recipient.to_string(), report.body()));
            if self.fail_for.is_some_and(|f| f == recipient) {
                return Err(anyhow!("SMTP error"));
            }
            Ok(())
        }
    }

    fn instruments() -> Vec<Instrument> {
        vec![
            Instrument::new("S&P 500", "^GSPC"),
            Instrument::new("Nasdaq", "^IXIC"),
        ]
    }

    fn template() -> ReportTemplate {
        ReportTemplate {
            subject: "Financial Data Update".to_string(),
            fx_pair: FxPair::default(),
            series: MonthlySeries::default(),
        }
    }

    fn prices() -> MockPrices {
        MockPrices(HashMap::from([("^GSPC", "5500.12"), ("^IXIC", "18000.55")]))
    }

    fn recipients() -> Vec<String> {
        ["a@example.com", "b@example.com", "c@example.com"]
            .iter()
            .map(|r| r.to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_end_to_end_with_empty_store() {
        let instruments = instruments();
        let template = template();
        let prices = prices();
        let rates = MockRate("1.3000");
        let series = MockSeries {
            value: "4.05",
            call_count: AtomicUsize::new(0),
        };
        let store = MemoryStore::new();
        let pipeline = Pipeline {
            instruments: &instruments,
            template: &template,
            collaborators: Collaborators {
                prices: &prices,
                rates: &rates,
                series: &series,
                store: &store,
            },
        };
        let notifier = MockNotifier::new(None);
        let now = Pacific.with_ymd_and_hms(2024, 7, 15, 6, 30, 0).unwrap();

        let summary = pipeline
            .run(&now, &recipients()[..1], &notifier, Duration::ZERO, &|_| {})
            .await
            .unwrap();

        assert!(summary.refreshed);
        assert_eq!(
            store.load(),
            Some(PeriodValue {
                value: dec("4.05"),
                period: "2024-06".parse().unwrap(),
            })
        );
        let body = summary.report.body();
        assert!(body.contains("FRED GS20 for 2024-06: 4.05"));
        assert!(body.contains("S&P 500 Open: 5500.12"));
        assert!(body.contains("Nasdaq Open: 18000.55"));
        assert!(body.contains("Exchange rate for GBP to USD: 1.3000"));
        assert_eq!(notifier.sent.lock().unwrap()[0].1, body);
    }

    #[tokio::test]
    async fn test_partial_dispatch_failure_still_succeeds() {
        let instruments = instruments();
        let template = template();
        let prices = prices();
        let rates = MockRate("1.3");
        let series = MockSeries {
            value: "4.05",
            call_count: AtomicUsize::new(0),
        };
        let store = MemoryStore::new();
        let pipeline = Pipeline {
            instruments: &instruments,
            template: &template,
            collaborators: Collaborators {
                prices: &prices,
                rates: &rates,
                series: &series,
                store: &store,
            },
        };
        let notifier = MockNotifier::new(Some("b@example.com"));
        let now = Pacific.with_ymd_and_hms(2024, 7, 15, 6, 30, 0).unwrap();

        let summary = pipeline
            .run(&now, &recipients(), &notifier, Duration::ZERO, &|_| {})
            .await
            .unwrap();

        assert_eq!(notifier.sent.lock().unwrap().len(), 3);
        assert_eq!(summary.dispatch.attempted, 3);
        assert_eq!(summary.dispatch.delivered.len(), 2);
        assert_eq!(summary.dispatch.failures.len(), 1);
        assert_eq!(summary.dispatch.failures[0].recipient, "b@example.com");
    }

    #[tokio::test]
    async fn test_every_send_failing_still_completes() {
        let instruments = instruments();
        let template = template();
        let prices = prices();
        let rates = MockRate("1.3");
        let series = MockSeries {
            value: "4.05",
            call_count: AtomicUsize::new(0),
        };
        let store = MemoryStore::new();
        let pipeline = Pipeline {
            instruments: &instruments,
            template: &template,
            collaborators: Collaborators {
                prices: &prices,
                rates: &rates,
                series: &series,
                store: &store,
            },
        };
        let notifier = MockNotifier::new(Some("a@example.com"));
        let now = Pacific.with_ymd_and_hms(2024, 7, 15, 6, 30, 0).unwrap();

        let summary = pipeline
            .run(&now, &recipients()[..1], &notifier, Duration::ZERO, &|_| {})
            .await
            .unwrap();

        assert!(summary.dispatch.all_failed());
        assert_eq!(summary.dispatch.attempted, 1);
        assert!(summary.dispatch.delivered.is_empty());
        assert_eq!(summary.dispatch.failures.len(), 1);
        assert_eq!(summary.dispatch.failures[0].recipient, "a@example.com");
        assert!(store.load().is_some());
    }

    #[tokio::test]
    async fn test_missing_price_sends_nothing_and_skips_gate() {
        let instruments = vec![
            Instrument::new("S&P 500", "^GSPC"),
            Instrument::new("Dow", "^DJI"),
        ];
        let template = template();
        let prices = prices();
        let rates = MockRate("1.3");
        let series = MockSeries {
            value: "4.05",
            call_count: AtomicUsize::new(0),
        };
        let store = MemoryStore::new();
        let pipeline = Pipeline {
            instruments: &instruments,
            template: &template,
            collaborators: Collaborators {
                prices: &prices,
                rates: &rates,
                series: &series,
                store: &store,
            },
        };
        let notifier = MockNotifier::new(None);
        let now = Pacific.with_ymd_and_hms(2024, 7, 15, 6, 30, 0).unwrap();

        let err = pipeline
            .run(&now, &recipients(), &notifier, Duration::ZERO, &|_| {})
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::DataUnavailable { .. }));
        assert!(notifier.sent.lock().unwrap().is_empty());
        assert_eq!(series.call_count.load(Ordering::SeqCst), 0);
        assert!(store.load().is_none());
    }

    #[tokio::test]
    async fn test_prepare_reuses_stored_value() {
        let instruments = instruments();
        let template = template();
        let prices = prices();
        let rates = MockRate("1.3");
        let series = MockSeries {
            value: "9.99",
            call_count: AtomicUsize::new(0),
        };
        let store = MemoryStore::with_value(PeriodValue {
            value: dec("4.05"),
            period: "2024-06".parse().unwrap(),
        });
        let pipeline = Pipeline {
            instruments: &instruments,
            template: &template,
            collaborators: Collaborators {
                prices: &prices,
                rates: &rates,
                series: &series,
                store: &store,
            },
        };
        let now = Pacific.with_ymd_and_hms(2024, 7, 31, 23, 0, 0).unwrap();

        let prepared = pipeline.prepare(&now).await.unwrap();

        assert!(!prepared.gate.refreshed);
        assert_eq!(series.call_count.load(Ordering::SeqCst), 0);
        assert!(prepared.report.body().contains("FRED GS20 for 2024-06: 4.05"));
    }
}
