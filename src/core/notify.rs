//! Report delivery abstractions

use super::error::DispatchFailure;
use super::report::Report;
use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{info, warn};

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, report: &Report, recipient: &str) -> Result<()>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    pub attempted: usize,
    pub delivered: Vec<String>,
    pub failures: Vec<DispatchFailure>,
}

impl DispatchSummary {
    pub fn all_failed(&self) -> bool {
        self.attempted > 0 && self.delivered.is_empty()
    }
}

/// Sends `report` to each recipient in order, sleeping `pacing` between sends.
///
/// A failed send is recorded and the remaining recipients are still attempted.
pub async fn dispatch_all(
    report: &Report,
    recipients: &[String],
    notifier: &dyn Notifier,
    pacing: Duration,
    on_attempt: &(dyn Fn(&str) + Sync),
) -> DispatchSummary {
    let mut summary = DispatchSummary::default();

    for (index, recipient) in recipients.iter().enumerate() {
        if index > 0 && !pacing.is_zero() {
            tokio::time::sleep(pacing).await;
        }

        summary.attempted += 1;
        match notifier.send(report, recipient).await {
            Ok(()) => {
                info!(%recipient, "Report sent");
                summary.delivered.push(recipient.clone());
            }
            Err(e) => {
                let reason = format!("{e:#}");
                warn!(%recipient, error = %reason, "Failed to send report");
                summary.failures.push(DispatchFailure {
                    recipient: recipient.clone(),
                    reason,
                });
            }
        }
        on_attempt(recipient);
    }

    summary
}
