use super::{AppContext, ui};
use crate::core::config::{AppConfig, EmailConfig};
use crate::core::notify::DispatchSummary;
use crate::providers::SmtpNotifier;
use anyhow::{Context, Result};
use tracing::info;

fn build_notifier(email: &EmailConfig) -> Result<SmtpNotifier> {
    let from = email
        .from
        .as_deref()
        .context("Sender address is not configured (set email.from or EMAIL_USER)")?;
    let password = email
        .password
        .as_deref()
        .context("SMTP password is not configured (set email.password or EMAIL_PASS)")?;
    let username = email.username.as_deref().unwrap_or(from);
    SmtpNotifier::new(&email.smtp_host, email.smtp_port, from, username, password)
}

/// Runs one full invocation: fetch, gate, compose and deliver.
pub async fn run(config: &AppConfig) -> Result<()> {
    let context = AppContext::from_config(config)?;
    let notifier = build_notifier(&config.email)?;
    let now = context.now();

    info!(recipients = config.recipients.len(), "Preparing financial snapshot");

    let pb = ui::new_progress_bar(config.recipients.len() as u64, "Sending reports...");
    let result = context
        .pipeline(config)
        .run(
            &now,
            &config.recipients,
            &notifier,
            config.email.pacing(),
            &|_| pb.inc(1),
        )
        .await;
    pb.finish_and_clear();

    let summary = result?;
    println!("{}", summarize(&summary.dispatch, summary.refreshed));
    Ok(())
}

fn summarize(dispatch: &DispatchSummary, refreshed: bool) -> String {
    let mut output = format!(
        "Report sent to {}/{} recipient(s)",
        ui::style_text(&dispatch.delivered.len().to_string(), ui::StyleType::Success),
        dispatch.attempted
    );
    if refreshed {
        output.push_str(&ui::style_text(
            " (monthly series refreshed)",
            ui::StyleType::Subtle,
        ));
    }
    for failure in &dispatch.failures {
        output.push_str(&format!(
            "\n  {} {}: {}",
            ui::style_text("failed", ui::StyleType::Error),
            failure.recipient,
            failure.reason
        ));
    }
    output
}
