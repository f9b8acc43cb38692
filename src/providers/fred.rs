use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use tracing::{debug, error, instrument};

use crate::core::series::SeriesProvider;

/// Series observations from the St. Louis Fed FRED API.
pub struct FredProvider {
    base_url: String,
    api_key: String,
}

impl FredProvider {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        FredProvider {
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    observations: Vec<Observation>,
}

#[derive(Debug, Deserialize)]
struct Observation {
    date: String,
    value: String,
}

#[async_trait]
impl SeriesProvider for FredProvider {
    #[instrument(name = "FredSeriesFetch", skip(self))]
    async fn fetch_latest(&self, series_id: &str) -> Result<Option<Decimal>> {
        let url = format!(
            "{}/fred/series/observations?series_id={}&api_key={}&file_type=json",
            self.base_url, series_id, self.api_key
        );
        debug!(
            "Requesting observations from {}/fred/series/observations for {}",
            self.base_url, series_id
        );

        let client = reqwest::Client::builder().user_agent("finsnap/1.0").build()?;
        let response = client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Failed to send request for series: {series_id}"))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for series: {}",
                response.status(),
                series_id
            ));
        }

        let response_text = response
            .text()
            .await
            .context("Failed to get response text")?;

        let data: ObservationsResponse = match serde_json::from_str(&response_text) {
            Ok(data) => data,
            Err(e) => {
                error!(
                    error = ?e,
                    response = %response_text,
                    "Failed to parse observations response"
                );
                return Err(e).context("Failed to parse observations response");
            }
        };

        // FRED marks missing observations with "."
        let latest = data
            .observations
            .iter()
            .rev()
            .find_map(|o| Decimal::from_str(o.value.trim()).ok().map(|v| (&o.date, v)));

        match latest {
            Some((date, value)) => {
                debug!(%date, %value, "Latest observation");
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }
}
