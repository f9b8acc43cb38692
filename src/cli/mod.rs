pub mod preview;
pub mod send;
pub mod setup;
pub mod status;
pub mod ui;

use crate::core::config::AppConfig;
use crate::core::pipeline::{Collaborators, Pipeline};
use crate::core::report::ReportTemplate;
use crate::providers::{ExchangeRateApiProvider, FredProvider, YahooFinanceProvider};
use crate::store::JsonFileStore;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tracing::debug;

/// Concrete collaborators wired from configuration.
pub(crate) struct AppContext {
    pub prices: YahooFinanceProvider,
    pub rates: ExchangeRateApiProvider,
    pub series: FredProvider,
    pub store: JsonFileStore,
    pub template: ReportTemplate,
    pub timezone: Tz,
}

impl AppContext {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let yahoo_base_url = config
            .providers
            .yahoo
            .as_ref()
            .map_or("https://query1.finance.yahoo.com", |p| &p.base_url);
        let fx_base_url = config
            .providers
            .exchange_rate
            .as_ref()
            .map_or("https://api.exchangerate-api.com", |p| &p.base_url);
        let fred = config.providers.fred.as_ref();
        let fred_base_url = fred.map_or("https://api.stlouisfed.org", |p| &p.base_url);
        let fred_api_key = fred
            .and_then(|p| p.api_key.as_deref())
            .context("FRED API key is not configured (set providers.fred.api_key or FRED_API_KEY)")?;

        let store_path = config.series_store_path()?;
        debug!("Using series store at {}", store_path.display());

        Ok(Self {
            prices: YahooFinanceProvider::new(yahoo_base_url),
            rates: ExchangeRateApiProvider::new(fx_base_url),
            series: FredProvider::new(fred_base_url, fred_api_key),
            store: JsonFileStore::new(store_path),
            template: ReportTemplate {
                subject: config.email.subject.clone(),
                fx_pair: config.exchange_rate.clone(),
                series: config.monthly_series.clone(),
            },
            timezone: config.timezone()?,
        })
    }

    pub fn pipeline<'a>(&'a self, config: &'a AppConfig) -> Pipeline<'a> {
        Pipeline {
            instruments: &config.instruments,
            template: &self.template,
            collaborators: Collaborators {
                prices: &self.prices,
                rates: &self.rates,
                series: &self.series,
                store: &self.store,
            },
        }
    }

    /// Current time in the configured report timezone.
    pub fn now(&self) -> DateTime<Tz> {
        Utc::now().with_timezone(&self.timezone)
    }
}
