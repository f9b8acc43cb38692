use anyhow::{Context, Result, anyhow};
use chrono_tz::Tz;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct Instrument {
    pub label: String,
    pub symbol: String,
}

impl Instrument {
    pub fn new(label: &str, symbol: &str) -> Self {
        Self {
            label: label.to_string(),
            symbol: symbol.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct FxPair {
    pub base: String,
    pub quote: String,
}

impl Default for FxPair {
    fn default() -> Self {
        FxPair {
            base: "GBP".to_string(),
            quote: "USD".to_string(),
        }
    }
}

impl Display for FxPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct MonthlySeries {
    pub id: String,
    pub label: String,
}

impl Default for MonthlySeries {
    fn default() -> Self {
        MonthlySeries {
            id: "GS20".to_string(),
            label: "FRED GS20".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub from: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub subject: String,
    pub pacing_secs: u64,
}

impl Default for EmailConfig {
    fn default() -> Self {
        EmailConfig {
            smtp_host: "smtp.gmail.com".to_string(),
            smtp_port: 587,
            from: None,
            username: None,
            password: None,
            subject: "Financial Data Update".to_string(),
            pacing_secs: 5,
        }
    }
}

impl EmailConfig {
    pub fn pacing(&self) -> Duration {
        Duration::from_secs(self.pacing_secs)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct YahooProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ExchangeRateProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FredProviderConfig {
    pub base_url: String,
    pub api_key: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub yahoo: Option<YahooProviderConfig>,
    pub exchange_rate: Option<ExchangeRateProviderConfig>,
    pub fred: Option<FredProviderConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            yahoo: Some(YahooProviderConfig {
                base_url: "https://query1.finance.yahoo.com".to_string(),
            }),
            exchange_rate: Some(ExchangeRateProviderConfig {
                base_url: "https://api.exchangerate-api.com".to_string(),
            }),
            fred: Some(FredProviderConfig {
                base_url: "https://api.stlouisfed.org".to_string(),
                api_key: None,
            }),
        }
    }
}

fn default_timezone() -> String {
    "US/Pacific".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub instruments: Vec<Instrument>,
    #[serde(default)]
    pub exchange_rate: FxPair,
    #[serde(default)]
    pub monthly_series: MonthlySeries,
    #[serde(default)]
    pub recipients: Vec<String>,
    #[serde(default)]
    pub email: EmailConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default = "default_timezone")]
    pub timezone: String,
    pub data_path: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("in", "finsnap", "finsnap")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("in", "finsnap", "finsnap")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    /// Location of the persisted monthly series record.
    pub fn series_store_path(&self) -> Result<PathBuf> {
        Ok(self
            .default_data_path()?
            .join(format!("{}.json", self.monthly_series.id.to_lowercase())))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let mut config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        let env_file = read_env_file(Path::new(".env"))?;
        config.apply_overrides(|key| {
            std::env::var(key)
                .ok()
                .or_else(|| env_file.get(key).cloned())
        })?;
        config.validate()?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    /// Applies deployment secrets: `EMAIL_USER`, `EMAIL_PASS`, `FRED_API_KEY`
    /// and `EMAIL_LIST` (a JSON array of addresses).
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(user) = lookup("EMAIL_USER") {
            self.email.from = Some(user);
        }
        if let Some(password) = lookup("EMAIL_PASS") {
            self.email.password = Some(password);
        }
        if let Some(key) = lookup("FRED_API_KEY") {
            let fred = self
                .providers
                .fred
                .get_or_insert_with(|| FredProviderConfig {
                    base_url: "https://api.stlouisfed.org".to_string(),
                    api_key: None,
                });
            fred.api_key = Some(key);
        }
        if let Some(list) = lookup("EMAIL_LIST") {
            self.recipients = serde_json::from_str(&list)
                .context("EMAIL_LIST must be a JSON array of addresses")?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.instruments.is_empty() {
            return Err(anyhow!("At least one instrument must be configured"));
        }
        self.timezone()?;
        Ok(())
    }

    pub fn timezone(&self) -> Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| anyhow!("Invalid timezone {}: {}", self.timezone, e))
    }
}

/// Reads `KEY=value` pairs from a dotenv file. A missing file has no entries.
///
/// Variables already set in the process environment take precedence over
/// these at lookup time.
pub fn read_env_file(path: &Path) -> Result<HashMap<String, String>> {
    match dotenvy::from_path_iter(path) {
        Ok(iter) => {
            let vars = iter
                .collect::<Result<HashMap<_, _>, _>>()
                .with_context(|| format!("Failed to parse env file: {}", path.display()))?;
            debug!(path = %path.display(), count = vars.len(), "Loaded env file");
            Ok(vars)
        }
        Err(e) if e.not_found() => Ok(HashMap::new()),
        Err(e) => Err(e).with_context(|| format!("Failed to read env file: {}", path.display())),
    }
}
