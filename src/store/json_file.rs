use crate::core::period::Period;
use crate::core::store::{PeriodValue, ValueStore};
use anyhow::{Context, Result, anyhow};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, warn};

/// On-disk layout: `{"value": 4.05, "last_updated": "2024-06"}`.
#[derive(Serialize, Deserialize)]
struct Record {
    value: serde_json::Number,
    last_updated: String,
}

impl Record {
    fn from_value(value: &PeriodValue) -> Result<Self> {
        let number = serde_json::Number::from_str(&value.value.normalize().to_string())
            .map_err(|e| anyhow!("Cannot encode {} as a JSON number: {}", value.value, e))?;
        Ok(Record {
            value: number,
            last_updated: value.period.to_string(),
        })
    }

    fn into_value(self) -> Result<PeriodValue> {
        let text = self.value.to_string();
        let value = Decimal::from_str(&text)
            .or_else(|_| Decimal::from_scientific(&text))
            .with_context(|| format!("Invalid value: {text}"))?;
        let period = self.last_updated.parse::<Period>()?;
        Ok(PeriodValue { value, period })
    }
}

/// Single JSON file holding the monthly series record.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Option<PeriodValue>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&self.path)?;
        let record: Record = serde_json::from_str(&contents)?;
        Ok(Some(record.into_value()?))
    }
}

impl ValueStore for JsonFileStore {
    fn load(&self) -> Option<PeriodValue> {
        match self.read() {
            Ok(value) => {
                debug!(path = %self.path.display(), found = value.is_some(), "Store LOAD");
                value
            }
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = ?e,
                    "Ignoring unreadable store record"
                );
                None
            }
        }
    }

    fn save(&self, value: &PeriodValue) -> std::io::Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir)?;

        let record = Record::from_value(value).map_err(|e| std::io::Error::other(e.to_string()))?;
        let json = serde_json::to_vec_pretty(&record)?;

        // Write next to the target and rename so readers never see a half-written record.
        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        tmp.write_all(&json)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;

        debug!(path = %self.path.display(), period = %value.period, "Store SAVE");
        Ok(())
    }
}
