use crate::core::store::{PeriodValue, ValueStore};
use std::sync::Mutex;
use tracing::debug;

/// In-memory store, lost when the process exits.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Option<PeriodValue>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(value: PeriodValue) -> Self {
        Self {
            inner: Mutex::new(Some(value)),
        }
    }
}

impl ValueStore for MemoryStore {
    fn load(&self) -> Option<PeriodValue> {
        let value = self.inner.lock().ok()?.clone();
        debug!(found = value.is_some(), "Memory store LOAD");
        value
    }

    fn save(&self, value: &PeriodValue) -> std::io::Result<()> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|e| std::io::Error::other(e.to_string()))?;
        *inner = Some(value.clone());
        debug!(period = %value.period, "Memory store SAVE");
        Ok(())
    }
}
