use crate::engine::EngineError;
use crate::limits::*;

/// Runtime settings, read from `NIGHTBOOK_*` environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub slot_count: u32,
    pub slot_hours: u32,
    pub session_min_run: u32,
    pub session_min_total: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            slot_count: DEFAULT_SLOT_COUNT,
            slot_hours: DEFAULT_SLOT_HOURS,
            session_min_run: SESSION_MIN_CONSECUTIVE,
            session_min_total: SESSION_MIN_TOTAL,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, EngineError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Unset or unparsable values fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, EngineError> {
        let get = |key: &str, default: u32| -> u32 {
            lookup(key)
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(default)
        };
        let config = Self {
            slot_count: get("NIGHTBOOK_SLOT_COUNT", DEFAULT_SLOT_COUNT),
            slot_hours: get("NIGHTBOOK_SLOT_HOURS", DEFAULT_SLOT_HOURS),
            session_min_run: get("NIGHTBOOK_SESSION_MIN_RUN", SESSION_MIN_CONSECUTIVE),
            session_min_total: get("NIGHTBOOK_SESSION_MIN_TOTAL", SESSION_MIN_TOTAL),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.slot_count == 0 || self.slot_count > MAX_SLOT_COUNT {
            return Err(EngineError::InvalidConfig("slot count out of range"));
        }
        if self.slot_hours == 0 {
            return Err(EngineError::InvalidConfig("slot length must be positive"));
        }
        if self.slot_count.saturating_mul(self.slot_hours).saturating_mul(60) > MINUTES_PER_DAY {
            return Err(EngineError::InvalidConfig("slot grid longer than a day"));
        }
        if self.session_min_run == 0 || self.session_min_total == 0 {
            return Err(EngineError::InvalidConfig("session thresholds must be positive"));
        }
        Ok(())
    }
}
