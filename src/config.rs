use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;
use crate::models::SchemaChoice;

pub const ENV_DEBOUNCE_MS: &str = "QR_SCANNER_DEBOUNCE_MS";
pub const ENV_SCHEMA: &str = "QR_SCANNER_SCHEMA";
pub const ENV_EXPORT_DIR: &str = "QR_SCANNER_EXPORT_DIR";

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(1000);
/// One day. Longer windows would make the scanner effectively single-shot.
pub const MAX_DEBOUNCE_MS: u64 = 86_400_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannerConfig {
    /// Window after a processed scan during which further scans are skipped as busy.
    pub debounce: Duration,
    pub schema: SchemaChoice,
    /// Directory for the export file; `None` means the user's Downloads folder.
    pub export_dir: Option<PathBuf>,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            schema: SchemaChoice::default(),
            export_dir: None,
        }
    }
}

impl ScannerConfig {
    /// Load `.env` (if any) and read `QR_SCANNER_*` variables from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(raw) = get(ENV_DEBOUNCE_MS) {
            config.debounce = parse_debounce_ms(&raw)?;
        }
        if let Some(raw) = get(ENV_SCHEMA) {
            config.schema = raw.parse()?;
        }
        if let Some(raw) = get(ENV_EXPORT_DIR) {
            config.export_dir = Some(PathBuf::from(raw.trim()));
        }
        Ok(config)
    }
}

/// Milliseconds in `0..=MAX_DEBOUNCE_MS`.
pub fn parse_debounce_ms(raw: &str) -> Result<Duration, ConfigError> {
    raw.trim()
        .parse::<u64>()
        .ok()
        .filter(|ms| *ms <= MAX_DEBOUNCE_MS)
        .map(Duration::from_millis)
        .ok_or_else(|| ConfigError::InvalidDebounce {
            value: raw.to_string(),
        })
}
