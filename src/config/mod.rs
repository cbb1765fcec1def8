//! User preferences, passed explicitly to whatever needs them.

use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use crate::currency::{CurrencyCode, LocaleConfig};
use crate::errors::TrackerError;
use crate::ledger::book::DEFAULT_HISTORY_WINDOW_MONTHS;

const CONFIG_DIR_NAME: &str = "cashflow";
const CONFIG_FILE_NAME: &str = "config.json";
const TMP_SUFFIX: &str = "tmp";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    #[default]
    System,
    Light,
    Dark,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub default_currency: CurrencyCode,
    pub locale: LocaleConfig,
    pub theme: ThemePreference,
    pub history_window_months: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_currency: CurrencyCode::default(),
            locale: LocaleConfig::default(),
            theme: ThemePreference::default(),
            history_window_months: DEFAULT_HISTORY_WINDOW_MONTHS,
        }
    }
}

pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<platform config dir>/cashflow/config.json`, or the working
    /// directory when the platform has none.
    pub fn default_location() -> Self {
        let base = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        Self::new(base.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Loads the config, falling back to defaults when no file exists yet.
    pub fn load(&self) -> Result<Config, TrackerError> {
        if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            let config = serde_json::from_str(&data)?;
            tracing::debug!(path = %self.path.display(), "config loaded");
            Ok(config)
        } else {
            tracing::debug!(path = %self.path.display(), "no config file; using defaults");
            Ok(Config::default())
        }
    }

    pub fn save(&self, config: &Config) -> Result<(), TrackerError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(config)?;
        let tmp = tmp_path(&self.path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;
        tracing::debug!(path = %self.path.display(), "config saved");
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<(), TrackerError> {
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}
