//! User settings from `~/.gofinances/config.json`

use chrono::FixedOffset;
use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::services::LocaleConfig;
use crate::types::{GoFinancesError, Result};

/// Optional overrides; every field falls back to a default when absent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Locale tag such as "pt-BR" or "en-US"
    pub locale: Option<String>,
    /// Directory for stored transaction lists
    pub data_dir: Option<PathBuf>,
    /// Offset from UTC, in minutes, used when displaying dates
    pub utc_offset_minutes: Option<i32>,
}

impl Settings {
    /// Default location: `~/.gofinances/config.json`
    pub fn default_path() -> Result<PathBuf> {
        let base_dirs = BaseDirs::new()
            .ok_or_else(|| GoFinancesError::Config("Cannot determine home directory".into()))?;
        Ok(base_dirs.home_dir().join(".gofinances").join("config.json"))
    }

    /// Read settings; a missing file means defaults, a corrupt one is an error
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e.into()),
        };

        serde_json::from_str(&content).map_err(|e| {
            GoFinancesError::Config(format!("invalid settings in {}: {}", path.display(), e))
        })
    }

    /// Build the formatting configuration these settings describe
    pub fn locale_config(&self) -> Result<LocaleConfig> {
        let locale = match self.locale.as_deref() {
            Some(tag) => LocaleConfig::from_tag(tag)?,
            None => LocaleConfig::default(),
        };

        match self.utc_offset_minutes {
            Some(minutes) => {
                let offset = minutes
                    .checked_mul(60)
                    .and_then(FixedOffset::east_opt)
                    .ok_or_else(|| {
                        let message = format!("utc offset {} minutes out of range", minutes);
                        GoFinancesError::Config(message)
                    })?;
                Ok(locale.with_offset(offset))
            }
            None => Ok(locale),
        }
    }
}
