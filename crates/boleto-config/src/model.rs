use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::ConfigError;

/// Stores user-configurable preferences for the tracker.
///
/// Enumerated settings such as the schedule anchor are kept as plain strings
/// and parsed by the code that consumes them, so an older binary never fails
/// to load a newer file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "Config::default_locale")]
    pub locale: String,
    #[serde(default = "Config::default_currency")]
    pub currency: String,
    #[serde(default = "Config::default_ui_color_enabled")]
    pub ui_color_enabled: bool,
    /// Days ahead of today in which an unpaid installment counts as due soon.
    #[serde(default = "Config::default_due_soon_days")]
    pub due_soon_days: u32,
    /// `next-month` or `creation-date`.
    #[serde(default = "Config::default_schedule_anchor_value")]
    pub default_schedule_anchor: String,
    #[serde(default = "Config::default_upcoming_limit")]
    pub upcoming_limit: usize,
    #[serde(default = "Config::default_backup_retention")]
    pub backup_retention: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Optional custom directory for the portfolio file. Defaults to `<data dir>/boleto-tracker`.
    pub data_root: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Optional custom directory for portfolio backups. Defaults to `<data root>/backups`.
    pub backup_root: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: Self::default_locale(),
            currency: Self::default_currency(),
            ui_color_enabled: Self::default_ui_color_enabled(),
            due_soon_days: Self::default_due_soon_days(),
            default_schedule_anchor: Self::default_schedule_anchor_value(),
            upcoming_limit: Self::default_upcoming_limit(),
            backup_retention: Self::default_backup_retention(),
            data_root: None,
            backup_root: None,
        }
    }
}

impl Config {
    pub const KEYS: [&'static str; 9] = [
        "locale",
        "currency",
        "ui_color_enabled",
        "due_soon_days",
        "default_schedule_anchor",
        "upcoming_limit",
        "backup_retention",
        "data_root",
        "backup_root",
    ];

    pub fn default_locale() -> String {
        "pt-BR".into()
    }

    pub fn default_currency() -> String {
        "BRL".into()
    }

    pub fn default_ui_color_enabled() -> bool {
        true
    }

    /// Upper bound accepted by `set` for the due-soon window.
    pub const MAX_DUE_SOON_DAYS: u32 = 365;

    pub fn default_due_soon_days() -> u32 {
        7
    }

    pub fn default_schedule_anchor_value() -> String {
        "next-month".into()
    }

    pub fn default_upcoming_limit() -> usize {
        5
    }

    pub fn default_backup_retention() -> usize {
        5
    }

    pub fn resolve_data_root(&self) -> PathBuf {
        if let Some(path) = &self.data_root {
            return path.clone();
        }

        let base = dirs::data_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        base.join("boleto-tracker")
    }

    pub fn resolve_backup_root(&self) -> PathBuf {
        if let Some(path) = &self.backup_root {
            return path.clone();
        }
        self.resolve_data_root().join("backups")
    }

    /// Reads one setting as text, `None` for unknown keys.
    pub fn get(&self, key: &str) -> Option<String> {
        let value = match key {
            "locale" => self.locale.clone(),
            "currency" => self.currency.clone(),
            "ui_color_enabled" => self.ui_color_enabled.to_string(),
            "due_soon_days" => self.due_soon_days.to_string(),
            "default_schedule_anchor" => self.default_schedule_anchor.clone(),
            "upcoming_limit" => self.upcoming_limit.to_string(),
            "backup_retention" => self.backup_retention.to_string(),
            "data_root" => display_path(&self.data_root),
            "backup_root" => display_path(&self.backup_root),
            _ => return None,
        };
        Some(value)
    }

    /// Updates one setting from text. An empty value clears the optional roots.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let trimmed = value.trim();
        match key {
            "locale" => self.locale = non_empty(key, trimmed)?,
            "currency" => self.currency = non_empty(key, trimmed)?.to_ascii_uppercase(),
            "ui_color_enabled" => self.ui_color_enabled = parse_value(key, trimmed)?,
            "due_soon_days" => {
                let days: u32 = parse_value(key, trimmed)?;
                if days > Self::MAX_DUE_SOON_DAYS {
                    return Err(invalid(key, trimmed, "must be at most 365 days"));
                }
                self.due_soon_days = days;
            }
            "default_schedule_anchor" => {
                let normalized = trimmed.to_ascii_lowercase().replace('_', "-");
                if !matches!(normalized.as_str(), "next-month" | "creation-date") {
                    return Err(invalid(key, trimmed, "expected next-month or creation-date"));
                }
                self.default_schedule_anchor = normalized;
            }
            "upcoming_limit" => self.upcoming_limit = parse_value(key, trimmed)?,
            "backup_retention" => {
                let retention: usize = parse_value(key, trimmed)?;
                if retention == 0 {
                    return Err(invalid(key, trimmed, "must keep at least one backup"));
                }
                self.backup_retention = retention;
            }
            "data_root" => self.data_root = optional_path(trimmed),
            "backup_root" => self.backup_root = optional_path(trimmed),
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }
}

fn display_path(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_default()
}

fn optional_path(value: &str) -> Option<PathBuf> {
    if value.is_empty() {
        None
    } else {
        Some(PathBuf::from(value))
    }
}

fn non_empty(key: &str, value: &str) -> Result<String, ConfigError> {
    if value.is_empty() {
        Err(invalid(key, value, "must not be empty"))
    } else {
        Ok(value.to_string())
    }
}

fn parse_value<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse::<T>()
        .map_err(|err| invalid(key, value, &err.to_string()))
}

fn invalid(key: &str, value: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
