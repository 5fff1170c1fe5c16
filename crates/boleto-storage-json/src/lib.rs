use std::{
    cmp::Reverse,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use boleto_core::{
    storage::{schedule_violations, BackupInfo, PortfolioStorage},
    CoreError,
};
use boleto_domain::Boleto;
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;
use tracing::{info, warn};

const PORTFOLIO_STEM: &str = "boletos";
const JSON_EXTENSION: &str = "json";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S%3f";
const TMP_SUFFIX: &str = "tmp";
pub const DEFAULT_RETENTION: usize = 5;

/// Directory layout used by [`JsonPortfolioStorage`].
#[derive(Debug, Clone)]
pub struct StoragePaths {
    pub data_root: PathBuf,
    pub backup_root: PathBuf,
}

/// Filesystem-backed JSON persistence for the portfolio and its rolling backups.
#[derive(Clone)]
pub struct JsonPortfolioStorage {
    data_dir: PathBuf,
    backups_dir: PathBuf,
    retention: usize,
}

impl JsonPortfolioStorage {
    pub fn new(paths: StoragePaths) -> Result<Self, CoreError> {
        Self::with_retention(paths, DEFAULT_RETENTION)
    }

    pub fn with_retention(paths: StoragePaths, retention: usize) -> Result<Self, CoreError> {
        fs::create_dir_all(&paths.data_root)?;
        fs::create_dir_all(&paths.backup_root)?;
        Ok(Self {
            data_dir: paths.data_root,
            backups_dir: paths.backup_root,
            retention: retention.max(1),
        })
    }

    pub fn portfolio_path(&self) -> PathBuf {
        self.data_dir
            .join(format!("{}.{}", PORTFOLIO_STEM, JSON_EXTENSION))
    }

    pub fn backups_dir(&self) -> &Path {
        &self.backups_dir
    }

    pub fn delete_backup(&self, backup_id: &str) -> Result<(), CoreError> {
        let path = self.backups_dir.join(backup_id);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    fn write_backup_file(
        &self,
        portfolio: &[Boleto],
        note: Option<&str>,
    ) -> Result<BackupInfo, CoreError> {
        let (file_name, timestamp) = self.next_backup_name(note)?;
        let path = self.backups_dir.join(&file_name);
        write_atomic(&path, &serialize_portfolio(portfolio)?)?;
        self.prune_backups()?;
        info!(backup = %file_name, count = portfolio.len(), "wrote portfolio backup");
        Ok(BackupInfo {
            id: file_name,
            created_at: timestamp,
            path,
        })
    }

    fn backup_existing_file(&self, path: &Path) -> Result<(), CoreError> {
        if !path.exists() {
            return Ok(());
        }
        let (file_name, _) = self.next_backup_name(None)?;
        fs::copy(path, self.backups_dir.join(file_name))?;
        self.prune_backups()
    }

    /// `boletos_YYYYMMDD_HHMMSSmmm[-N][_note].json`, where `-N` numbers
    /// backups taken within the same millisecond so none is overwritten.
    fn next_backup_name(&self, note: Option<&str>) -> Result<(String, String), CoreError> {
        fs::create_dir_all(&self.backups_dir)?;
        let timestamp = Utc::now().format(BACKUP_TIMESTAMP_FORMAT).to_string();
        let label = sanitize_backup_note(note);
        let existing: Vec<String> = fs::read_dir(&self.backups_dir)?
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .collect();
        let mut sequence = 0u32;
        loop {
            let mut stem = format!("{}_{}", PORTFOLIO_STEM, timestamp);
            if sequence > 0 {
                stem.push_str(&format!("-{}", sequence));
            }
            let taken = existing.iter().any(|name| {
                name.strip_prefix(stem.as_str()).is_some_and(|rest| {
                    rest.starts_with('_') || rest == format!(".{}", JSON_EXTENSION)
                })
            });
            if !taken {
                if let Some(label) = &label {
                    stem.push('_');
                    stem.push_str(label);
                }
                return Ok((format!("{}.{}", stem, JSON_EXTENSION), timestamp));
            }
            sequence += 1;
        }
    }

    fn prune_backups(&self) -> Result<(), CoreError> {
        let entries = self.list_backups()?;
        for entry in entries.into_iter().skip(self.retention) {
            let _ = fs::remove_file(entry.path);
        }
        Ok(())
    }
}

impl PortfolioStorage for JsonPortfolioStorage {
    fn load(&self) -> Result<Vec<Boleto>, CoreError> {
        let path = self.portfolio_path();
        if !path.exists() {
            info!(path = %path.display(), "no portfolio file yet; starting empty");
            return Ok(Vec::new());
        }
        let portfolio = load_portfolio_from_path(&path)?;
        info!(count = portfolio.len(), "loaded portfolio");
        Ok(portfolio)
    }

    fn save(&self, portfolio: &[Boleto]) -> Result<(), CoreError> {
        let path = self.portfolio_path();
        self.backup_existing_file(&path)?;
        save_portfolio_to_path(portfolio, &path)?;
        info!(count = portfolio.len(), "saved portfolio");
        Ok(())
    }

    fn backup(&self, portfolio: &[Boleto], note: Option<&str>) -> Result<BackupInfo, CoreError> {
        self.write_backup_file(portfolio, note)
    }

    /// Newest first.
    fn list_backups(&self) -> Result<Vec<BackupInfo>, CoreError> {
        if !self.backups_dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for entry in fs::read_dir(&self.backups_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(JSON_EXTENSION) {
                continue;
            }
            if let Some(file_name) = path.file_name().and_then(|name| name.to_str()) {
                let Some((created, sequence)) = parse_backup_name(file_name) else {
                    continue;
                };
                entries.push((
                    (created, sequence),
                    BackupInfo {
                        id: file_name.to_string(),
                        created_at: created.to_rfc3339(),
                        path: path.clone(),
                    },
                ));
            }
        }
        entries.sort_by_key(|(stamp, info)| (Reverse(*stamp), Reverse(info.id.clone())));
        Ok(entries.into_iter().map(|(_, info)| info).collect())
    }

    fn restore(&self, backup: &BackupInfo) -> Result<Vec<Boleto>, CoreError> {
        if !backup.path.exists() {
            return Err(CoreError::Storage(format!(
                "backup `{}` not found",
                backup.id
            )));
        }
        let restored = load_portfolio_from_path(&backup.path)?;
        let target = self.portfolio_path();
        self.backup_existing_file(&target)?;
        save_portfolio_to_path(&restored, &target)?;
        info!(backup = %backup.id, count = restored.len(), "restored portfolio");
        Ok(restored)
    }
}

/// Saves the portfolio to an arbitrary path, replacing it atomically.
pub fn save_portfolio_to_path(portfolio: &[Boleto], path: &Path) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = tmp_path(path);
    write_atomic(&tmp, &serialize_portfolio(portfolio)?)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

pub fn load_portfolio_from_path(path: &Path) -> Result<Vec<Boleto>, CoreError> {
    let data = fs::read_to_string(path)?;
    serde_json::from_str(&data).map_err(|err| CoreError::Serde(err.to_string()))
}

/// Serializes the whole portfolio as a pretty-printed top-level JSON array.
pub fn export_portfolio(portfolio: &[Boleto]) -> Result<Vec<u8>, CoreError> {
    let bytes = serde_json::to_vec_pretty(portfolio)
        .map_err(|err| CoreError::Serde(err.to_string()))?;
    info!(count = portfolio.len(), bytes = bytes.len(), "exported portfolio");
    Ok(bytes)
}

/// Parses an exported portfolio, rejecting the whole payload on the first bad entry.
pub fn import_portfolio(bytes: &[u8]) -> Result<Vec<Boleto>, CoreError> {
    let value: Value = serde_json::from_slice(bytes).map_err(|err| reject(err.to_string()))?;
    let Value::Array(items) = value else {
        return Err(reject("top-level value must be an array of boletos".into()));
    };
    let mut portfolio = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        let boleto: Boleto = serde_json::from_value(item)
            .map_err(|err| reject(format!("entry {index}: {err}")))?;
        if let Some(violation) = schedule_violations(&boleto).into_iter().next() {
            return Err(reject(format!("entry {index}: {violation}")));
        }
        portfolio.push(boleto);
    }
    info!(count = portfolio.len(), "imported portfolio");
    Ok(portfolio)
}

/// Suggested file name for an export made on `date`.
pub fn backup_file_name(date: NaiveDate) -> String {
    format!("boletos-backup-{}.json", date.format("%Y-%m-%d"))
}

fn reject(reason: String) -> CoreError {
    warn!(%reason, "rejected portfolio import");
    CoreError::Format(reason)
}

fn sanitize_backup_note(note: Option<&str>) -> Option<String> {
    let raw = note?.trim();
    if raw.is_empty() {
        return None;
    }
    let mut sanitized = String::new();
    let mut last_dash = false;
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            sanitized.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if (ch.is_whitespace() || matches!(ch, '-' | '.' | '_'))
            && !sanitized.is_empty()
            && !last_dash
        {
            sanitized.push('-');
            last_dash = true;
        }
    }
    let trimmed = sanitized.trim_matches('-').to_string();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

/// Reads the timestamp and same-millisecond sequence out of
/// `boletos_YYYYMMDD_HHMMSS[mmm][-N][_note].json`.
fn parse_backup_name(name: &str) -> Option<(DateTime<Utc>, u32)> {
    let trimmed = name.strip_suffix(&format!(".{}", JSON_EXTENSION))?;
    let rest = trimmed.strip_prefix(&format!("{}_", PORTFOLIO_STEM))?;
    let mut segments = rest.split('_');
    let date = segments.next()?;
    let time_segment = segments.next()?;
    let (time, sequence) = match time_segment.split_once('-') {
        Some((time, sequence)) => (time, sequence.parse::<u32>().ok()?),
        None => (time_segment, 0),
    };
    if !is_digits(date, 8) {
        return None;
    }
    let (clock, millis) = match time.len() {
        6 if is_digits(time, 6) => (time, 0),
        9 if is_digits(time, 9) => (&time[..6], time[6..].parse::<i64>().ok()?),
        _ => return None,
    };
    let naive = NaiveDateTime::parse_from_str(&format!("{}{}", date, clock), "%Y%m%d%H%M%S")
        .ok()?
        + Duration::milliseconds(millis);
    Some((DateTime::from_naive_utc_and_offset(naive, Utc), sequence))
}

fn is_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.chars().all(|c| c.is_ascii_digit())
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

fn write_atomic(path: &Path, data: &str) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}

fn serialize_portfolio(portfolio: &[Boleto]) -> Result<String, CoreError> {
    serde_json::to_string_pretty(portfolio).map_err(|err| CoreError::Serde(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn backup_names_carry_a_parsable_timestamp() {
        let (parsed, sequence) = parse_backup_name("boletos_20240315_093000_pre-import.json")
            .expect("timestamp");
        assert_eq!(parsed.to_rfc3339(), "2024-03-15T09:30:00+00:00");
        assert_eq!(sequence, 0);
        assert!(parse_backup_name("boletos.json").is_none());
        assert!(parse_backup_name("other_20240315_093000.json").is_none());
    }

    #[test]
    fn millisecond_names_and_sequences_parse() {
        let (parsed, sequence) =
            parse_backup_name("boletos_20240315_093000250-2_before-import.json").expect("parse");
        assert_eq!(parsed.timestamp_subsec_millis(), 250);
        assert_eq!(sequence, 2);
        let (_, first) = parse_backup_name("boletos_20240315_093000250.json").expect("parse");
        assert_eq!(first, 0);
        assert!(parse_backup_name("boletos_20240315_093000250-x.json").is_none());
    }

    #[test]
    fn notes_are_slugged() {
        assert_eq!(
            sanitize_backup_note(Some("  Before Import v2.0 ")),
            Some("before-import-v2-0".into())
        );
        assert_eq!(sanitize_backup_note(Some("***")), None);
        assert_eq!(sanitize_backup_note(None), None);
    }

    #[test]
    fn tmp_path_appends_suffix() {
        assert_eq!(
            tmp_path(Path::new("/data/boletos.json")),
            PathBuf::from("/data/boletos.json.tmp")
        );
    }
}
