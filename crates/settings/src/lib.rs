//! Persistent configuration for the NoteLinker components.
//!
//! The settings model owns the date-format choice consumed by the trigger
//! rewriters plus the connection fields a host hands to its issue-tracker
//! collaborator. Unrecognised `date_format` tokens never fail a load; they
//! fall back to `YYYY-MM-DD`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use notelinker_triggers::DateFormat;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const SETTINGS_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse settings {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize settings {path}: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write settings {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to prepare directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default, with = "date_format_token")]
    pub date_format: DateFormat,
    #[serde(default)]
    pub lookup: LookupSettings,
}

fn default_version() -> u32 {
    SETTINGS_VERSION
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION,
            date_format: DateFormat::default(),
            lookup: LookupSettings::default(),
        }
    }
}

impl Settings {
    pub fn sanitize(&mut self) {
        if self.version == 0 {
            self.version = SETTINGS_VERSION;
        }
        self.lookup.sanitize();
    }
}

/// Which tracker backend the host's lookup collaborator talks to. The core
/// never interprets these fields; they are stored and handed over verbatim.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LookupProvider {
    #[default]
    Jira,
    Github,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupSettings {
    #[serde(default)]
    pub provider: LookupProvider,
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub api_token: String,
}

impl Default for LookupSettings {
    fn default() -> Self {
        Self {
            provider: LookupProvider::default(),
            base_url: String::new(),
            username: String::new(),
            api_token: String::new(),
        }
    }
}

impl LookupSettings {
    fn sanitize(&mut self) {
        self.base_url = self.base_url.trim().trim_end_matches('/').to_string();
        self.username = self.username.trim().to_string();
        self.api_token = self.api_token.trim().to_string();
    }

    /// Whether the host has enough to construct a lookup client.
    pub fn is_configured(&self) -> bool {
        !self.base_url.is_empty()
    }
}

/// Serialises [`DateFormat`] through its configuration token. Unknown or
/// missing tokens deserialize as the default rather than failing the load.
mod date_format_token {
    use notelinker_triggers::DateFormat;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(format: &DateFormat, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(format.token())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateFormat, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw
            .as_deref()
            .and_then(DateFormat::parse_token)
            .unwrap_or_default())
    }
}

/// Disk-backed settings store: loads sanitized defaults when the file is
/// missing, saves through a temporary file and an atomic rename.
#[derive(Debug)]
pub struct SettingsStore {
    path: PathBuf,
    data: Settings,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>, settings: Settings) -> Self {
        Self {
            path: path.into(),
            data: settings,
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            let mut data = Settings::default();
            data.sanitize();
            return Ok(Self { path, data });
        }

        let contents = fs::read_to_string(&path).map_err(|source| SettingsError::Read {
            path: path.clone(),
            source,
        })?;
        let mut data: Settings =
            serde_json::from_str(&contents).map_err(|source| SettingsError::Parse {
                path: path.clone(),
                source,
            })?;
        data.sanitize();
        Ok(Self { path, data })
    }

    pub fn settings(&self) -> &Settings {
        &self.data
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.data
    }

    pub fn update<F>(&mut self, mut op: F) -> Result<(), SettingsError>
    where
        F: FnMut(&mut Settings),
    {
        op(&mut self.data);
        self.data.sanitize();
        self.save()
    }

    pub fn save(&self) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| SettingsError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let payload =
            serde_json::to_string_pretty(&self.data).map_err(|source| SettingsError::Serialize {
                path: self.path.clone(),
                source,
            })?;

        let tmp_path = self.path.with_extension("tmp");
        fs::write(&tmp_path, payload.as_bytes()).map_err(|source| SettingsError::Write {
            path: tmp_path.clone(),
            source,
        })?;
        fs::rename(&tmp_path, &self.path).map_err(|source| SettingsError::Write {
            path: self.path.clone(),
            source,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn export_to(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| SettingsError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let payload =
            serde_json::to_string_pretty(&self.data).map_err(|source| SettingsError::Serialize {
                path: path.clone(),
                source,
            })?;
        fs::write(&path, payload.as_bytes())
            .map_err(|source| SettingsError::Write { path, source })
    }

    pub fn import_from(&mut self, source: impl AsRef<Path>) -> Result<(), SettingsError> {
        let source = source.as_ref().to_path_buf();
        let contents = fs::read_to_string(&source).map_err(|err| SettingsError::Read {
            path: source.clone(),
            source: err,
        })?;
        let mut data: Settings =
            serde_json::from_str(&contents).map_err(|err| SettingsError::Parse {
                path: source.clone(),
                source: err,
            })?;
        data.sanitize();
        self.backup_existing()?;
        self.data = data;
        self.save()
    }

    fn backup_existing(&self) -> Result<(), SettingsError> {
        if self.path.exists() {
            let backup = self.path.with_extension("bak");
            fs::copy(&self.path, &backup).map_err(|source| SettingsError::Write {
                path: backup,
                source,
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_use_iso_dates() {
        let settings = Settings::default();
        assert_eq!(settings.date_format, DateFormat::Iso);
        assert_eq!(settings.lookup.provider, LookupProvider::Jira);
        assert!(!settings.lookup.is_configured());
    }

    #[test]
    fn known_tokens_deserialize_to_their_format() {
        let settings: Settings =
            serde_json::from_str(r#"{ "date_format": "DD/MM/YYYY" }"#).unwrap();
        assert_eq!(settings.date_format, DateFormat::DayMonthYearSlash);
    }

    #[test]
    fn unknown_tokens_fall_back_to_iso() {
        let settings: Settings =
            serde_json::from_str(r#"{ "date_format": "YYYY/MM/DD" }"#).unwrap();
        assert_eq!(settings.date_format, DateFormat::Iso);

        let settings: Settings = serde_json::from_str(r#"{ "date_format": null }"#).unwrap();
        assert_eq!(settings.date_format, DateFormat::Iso);

        let settings: Settings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings.date_format, DateFormat::Iso);
    }

    #[test]
    fn serialization_emits_the_canonical_token() {
        let mut settings = Settings::default();
        settings.date_format = DateFormat::MonthDayYear;
        let json = serde_json::to_string(&settings).unwrap();
        assert!(json.contains("\"MM-DD-YYYY\""));
    }

    #[test]
    fn sanitize_normalises_lookup_fields() {
        let mut settings = Settings {
            version: 0,
            date_format: DateFormat::Iso,
            lookup: LookupSettings {
                provider: LookupProvider::Jira,
                base_url: " https://tracker.example.com/ ".into(),
                username: " bot ".into(),
                api_token: "token\n".into(),
            },
        };
        settings.sanitize();
        assert_eq!(settings.version, SETTINGS_VERSION);
        assert_eq!(settings.lookup.base_url, "https://tracker.example.com");
        assert_eq!(settings.lookup.username, "bot");
        assert_eq!(settings.lookup.api_token, "token");
        assert!(settings.lookup.is_configured());
    }
}
