//! meetsync configuration.
//!
//! Settings live in `~/.config/meetsync/config.toml` and can be overridden by
//! `MEETSYNC_*` environment variables (nested keys use `__`, e.g.
//! `MEETSYNC_SOURCE__URL`).

use std::path::{Path, PathBuf};

use chrono::Duration;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_ALERT_DURATION_SECS, DEFAULT_HORIZON_HOURS, DEFAULT_LEAD_MINUTES,
    DEFAULT_POLL_INTERVAL_SECS, DEFAULT_REMINDER_LIST, DEFAULT_SNOOZE_MINUTES, MAX_HORIZON_HOURS,
    MAX_OFFSET_MINUTES,
};
use crate::error::{MeetSyncError, MeetSyncResult};
use crate::event::SourceFormat;

const LEDGER_FILE: &str = "synced_events.json";

fn default_horizon_hours() -> i64 {
    DEFAULT_HORIZON_HOURS
}

fn default_lead_minutes() -> i64 {
    DEFAULT_LEAD_MINUTES
}

fn default_poll_interval_secs() -> u64 {
    DEFAULT_POLL_INTERVAL_SECS
}

fn default_alert_duration_secs() -> u64 {
    DEFAULT_ALERT_DURATION_SECS
}

fn default_snooze_minutes() -> i64 {
    DEFAULT_SNOOZE_MINUTES
}

fn default_reminder_list() -> String {
    DEFAULT_REMINDER_LIST.to_string()
}

fn default_calendar_id() -> String {
    "primary".to_string()
}

/// Where calendar events come from.
///
/// Settings for both source kinds may be present; `kind` picks the one used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceSettings {
    pub kind: SourceFormat,

    /// Secret iCal address of a calendar.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default = "default_calendar_id")]
    pub calendar_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_file: Option<PathBuf>,

    /// Calendar API root, for pointing at a proxy or test server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl SourceSettings {
    pub fn ical(url: impl Into<String>) -> Self {
        SourceSettings {
            kind: SourceFormat::Ical,
            url: Some(url.into()),
            calendar_id: default_calendar_id(),
            token_file: None,
            base_url: None,
        }
    }

    pub fn google_api(calendar_id: impl Into<String>) -> Self {
        SourceSettings {
            kind: SourceFormat::GoogleApi,
            url: None,
            calendar_id: calendar_id.into(),
            token_file: None,
            base_url: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_horizon_hours")]
    pub horizon_hours: i64,

    #[serde(default = "default_lead_minutes")]
    pub lead_minutes: i64,

    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    #[serde(default = "default_alert_duration_secs")]
    pub alert_duration_secs: u64,

    #[serde(default = "default_snooze_minutes")]
    pub snooze_minutes: i64,

    #[serde(default = "default_reminder_list")]
    pub reminder_list: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ledger_path: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,

    /// Your own address; never listed as a reminder's organizer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub self_email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceSettings>,

    /// Usually supplied as `MEETSYNC_ACCESS_TOKEN`.
    #[serde(default, skip_serializing)]
    pub access_token: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            horizon_hours: DEFAULT_HORIZON_HOURS,
            lead_minutes: DEFAULT_LEAD_MINUTES,
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            alert_duration_secs: DEFAULT_ALERT_DURATION_SECS,
            snooze_minutes: DEFAULT_SNOOZE_MINUTES,
            reminder_list: DEFAULT_REMINDER_LIST.to_string(),
            ledger_path: None,
            log_file: None,
            self_email: None,
            source: None,
            access_token: None,
        }
    }
}

impl Settings {
    pub fn config_path() -> MeetSyncResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| MeetSyncError::Config("Could not determine config directory".into()))?
            .join("meetsync");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from the default location, creating a commented config file on
    /// first use.
    pub fn load() -> MeetSyncResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
            tracing::info!(path = %config_path.display(), "created default config");
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> MeetSyncResult<Self> {
        let settings: Settings = Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(
                Environment::with_prefix("MEETSYNC")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| MeetSyncError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| MeetSyncError::Config(e.to_string()))?;

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> MeetSyncResult<()> {
        if !(1..=MAX_HORIZON_HOURS).contains(&self.horizon_hours) {
            return Err(MeetSyncError::Config(format!(
                "horizon_hours must be between 1 and {MAX_HORIZON_HOURS}"
            )));
        }
        if !(0..=MAX_OFFSET_MINUTES).contains(&self.lead_minutes) {
            return Err(MeetSyncError::Config(format!(
                "lead_minutes must be between 0 and {MAX_OFFSET_MINUTES}"
            )));
        }
        if self.poll_interval_secs == 0 {
            return Err(MeetSyncError::Config("poll_interval_secs must be positive".into()));
        }
        if !(1..=MAX_OFFSET_MINUTES).contains(&self.snooze_minutes) {
            return Err(MeetSyncError::Config(format!(
                "snooze_minutes must be between 1 and {MAX_OFFSET_MINUTES}"
            )));
        }
        Ok(())
    }

    pub fn horizon(&self) -> Duration {
        Duration::hours(self.horizon_hours.clamp(0, MAX_HORIZON_HOURS))
    }

    pub fn poll_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.poll_interval_secs)
    }

    pub fn alert_duration(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.alert_duration_secs)
    }

    /// The configured ledger path, or `synced_events.json` in the data dir.
    pub fn ledger_path(&self) -> MeetSyncResult<PathBuf> {
        match &self.ledger_path {
            Some(path) => Ok(expand(path)),
            None => Ok(data_dir()?.join(LEDGER_FILE)),
        }
    }

    pub fn log_file(&self) -> Option<PathBuf> {
        self.log_file.as_deref().map(expand)
    }

    /// Token for the Google API source: the inline/env value first, then the
    /// token file.
    pub fn access_token(&self) -> MeetSyncResult<String> {
        if let Some(token) = self.access_token.as_deref().map(str::trim)
            && !token.is_empty()
        {
            return Ok(token.to_string());
        }

        let token_file = match self.source.as_ref().and_then(|s| s.token_file.as_deref()) {
            Some(path) => expand(path),
            None => {
                return Err(MeetSyncError::MissingCredentials(
                    "set MEETSYNC_ACCESS_TOKEN or source.token_file".into(),
                ));
            }
        };

        let content = std::fs::read_to_string(&token_file).map_err(|e| {
            MeetSyncError::MissingCredentials(format!("{}: {e}", token_file.display()))
        })?;
        read_token(&content).ok_or_else(|| {
            MeetSyncError::MissingCredentials(format!(
                "{} contains no access_token",
                token_file.display()
            ))
        })
    }

    /// Create a default config file with everything but the source commented out.
    pub fn create_default_config(path: &Path) -> MeetSyncResult<()> {
        let contents = format!(
            "\
# meetsync configuration

# Look this far ahead for meetings:
# horizon_hours = {DEFAULT_HORIZON_HOURS}

# Reminders and alerts fire this many minutes before a meeting:
# lead_minutes = {DEFAULT_LEAD_MINUTES}

# Alert mode (`meetsync watch`):
# poll_interval_secs = {DEFAULT_POLL_INTERVAL_SECS}
# alert_duration_secs = {DEFAULT_ALERT_DURATION_SECS}
# snooze_minutes = {DEFAULT_SNOOZE_MINUTES}

# Reminders list that receives meeting reminders:
# reminder_list = \"{DEFAULT_REMINDER_LIST}\"

# ledger_path = \"~/.local/share/meetsync/{LEDGER_FILE}\"
# log_file = \"~/.local/share/meetsync/sync.log\"
# self_email = \"me@example.com\"

# [source]
# kind = \"ical\"
# url = \"https://calendar.google.com/calendar/ical/.../basic.ics\"
#
# or:
#
# [source]
# kind = \"google_api\"
# calendar_id = \"primary\"
# token_file = \"~/.config/meetsync/token.json\"
"
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                MeetSyncError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| MeetSyncError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}

pub fn data_dir() -> MeetSyncResult<PathBuf> {
    Ok(dirs::data_dir()
        .ok_or_else(|| MeetSyncError::Config("Could not determine data directory".into()))?
        .join("meetsync"))
}

fn expand(path: &Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned())
}

/// Accepts `{"access_token": "..."}` or a bare token.
fn read_token(content: &str) -> Option<String> {
    #[derive(Deserialize)]
    struct TokenFile {
        access_token: String,
    }

    let token = match serde_json::from_str::<TokenFile>(content) {
        Ok(file) => file.access_token,
        Err(_) => content.trim().to_string(),
    };
    let token = token.trim();
    (!token.is_empty() && !token.starts_with('{')).then(|| token.to_string())
}
