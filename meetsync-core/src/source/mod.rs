//! Calendar sources: where raw payloads come from.

mod google;
mod ical;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::config::Settings;
use crate::error::{MeetSyncError, MeetSyncResult};
use crate::event::SourceFormat;

pub use google::GoogleApiSource;
pub use ical::IcalFeedSource;

/// HTTP timeout for calendar fetches.
pub const FETCH_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

/// Time range a fetch should cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncWindow {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl SyncWindow {
    pub fn ahead(now: DateTime<Utc>, length: Duration) -> Self {
        SyncWindow {
            from: now,
            to: now + length,
        }
    }
}

/// Undecoded payload plus the format needed to decode it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPayload {
    pub format: SourceFormat,
    pub body: String,
}

#[async_trait]
pub trait CalendarSource: Send + Sync {
    /// Short human-readable label for logs.
    fn describe(&self) -> String;

    /// Fetch events overlapping `window`.
    ///
    /// Feeds that cannot filter server-side may return more than asked for;
    /// callers filter again after parsing.
    async fn fetch(&self, window: &SyncWindow) -> MeetSyncResult<RawPayload>;
}

/// Build the source configured in `settings`.
pub fn from_settings(settings: &Settings) -> MeetSyncResult<Box<dyn CalendarSource>> {
    let source = settings.source.as_ref().ok_or_else(|| {
        MeetSyncError::Config("no [source] configured; run `meetsync config` for the path".into())
    })?;

    match source.kind {
        SourceFormat::Ical => {
            let url = source.url.as_deref().filter(|u| !u.trim().is_empty()).ok_or_else(|| {
                MeetSyncError::Config("source.url is required for the ical source".into())
            })?;
            Ok(Box::new(IcalFeedSource::new(url)?))
        }
        SourceFormat::GoogleApi => {
            let token = settings.access_token()?;
            let mut api = GoogleApiSource::new(&source.calendar_id, token)?;
            if let Some(base_url) = &source.base_url {
                api = api.with_base_url(base_url);
            }
            Ok(Box::new(api))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SourceSettings;

    #[test]
    fn test_window_ahead() {
        let now = Utc::now();
        let window = SyncWindow::ahead(now, Duration::hours(24));
        assert_eq!(window.to - window.from, Duration::hours(24));
    }

    #[test]
    fn test_missing_source_is_config_error() {
        let settings = Settings::default();
        assert!(matches!(
            from_settings(&settings),
            Err(MeetSyncError::Config(_))
        ));
    }

    #[test]
    fn test_ical_requires_url() {
        let settings = Settings {
            source: Some(SourceSettings {
                url: None,
                ..SourceSettings::ical("")
            }),
            ..Default::default()
        };
        assert!(matches!(
            from_settings(&settings),
            Err(MeetSyncError::Config(_))
        ));
    }

    #[test]
    fn test_google_without_token() {
        let settings = Settings {
            source: Some(SourceSettings::google_api("primary")),
            ..Default::default()
        };
        assert!(matches!(
            from_settings(&settings),
            Err(MeetSyncError::MissingCredentials(_))
        ));
    }

    #[test]
    fn test_builds_configured_source() {
        let settings = Settings {
            source: Some(SourceSettings::ical("https://calendar.example.com/basic.ics")),
            ..Default::default()
        };
        let source = from_settings(&settings).expect("ical source");
        assert_eq!(source.describe(), "iCal feed calendar.example.com");
    }
}
