//! Source-neutral event types.
//!
//! Both feed formats are decoded into [`NormalizedEvent`], so the eligibility
//! filter, link extractor and sync engine never see source-specific shapes.

use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::constants::UNTITLED_MEETING;

/// Which payload format an event was decoded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceFormat {
    /// Google Calendar `events.list` JSON response.
    GoogleApi,
    /// Line-oriented iCalendar feed text.
    Ical,
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceFormat::GoogleApi => write!(f, "google-api"),
            SourceFormat::Ical => write!(f, "ical"),
        }
    }
}

/// A structured conferencing entry point (video, phone, sip...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryPoint {
    pub kind: String,
    pub uri: String,
}

/// A calendar event after parsing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedEvent {
    pub id: String,
    pub summary: String,
    /// `None` for all-day events.
    pub start: Option<DateTime<FixedOffset>>,
    pub is_all_day: bool,
    pub is_cancelled: bool,
    pub description: String,
    pub location: String,
    /// Direct conferencing link (e.g. Google's `hangoutLink`).
    pub conferencing_uri: Option<String>,
    pub entry_points: Vec<EntryPoint>,
    pub organizer_email: Option<String>,
    pub origin: SourceFormat,
}

impl NormalizedEvent {
    /// A confirmed event with no free text or conferencing data.
    pub fn new(
        id: impl Into<String>,
        summary: impl Into<String>,
        start: Option<DateTime<FixedOffset>>,
        origin: SourceFormat,
    ) -> Self {
        let summary = summary.into();
        NormalizedEvent {
            id: id.into(),
            summary: if summary.trim().is_empty() {
                UNTITLED_MEETING.to_string()
            } else {
                summary
            },
            is_all_day: start.is_none(),
            start,
            is_cancelled: false,
            description: String::new(),
            location: String::new(),
            conferencing_uri: None,
            entry_points: Vec::new(),
            organizer_email: None,
            origin,
        }
    }

    /// Start time formatted as `HH:MM` in the event's own offset.
    pub fn start_hhmm(&self) -> Option<String> {
        self.start.map(|s| s.format("%H:%M").to_string())
    }
}

impl fmt::Display for NormalizedEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.start_hhmm() {
            Some(time) => write!(f, "{} ({})", self.summary, time),
            None => write!(f, "{} (all day)", self.summary),
        }
    }
}
