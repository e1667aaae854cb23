use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};

use crate::event::NormalizedEvent;

/// What the user is shown when a meeting is about to start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub event_id: String,
    pub summary: String,
    pub start: DateTime<FixedOffset>,
    pub meeting_link: Option<String>,
}

impl Alert {
    pub fn for_event(
        event: &NormalizedEvent,
        start: DateTime<FixedOffset>,
        meeting_link: Option<String>,
    ) -> Self {
        Alert {
            event_id: event.id.clone(),
            summary: event.summary.clone(),
            start,
            meeting_link,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertResponse {
    /// Open the meeting link.
    Join,
    /// Show the alert again after this many minutes.
    Snooze(i64),
    Dismiss,
    /// Nobody answered before the alert gave up.
    TimedOut,
}

#[async_trait]
pub trait AlertPresenter: Send + Sync {
    /// Show `alert` and wait for the user's answer.
    ///
    /// Presentation failures are reported as `Dismiss`; there is nobody to
    /// hand an error to.
    async fn present(&self, alert: &Alert) -> AlertResponse;
}
