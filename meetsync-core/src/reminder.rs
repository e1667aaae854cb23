//! Reminder artifacts and the sink that creates them.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};

use crate::constants::EVENT_ID_MARKER;
use crate::eligibility::Eligible;
use crate::error::MeetSyncResult;
use crate::event::NormalizedEvent;

/// One reminder to create, built fresh for each eligible event on each run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderRequest {
    pub event_id: String,
    pub title: String,
    pub body: String,
    pub fire_at: DateTime<FixedOffset>,
}

impl ReminderRequest {
    pub fn build(
        event: &NormalizedEvent,
        eligible: &Eligible,
        meeting_link: Option<&str>,
        self_email: Option<&str>,
    ) -> ReminderRequest {
        let time = eligible.start.format("%H:%M");

        let mut lines = vec![format!("Starts at {time}")];
        if let Some(link) = meeting_link {
            lines.push(format!("Join: {link}"));
        }
        if let Some(organizer) = event.organizer_email.as_deref()
            && !self_email.is_some_and(|me| me.eq_ignore_ascii_case(organizer))
        {
            lines.push(format!("Organizer: {organizer}"));
        }

        ReminderRequest {
            event_id: event.id.clone(),
            title: format!("📅 {} - {time}", event.summary),
            body: lines.join("\n"),
            fire_at: eligible.fire_at,
        }
    }

    /// Body with the event id marker appended; sinks look reminders up by it.
    pub fn tagged_body(&self) -> String {
        format!("{}\n\n{}", self.body, self.marker())
    }

    pub fn marker(&self) -> String {
        format!("{EVENT_ID_MARKER} {}", self.event_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkOutcome {
    Created,
    /// A reminder for this event was already present in the sink.
    AlreadyExists,
    Failed(String),
}

/// Destination for reminders.
///
/// `create` must look for an existing reminder carrying the request's event id
/// before creating one, so replaying a request never duplicates it.
#[async_trait]
pub trait ReminderSink: Send + Sync {
    /// Idempotent setup (e.g. make sure the target list exists).
    async fn ensure_container(&self) -> MeetSyncResult<()>;

    async fn create(&self, request: &ReminderRequest) -> SinkOutcome;
}
