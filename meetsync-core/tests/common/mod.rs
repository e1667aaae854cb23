#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use meetsync_core::{
    CalendarSource, MeetSyncError, MeetSyncResult, RawPayload, ReminderRequest, ReminderSink,
    SinkOutcome, SourceFormat, SyncWindow,
};

pub fn utc(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .expect("valid timestamp")
        .with_timezone(&Utc)
}

/// Serves a fixed payload, or fails every fetch.
pub struct StaticSource {
    payload: Option<RawPayload>,
    pub windows: Arc<Mutex<Vec<SyncWindow>>>,
}

impl StaticSource {
    pub fn google(body: &str) -> Self {
        StaticSource {
            payload: Some(RawPayload {
                format: SourceFormat::GoogleApi,
                body: body.to_string(),
            }),
            windows: Arc::default(),
        }
    }

    pub fn ical(body: &str) -> Self {
        StaticSource {
            payload: Some(RawPayload {
                format: SourceFormat::Ical,
                body: body.to_string(),
            }),
            windows: Arc::default(),
        }
    }

    pub fn failing() -> Self {
        StaticSource {
            payload: None,
            windows: Arc::default(),
        }
    }
}

#[async_trait]
impl CalendarSource for StaticSource {
    fn describe(&self) -> String {
        "static".to_string()
    }

    async fn fetch(&self, window: &SyncWindow) -> MeetSyncResult<RawPayload> {
        self.windows.lock().unwrap().push(*window);
        self.payload
            .clone()
            .ok_or_else(|| MeetSyncError::SourceUnavailable("connection refused".into()))
    }
}

/// Records every request; answers with scripted outcomes, then `Created`.
#[derive(Clone, Default)]
pub struct RecordingSink {
    pub requests: Arc<Mutex<Vec<ReminderRequest>>>,
    outcomes: Arc<Mutex<VecDeque<SinkOutcome>>>,
    fail_container: bool,
}

impl RecordingSink {
    pub fn with_outcomes(outcomes: impl IntoIterator<Item = SinkOutcome>) -> Self {
        RecordingSink {
            outcomes: Arc::new(Mutex::new(outcomes.into_iter().collect())),
            ..Default::default()
        }
    }

    pub fn broken_container() -> Self {
        RecordingSink {
            fail_container: true,
            ..Default::default()
        }
    }

    pub fn requests(&self) -> Vec<ReminderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReminderSink for RecordingSink {
    async fn ensure_container(&self) -> MeetSyncResult<()> {
        if self.fail_container {
            return Err(MeetSyncError::Script("Reminders is not running".into()));
        }
        Ok(())
    }

    async fn create(&self, request: &ReminderRequest) -> SinkOutcome {
        self.requests.lock().unwrap().push(request.clone());
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(SinkOutcome::Created)
    }
}
