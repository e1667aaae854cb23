//! One calendar → reminders pass.

use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::config::Settings;
use crate::eligibility;
use crate::error::MeetSyncResult;
use crate::feed;
use crate::ledger::SyncLedger;
use crate::link;
use crate::reminder::{ReminderRequest, ReminderSink, SinkOutcome};
use crate::source::{CalendarSource, SyncWindow};

/// Counters for a single pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub fetched: usize,
    pub eligible: usize,
    pub created: usize,
    pub already_existed: usize,
    pub failed: usize,
    pub skipped: usize,
}

pub struct SyncEngine {
    source: Box<dyn CalendarSource>,
    sink: Box<dyn ReminderSink>,
    ledger_path: PathBuf,
    horizon: Duration,
    lead_minutes: i64,
    self_email: Option<String>,
}

impl SyncEngine {
    pub fn new(
        source: Box<dyn CalendarSource>,
        sink: Box<dyn ReminderSink>,
        settings: &Settings,
    ) -> MeetSyncResult<Self> {
        Ok(SyncEngine {
            source,
            sink,
            ledger_path: settings.ledger_path()?,
            horizon: settings.horizon(),
            lead_minutes: settings.lead_minutes,
            self_email: settings.self_email.clone(),
        })
    }

    pub async fn run(&self) -> MeetSyncResult<SyncReport> {
        self.run_at(Utc::now()).await
    }

    /// Run one pass as if the current time were `now`.
    ///
    /// A fetch or payload failure returns before the ledger is touched. A
    /// reminder that fails to be created is left out of the ledger and retried
    /// on the next pass. The ledger is saved once, after every event has been
    /// handled.
    pub async fn run_at(&self, now: DateTime<Utc>) -> MeetSyncResult<SyncReport> {
        tracing::info!(source = %self.source.describe(), "starting calendar sync");

        let window = SyncWindow::ahead(now, self.horizon);
        let payload = self.source.fetch(&window).await.inspect_err(|e| {
            tracing::error!(error = %e, "failed to fetch calendar");
        })?;
        let events = feed::parse(&payload.body, payload.format).inspect_err(|e| {
            tracing::error!(error = %e, "failed to read calendar payload");
        })?;

        let mut ledger = SyncLedger::load(&self.ledger_path, now);

        if let Err(e) = self.sink.ensure_container().await {
            tracing::warn!(error = %e, "could not prepare reminder list");
        }

        let mut report = SyncReport {
            fetched: events.len(),
            ..Default::default()
        };

        for event in &events {
            let eligible =
                match eligibility::check(event, now, self.horizon, self.lead_minutes, &ledger) {
                    Ok(eligible) => eligible,
                    Err(reason) => {
                        tracing::debug!(event_id = %event.id, summary = %event.summary, %reason, "skipping event");
                        report.skipped += 1;
                        continue;
                    }
                };
            report.eligible += 1;

            let meeting_link = link::extract(event);
            let request = ReminderRequest::build(
                event,
                &eligible,
                meeting_link.as_deref(),
                self.self_email.as_deref(),
            );

            match self.sink.create(&request).await {
                SinkOutcome::Created => {
                    tracing::info!(
                        event_id = %event.id,
                        title = %request.title,
                        fire_at = %request.fire_at,
                        "created reminder"
                    );
                    report.created += 1;
                    ledger.record(event, eligible.start, now);
                }
                SinkOutcome::AlreadyExists => {
                    tracing::info!(event_id = %event.id, "reminder already exists");
                    report.already_existed += 1;
                    ledger.record(event, eligible.start, now);
                }
                SinkOutcome::Failed(reason) => {
                    tracing::warn!(event_id = %event.id, %reason, "failed to create reminder");
                    report.failed += 1;
                }
            }
        }

        ledger.save()?;

        tracing::info!(
            fetched = report.fetched,
            created = report.created,
            already_existed = report.already_existed,
            failed = report.failed,
            skipped = report.skipped,
            "sync complete"
        );
        Ok(report)
    }
}
