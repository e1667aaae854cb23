//! Alert mode: poll the calendar and pop an interactive alert shortly before
//! each meeting.
//!
//! The scheduler owns its dedup set outright. Each alert is presented on a
//! detached task that never reports back, so nothing else touches the set.

mod presenter;

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::task::JoinHandle;
use tokio::time;

use crate::config::Settings;
use crate::constants::MAX_OFFSET_MINUTES;
use crate::error::MeetSyncResult;
use crate::feed;
use crate::link;
use crate::source::{CalendarSource, SyncWindow};

pub use presenter::{Alert, AlertPresenter, AlertResponse};

/// Event ids that were already alerted, each remembered until its meeting
/// has started.
#[derive(Debug, Default)]
pub struct AlertedSet {
    entries: HashMap<String, DateTime<Utc>>,
}

impl AlertedSet {
    /// Returns false if the id was already present.
    pub fn insert(&mut self, event_id: impl Into<String>, start: DateTime<Utc>) -> bool {
        self.entries.insert(event_id.into(), start).is_none()
    }

    pub fn contains(&self, event_id: &str) -> bool {
        self.entries.contains_key(event_id)
    }

    /// Forget events whose start is before `now`.
    pub fn prune(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, start| *start >= now);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub struct AlertScheduler {
    source: Box<dyn CalendarSource>,
    presenter: Arc<dyn AlertPresenter>,
    lead_minutes: i64,
    poll_interval: std::time::Duration,
    alerted: AlertedSet,
}

impl AlertScheduler {
    pub fn new(
        source: Box<dyn CalendarSource>,
        presenter: Arc<dyn AlertPresenter>,
        settings: &Settings,
    ) -> Self {
        AlertScheduler {
            source,
            presenter,
            lead_minutes: settings.lead_minutes,
            poll_interval: settings.poll_interval(),
            alerted: AlertedSet::default(),
        }
    }

    pub fn alerted(&self) -> &AlertedSet {
        &self.alerted
    }

    /// Poll every interval until `shutdown` resolves.
    ///
    /// A failed poll is logged and the next one runs as usual. Alerts still
    /// on screen at shutdown are left to give up on their own.
    pub async fn run(mut self, shutdown: impl Future<Output = ()>) {
        let mut ticker = time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(time::MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        tracing::info!(
            source = %self.source.describe(),
            interval = ?self.poll_interval,
            lead_minutes = self.lead_minutes,
            "alert scheduler started"
        );

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("alert scheduler stopping");
                    break;
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.tick(Utc::now()).await {
                        tracing::error!(error = %e, "alert poll failed");
                    }
                }
            }
        }
    }

    /// One poll: fetch, pick meetings starting within the lead time, and
    /// dispatch an alert for each one not yet alerted.
    ///
    /// Returns the ids alerted on this tick.
    pub async fn tick(&mut self, now: DateTime<Utc>) -> MeetSyncResult<Vec<String>> {
        let pruned = self.alerted.prune(now);
        if pruned > 0 {
            tracing::debug!(pruned, "forgot alerts for started meetings");
        }

        let lead = Duration::minutes(self.lead_minutes);
        let window = SyncWindow::ahead(now, lead + Duration::minutes(1));
        let payload = self.source.fetch(&window).await?;
        let events = feed::parse(&payload.body, payload.format)?;

        let mut dispatched = Vec::new();
        for event in events {
            if event.is_all_day || event.is_cancelled {
                continue;
            }
            let Some(start) = event.start else {
                continue;
            };

            let until_start = start.with_timezone(&Utc) - now;
            if until_start < Duration::zero() || until_start > lead {
                continue;
            }

            if !self.alerted.insert(event.id.clone(), start.with_timezone(&Utc)) {
                continue;
            }

            let alert = Alert::for_event(&event, start, link::extract(&event));
            tracing::info!(
                event_id = %alert.event_id,
                summary = %alert.summary,
                minutes_until = until_start.num_minutes(),
                "alerting"
            );
            dispatch(self.presenter.clone(), alert);
            dispatched.push(event.id);
        }

        Ok(dispatched)
    }
}

/// Present `alert` on its own task, handling snoozes until the user joins,
/// dismisses, or lets it time out.
pub fn dispatch(presenter: Arc<dyn AlertPresenter>, alert: Alert) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match presenter.present(&alert).await {
                AlertResponse::Join => {
                    match &alert.meeting_link {
                        Some(link) => {
                            if let Err(e) = open::that_detached(link) {
                                tracing::warn!(error = %e, link = %link, "could not open meeting link");
                            }
                        }
                        None => tracing::debug!(event_id = %alert.event_id, "no link to join"),
                    }
                    break;
                }
                AlertResponse::Snooze(minutes) => {
                    tracing::info!(event_id = %alert.event_id, minutes, "alert snoozed");
                    let secs = minutes.clamp(1, MAX_OFFSET_MINUTES).unsigned_abs() * 60;
                    time::sleep(std::time::Duration::from_secs(secs)).await;
                }
                AlertResponse::Dismiss | AlertResponse::TimedOut => break,
            }
        }
    })
}
