//! Which events get a reminder, and when it fires.

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Duration, FixedOffset, Utc};

use crate::event::NormalizedEvent;
use crate::ledger::SyncLedger;

/// Lookup of event ids that already have a reminder.
pub trait SyncedIds {
    fn is_synced(&self, event_id: &str) -> bool;
}

impl SyncedIds for SyncLedger {
    fn is_synced(&self, event_id: &str) -> bool {
        self.contains(event_id)
    }
}

impl SyncedIds for HashSet<String> {
    fn is_synced(&self, event_id: &str) -> bool {
        self.contains(event_id)
    }
}

/// Why an event was passed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Skip {
    AllDay,
    Cancelled,
    NoStart,
    Past,
    BeyondHorizon,
    FireTimePassed,
    AlreadySynced,
}

impl fmt::Display for Skip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Skip::AllDay => "all-day event",
            Skip::Cancelled => "cancelled",
            Skip::NoStart => "no start time",
            Skip::Past => "already started",
            Skip::BeyondHorizon => "beyond sync horizon",
            Skip::FireTimePassed => "reminder time already passed",
            Skip::AlreadySynced => "already synced",
        };
        f.write_str(reason)
    }
}

/// An event that passed every check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Eligible {
    pub start: DateTime<FixedOffset>,
    pub fire_at: DateTime<FixedOffset>,
}

pub fn compute_fire_at(event: &NormalizedEvent, lead_minutes: i64) -> Option<DateTime<FixedOffset>> {
    let lead = Duration::try_minutes(lead_minutes)?;
    event.start?.checked_sub_signed(lead)
}

/// Run every eligibility check in order, reporting the first that fails.
///
/// The horizon is half-open: an event starting exactly at `now + horizon` is
/// outside it. A reminder whose fire time is exactly `now` still counts.
pub fn check(
    event: &NormalizedEvent,
    now: DateTime<Utc>,
    horizon: Duration,
    lead_minutes: i64,
    already_synced: &impl SyncedIds,
) -> Result<Eligible, Skip> {
    if event.is_all_day {
        return Err(Skip::AllDay);
    }
    if event.is_cancelled {
        return Err(Skip::Cancelled);
    }
    let (Some(start), Some(fire_at)) = (event.start, compute_fire_at(event, lead_minutes)) else {
        return Err(Skip::NoStart);
    };
    if start < now {
        return Err(Skip::Past);
    }
    if start >= now + horizon {
        return Err(Skip::BeyondHorizon);
    }
    if fire_at < now {
        return Err(Skip::FireTimePassed);
    }
    if already_synced.is_synced(&event.id) {
        return Err(Skip::AlreadySynced);
    }

    Ok(Eligible { start, fire_at })
}

pub fn is_eligible(
    event: &NormalizedEvent,
    now: DateTime<Utc>,
    horizon: Duration,
    lead_minutes: i64,
    already_synced: &impl SyncedIds,
) -> bool {
    check(event, now, horizon, lead_minutes, already_synced).is_ok()
}
