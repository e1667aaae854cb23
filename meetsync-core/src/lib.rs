//! Core library for meetsync: turn upcoming calendar meetings into exactly one
//! reminder each, and optionally pop an alert right before they start.

pub mod alert;
pub mod apple;
pub mod config;
pub mod constants;
pub mod eligibility;
pub mod error;
pub mod event;
pub mod feed;
pub mod ledger;
pub mod link;
pub mod reminder;
pub mod source;
pub mod sync;

pub use alert::{Alert, AlertPresenter, AlertResponse, AlertScheduler};
pub use config::{Settings, SourceSettings};
pub use error::{MeetSyncError, MeetSyncResult};
pub use event::{EntryPoint, NormalizedEvent, SourceFormat};
pub use ledger::{LedgerEntry, SyncLedger};
pub use reminder::{ReminderRequest, ReminderSink, SinkOutcome};
pub use source::{CalendarSource, RawPayload, SyncWindow};
pub use sync::{SyncEngine, SyncReport};
