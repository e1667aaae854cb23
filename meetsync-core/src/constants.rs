//! Defaults shared by the sync engine, alert scheduler and CLI.

/// How far ahead the sync pass looks for meetings.
pub const DEFAULT_HORIZON_HOURS: i64 = 24;

/// Reminders and alerts fire this many minutes before a meeting starts.
pub const DEFAULT_LEAD_MINUTES: i64 = 3;

/// Alert mode polling interval.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;

/// How long an alert dialog stays up before giving up.
pub const DEFAULT_ALERT_DURATION_SECS: u64 = 60;

/// Snooze length offered by the alert dialog.
pub const DEFAULT_SNOOZE_MINUTES: i64 = 2;

/// Upper bound accepted for `horizon_hours` (one year).
pub const MAX_HORIZON_HOURS: i64 = 24 * 366;

/// Upper bound accepted for `lead_minutes` and `snooze_minutes` (one day).
pub const MAX_OFFSET_MINUTES: i64 = 24 * 60;

/// Reminders list that receives meeting reminders.
pub const DEFAULT_REMINDER_LIST: &str = "Calendar";

/// Ledger entries older than this are dropped when the ledger is loaded.
pub const LEDGER_RETENTION_DAYS: i64 = 2;

/// Placeholder used when an event has no summary.
pub const UNTITLED_MEETING: &str = "Untitled Meeting";

/// Marker embedded in every reminder body so the sink can find it again.
pub const EVENT_ID_MARKER: &str = "Event ID:";

pub const GOOGLE_API_BASE: &str = "https://www.googleapis.com/calendar/v3";

pub const USER_AGENT: &str = concat!("meetsync/", env!("CARGO_PKG_VERSION"));
