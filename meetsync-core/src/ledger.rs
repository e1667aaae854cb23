//! Persisted record of which events already have a reminder.
//!
//! The ledger is a pretty-printed JSON object keyed by event id. It is loaded
//! once per sync pass, mutated in memory, and written back once at the end.
//! Stale entries are dropped on load only.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::LEDGER_RETENTION_DAYS;
use crate::error::{MeetSyncError, MeetSyncResult};
use crate::event::NormalizedEvent;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub summary: String,
    pub start_time: DateTime<FixedOffset>,
    pub synced_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct SyncLedger {
    path: PathBuf,
    entries: BTreeMap<String, LedgerEntry>,
}

impl SyncLedger {
    /// Load the ledger at `path`, evicting entries synced more than the
    /// retention window before `now`.
    ///
    /// Never fails: a missing file is an empty ledger, and an unreadable one is
    /// logged and treated as empty.
    pub fn load(path: impl Into<PathBuf>, now: DateTime<Utc>) -> SyncLedger {
        let path = path.into();
        let entries = match read_entries(&path) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable ledger");
                BTreeMap::new()
            }
        };

        let mut ledger = SyncLedger { path, entries };
        let evicted = ledger.evict_older_than(now - Duration::days(LEDGER_RETENTION_DAYS));
        if evicted > 0 {
            tracing::debug!(evicted, "evicted stale ledger entries");
        }
        ledger
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn contains(&self, event_id: &str) -> bool {
        self.entries.contains_key(event_id)
    }

    pub fn get(&self, event_id: &str) -> Option<&LedgerEntry> {
        self.entries.get(event_id)
    }

    /// Record (or refresh) the entry for an event.
    pub fn record(&mut self, event: &NormalizedEvent, start: DateTime<FixedOffset>, now: DateTime<Utc>) {
        self.entries.insert(
            event.id.clone(),
            LedgerEntry {
                summary: event.summary.clone(),
                start_time: start,
                synced_at: now,
            },
        );
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &LedgerEntry)> {
        self.entries.iter().map(|(id, entry)| (id.as_str(), entry))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn evict_older_than(&mut self, cutoff: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.synced_at > cutoff);
        before - self.entries.len()
    }

    /// Replace the ledger file with the current entries.
    ///
    /// Written to a sibling temp file first and renamed into place, so readers
    /// see either the old or the new ledger.
    pub fn save(&self) -> MeetSyncResult<()> {
        if let Some(dir) = self.path.parent()
            && !dir.as_os_str().is_empty()
        {
            std::fs::create_dir_all(dir)?;
        }

        let content = serde_json::to_string_pretty(&self.entries)
            .map_err(|e| MeetSyncError::Serialization(e.to_string()))?;

        let mut temp = self.path.clone().into_os_string();
        temp.push(".tmp");
        let temp = PathBuf::from(temp);

        std::fs::write(&temp, content)?;
        std::fs::rename(&temp, &self.path)?;
        Ok(())
    }
}

/// Entries that fail to decode are dropped individually.
fn read_entries(path: &Path) -> MeetSyncResult<BTreeMap<String, LedgerEntry>> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
        Err(e) => return Err(MeetSyncError::LedgerCorrupt(e.to_string())),
    };

    let raw: BTreeMap<String, serde_json::Value> = serde_json::from_str(&content)
        .map_err(|e| MeetSyncError::LedgerCorrupt(e.to_string()))?;

    let entries = raw
        .into_iter()
        .filter_map(|(id, value)| match serde_json::from_value(value) {
            Ok(entry) => Some((id, entry)),
            Err(e) => {
                tracing::warn!(event_id = %id, error = %e, "dropping malformed ledger entry");
                None
            }
        })
        .collect();

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::SourceFormat;
    use tempfile::TempDir;

    fn at(s: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(s).expect("valid timestamp")
    }

    fn utc(s: &str) -> DateTime<Utc> {
        at(s).with_timezone(&Utc)
    }

    fn event(id: &str) -> NormalizedEvent {
        NormalizedEvent::new(
            id,
            "Planning",
            Some(at("2025-03-20T14:00:00+01:00")),
            SourceFormat::GoogleApi,
        )
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().expect("tempdir");
        let ledger = SyncLedger::load(dir.path().join("synced_events.json"), Utc::now());
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("nested/synced_events.json");
        let now = utc("2025-03-20T10:00:00Z");

        let mut ledger = SyncLedger::load(&path, now);
        let e = event("E1");
        ledger.record(&e, e.start.expect("timed"), now);
        ledger.save().expect("save");

        assert!(!dir.path().join("nested/synced_events.json.tmp").exists());

        let reloaded = SyncLedger::load(&path, now);
        assert_eq!(reloaded.len(), 1);
        let entry = reloaded.get("E1").expect("entry");
        assert_eq!(entry.summary, "Planning");
        assert_eq!(entry.start_time, at("2025-03-20T14:00:00+01:00"));
        assert_eq!(entry.synced_at, now);
    }

    #[test]
    fn test_stale_entries_evicted_on_load() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("ledger.json");
        std::fs::write(
            &path,
            r#"{
                "old": {"summary": "Old", "start_time": "2025-03-17T09:00:00+00:00", "synced_at": "2025-03-17T08:00:00Z"},
                "edge": {"summary": "Edge", "start_time": "2025-03-18T11:00:00+00:00", "synced_at": "2025-03-18T10:00:00Z"},
                "fresh": {"summary": "Fresh", "start_time": "2025-03-20T09:00:00+00:00", "synced_at": "2025-03-19T12:00:00Z"}
            }"#,
        )
        .expect("write");

        let ledger = SyncLedger::load(&path, utc("2025-03-20T10:00:00Z"));
        let ids: Vec<_> = ledger.entries().map(|(id, _)| id).collect();
        assert_eq!(ids, ["fresh"]);
    }

    #[test]
    fn test_corrupt_file_loads_empty() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("ledger.json");
        std::fs::write(&path, "{ not json").expect("write");

        let ledger = SyncLedger::load(&path, Utc::now());
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_malformed_entry_dropped() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("ledger.json");
        std::fs::write(
            &path,
            r#"{
                "bad": {"summary": "Bad", "start_time": "yesterday"},
                "good": {"summary": "Good", "start_time": "2025-03-20T09:00:00+00:00", "synced_at": "2025-03-20T08:00:00Z"}
            }"#,
        )
        .expect("write");

        let ledger = SyncLedger::load(&path, utc("2025-03-20T10:00:00Z"));
        assert!(ledger.contains("good"));
        assert!(!ledger.contains("bad"));
    }

    #[test]
    fn test_record_refreshes_entry() {
        let dir = TempDir::new().expect("tempdir");
        let mut ledger = SyncLedger::load(dir.path().join("l.json"), Utc::now());
        let e = event("E1");
        let start = e.start.expect("timed");

        ledger.record(&e, start, utc("2025-03-20T10:00:00Z"));
        ledger.record(&e, start, utc("2025-03-20T10:30:00Z"));

        assert_eq!(ledger.len(), 1);
        assert_eq!(
            ledger.get("E1").map(|entry| entry.synced_at),
            Some(utc("2025-03-20T10:30:00Z"))
        );
    }
}
