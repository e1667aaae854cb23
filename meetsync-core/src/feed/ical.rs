//! Line-oriented iCalendar feed parsing.
//!
//! Subscription feeds are large and frequently contain components that a
//! strict parser rejects, so this reads the feed one property line at a time
//! and drops only the events it cannot make sense of.

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use icalendar::parser::unfold;

use crate::error::{MeetSyncError, MeetSyncResult};
use crate::event::{NormalizedEvent, SourceFormat};
use crate::link;

/// A single `NAME;PARAM=VALUE:value` content line.
#[derive(Debug, Clone, PartialEq)]
struct ContentLine {
    name: String,
    params: HashMap<String, String>,
    value: String,
}

impl ContentLine {
    /// Split at the first `:` outside a quoted parameter value.
    fn parse(line: &str) -> Option<Self> {
        let mut in_quotes = false;
        let split = line.char_indices().find_map(|(i, c)| match c {
            '"' => {
                in_quotes = !in_quotes;
                None
            }
            ':' if !in_quotes => Some(i),
            _ => None,
        })?;

        let (key, value) = (&line[..split], &line[split + 1..]);
        let mut parts = key.split(';');
        let name = parts.next()?.trim().to_ascii_uppercase();
        if name.is_empty() {
            return None;
        }

        let params = parts
            .filter_map(|param| {
                let (k, v) = param.split_once('=')?;
                Some((k.trim().to_ascii_uppercase(), v.trim_matches('"').to_string()))
            })
            .collect();

        Some(ContentLine {
            name,
            params,
            value: value.to_string(),
        })
    }

    fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}

/// Parse every `VEVENT` in a feed, sorted by start (all-day last).
pub fn parse_feed(content: &str) -> Vec<NormalizedEvent> {
    let unfolded = unfold(content);

    let mut events = Vec::new();
    let mut current: Option<Vec<ContentLine>> = None;
    // Nesting depth of sub-components (VALARM...) inside the current VEVENT.
    let mut nested = 0usize;

    for line in unfolded.lines() {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }

        if line.eq_ignore_ascii_case("BEGIN:VEVENT") {
            current = Some(Vec::new());
            nested = 0;
            continue;
        }

        if line.eq_ignore_ascii_case("END:VEVENT") {
            if let Some(lines) = current.take() {
                match build_event(&lines) {
                    Ok(event) => events.push(event),
                    Err(e) => tracing::debug!(error = %e, "dropping feed event"),
                }
            }
            continue;
        }

        let Some(lines) = current.as_mut() else {
            continue;
        };

        let upper = line.to_ascii_uppercase();
        if upper.starts_with("BEGIN:") {
            nested += 1;
        } else if upper.starts_with("END:") {
            nested = nested.saturating_sub(1);
        } else if nested == 0
            && let Some(content_line) = ContentLine::parse(line)
        {
            lines.push(content_line);
        }
    }

    events.sort_by_key(|e| (e.start.is_none(), e.start));
    events
}

fn build_event(lines: &[ContentLine]) -> MeetSyncResult<NormalizedEvent> {
    let find = |name: &str| lines.iter().find(|l| l.name == name);
    let text = |name: &str| find(name).map(|l| unescape_text(&l.value)).unwrap_or_default();

    let id = find("UID")
        .map(|l| l.value.trim().to_string())
        .filter(|uid| !uid.is_empty())
        .ok_or_else(|| MeetSyncError::MalformedRecord("VEVENT has no UID".to_string()))?;

    let dtstart = find("DTSTART").ok_or_else(|| {
        MeetSyncError::MalformedRecord(format!("event {id} has no DTSTART"))
    })?;
    let start = parse_start(dtstart)
        .map_err(|e| MeetSyncError::MalformedRecord(format!("event {id}: {e}")))?;

    let mut event = NormalizedEvent::new(id, text("SUMMARY"), start, SourceFormat::Ical);
    event.description = text("DESCRIPTION");
    event.location = text("LOCATION");
    event.is_cancelled = find("STATUS")
        .is_some_and(|l| l.value.trim().eq_ignore_ascii_case("CANCELLED"));
    event.organizer_email = find("ORGANIZER").and_then(|l| organizer_email(&l.value));
    event.conferencing_uri = find("X-GOOGLE-CONFERENCE")
        .or_else(|| find("URL"))
        .and_then(|l| link::meeting_url(&l.value));

    Ok(event)
}

/// Resolve a `DTSTART` line.
///
/// `Ok(None)` is an all-day date. Anything that is neither a date nor a
/// `YYYYMMDDTHHMMSS` date-time is an error.
fn parse_start(line: &ContentLine) -> Result<Option<DateTime<FixedOffset>>, String> {
    let value = line.value.trim();

    let is_date_only = line
        .param("VALUE")
        .is_some_and(|v| v.eq_ignore_ascii_case("DATE"))
        || !value.contains('T');
    if is_date_only {
        let date = value.get(..8).unwrap_or(value);
        return NaiveDate::parse_from_str(date, "%Y%m%d")
            .map(|_| None)
            .map_err(|_| format!("unparseable date {value:?}"));
    }

    let naive = value
        .get(..15)
        .and_then(|s| NaiveDateTime::parse_from_str(s, "%Y%m%dT%H%M%S").ok())
        .ok_or_else(|| format!("unparseable date-time {value:?}"))?;

    let resolved = if value[15..].starts_with('Z') {
        Some(Utc.from_utc_datetime(&naive).with_timezone(&Local).fixed_offset())
    } else if let Some(tz) = line.param("TZID").and_then(|id| id.parse::<Tz>().ok()) {
        tz.from_local_datetime(&naive)
            .earliest()
            .map(|dt| dt.with_timezone(&Local).fixed_offset())
    } else {
        Local.from_local_datetime(&naive).earliest().map(|dt| dt.fixed_offset())
    };

    resolved
        .map(Some)
        .ok_or_else(|| format!("date-time {value:?} does not exist in its zone"))
}

fn organizer_email(value: &str) -> Option<String> {
    let value = value.trim();
    let email = match value.get(..7) {
        Some(prefix) if prefix.eq_ignore_ascii_case("mailto:") => &value[7..],
        _ => value,
    };
    (!email.is_empty()).then(|| email.to_string())
}

/// Decode iCalendar TEXT escapes.
fn unescape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') | Some('N') => out.push('\n'),
            Some(escaped @ (',' | ';' | '\\')) => out.push(escaped),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
