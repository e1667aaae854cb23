//! Google Calendar `events.list` responses.

use chrono::DateTime;
use serde::Deserialize;

use crate::error::{MeetSyncError, MeetSyncResult};
use crate::event::{EntryPoint, NormalizedEvent, SourceFormat};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventsResponse {
    #[serde(default)]
    items: Vec<serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ApiEvent {
    id: String,
    status: String,
    summary: String,
    description: String,
    location: String,
    start: Option<ApiEventTime>,
    hangout_link: Option<String>,
    conference_data: Option<ConferenceData>,
    organizer: Option<Organizer>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ApiEventTime {
    date_time: Option<String>,
    date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ConferenceData {
    entry_points: Vec<ApiEntryPoint>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ApiEntryPoint {
    entry_point_type: String,
    uri: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Organizer {
    email: Option<String>,
}

/// Parse an `events.list` JSON document.
///
/// Items that fail to decode, or have a missing id, a missing start or an
/// unparseable `dateTime`, are dropped individually. A body that is not a JSON document at all means the source did
/// not deliver what it promised.
pub fn parse_events_response(body: &str) -> MeetSyncResult<Vec<NormalizedEvent>> {
    let response: EventsResponse = serde_json::from_str(body).map_err(|e| {
        MeetSyncError::SourceUnavailable(format!("invalid Calendar API response: {e}"))
    })?;

    let events = response
        .items
        .into_iter()
        .filter_map(|value| {
            let id = value
                .get("id")
                .and_then(|id| id.as_str())
                .unwrap_or_default()
                .to_string();
            let decoded = serde_json::from_value::<ApiEvent>(value)
                .map_err(|e| MeetSyncError::MalformedRecord(e.to_string()))
                .and_then(to_normalized);
            match decoded {
                Ok(event) => Some(event),
                Err(e) => {
                    tracing::debug!(event_id = %id, error = %e, "dropping calendar item");
                    None
                }
            }
        })
        .collect();

    Ok(events)
}

fn to_normalized(item: ApiEvent) -> MeetSyncResult<NormalizedEvent> {
    if item.id.trim().is_empty() {
        return Err(MeetSyncError::MalformedRecord("item has no id".to_string()));
    }

    let start_field = item
        .start
        .ok_or_else(|| MeetSyncError::MalformedRecord("item has no start".to_string()))?;

    let start = match (start_field.date_time, start_field.date) {
        (Some(dt), _) => Some(DateTime::parse_from_rfc3339(&dt).map_err(|e| {
            MeetSyncError::MalformedRecord(format!("bad start dateTime {dt:?}: {e}"))
        })?),
        (None, Some(_)) => None,
        (None, None) => {
            return Err(MeetSyncError::MalformedRecord(
                "start has neither dateTime nor date".to_string(),
            ));
        }
    };

    let mut event = NormalizedEvent::new(item.id, item.summary, start, SourceFormat::GoogleApi);
    event.is_cancelled = item.status.eq_ignore_ascii_case("cancelled");
    event.description = item.description;
    event.location = item.location;
    event.conferencing_uri = item.hangout_link.filter(|link| !link.trim().is_empty());
    event.entry_points = item
        .conference_data
        .map(|cd| {
            cd.entry_points
                .into_iter()
                .map(|ep| EntryPoint {
                    kind: ep.entry_point_type,
                    uri: ep.uri,
                })
                .collect()
        })
        .unwrap_or_default();
    event.organizer_email = item
        .organizer
        .and_then(|o| o.email)
        .filter(|email| !email.is_empty());

    Ok(event)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESPONSE: &str = r#"{
        "kind": "calendar#events",
        "items": [
            {
                "id": "abc123",
                "status": "confirmed",
                "summary": "Design review",
                "description": "Agenda in doc",
                "start": { "dateTime": "2025-03-20T14:00:00+01:00", "timeZone": "Europe/Berlin" },
                "hangoutLink": "https://meet.google.com/abc-defg-hij",
                "conferenceData": {
                    "entryPoints": [
                        { "entryPointType": "video", "uri": "https://meet.google.com/abc-defg-hij" },
                        { "entryPointType": "phone", "uri": "tel:+49-30-1234" }
                    ]
                },
                "organizer": { "email": "lead@example.com" }
            },
            {
                "id": "holiday",
                "summary": "Public holiday",
                "start": { "date": "2025-03-21" }
            },
            {
                "id": "gone",
                "status": "cancelled",
                "start": { "dateTime": "2025-03-20T16:00:00Z" }
            },
            {
                "id": "broken",
                "summary": "Bad time",
                "start": { "dateTime": "tomorrow-ish" }
            }
        ]
    }"#;

    #[test]
    fn test_parse_events_response() {
        let events = parse_events_response(RESPONSE).expect("valid response");
        assert_eq!(events.len(), 3);

        let review = &events[0];
        assert_eq!(review.id, "abc123");
        assert_eq!(review.summary, "Design review");
        assert_eq!(review.start_hhmm().as_deref(), Some("14:00"));
        assert!(!review.is_all_day);
        assert!(!review.is_cancelled);
        assert_eq!(
            review.conferencing_uri.as_deref(),
            Some("https://meet.google.com/abc-defg-hij")
        );
        assert_eq!(review.entry_points.len(), 2);
        assert_eq!(review.entry_points[1].kind, "phone");
        assert_eq!(review.organizer_email.as_deref(), Some("lead@example.com"));
        assert_eq!(review.origin, SourceFormat::GoogleApi);

        let holiday = &events[1];
        assert!(holiday.is_all_day);
        assert_eq!(holiday.start, None);

        let gone = &events[2];
        assert!(gone.is_cancelled);
        assert_eq!(gone.summary, "Untitled Meeting");
    }

    #[test]
    fn test_missing_items_is_empty() {
        let events = parse_events_response(r#"{"kind": "calendar#events"}"#).expect("valid");
        assert!(events.is_empty());
    }

    #[test]
    fn test_non_json_is_source_failure() {
        let err = parse_events_response("<html>502 Bad Gateway</html>").unwrap_err();
        assert!(matches!(err, MeetSyncError::SourceUnavailable(_)));
    }

    #[test]
    fn test_mistyped_item_dropped() {
        let body = r#"{
            "items": [
                {"id": "good", "summary": "Standup", "start": {"dateTime": "2025-03-20T09:00:00Z"}},
                {"id": "bad", "summary": null, "start": {"dateTime": "2025-03-20T10:00:00Z"}}
            ]
        }"#;

        let events = parse_events_response(body).expect("valid document");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id, "good");
        assert_eq!(events[0].summary, "Standup");
    }
}
