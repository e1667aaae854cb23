mod common;

use chrono::Duration;
use common::utc;
use meetsync_core::source::{GoogleApiSource, IcalFeedSource};
use meetsync_core::{CalendarSource, MeetSyncError, SourceFormat, SyncWindow, feed};
use wiremock::matchers::{header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn window() -> SyncWindow {
    SyncWindow::ahead(utc("2025-03-20T10:00:00Z"), Duration::hours(24))
}

#[tokio::test]
async fn test_google_source_queries_window() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/calendars/primary/events"))
        .and(header("Authorization", "Bearer test-token"))
        .and(query_param("timeMin", "2025-03-20T10:00:00Z"))
        .and(query_param("timeMax", "2025-03-21T10:00:00Z"))
        .and(query_param("singleEvents", "true"))
        .and(query_param("orderBy", "startTime"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [
                { "id": "E1", "summary": "Sync", "start": { "dateTime": "2025-03-20T14:00:00Z" } }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let source = GoogleApiSource::new("primary", "test-token")
        .unwrap()
        .with_base_url(server.uri());
    let payload = source.fetch(&window()).await.expect("fetch");

    assert_eq!(payload.format, SourceFormat::GoogleApi);
    let events = feed::parse(&payload.body, payload.format).expect("parse");
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].id, "E1");
}

#[tokio::test]
async fn test_google_source_follows_pages() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/calendars/primary/events"))
        .and(query_param("pageToken", "page-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [
                { "id": "E2", "start": { "dateTime": "2025-03-20T16:00:00Z" } }
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/calendars/primary/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [
                { "id": "E1", "start": { "dateTime": "2025-03-20T14:00:00Z" } }
            ],
            "nextPageToken": "page-2"
        })))
        .mount(&server)
        .await;

    let source = GoogleApiSource::new("primary", "t")
        .unwrap()
        .with_base_url(server.uri());
    let payload = source.fetch(&window()).await.expect("fetch");
    let ids: Vec<_> = feed::parse(&payload.body, payload.format)
        .expect("parse")
        .into_iter()
        .map(|e| e.id)
        .collect();

    assert_eq!(ids, ["E1", "E2"]);
}

#[tokio::test]
async fn test_google_source_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Invalid Credentials"))
        .mount(&server)
        .await;

    let source = GoogleApiSource::new("primary", "expired")
        .unwrap()
        .with_base_url(server.uri());
    let err = source.fetch(&window()).await.unwrap_err();

    match err {
        MeetSyncError::SourceUnavailable(message) => {
            assert!(message.contains("401"), "{message}");
            assert!(message.contains("Invalid Credentials"), "{message}");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_ical_source_fetches_feed() {
    let server = MockServer::start().await;
    let feed_body = "BEGIN:VCALENDAR\r\nBEGIN:VEVENT\r\nUID:E1\r\nDTSTART:20250320T140000Z\r\nEND:VEVENT\r\nEND:VCALENDAR\r\n";
    Mock::given(method("GET"))
        .and(path("/calendar/ical/secret/basic.ics"))
        .and(header_exists("User-Agent"))
        .respond_with(ResponseTemplate::new(200).set_body_string(feed_body))
        .expect(1)
        .mount(&server)
        .await;

    let source =
        IcalFeedSource::new(format!("{}/calendar/ical/secret/basic.ics", server.uri())).unwrap();
    let payload = source.fetch(&window()).await.expect("fetch");

    assert_eq!(payload.format, SourceFormat::Ical);
    assert_eq!(payload.body, feed_body);
    assert!(!source.describe().contains("secret"));
}

#[tokio::test]
async fn test_ical_source_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let source = IcalFeedSource::new(format!("{}/gone.ics", server.uri())).unwrap();
    assert!(matches!(
        source.fetch(&window()).await,
        Err(MeetSyncError::SourceUnavailable(_))
    ));
}
