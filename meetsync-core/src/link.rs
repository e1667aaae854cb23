//! Meeting link extraction.
//!
//! Structured conferencing data always wins over links scraped from free
//! text. Free-text scanning only accepts URLs whose *host* belongs to a known
//! meeting provider, so a provider domain buried in another site's URL is
//! never picked up.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::event::{NormalizedEvent, SourceFormat};

static URL_CANDIDATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"https://[^\s<>"'\\]+"#).expect("valid URL pattern"));

/// Characters that commonly trail a URL in prose or markup.
const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?', ')', ']', '}', '>', '\'', '"'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeetingProvider {
    Zoom,
    GoogleMeet,
    Teams,
}

impl MeetingProvider {
    pub fn for_host(host: &str) -> Option<Self> {
        let host = host.to_ascii_lowercase();
        if host == "zoom.us" || host.ends_with(".zoom.us") {
            Some(MeetingProvider::Zoom)
        } else if host == "meet.google.com" {
            Some(MeetingProvider::GoogleMeet)
        } else if host == "teams.microsoft.com" {
            Some(MeetingProvider::Teams)
        } else {
            None
        }
    }
}

/// Return the joinable meeting link for an event, if it has one.
pub fn extract(event: &NormalizedEvent) -> Option<String> {
    if let Some(uri) = event.conferencing_uri.as_deref().map(str::trim)
        && !uri.is_empty()
    {
        return Some(uri.to_string());
    }

    if let Some(entry) = event
        .entry_points
        .iter()
        .find(|ep| ep.kind.eq_ignore_ascii_case("video") && !ep.uri.trim().is_empty())
    {
        return Some(entry.uri.trim().to_string());
    }

    scan_text(&event.description).or_else(|| match event.origin {
        SourceFormat::Ical => scan_text(&event.location),
        SourceFormat::GoogleApi => None,
    })
}

/// First known-provider meeting URL in `text`, in order of appearance.
pub fn scan_text(text: &str) -> Option<String> {
    URL_CANDIDATE
        .find_iter(text)
        .find_map(|m| meeting_url(m.as_str()))
}

/// Validate a single URL candidate against the provider list.
///
/// Returns the cleaned URL when its host is a known provider and it carries a
/// path (a bare provider homepage is not a meeting).
pub fn meeting_url(candidate: &str) -> Option<String> {
    let cleaned = candidate.trim().trim_end_matches(TRAILING_PUNCTUATION);
    let url = Url::parse(cleaned).ok()?;
    MeetingProvider::for_host(url.host_str()?)?;

    if url.path().trim_matches('/').is_empty() {
        return None;
    }

    Some(cleaned.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EntryPoint;

    fn event_with(description: &str, location: &str, origin: SourceFormat) -> NormalizedEvent {
        let mut event = NormalizedEvent::new("evt-1", "Standup", None, origin);
        event.description = description.to_string();
        event.location = location.to_string();
        event
    }

    #[test]
    fn test_structured_field_wins_over_description() {
        let mut event = event_with(
            "Dial in at https://zoom.us/j/123456",
            "",
            SourceFormat::GoogleApi,
        );
        event.conferencing_uri = Some("https://meet.google.com/abc-defg-hij".to_string());

        assert_eq!(
            extract(&event).as_deref(),
            Some("https://meet.google.com/abc-defg-hij")
        );
    }

    #[test]
    fn test_video_entry_point_used_before_text_scan() {
        let mut event = event_with("https://zoom.us/j/999", "", SourceFormat::GoogleApi);
        event.entry_points = vec![
            EntryPoint {
                kind: "phone".to_string(),
                uri: "tel:+1-555-0100".to_string(),
            },
            EntryPoint {
                kind: "video".to_string(),
                uri: "https://teams.microsoft.com/l/meetup-join/xyz".to_string(),
            },
        ];

        assert_eq!(
            extract(&event).as_deref(),
            Some("https://teams.microsoft.com/l/meetup-join/xyz")
        );
    }

    #[test]
    fn test_scan_tolerates_markup_and_punctuation() {
        let event = event_with(
            r#"Join here: <a href="https://us02web.zoom.us/j/8812?pwd=abc">link</a>."#,
            "",
            SourceFormat::GoogleApi,
        );
        assert_eq!(
            extract(&event).as_deref(),
            Some("https://us02web.zoom.us/j/8812?pwd=abc")
        );

        let event = event_with(
            "(see https://meet.google.com/xyz-abcd-efg).",
            "",
            SourceFormat::GoogleApi,
        );
        assert_eq!(
            extract(&event).as_deref(),
            Some("https://meet.google.com/xyz-abcd-efg")
        );
    }

    #[test]
    fn test_partial_domains_never_match() {
        for text in [
            "https://notzoom.us/j/123",
            "https://zoom.us.example.com/j/123",
            "https://redirect.example.com/?to=https://zoom.us/j/123",
            "https://example.com/meet.google.com/abc",
            "https://zoom.us/",
        ] {
            assert_eq!(scan_text(text), None, "should not match {text}");
        }
    }

    #[test]
    fn test_first_match_in_text_order() {
        let text = "Backup: https://teams.microsoft.com/l/meetup-join/1 primary https://zoom.us/j/2";
        assert_eq!(
            scan_text(text).as_deref(),
            Some("https://teams.microsoft.com/l/meetup-join/1")
        );
    }

    #[test]
    fn test_location_scanned_only_for_feed_events() {
        let feed = event_with("", "https://zoom.us/j/42", SourceFormat::Ical);
        assert_eq!(extract(&feed).as_deref(), Some("https://zoom.us/j/42"));

        let api = event_with("", "https://zoom.us/j/42", SourceFormat::GoogleApi);
        assert_eq!(extract(&api), None);
    }

    #[test]
    fn test_no_link() {
        let event = event_with("Room 4B, bring snacks", "Building 2", SourceFormat::Ical);
        assert_eq!(extract(&event), None);
    }
}
