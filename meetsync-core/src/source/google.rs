use async_trait::async_trait;
use chrono::SecondsFormat;
use reqwest::Client;
use serde_json::Value;
use url::Url;

use super::{CalendarSource, FETCH_TIMEOUT, RawPayload, SyncWindow};
use crate::constants::{GOOGLE_API_BASE, USER_AGENT};
use crate::error::{MeetSyncError, MeetSyncResult};
use crate::event::SourceFormat;

/// Guard against a server that keeps handing out page tokens.
const MAX_PAGES: usize = 20;

/// Google Calendar `events.list` with a bearer token.
pub struct GoogleApiSource {
    client: Client,
    base_url: String,
    calendar_id: String,
    access_token: String,
}

impl GoogleApiSource {
    pub fn new(calendar_id: impl Into<String>, access_token: impl Into<String>) -> MeetSyncResult<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(|e| MeetSyncError::Config(format!("Could not build HTTP client: {e}")))?;

        Ok(GoogleApiSource {
            client,
            base_url: GOOGLE_API_BASE.to_string(),
            calendar_id: calendar_id.into(),
            access_token: access_token.into(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn events_url(&self) -> MeetSyncResult<Url> {
        let mut url = Url::parse(self.base_url.trim_end_matches('/'))
            .map_err(|e| MeetSyncError::Config(format!("invalid API base URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| MeetSyncError::Config("API base URL cannot have a path".into()))?
            .pop_if_empty()
            .extend(["calendars", self.calendar_id.as_str(), "events"]);
        Ok(url)
    }

    async fn fetch_page(&self, url: &Url, query: &[(&str, String)]) -> MeetSyncResult<Value> {
        let response = self
            .client
            .get(url.clone())
            .bearer_auth(&self.access_token)
            .query(query)
            .send()
            .await
            .map_err(|e| {
                MeetSyncError::SourceUnavailable(format!("Google API request failed: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(MeetSyncError::SourceUnavailable(format!(
                "Google API error ({status}): {error_text}"
            )));
        }

        let body = response.text().await.map_err(|e| {
            MeetSyncError::SourceUnavailable(format!("could not read Google API response: {e}"))
        })?;
        serde_json::from_str(&body).map_err(|e| {
            MeetSyncError::SourceUnavailable(format!("invalid Calendar API response: {e}"))
        })
    }
}

#[async_trait]
impl CalendarSource for GoogleApiSource {
    fn describe(&self) -> String {
        format!("Google Calendar {}", self.calendar_id)
    }

    /// Fetches every page and hands back a single `{"items": [...]}` document.
    async fn fetch(&self, window: &SyncWindow) -> MeetSyncResult<RawPayload> {
        let url = self.events_url()?;
        let base_query = [
            ("timeMin", window.from.to_rfc3339_opts(SecondsFormat::Secs, true)),
            ("timeMax", window.to.to_rfc3339_opts(SecondsFormat::Secs, true)),
            ("singleEvents", "true".to_string()),
            ("orderBy", "startTime".to_string()),
            ("maxResults", "250".to_string()),
        ];

        let mut items = Vec::new();
        let mut page_token: Option<String> = None;

        for page_number in 1..=MAX_PAGES {
            let mut query = base_query.to_vec();
            if let Some(token) = page_token.take() {
                query.push(("pageToken", token));
            }

            let mut page = self.fetch_page(&url, &query).await?;
            if let Some(Value::Array(page_items)) = page.get_mut("items").map(Value::take) {
                items.extend(page_items);
            }

            match page.get("nextPageToken").and_then(Value::as_str) {
                Some(token) if page_number < MAX_PAGES => page_token = Some(token.to_string()),
                Some(_) => {
                    tracing::warn!(pages = MAX_PAGES, "stopping after page limit");
                    break;
                }
                None => break,
            }
        }

        let body = serde_json::json!({ "items": items }).to_string();
        Ok(RawPayload {
            format: SourceFormat::GoogleApi,
            body,
        })
    }
}
