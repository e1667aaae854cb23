use async_trait::async_trait;
use reqwest::Client;

use super::{CalendarSource, FETCH_TIMEOUT, RawPayload, SyncWindow};
use crate::constants::USER_AGENT;
use crate::error::{MeetSyncError, MeetSyncResult};
use crate::event::SourceFormat;

/// Plain GET of a (secret) iCal feed address.
pub struct IcalFeedSource {
    client: Client,
    url: String,
}

impl IcalFeedSource {
    pub fn new(url: impl Into<String>) -> MeetSyncResult<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(|e| MeetSyncError::Config(format!("Could not build HTTP client: {e}")))?;

        Ok(IcalFeedSource {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl CalendarSource for IcalFeedSource {
    /// The feed URL embeds a secret, so only the host is shown.
    fn describe(&self) -> String {
        let host = url::Url::parse(&self.url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_else(|| "(invalid url)".to_string());
        format!("iCal feed {host}")
    }

    async fn fetch(&self, _window: &SyncWindow) -> MeetSyncResult<RawPayload> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| MeetSyncError::SourceUnavailable(format!("feed request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MeetSyncError::SourceUnavailable(format!(
                "feed returned {status}"
            )));
        }

        let body = response.text().await.map_err(|e| {
            MeetSyncError::SourceUnavailable(format!("could not read feed body: {e}"))
        })?;

        Ok(RawPayload {
            format: SourceFormat::Ical,
            body,
        })
    }
}
