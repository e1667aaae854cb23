//! Decoding of raw calendar payloads into [`NormalizedEvent`]s.

mod google;
mod ical;

use crate::error::MeetSyncResult;
use crate::event::{NormalizedEvent, SourceFormat};

pub use google::parse_events_response;
pub use ical::parse_feed;

/// Decode `payload` according to `format`.
///
/// Individual records that fail to parse are dropped (logged at debug).
/// Only a payload that cannot be read as the given format at all is an error.
pub fn parse(payload: &str, format: SourceFormat) -> MeetSyncResult<Vec<NormalizedEvent>> {
    let events = match format {
        SourceFormat::GoogleApi => parse_events_response(payload)?,
        SourceFormat::Ical => parse_feed(payload),
    };
    tracing::debug!(%format, count = events.len(), "parsed calendar payload");
    Ok(events)
}
