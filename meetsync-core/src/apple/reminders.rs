//! Reminders.app sink.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{Datelike, Local, Timelike};

use super::{SCRIPT_TIMEOUT, quote, run_osascript};
use crate::error::MeetSyncResult;
use crate::reminder::{ReminderRequest, ReminderSink, SinkOutcome};

/// Creates reminders in one Reminders list, skipping events that already
/// have one (matched by the `Event ID:` line in the body).
pub struct RemindersAppSink {
    list_name: String,
    timeout: Duration,
}

impl RemindersAppSink {
    pub fn new(list_name: impl Into<String>) -> Self {
        RemindersAppSink {
            list_name: list_name.into(),
            timeout: SCRIPT_TIMEOUT,
        }
    }

    fn ensure_list_script(&self) -> String {
        let list = quote(&self.list_name);
        format!(
            r#"tell application "Reminders"
    if not (exists list {list}) then
        make new list with properties {{name:{list}}}
    end if
end tell"#
        )
    }

    /// The reminder date is assembled from numeric components so the script
    /// does not depend on the system's date format.
    fn create_script(&self, request: &ReminderRequest) -> String {
        let fire_at = request.fire_at.with_timezone(&Local);
        let list = quote(&self.list_name);
        let marker = quote(&request.marker());
        let name = quote(&request.title);
        let body = quote(&request.tagged_body());

        format!(
            r#"set remindAt to current date
set day of remindAt to 1
set year of remindAt to {year}
set month of remindAt to {month}
set day of remindAt to {day}
set time of remindAt to {seconds}
tell application "Reminders"
    set targetList to list {list}
    if (count of (reminders of targetList whose body ends with {marker})) > 0 then
        return "exists"
    end if
    tell targetList
        make new reminder with properties {{name:{name}, body:{body}, remind me date:remindAt}}
    end tell
    return "created"
end tell"#,
            year = fire_at.year(),
            month = fire_at.month(),
            day = fire_at.day(),
            seconds = fire_at.num_seconds_from_midnight(),
        )
    }
}

fn outcome_from_output(output: &str) -> SinkOutcome {
    match output.trim() {
        "created" => SinkOutcome::Created,
        "exists" => SinkOutcome::AlreadyExists,
        other => SinkOutcome::Failed(format!("unexpected osascript output: {other:?}")),
    }
}

#[async_trait]
impl ReminderSink for RemindersAppSink {
    async fn ensure_container(&self) -> MeetSyncResult<()> {
        run_osascript(&self.ensure_list_script(), self.timeout).await?;
        Ok(())
    }

    async fn create(&self, request: &ReminderRequest) -> SinkOutcome {
        match run_osascript(&self.create_script(request), self.timeout).await {
            Ok(output) => outcome_from_output(&output),
            Err(e) => SinkOutcome::Failed(e.to_string()),
        }
    }
}
