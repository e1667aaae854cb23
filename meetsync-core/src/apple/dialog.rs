//! Alerts shown with `display dialog`.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Local;

use super::{quote, run_osascript};
use crate::alert::{Alert, AlertPresenter, AlertResponse};

const JOIN: &str = "Join";
const DISMISS: &str = "Dismiss";

/// Extra time osascript gets beyond the dialog's own give-up delay.
const DIALOG_MARGIN: Duration = Duration::from_secs(10);

pub struct DialogPresenter {
    display_for: Duration,
    snooze_minutes: i64,
}

impl DialogPresenter {
    pub fn new(display_for: Duration, snooze_minutes: i64) -> Self {
        DialogPresenter {
            display_for,
            snooze_minutes,
        }
    }

    fn snooze_label(&self) -> String {
        format!("Snooze {} min", self.snooze_minutes)
    }

    fn script(&self, alert: &Alert) -> String {
        let start = alert.start.with_timezone(&Local).format("%H:%M");
        let mut message = format!("{}\n\nStarts at {start}", alert.summary);
        if let Some(link) = &alert.meeting_link {
            message.push_str(&format!("\n{link}"));
        }

        // Join is only offered when there is something to open.
        let (buttons, default) = if alert.meeting_link.is_some() {
            (vec![self.snooze_label(), DISMISS.to_string(), JOIN.to_string()], JOIN)
        } else {
            (vec![self.snooze_label(), DISMISS.to_string()], DISMISS)
        };
        let buttons = buttons
            .iter()
            .map(|b| quote(b))
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "display dialog {message} with title {title} buttons {{{buttons}}} default button {default} with icon caution giving up after {secs}",
            message = quote(&message),
            title = quote("Meeting starting soon"),
            default = quote(default),
            secs = self.display_for.as_secs().max(1),
        )
    }

    /// Parse `button returned:Join, gave up:false`.
    fn response_from_output(&self, output: &str) -> AlertResponse {
        let mut button = None;
        let mut gave_up = false;
        for part in output.split(", ") {
            if let Some(value) = part.strip_prefix("button returned:") {
                button = Some(value.trim());
            } else if let Some(value) = part.strip_prefix("gave up:") {
                gave_up = value.trim() == "true";
            }
        }

        if gave_up {
            return AlertResponse::TimedOut;
        }
        match button {
            Some(JOIN) => AlertResponse::Join,
            Some(label) if label == self.snooze_label() => {
                AlertResponse::Snooze(self.snooze_minutes)
            }
            _ => AlertResponse::Dismiss,
        }
    }
}

#[async_trait]
impl AlertPresenter for DialogPresenter {
    async fn present(&self, alert: &Alert) -> AlertResponse {
        match run_osascript(&self.script(alert), self.display_for + DIALOG_MARGIN).await {
            Ok(output) => self.response_from_output(&output),
            Err(e) => {
                tracing::warn!(event_id = %alert.event_id, error = %e, "alert dialog failed");
                AlertResponse::Dismiss
            }
        }
    }
}
