//! Colored terminal rendering for meetsync types.

use chrono::Local;
use meetsync_core::{LedgerEntry, SyncLedger, SyncReport};
use owo_colors::OwoColorize;

pub trait Render {
    fn render(&self) -> String;
}

fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{word}s")
    }
}

impl Render for SyncReport {
    fn render(&self) -> String {
        let mut lines = Vec::new();

        if self.created > 0 {
            let label = format!("{} {} created", self.created, pluralize("reminder", self.created));
            lines.push(format!("   {} {}", "+".green(), label.green()));
        }
        if self.already_existed > 0 {
            lines.push(format!(
                "   {} {} already in Reminders",
                "=".dimmed(),
                self.already_existed
            ));
        }
        if self.failed > 0 {
            let label = format!("{} failed, will retry next sync", self.failed);
            lines.push(format!("   {} {}", "!".red(), label.red()));
        }
        if lines.is_empty() {
            lines.push(format!("   {}", "No new meetings".dimmed()));
        }

        lines.push(
            format!(
                "   {} fetched, {} eligible, {} skipped",
                self.fetched, self.eligible, self.skipped
            )
            .dimmed()
            .to_string(),
        );

        lines.join("\n")
    }
}

impl Render for (&str, &LedgerEntry) {
    fn render(&self) -> String {
        let (event_id, entry) = self;
        let start = entry.start_time.with_timezone(&Local).format("%a %d %b %H:%M");
        let synced = entry.synced_at.with_timezone(&Local).format("%H:%M");
        format!(
            "   {} {} {}",
            start.to_string().cyan(),
            entry.summary,
            format!("({event_id}, synced {synced})").dimmed()
        )
    }
}

impl Render for SyncLedger {
    fn render(&self) -> String {
        if self.is_empty() {
            return format!("   {}", "No synced events".dimmed());
        }

        let mut entries: Vec<_> = self.entries().collect();
        entries.sort_by_key(|(_, entry)| entry.start_time);
        entries
            .iter()
            .map(|entry| entry.render())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
