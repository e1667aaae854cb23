use anyhow::Result;
use meetsync_core::apple::RemindersAppSink;
use meetsync_core::{Settings, SourceFormat, SourceSettings, SyncEngine, source};
use owo_colors::OwoColorize;

use crate::render::Render;
use crate::utils::tui;

pub async fn run(mut settings: Settings, source_override: Option<SourceFormat>) -> Result<()> {
    if let Some(kind) = source_override {
        let configured = settings
            .source
            .take()
            .unwrap_or_else(|| SourceSettings::google_api("primary"));
        settings.source = Some(SourceSettings { kind, ..configured });
    }

    let source = source::from_settings(&settings)?;
    let label = source.describe();
    let sink = RemindersAppSink::new(&settings.reminder_list);
    let engine = SyncEngine::new(source, Box::new(sink), &settings)?;

    let spinner = tui::create_spinner(format!("📅 {label}"));
    let result = engine.run().await;
    spinner.finish_and_clear();

    println!("📅 {label}");
    match result {
        Ok(report) => {
            println!("{}", report.render());
            Ok(())
        }
        Err(e) => {
            println!("   {}", e.to_string().red());
            Err(e.into())
        }
    }
}
