use std::sync::Arc;

use anyhow::Result;
use meetsync_core::apple::DialogPresenter;
use meetsync_core::{AlertScheduler, Settings, source};
use owo_colors::OwoColorize;

pub async fn run(settings: Settings) -> Result<()> {
    let source = source::from_settings(&settings)?;
    let presenter = DialogPresenter::new(settings.alert_duration(), settings.snooze_minutes);
    let scheduler = AlertScheduler::new(source, Arc::new(presenter), &settings);

    println!(
        "Watching for meetings starting within {} minutes {}",
        settings.lead_minutes,
        "(Ctrl-C to stop)".dimmed()
    );

    scheduler
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "could not listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
        })
        .await;

    Ok(())
}
