use anyhow::Result;
use chrono::Utc;
use meetsync_core::{Settings, SyncLedger};
use owo_colors::OwoColorize;

use crate::render::Render;

pub fn run(settings: &Settings) -> Result<()> {
    let ledger = SyncLedger::load(settings.ledger_path()?, Utc::now());

    println!(
        "{} {}",
        "Synced events".bold(),
        format!("({})", ledger.path().display()).dimmed()
    );
    println!("{}", ledger.render());

    Ok(())
}
