use anyhow::Result;

use crate::commands::{CommandReport, open_workspace};
use crate::sync::engine::SyncEngine;

pub fn run() -> Result<CommandReport> {
    let ws = open_workspace()?;
    let mut report = CommandReport::new("pull");
    report.detail(format!("base_dir={}", ws.store.base_dir().display()));

    let engine = SyncEngine::new(&ws.remote, &ws.store);
    let outcome = engine.reconcile_pull()?;

    report.detail(format!("remote_articles={}", outcome.remote_count));
    for (id, path) in &outcome.stored {
        report.detail(format!("stored {id} -> {}", path.display()));
    }
    report.detail(format!("up_to_date={}", outcome.skipped.len()));
    Ok(report)
}
