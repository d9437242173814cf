use anyhow::{Result, bail};
use std::path::PathBuf;

use crate::commands::{CommandReport, open_workspace};
use crate::sync::document;
use crate::sync::engine::{SyncEngine, UpdateOutcome};

#[derive(Debug, Clone)]
pub struct UpdateOptions {
    pub file: PathBuf,
}

pub fn run(opts: &UpdateOptions) -> Result<CommandReport> {
    let local = document::parse(&opts.file)?;
    if local.private {
        bail!(
            "once published, an article cannot be made private again; \
             check that `private` in the header of {} is set to false",
            opts.file.display()
        );
    }

    let ws = open_workspace()?;
    let mut report = CommandReport::new("update");
    report.detail(format!("file={}", opts.file.display()));

    let engine = SyncEngine::new(&ws.remote, &ws.store);
    match engine.push_update(&opts.file)? {
        UpdateOutcome::Pushed { article, path } => {
            report.detail(format!("pushed {} {}", article.id, article.url));
            report.detail(format!("rewrote {}", path.display()));
        }
        UpdateOutcome::RemoteNotOlder { id } => {
            report.detail(format!("skipped {id}: remote is same or newer"));
        }
    }
    Ok(report)
}
