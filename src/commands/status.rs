use anyhow::Result;

use crate::commands::{CommandReport, open_workspace};
use crate::sync::config::resolve_config_path;
use crate::sync::document;

pub fn run() -> Result<CommandReport> {
    let ws = open_workspace()?;
    let mut report = CommandReport::new("status");

    match resolve_config_path() {
        Some(path) if path.exists() => report.detail(format!("config={}", path.display())),
        Some(path) => report.detail(format!("config={} (missing, env only)", path.display())),
        None => report.detail("config=<none>"),
    }
    report.detail(format!("base_url={}", ws.config.qiita.base_url));
    report.detail(format!("per_page={}", ws.remote.per_page()));
    report.detail(format!("base_dir={}", ws.store.base_dir().display()));
    report.detail(format!(
        "filename_mode={}",
        ws.config.filename_mode().as_str()
    ));

    let mut drafts = 0usize;
    for path in ws.store.list_all()? {
        match document::parse(&path) {
            Ok(article) if !article.is_synced() => drafts += 1,
            Ok(_) => {}
            Err(err) => report.issue(format!("{} ({})", err, err.kind())),
        }
    }
    match ws.store.load_index() {
        Ok(index) => report.detail(format!("synced_articles={}", index.len())),
        Err(err) => report.issue(format!("{} ({})", err, err.kind())),
    }
    report.detail(format!("drafts={drafts}"));

    Ok(report)
}
