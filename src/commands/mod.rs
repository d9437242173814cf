pub mod post;
pub mod pull;
pub mod status;
pub mod update;

use crate::sync::config::{self, SyncConfig};
use crate::sync::remote::RemoteClient;
use crate::sync::store::ArticleStore;
use crate::sync::transport::HttpTransport;
use anyhow::{Context, Result};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct CommandReport {
    pub command: String,
    pub ok: bool,
    pub details: Vec<String>,
    pub issues: Vec<String>,
}

impl CommandReport {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            ok: true,
            details: Vec::new(),
            issues: Vec::new(),
        }
    }

    pub fn detail(&mut self, text: impl Into<String>) {
        self.details.push(text.into());
    }

    pub fn issue(&mut self, text: impl Into<String>) {
        self.ok = false;
        self.issues.push(text.into());
    }

    pub fn render_text(&self) -> String {
        let mut out = format!(
            "{}: {}\n",
            self.command,
            if self.ok { "ok" } else { "failed" }
        );
        for detail in &self.details {
            out.push_str(&format!("  {detail}\n"));
        }
        for issue in &self.issues {
            out.push_str(&format!("  issue: {issue}\n"));
        }
        out
    }
}

/// Remote client and local store built from one loaded configuration.
pub struct Workspace {
    pub config: SyncConfig,
    pub remote: RemoteClient<HttpTransport>,
    pub store: ArticleStore,
}

pub fn open_workspace() -> Result<Workspace> {
    let config = config::load_config().context("load config")?;
    let remote_settings = config.remote_settings();
    let transport = HttpTransport::new(remote_settings.base_url.clone())?;
    Ok(Workspace {
        remote: RemoteClient::new(transport, remote_settings),
        store: ArticleStore::new(config.store_settings()),
        config,
    })
}

#[cfg(test)]
mod tests {
    use super::CommandReport;

    #[test]
    fn issue_marks_report_failed() {
        let mut report = CommandReport::new("pull");
        report.detail("stored a");
        assert!(report.ok);
        report.issue("boom");
        assert!(!report.ok);
        assert_eq!(
            report.render_text(),
            "pull: failed\n  stored a\n  issue: boom\n"
        );
    }
}
