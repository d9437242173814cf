use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::commands::{self, CommandReport};

#[derive(Parser)]
#[command(name = "qiisync")]
#[command(about = "Synchronize Markdown articles between a local directory and Qiita")]
#[command(version)]
pub struct Cli {
    /// Print the command report as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Pull articles from remote
    Pull,
    /// Post a new article to remote
    Post {
        /// Markdown file holding the article body
        file: PathBuf,
        /// Article title (prompted when omitted)
        #[arg(long)]
        title: Option<String>,
        /// Tags like "Go:1.14,Python:3.7:3.8" (prompted when omitted)
        #[arg(long)]
        tags: Option<String>,
        /// Post as a private article: true or false (prompted when omitted)
        #[arg(long, value_name = "BOOL")]
        private: Option<bool>,
    },
    /// Push a local article to remote
    Update {
        /// Previously pulled or posted article file
        file: PathBuf,
    },
    /// Show resolved configuration and local article counts
    Status,
}

fn print_report(report: &CommandReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        print!("{}", report.render_text());
    }
    Ok(())
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let report = match cli.command {
        Commands::Pull => commands::pull::run()?,
        Commands::Post {
            file,
            title,
            tags,
            private,
        } => commands::post::run(&commands::post::PostOptions {
            file,
            title,
            tags,
            private,
        })?,
        Commands::Update { file } => {
            commands::update::run(&commands::update::UpdateOptions { file })?
        }
        Commands::Status => commands::status::run()?,
    };

    print_report(&report, cli.json)?;
    if !report.ok {
        bail!("{} reported {} issue(s)", report.command, report.issues.len());
    }
    Ok(())
}
