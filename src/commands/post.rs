use anyhow::{Context, Result, anyhow, bail};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use crate::commands::{CommandReport, open_workspace};
use crate::sync::engine::{NewPost, SyncEngine};

#[derive(Debug, Clone)]
pub struct PostOptions {
    pub file: PathBuf,
    pub title: Option<String>,
    pub tags: Option<String>,
    pub private: Option<bool>,
}

fn prompt_line(input: &mut impl BufRead, out: &mut impl Write, lines: &[&str]) -> Result<String> {
    writeln!(out)?;
    for line in lines {
        writeln!(out, "{line}")?;
    }
    out.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer).context("failed to read answer")?;
    Ok(answer.trim().to_string())
}

/// Fill in whatever the flags left out by asking on `input`.
pub fn collect_post(
    opts: &PostOptions,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<NewPost> {
    let title = match &opts.title {
        Some(title) => title.trim().to_string(),
        None => prompt_line(
            input,
            out,
            &[r#"Please enter the "title" of the article you want to post."#],
        )?,
    };
    if title.is_empty() {
        bail!("title is required");
    }

    let tag_string = match &opts.tags {
        Some(tags) => tags.trim().to_string(),
        None => prompt_line(
            input,
            out,
            &[
                r#"Please enter the "tag" of the article you want to post."#,
                r#"Tag is like "React,redux,TypeScript" or "Go" or "Python:3.7". To specify more than one, separate them with ","."#,
            ],
        )?,
    };
    if tag_string.is_empty() {
        bail!("at least one tag is required");
    }

    let private = match opts.private {
        Some(private) => private,
        None => {
            let answer = prompt_line(
                input,
                out,
                &[r#"Do you make the article you post private? "true" is private, "false" is public."#],
            )?;
            answer
                .parse::<bool>()
                .map_err(|_| anyhow!("input string ({answer}) could not be parsed into bool"))?
        }
    };

    Ok(NewPost {
        source: opts.file.clone(),
        title,
        tag_string,
        private,
    })
}

pub fn run(opts: &PostOptions) -> Result<CommandReport> {
    let ws = open_workspace()?;
    let stdin = io::stdin();
    let new_post = collect_post(opts, &mut stdin.lock(), &mut io::stdout())?;

    let mut report = CommandReport::new("post");
    report.detail(format!("source={}", opts.file.display()));

    let engine = SyncEngine::new(&ws.remote, &ws.store);
    let outcome = engine.post(&new_post)?;
    report.detail(format!("created {} {}", outcome.article.id, outcome.article.url));
    report.detail(format!("stored {}", outcome.path.display()));
    Ok(report)
}
