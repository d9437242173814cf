//! Local article files: a `---` delimited header of `key: value` lines, one
//! blank line, then the raw Markdown body.
//!
//! Files that do not start with the separator are drafts; their whole content
//! is the body and they carry no identity.

use crate::error::{SyncError, SyncResult};
use crate::sync::model::Article;
use crate::sync::tags;
use chrono::{DateTime, Utc};
use std::fs;
use std::path::Path;

pub const SEPARATOR: &str = "---";

const HEADER_KEYS: [&str; 5] = ["id", "title", "tags", "author", "private"];

/// Read `path` and attach its mtime as `updated_at`.
pub fn parse(path: &Path) -> SyncResult<Article> {
    let content =
        fs::read_to_string(path).map_err(|err| SyncError::io("failed to read", path, err))?;
    let mut article = parse_str(&content, path)?;

    let modified = fs::metadata(path)
        .and_then(|meta| meta.modified())
        .map_err(|err| SyncError::io("failed to stat", path, err))?;
    article.updated_at = Some(DateTime::<Utc>::from(modified).fixed_offset());
    article.file_path = Some(path.to_path_buf());
    Ok(article)
}

/// Parse file content without touching the filesystem. `origin` only labels
/// errors.
pub fn parse_str(content: &str, origin: &Path) -> SyncResult<Article> {
    let Some(rest) = content.strip_prefix("---\n") else {
        return Ok(Article {
            body: content.to_string(),
            ..Article::default()
        });
    };

    let mut header_lines = Vec::new();
    let mut body_start = None;
    let mut offset = 0usize;
    for line in rest.split_inclusive('\n') {
        offset += line.len();
        let line = line.trim_end_matches('\n');
        if line == SEPARATOR {
            body_start = Some(offset);
            break;
        }
        header_lines.push(line);
    }
    let Some(body_start) = body_start else {
        return Err(SyncError::format(origin, "header has no closing separator"));
    };

    let mut article = Article::default();
    apply_header(&mut article, &header_lines, origin)?;

    let body = &rest[body_start..];
    article.body = body.strip_prefix('\n').unwrap_or(body).to_string();
    Ok(article)
}

fn apply_header(article: &mut Article, lines: &[&str], origin: &Path) -> SyncResult<()> {
    for (idx, line) in lines.iter().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let Some((key, raw)) = line.split_once(':') else {
            return Err(SyncError::format(
                origin,
                format!("header line {} is not `key: value`: {line}", idx + 2),
            ));
        };
        let key = key.trim().to_ascii_lowercase();
        let value = decode_value(raw, origin)?;
        match key.as_str() {
            "id" => article.id = value,
            "title" => article.title = value,
            "tags" => {
                article.tags = tags::encode(&value).map_err(|err| {
                    SyncError::format(origin, format!("invalid tags header: {err}"))
                })?;
            }
            "author" => article.author = value,
            "private" => {
                article.private = match value.as_str() {
                    "true" => true,
                    "false" => false,
                    other => {
                        return Err(SyncError::format(
                            origin,
                            format!("private must be `true` or `false`, got `{other}`"),
                        ));
                    }
                };
            }
            _ => {}
        }
    }
    Ok(())
}

fn decode_value(raw: &str, origin: &Path) -> SyncResult<String> {
    let trimmed = raw.trim();
    if trimmed.starts_with('"') {
        return serde_json::from_str::<String>(trimmed)
            .map_err(|err| SyncError::format(origin, format!("bad quoted value {trimmed}: {err}")));
    }
    Ok(trimmed.to_string())
}

fn encode_value(value: &str) -> String {
    let plain = !value.is_empty()
        && value.trim() == value
        && !value.starts_with('"')
        && !value.contains(['\n', '\r']);
    if plain {
        value.to_string()
    } else {
        serde_json::Value::String(value.to_string()).to_string()
    }
}

/// Serialize the header and body. The output always ends with a newline.
pub fn render(article: &Article) -> String {
    let tag_string = tags::decode(&article.tags);
    let private = if article.private { "true" } else { "false" };
    let values = [
        encode_value(&article.id),
        encode_value(&article.title),
        encode_value(&tag_string),
        encode_value(&article.author),
        private.to_string(),
    ];

    let mut out = String::with_capacity(article.body.len() + 128);
    out.push_str(SEPARATOR);
    out.push('\n');
    for (key, value) in HEADER_KEYS.iter().zip(values.iter()) {
        out.push_str(key);
        out.push_str(": ");
        out.push_str(value);
        out.push('\n');
    }
    out.push_str(SEPARATOR);
    out.push_str("\n\n");
    out.push_str(&article.body);
    if !out.ends_with('\n') {
        out.push('\n');
    }
    out
}
