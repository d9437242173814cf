use serde::Serialize;
use std::env;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Http,
    Fresh,
    Store,
    Post,
    Update,
    Skip,
    Error,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Fresh => "fresh",
            Self::Store => "store",
            Self::Post => "post",
            Self::Update => "update",
            Self::Skip => "skip",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LogEvent {
    pub category: Category,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Text,
    Json,
}

fn format_from_env() -> Format {
    match env::var("QIISYNC_LOG_FORMAT") {
        Ok(v) if v.trim().eq_ignore_ascii_case("json") => Format::Json,
        _ => Format::Text,
    }
}

fn quiet_from_env() -> bool {
    matches!(
        env::var("QIISYNC_QUIET").as_deref().map(str::trim),
        Ok("1" | "true" | "TRUE" | "yes" | "on")
    )
}

fn sanitize_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut prev_sep = false;
    for ch in value.chars() {
        if ch.is_whitespace() {
            if !out.is_empty() && !prev_sep {
                out.push(' ');
                prev_sep = true;
            }
        } else if !ch.is_control() {
            out.push(ch);
            prev_sep = false;
        }
    }
    out.trim_end().to_string()
}

fn render(event: &LogEvent, format: Format) -> String {
    match format {
        Format::Json => serde_json::to_string(event).unwrap_or_else(|_| {
            format!(
                "{{\"category\":\"{}\",\"message\":\"<unencodable>\"}}",
                event.category.as_str()
            )
        }),
        Format::Text => format!(
            "category={} msg={}",
            event.category.as_str(),
            sanitize_value(&event.message)
        ),
    }
}

/// Write one event to stderr. Errors are always shown; the rest honour
/// `QIISYNC_QUIET`.
pub fn emit(category: Category, message: impl Into<String>) {
    if category != Category::Error && quiet_from_env() {
        return;
    }
    let event = LogEvent {
        category,
        message: message.into(),
    };
    eprintln!("{}", render(&event, format_from_env()));
}
