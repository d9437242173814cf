use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("entry format is invalid in {path}: {reason}")]
    Format { path: PathBuf, reason: String },
    #[error("duplicate article id `{id}` in {first} and {second}")]
    DuplicateIdentity {
        id: String,
        first: PathBuf,
        second: PathBuf,
    },
    #[error("{0}")]
    Validation(String),
    #[error("remote returned {status} for {method} {path}")]
    Remote {
        status: u16,
        method: String,
        path: String,
    },
    #[error("{action} {}: {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("http request failed: {0}")]
    Http(String),
    #[error("unexpected response payload: {0}")]
    Decode(String),
}

impl SyncError {
    pub fn format(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Format {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation(reason.into())
    }

    pub fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }

    /// Short machine-friendly label, used as the `error` log category payload.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Format { .. } => "format",
            Self::DuplicateIdentity { .. } => "duplicate_identity",
            Self::Validation(_) => "validation",
            Self::Remote { .. } => "remote",
            Self::Io { .. } => "io",
            Self::Http(_) => "http",
            Self::Decode(_) => "decode",
        }
    }
}

pub type SyncResult<T> = std::result::Result<T, SyncError>;
