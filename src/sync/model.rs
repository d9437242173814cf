use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    #[serde(default)]
    pub versions: Vec<String>,
}

impl Tag {
    #[cfg(test)]
    pub fn new(name: impl Into<String>, versions: &[&str]) -> Self {
        Self {
            name: name.into(),
            versions: versions.iter().map(|v| (*v).to_string()).collect(),
        }
    }
}

/// One synchronized article, either loaded from a local file or converted from
/// an API item.
///
/// An empty `id` marks a draft that has never been created remotely. Drafts
/// carry no `created_at`, and their `updated_at` is the backing file's mtime.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Article {
    pub id: String,
    pub title: String,
    pub tags: Vec<Tag>,
    pub author: String,
    pub private: bool,
    pub body: String,
    pub url: String,
    pub created_at: Option<DateTime<FixedOffset>>,
    pub updated_at: Option<DateTime<FixedOffset>>,
    pub file_path: Option<PathBuf>,
    /// Local file stem chosen to keep title-named files apart. Never sent to
    /// the remote and never written to the header.
    pub file_stem: Option<String>,
}

impl Article {
    pub fn is_synced(&self) -> bool {
        !self.id.is_empty()
    }

    /// `YYYYMMDD` of the creation timestamp, in the offset the API reported it.
    pub fn created_date(&self) -> Option<String> {
        self.created_at
            .map(|created| created.format("%Y%m%d").to_string())
    }
}

/// Payload for create and update calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostBody {
    #[serde(skip)]
    pub id: String,
    pub title: String,
    pub body: String,
    pub tags: Vec<Tag>,
    pub private: bool,
}

impl PostBody {
    pub fn from_article(article: &Article) -> Self {
        Self {
            id: article.id.clone(),
            title: article.title.clone(),
            body: article.body.clone(),
            tags: article.tags.clone(),
            private: article.private,
        }
    }
}
