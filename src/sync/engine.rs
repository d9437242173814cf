//! Freshness reconciliation between the remote service and the local store.
//!
//! Whichever side has the strictly later `updated_at` wins; ties leave both
//! sides untouched. Every error aborts the operation in progress.

use crate::error::{SyncError, SyncResult};
use crate::sync::document;
use crate::sync::log::{self, Category};
use crate::sync::model::{Article, PostBody};
use crate::sync::remote::RemoteClient;
use crate::sync::store::ArticleStore;
use crate::sync::tags;
use crate::sync::transport::Transport;
use chrono::{DateTime, FixedOffset};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default)]
pub struct PullOutcome {
    pub remote_count: usize,
    pub stored: Vec<(String, PathBuf)>,
    pub skipped: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub source: PathBuf,
    pub title: String,
    pub tag_string: String,
    pub private: bool,
}

#[derive(Debug, Clone)]
pub struct PostOutcome {
    pub article: Article,
    pub path: PathBuf,
}

#[derive(Debug, Clone)]
pub enum UpdateOutcome {
    Pushed { article: Article, path: PathBuf },
    RemoteNotOlder { id: String },
}

fn stamp(at: Option<DateTime<FixedOffset>>) -> String {
    at.map_or_else(|| "never".to_string(), |t| t.to_rfc3339())
}

/// A public article may never go back to private.
pub fn ensure_visibility_transition(local: &Article, remote: &Article) -> SyncResult<()> {
    if local.private && !remote.private {
        return Err(SyncError::validation(format!(
            "article `{}` is already public on the remote and cannot be made private again",
            local.id
        )));
    }
    Ok(())
}

pub struct SyncEngine<'a, T: Transport> {
    remote: &'a RemoteClient<T>,
    store: &'a ArticleStore,
}

impl<'a, T: Transport> SyncEngine<'a, T> {
    pub fn new(remote: &'a RemoteClient<T>, store: &'a ArticleStore) -> Self {
        Self { remote, store }
    }

    /// Write `remote` locally when it is strictly newer than the local copy.
    /// An existing file is overwritten in place; a new article goes to the
    /// first vacant path, never onto a file in `claimed` or on disk. Returns
    /// the written path, if any.
    pub fn store_fresh(
        &self,
        local: &BTreeMap<String, Article>,
        claimed: &mut BTreeSet<PathBuf>,
        remote: &Article,
    ) -> SyncResult<Option<PathBuf>> {
        let existing = local.get(&remote.id);
        let baseline = existing.and_then(|article| article.updated_at);
        if remote.updated_at <= baseline {
            return Ok(None);
        }

        let path = match existing.and_then(|article| article.file_path.clone()) {
            Some(path) => path,
            None => self.store.vacant_path(remote, claimed)?,
        };

        log::emit(
            Category::Fresh,
            format!(
                "{} remote={} > local={}",
                remote.id,
                stamp(remote.updated_at),
                stamp(baseline)
            ),
        );
        self.store.write(&path, remote)?;
        claimed.insert(path.clone());
        Ok(Some(path))
    }

    pub fn reconcile_pull(&self) -> SyncResult<PullOutcome> {
        let remote_articles = self.remote.fetch_all()?;
        let local = self.store.load_index()?;
        let mut claimed: BTreeSet<PathBuf> = local
            .values()
            .filter_map(|article| article.file_path.clone())
            .collect();

        let mut outcome = PullOutcome {
            remote_count: remote_articles.len(),
            ..PullOutcome::default()
        };
        for article in &remote_articles {
            match self.store_fresh(&local, &mut claimed, article)? {
                Some(path) => outcome.stored.push((article.id.clone(), path)),
                None => {
                    log::emit(Category::Skip, format!("{} is up to date", article.id));
                    outcome.skipped.push(article.id.clone());
                }
            }
        }
        Ok(outcome)
    }

    /// Create a new remote article from a local file and store the canonical
    /// result (with its new id) under the computed path.
    pub fn post(&self, new_post: &NewPost) -> SyncResult<PostOutcome> {
        let title = new_post.title.trim();
        if title.is_empty() {
            return Err(SyncError::validation("title is required"));
        }
        let tags = tags::encode(&new_post.tag_string)?;
        if tags.is_empty() {
            return Err(SyncError::validation("at least one tag is required"));
        }

        let source = document::parse(&new_post.source)?;
        let post = PostBody {
            id: String::new(),
            title: title.to_string(),
            body: source.body,
            tags,
            private: new_post.private,
        };

        let created = self.remote.create(&post)?;
        log::emit(
            Category::Post,
            format!("created {} {}", created.id, created.url),
        );
        let claimed: BTreeSet<PathBuf> = self
            .store
            .load_index()?
            .into_values()
            .filter_map(|article| article.file_path)
            .collect();
        let path = self.store.vacant_path(&created, &claimed)?;
        self.store.write(&path, &created)?;
        Ok(PostOutcome {
            article: created,
            path,
        })
    }

    /// Push a local edit when the local file is strictly newer than the
    /// remote copy. The canonical response is written back in place.
    pub fn push_update(&self, path: &Path) -> SyncResult<UpdateOutcome> {
        let local = document::parse(path)?;
        if !local.is_synced() {
            return Err(SyncError::validation(format!(
                "{} has no id header; use `post` for new articles",
                path.display()
            )));
        }

        let remote = self.remote.fetch_one(&local.id)?;
        if local.updated_at <= remote.updated_at {
            log::emit(
                Category::Skip,
                format!(
                    "{} remote={} >= local={}",
                    local.id,
                    stamp(remote.updated_at),
                    stamp(local.updated_at)
                ),
            );
            return Ok(UpdateOutcome::RemoteNotOlder { id: local.id });
        }
        ensure_visibility_transition(&local, &remote)?;

        let updated = self.remote.update(&PostBody::from_article(&local))?;
        log::emit(Category::Update, format!("{} {}", updated.id, updated.url));
        self.store.write(path, &updated)?;
        Ok(UpdateOutcome::Pushed {
            article: updated,
            path: path.to_path_buf(),
        })
    }
}
