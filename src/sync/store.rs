use crate::error::{SyncError, SyncResult};
use crate::sync::config::{FilenameMode, StoreSettings};
use crate::sync::document;
use crate::sync::log::{self, Category};
use crate::sync::model::Article;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use walkdir::WalkDir;

pub const EXTENSION: &str = "md";

const ILLEGAL_FILENAME_CHARS: [char; 9] = ['\\', '/', '?', ':', '*', '"', '<', '>', '|'];

/// Local article directory. Files are grouped under `<base>/<YYYYMMDD>/`.
#[derive(Debug, Clone)]
pub struct ArticleStore {
    settings: StoreSettings,
}

pub fn sanitize_file_stem(raw: &str) -> String {
    raw.chars()
        .map(|ch| {
            if ILLEGAL_FILENAME_CHARS.contains(&ch) {
                '_'
            } else {
                ch
            }
        })
        .collect()
}

pub fn compute_file_name(article: &Article, mode: FilenameMode) -> String {
    let stem = match mode {
        FilenameMode::Id => article.id.clone(),
        FilenameMode::Title => {
            let raw = article.file_stem.as_deref().unwrap_or(&article.title);
            let stem = sanitize_file_stem(raw.trim());
            if stem.is_empty() {
                article.id.clone()
            } else {
                stem
            }
        }
    };
    format!("{stem}.{EXTENSION}")
}

pub fn compute_path(article: &Article, root: &Path, mode: FilenameMode) -> SyncResult<PathBuf> {
    let Some(date) = article.created_date() else {
        return Err(SyncError::validation(format!(
            "article `{}` has no creation date; cannot place it under {}",
            article.id,
            root.display()
        )));
    };
    Ok(root.join(date).join(compute_file_name(article, mode)))
}

fn is_vacant(path: &Path, claimed: &BTreeSet<PathBuf>) -> SyncResult<bool> {
    if claimed.contains(path) {
        return Ok(false);
    }
    let exists = path
        .try_exists()
        .map_err(|err| SyncError::io("failed to check", path, err))?;
    Ok(!exists)
}

fn is_hidden(entry: &walkdir::DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| name.starts_with('.'))
}

impl ArticleStore {
    pub fn new(settings: StoreSettings) -> Self {
        Self { settings }
    }

    pub fn base_dir(&self) -> &Path {
        &self.settings.base_dir
    }

    pub fn fresh_path(&self, article: &Article) -> SyncResult<PathBuf> {
        compute_path(article, self.base_dir(), self.settings.filename_mode)
    }

    /// The computed path for `article`, or the first `<stem>_<n>` sibling that
    /// is neither in `claimed` nor present on disk. An existing file is never
    /// handed out.
    pub fn vacant_path(&self, article: &Article, claimed: &BTreeSet<PathBuf>) -> SyncResult<PathBuf> {
        let path = self.fresh_path(article)?;
        if is_vacant(&path, claimed)? {
            return Ok(path);
        }

        let parent = path.parent().unwrap_or(self.base_dir());
        let stem = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| article.id.clone());
        let mut n = 1u32;
        loop {
            let candidate = parent.join(format!("{stem}_{n}.{EXTENSION}"));
            if is_vacant(&candidate, claimed)? {
                log::emit(
                    Category::Store,
                    format!(
                        "{} is taken; using {} for {}",
                        path.display(),
                        candidate.display(),
                        article.id
                    ),
                );
                return Ok(candidate);
            }
            n += 1;
        }
    }

    /// Every regular file under the base dir, in file-name order. The base dir
    /// is created when missing. Dotfiles and dot-directories are skipped.
    pub fn list_all(&self) -> SyncResult<Vec<PathBuf>> {
        let root = self.base_dir();
        fs::create_dir_all(root).map_err(|err| SyncError::io("failed to create", root, err))?;

        let mut paths = Vec::new();
        let walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry));
        for entry in walker {
            let entry = entry.map_err(|err| {
                let path = err.path().unwrap_or(root).to_path_buf();
                SyncError::io("failed to walk", path, std::io::Error::from(err))
            })?;
            if entry.file_type().is_file() {
                paths.push(entry.into_path());
            }
        }
        Ok(paths)
    }

    /// Load every synced article keyed by id. Drafts are skipped; a second
    /// file claiming an id already seen aborts the whole load.
    pub fn load_index(&self) -> SyncResult<BTreeMap<String, Article>> {
        let mut index: BTreeMap<String, Article> = BTreeMap::new();
        for path in self.list_all()? {
            let article = document::parse(&path)?;
            if !article.is_synced() {
                continue;
            }
            if let Some(existing) = index.get(&article.id) {
                return Err(SyncError::DuplicateIdentity {
                    id: article.id.clone(),
                    first: existing.file_path.clone().unwrap_or_default(),
                    second: path,
                });
            }
            index.insert(article.id.clone(), article);
        }
        Ok(index)
    }

    /// Render `article` to `path` through a sibling temp file, then stamp the
    /// result with the article's `updated_at`.
    pub fn write(&self, path: &Path, article: &Article) -> SyncResult<()> {
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent).map_err(|err| SyncError::io("failed to create", parent, err))?;

        let mut tmp = tempfile::NamedTempFile::new_in(parent)
            .map_err(|err| SyncError::io("failed to create temp file in", parent, err))?;
        tmp.write_all(document::render(article).as_bytes())
            .map_err(|err| SyncError::io("failed to write", tmp.path().to_path_buf(), err))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tmp.as_file()
                .set_permissions(fs::Permissions::from_mode(0o644))
                .map_err(|err| SyncError::io("failed to chmod", tmp.path().to_path_buf(), err))?;
        }

        if let Some(updated_at) = article.updated_at {
            let stamp = SystemTime::from(updated_at);
            let times = fs::FileTimes::new()
                .set_accessed(stamp)
                .set_modified(stamp);
            tmp.as_file()
                .set_times(times)
                .map_err(|err| SyncError::io("failed to set times on", path, err))?;
        }

        tmp.persist(path)
            .map_err(|err| SyncError::io("failed to replace", path, err.error))?;
        log::emit(Category::Store, path.display().to_string());
        Ok(())
    }
}
