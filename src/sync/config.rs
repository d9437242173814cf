use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_BASE_URL: &str = "https://qiita.com/api/v2/";
pub const DEFAULT_PER_PAGE: u32 = 20;
const MAX_PER_PAGE: u32 = 100;

/// How a freshly pulled article's file is named inside its date directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilenameMode {
    Id,
    #[default]
    Title,
}

impl FilenameMode {
    /// `"id"` selects id-based names; anything else falls back to titles.
    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("id") {
            Self::Id
        } else {
            Self::Title
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Title => "title",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QiitaSection {
    #[serde(default)]
    pub api_token: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_per_page() -> u32 {
    DEFAULT_PER_PAGE
}

impl Default for QiitaSection {
    fn default() -> Self {
        Self {
            api_token: String::new(),
            base_url: default_base_url(),
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LocalSection {
    #[serde(default)]
    pub base_dir: String,
    #[serde(default)]
    pub filename_mode: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SyncConfig {
    #[serde(default)]
    pub qiita: QiitaSection,
    #[serde(default)]
    pub local: LocalSection,
}

/// Everything the remote client needs, detached from file/env loading.
#[derive(Debug, Clone)]
pub struct RemoteSettings {
    pub base_url: String,
    pub token: String,
    pub per_page: u32,
    pub filename_mode: FilenameMode,
}

#[derive(Debug, Clone)]
pub struct StoreSettings {
    pub base_dir: PathBuf,
    pub filename_mode: FilenameMode,
}

impl SyncConfig {
    pub fn filename_mode(&self) -> FilenameMode {
        FilenameMode::parse(&self.local.filename_mode)
    }

    pub fn remote_settings(&self) -> RemoteSettings {
        RemoteSettings {
            base_url: self.qiita.base_url.clone(),
            token: self.qiita.api_token.clone(),
            per_page: self.qiita.per_page,
            filename_mode: self.filename_mode(),
        }
    }

    pub fn store_settings(&self) -> StoreSettings {
        StoreSettings {
            base_dir: PathBuf::from(&self.local.base_dir),
            filename_mode: self.filename_mode(),
        }
    }
}

fn env_or_string(var: &str, fallback: &str) -> String {
    match env::var(var) {
        Ok(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => fallback.to_string(),
    }
}

fn env_or_u32(var: &str, fallback: u32) -> u32 {
    match env::var(var) {
        Ok(v) => v.trim().parse::<u32>().ok().unwrap_or(fallback),
        Err(_) => fallback,
    }
}

fn normalize(cfg: &mut SyncConfig) {
    if !cfg.qiita.base_url.ends_with('/') {
        cfg.qiita.base_url.push('/');
    }
}

fn validate(cfg: &SyncConfig) -> Result<()> {
    if cfg.qiita.api_token.trim().is_empty() {
        return Err(anyhow!(
            "missing api token: set [qiita] api_token or QIISYNC_API_TOKEN"
        ));
    }
    if cfg.local.base_dir.trim().is_empty() {
        return Err(anyhow!(
            "missing base dir: set [local] base_dir or QIISYNC_BASE_DIR"
        ));
    }
    if cfg.qiita.per_page == 0 || cfg.qiita.per_page > MAX_PER_PAGE {
        return Err(anyhow!(
            "invalid per_page: require 1 <= per_page <= {MAX_PER_PAGE}"
        ));
    }
    if !cfg.qiita.base_url.starts_with("http://") && !cfg.qiita.base_url.starts_with("https://")
    {
        return Err(anyhow!(
            "invalid base url `{}`: must be http(s)",
            cfg.qiita.base_url
        ));
    }
    Ok(())
}

pub fn resolve_config_path() -> Option<PathBuf> {
    if let Ok(custom) = env::var("QIISYNC_CONFIG_PATH") {
        let trimmed = custom.trim();
        if !trimmed.is_empty() {
            return Some(PathBuf::from(trimmed));
        }
    }

    let home = dirs::home_dir()?;
    Some(home.join(".config").join("qiisync").join("config"))
}

pub fn parse_config(raw: &str, origin: &Path) -> Result<SyncConfig> {
    toml::from_str(raw)
        .map_err(|err| anyhow!("failed to parse qiisync config {}: {err}", origin.display()))
}

fn read_file_config() -> Result<SyncConfig> {
    let Some(path) = resolve_config_path() else {
        return Ok(SyncConfig::default());
    };
    if !path.exists() {
        return Ok(SyncConfig::default());
    }

    let raw = fs::read_to_string(&path)
        .map_err(|err| anyhow!("failed to read {}: {err}", path.display()))?;
    parse_config(&raw, &path)
}

pub fn load_config() -> Result<SyncConfig> {
    let mut cfg = read_file_config()?;

    cfg.qiita.api_token = env_or_string("QIISYNC_API_TOKEN", &cfg.qiita.api_token);
    cfg.qiita.base_url = env_or_string("QIISYNC_BASE_URL", &cfg.qiita.base_url);
    cfg.qiita.per_page = env_or_u32("QIISYNC_PER_PAGE", cfg.qiita.per_page);
    cfg.local.base_dir = env_or_string("QIISYNC_BASE_DIR", &cfg.local.base_dir);
    cfg.local.filename_mode = env_or_string("QIISYNC_FILENAME_MODE", &cfg.local.filename_mode);

    normalize(&mut cfg);
    validate(&cfg)?;
    Ok(cfg)
}
