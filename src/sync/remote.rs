use crate::error::{SyncError, SyncResult};
use crate::sync::config::{FilenameMode, RemoteSettings};
use crate::sync::model::{Article, PostBody, Tag};
use crate::sync::transport::{ApiRequest, ApiResponse, Method, Transport};
use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use std::collections::HashMap;

pub const LIST_PATH: &str = "authenticated_user/items";
pub const ITEMS_PATH: &str = "items";
pub const TOTAL_COUNT_HEADER: &str = "Total-Count";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct User {
    #[serde(default)]
    pub name: String,
}

/// Subset of the API item object this tool reads.
#[derive(Debug, Clone, Deserialize)]
pub struct Item {
    pub id: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub user: User,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub private: bool,
}

impl Item {
    pub fn into_article(self) -> Article {
        Article {
            id: self.id,
            title: self.title,
            tags: self.tags,
            author: self.user.name,
            private: self.private,
            body: self.body,
            url: self.url,
            created_at: Some(self.created_at),
            updated_at: Some(self.updated_at),
            file_path: None,
            file_stem: None,
        }
    }
}

/// Suffixes repeated `(creation date, title)` pairs with `_<n>` so title-named
/// files do not overwrite each other. Only the local file stem changes; the
/// title itself is left as the remote reported it.
#[derive(Debug, Default)]
pub struct TitleDeduper {
    seen: HashMap<(String, String), usize>,
}

impl TitleDeduper {
    pub fn apply(&mut self, article: &mut Article) {
        let key = (
            article.created_date().unwrap_or_default(),
            article.title.clone(),
        );
        let count = self.seen.entry(key).or_insert(0);
        if *count > 0 {
            article.file_stem = Some(format!("{}_{}", article.title, count));
        }
        *count += 1;
    }
}

pub struct RemoteClient<T: Transport> {
    transport: T,
    settings: RemoteSettings,
}

fn decode<'a, D: Deserialize<'a>>(response: &'a ApiResponse, what: &str) -> SyncResult<D> {
    serde_json::from_str(&response.body)
        .map_err(|err| SyncError::Decode(format!("{what}: {err}")))
}

/// Ids go straight into the request path, so anything that could change the
/// URL structure is refused.
fn require_id(id: &str, action: &str) -> SyncResult<()> {
    if id.trim().is_empty() {
        return Err(SyncError::validation(format!(
            "cannot {action} an article without an id"
        )));
    }
    if !id.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_') {
        return Err(SyncError::validation(format!(
            "cannot {action} article `{id}`: id may only hold ASCII letters, digits, `-` and `_`"
        )));
    }
    Ok(())
}

impl<T: Transport> RemoteClient<T> {
    pub fn new(transport: T, settings: RemoteSettings) -> Self {
        Self {
            transport,
            settings,
        }
    }

    pub fn per_page(&self) -> u32 {
        self.settings.per_page
    }

    fn request(&self, method: Method, path: String) -> ApiRequest {
        let mut request = ApiRequest::new(method, path);
        request.headers.push((
            "Authorization".to_string(),
            format!("Bearer {}", self.settings.token),
        ));
        request
    }

    fn with_body(&self, mut request: ApiRequest, post: &PostBody) -> SyncResult<ApiRequest> {
        let body = serde_json::to_value(post)
            .map_err(|err| SyncError::Decode(format!("encode post body: {err}")))?;
        request
            .headers
            .push(("Content-Type".to_string(), "application/json".to_string()));
        request.body = Some(body);
        Ok(request)
    }

    fn send_expecting(&self, request: &ApiRequest, expected: u16) -> SyncResult<ApiResponse> {
        let response = self.transport.send(request)?;
        if response.status != expected {
            return Err(SyncError::Remote {
                status: response.status,
                method: request.method.as_str().to_string(),
                path: request.path.clone(),
            });
        }
        Ok(response)
    }

    /// Convert one listing batch. In title mode, repeated `(creation date,
    /// title)` pairs get a suffixed local file stem.
    pub fn items_to_articles(&self, items: Vec<Item>) -> Vec<Article> {
        let mut deduper = TitleDeduper::default();
        items
            .into_iter()
            .map(|item| {
                let mut article = item.into_article();
                if self.settings.filename_mode == FilenameMode::Title {
                    deduper.apply(&mut article);
                }
                article
            })
            .collect()
    }

    /// One page of the authenticated user's items plus whether another page
    /// exists.
    pub fn list_mine(&self, page: u32, per_page: u32) -> SyncResult<(Vec<Item>, bool)> {
        let mut request = self.request(Method::Get, LIST_PATH.to_string());
        request.query = vec![
            ("page".to_string(), page.to_string()),
            ("per_page".to_string(), per_page.to_string()),
        ];
        let response = self.send_expecting(&request, 200)?;

        let items: Vec<Item> = decode(&response, "item list")?;
        let total = response
            .header(TOTAL_COUNT_HEADER)
            .ok_or_else(|| SyncError::Decode(format!("missing {TOTAL_COUNT_HEADER} header")))?
            .trim()
            .parse::<u64>()
            .map_err(|err| SyncError::Decode(format!("bad {TOTAL_COUNT_HEADER} header: {err}")))?;

        let has_next = u64::from(per_page) * u64::from(page) < total;
        Ok((items, has_next))
    }

    /// Every page in order, requested one after another, converted as a
    /// single batch so suffixes carry across page boundaries.
    pub fn fetch_all(&self) -> SyncResult<Vec<Article>> {
        let mut items = Vec::new();
        let mut page = 1;
        loop {
            let (batch, has_next) = self.list_mine(page, self.settings.per_page)?;
            items.extend(batch);
            if !has_next {
                break;
            }
            page += 1;
        }
        Ok(self.items_to_articles(items))
    }

    pub fn fetch_one(&self, id: &str) -> SyncResult<Article> {
        require_id(id, "fetch")?;
        let request = self.request(Method::Get, format!("{ITEMS_PATH}/{id}"));
        let response = self.send_expecting(&request, 200)?;
        let item: Item = decode(&response, "item")?;
        Ok(item.into_article())
    }

    /// Create a new article. The returned article carries the id the service
    /// assigned; callers must persist it.
    pub fn create(&self, post: &PostBody) -> SyncResult<Article> {
        let request = self.with_body(self.request(Method::Post, ITEMS_PATH.to_string()), post)?;
        let response = self.send_expecting(&request, 201)?;
        let item: Item = decode(&response, "created item")?;
        Ok(item.into_article())
    }

    pub fn update(&self, post: &PostBody) -> SyncResult<Article> {
        require_id(&post.id, "update")?;
        let request = self.with_body(
            self.request(Method::Patch, format!("{ITEMS_PATH}/{}", post.id)),
            post,
        )?;
        let response = self.send_expecting(&request, 200)?;
        let item: Item = decode(&response, "updated item")?;
        Ok(item.into_article())
    }
}

#[cfg(test)]
impl<T: Transport> RemoteClient<T> {
    pub fn transport(&self) -> &T {
        &self.transport
    }
}

#[cfg(test)]
pub mod test_support {
    use serde_json::json;

    pub fn item_json(id: &str, title: &str, created_at: &str, updated_at: &str) -> serde_json::Value {
        json!({
            "rendered_body": "<h1>Example</h1>",
            "body": "# Example",
            "coediting": false,
            "created_at": created_at,
            "id": id,
            "private": false,
            "tags": [{"name": "Ruby", "versions": ["0.0.1"]}],
            "title": title,
            "updated_at": updated_at,
            "url": format!("https://qiita.com/Qiita/items/{id}"),
            "user": {"id": "qiita", "name": "Qiita キータ", "followers_count": 200},
            "page_views_count": 100
        })
    }
}
