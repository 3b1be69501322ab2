//! Elasticsearch-compatible search index adapter over its REST API.

mod query;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Serialize;
use tracing::{debug, info};
use url::Url;

use crate::application::search::{SearchError, SearchIndex};
use crate::config::SearchSettings;
use crate::domain::entities::{PostRecord, SearchDocument};

use query::{SearchResponse, index_mapping, related_query, text_query};

const MAX_ERROR_BODY: usize = 512;

#[derive(Clone, Debug)]
pub struct ElasticsearchIndex {
    client: Client,
    base: Url,
    index: String,
    max_results: usize,
}

impl ElasticsearchIndex {
    pub fn new(
        mut base: Url,
        index: impl Into<String>,
        timeout: Duration,
        max_results: usize,
    ) -> Result<Self, SearchError> {
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("postsync/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(transport)?;

        Ok(Self {
            client,
            base,
            index: index.into(),
            max_results,
        })
    }

    pub fn from_settings(settings: &SearchSettings) -> Result<Self, SearchError> {
        Self::new(
            settings.url.clone(),
            settings.index.clone(),
            settings.timeout,
            settings.max_results.get() as usize,
        )
    }

    pub fn index_name(&self) -> &str {
        &self.index
    }

    fn url(&self, path: &str) -> Result<Url, SearchError> {
        self.base
            .join(path)
            .map_err(|err| SearchError::Transport(format!("invalid search url `{path}`: {err}")))
    }

    async fn search(&self, body: serde_json::Value) -> Result<Vec<SearchDocument>, SearchError> {
        let url = self.url(&format!("{}/_search", self.index))?;
        let response = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(transport)?;
        let response = ensure_success(response).await?;
        let decoded: SearchResponse = response
            .json()
            .await
            .map_err(|err| SearchError::Decode(err.to_string()))?;
        Ok(decoded.into_documents())
    }
}

#[derive(Serialize)]
struct IndexedPost<'a> {
    id: i64,
    title: &'a str,
    content: &'a str,
    tags: &'a [String],
}

impl<'a> From<&'a PostRecord> for IndexedPost<'a> {
    fn from(post: &'a PostRecord) -> Self {
        Self {
            id: post.id,
            title: &post.title,
            content: &post.content,
            tags: &post.tags,
        }
    }
}

#[async_trait]
impl SearchIndex for ElasticsearchIndex {
    async fn ensure_index(&self) -> Result<(), SearchError> {
        let url = self.url(&self.index)?;
        let existing = self
            .client
            .head(url.clone())
            .send()
            .await
            .map_err(transport)?;

        match existing.status() {
            status if status.is_success() => {
                debug!(target = "postsync::search", index = %self.index, "index exists");
                return Ok(());
            }
            StatusCode::NOT_FOUND => {}
            status => {
                return Err(SearchError::Status {
                    status: status.as_u16(),
                    body: String::new(),
                });
            }
        }

        let response = self
            .client
            .put(url)
            .json(&index_mapping())
            .send()
            .await
            .map_err(transport)?;

        // Another instance may have created it between the two calls.
        if response.status() == StatusCode::BAD_REQUEST {
            let body = response.text().await.map_err(transport)?;
            if body.contains("resource_already_exists_exception") {
                return Ok(());
            }
            return Err(SearchError::Status {
                status: StatusCode::BAD_REQUEST.as_u16(),
                body: truncate(body),
            });
        }

        ensure_success(response).await?;
        info!(target = "postsync::search", index = %self.index, "created search index");
        Ok(())
    }

    async fn upsert(&self, post: &PostRecord) -> Result<(), SearchError> {
        let url = self.url(&format!("{}/_doc/{}", self.index, post.id))?;
        let response = self
            .client
            .put(url)
            .json(&IndexedPost::from(post))
            .send()
            .await
            .map_err(transport)?;
        ensure_success(response).await?;
        Ok(())
    }

    async fn search_text(&self, query: &str) -> Result<Vec<SearchDocument>, SearchError> {
        self.search(text_query(query, self.max_results)).await
    }

    async fn related_by_tags(
        &self,
        tags: &[String],
        exclude_id: i64,
        limit: usize,
    ) -> Result<Vec<SearchDocument>, SearchError> {
        if tags.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let mut related = self.search(related_query(tags, exclude_id, limit)).await?;
        related.retain(|doc| doc.id != exclude_id);
        related.truncate(limit);
        Ok(related)
    }
}

fn transport(err: reqwest::Error) -> SearchError {
    SearchError::Transport(err.to_string())
}

async fn ensure_success(response: Response) -> Result<Response, SearchError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(SearchError::Status {
        status: status.as_u16(),
        body: truncate(body),
    })
}

fn truncate(mut body: String) -> String {
    if body.len() > MAX_ERROR_BODY {
        let mut cut = MAX_ERROR_BODY;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
    }
    body
}
