//! Request bodies and response decoding for the Elasticsearch search API.

use serde::Deserialize;
use serde_json::{Value, json};
use tracing::warn;

use crate::domain::entities::SearchDocument;

/// Field holding exact tag values. Dynamic mapping of a string array produces `tags.keyword`.
pub(super) const TAG_KEYWORD_FIELD: &str = "tags.keyword";

pub(super) fn index_mapping() -> Value {
    json!({
        "mappings": {
            "properties": {
                "id": { "type": "long" },
                "title": { "type": "text" },
                "content": { "type": "text" },
                "tags": {
                    "type": "text",
                    "fields": { "keyword": { "type": "keyword", "ignore_above": 256 } }
                }
            }
        }
    })
}

pub(super) fn text_query(query: &str, size: usize) -> Value {
    json!({
        "size": size,
        "query": {
            "multi_match": {
                "query": query,
                "fields": ["title", "content"]
            }
        }
    })
}

/// Tag similarity: every tag is a `should` term, at least one has to match, and the source post
/// is excluded.
pub(super) fn related_query(tags: &[String], exclude_id: i64, size: usize) -> Value {
    let should: Vec<Value> = tags
        .iter()
        .map(|tag| json!({ "term": { TAG_KEYWORD_FIELD: tag } }))
        .collect();

    json!({
        "size": size,
        "query": {
            "bool": {
                "should": should,
                "minimum_should_match": 1,
                "must_not": [ { "term": { "id": exclude_id } } ]
            }
        }
    })
}

#[derive(Debug, Deserialize)]
pub(super) struct SearchResponse {
    hits: Hits,
}

#[derive(Debug, Deserialize)]
struct Hits {
    #[serde(default)]
    hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct Hit {
    #[serde(rename = "_id", default)]
    id: Option<String>,
    #[serde(rename = "_source")]
    source: Option<Value>,
}

impl SearchResponse {
    /// Decode hit sources in engine order, skipping any that do not look like a post document.
    pub(super) fn into_documents(self) -> Vec<SearchDocument> {
        self.hits
            .hits
            .into_iter()
            .filter_map(|hit| {
                let source = hit.source?;
                match serde_json::from_value::<SearchDocument>(source) {
                    Ok(doc) => Some(doc),
                    Err(err) => {
                        warn!(
                            target = "postsync::search",
                            hit_id = hit.id.as_deref().unwrap_or(""),
                            error = %err,
                            "skipping undecodable search hit"
                        );
                        None
                    }
                }
            })
            .collect()
    }
}
