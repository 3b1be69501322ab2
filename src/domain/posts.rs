use std::collections::HashSet;

use crate::domain::entities::PostDraft;
use crate::domain::error::DomainError;

/// Positive post identifier as assigned by the record store.
pub fn parse_post_id(raw: &str) -> Result<i64, DomainError> {
    match raw.trim().parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(DomainError::validation(format!(
            "`{raw}` is not a valid post id"
        ))),
    }
}

/// Postgres `TEXT` cannot store NUL, so such input is rejected before any store call.
pub fn ensure_storable(field: &str, value: &str) -> Result<(), DomainError> {
    if value.contains('\0') {
        return Err(DomainError::validation(format!(
            "{field} must not contain NUL characters"
        )));
    }
    Ok(())
}

/// Trim tags, drop empty ones and remove duplicates while keeping first-seen order.
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut normalized = Vec::new();
    for tag in tags {
        let tag = tag.as_ref().trim();
        if tag.is_empty() {
            continue;
        }
        if seen.insert(tag.to_string()) {
            normalized.push(tag.to_string());
        }
    }
    normalized
}

impl PostDraft {
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        tags: Vec<String>,
    ) -> Result<Self, DomainError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(DomainError::validation("title must not be empty"));
        }
        let content = content.into();
        ensure_storable("title", &title)?;
        ensure_storable("content", &content)?;
        for tag in &tags {
            ensure_storable("tags", tag)?;
        }

        Ok(Self {
            title,
            content,
            tags: normalize_tags(tags),
        })
    }
}
