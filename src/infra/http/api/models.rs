//! Conversions between service types and the wire types in `postsync-api-types`.

pub use postsync_api_types::{
    PostView, PostWithRelatedView, PostWriteRequest, SearchDocumentView, TagQuery, TextQuery,
};

use crate::application::posts::PostWithRelated;
use crate::domain::entities::{PostDraft, PostRecord, SearchDocument};
use crate::domain::error::DomainError;

pub fn post_view(post: PostRecord) -> PostView {
    PostView {
        id: post.id,
        title: post.title,
        content: post.content,
        tags: post.tags,
        created_at: post.created_at,
    }
}

pub fn document_view(doc: SearchDocument) -> SearchDocumentView {
    SearchDocumentView {
        id: doc.id,
        title: doc.title,
        content: doc.content,
        tags: doc.tags,
    }
}

pub fn post_with_related_view(value: PostWithRelated) -> PostWithRelatedView {
    PostWithRelatedView {
        post: post_view(value.post),
        related: value.related.into_iter().map(document_view).collect(),
    }
}

pub fn draft_from_request(request: PostWriteRequest) -> Result<PostDraft, DomainError> {
    PostDraft::new(request.title, request.content, request.tags)
}
