//! Post handlers.

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::domain::posts::parse_post_id;
use crate::infra::http::db_health_response;

use super::error::{ApiError, domain_to_api, posts_to_api};
use super::models::*;
use super::state::ApiState;

fn read_body(
    payload: Result<Json<PostWriteRequest>, JsonRejection>,
) -> Result<PostWriteRequest, ApiError> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        ApiError::bad_request("Invalid request body", Some(rejection.body_text()))
    })
}

fn read_query<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, ApiError> {
    query.map(|Query(params)| params).map_err(|rejection| {
        ApiError::bad_request("Invalid query string", Some(rejection.body_text()))
    })
}

pub async fn create_post(
    State(state): State<ApiState>,
    payload: Result<Json<PostWriteRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let draft = draft_from_request(read_body(payload)?).map_err(domain_to_api)?;
    let post = state.posts.create_post(draft).await.map_err(posts_to_api)?;
    Ok((StatusCode::CREATED, Json(post_view(post))))
}

pub async fn get_post(
    State(state): State<ApiState>,
    Path(raw_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_post_id(&raw_id).map_err(domain_to_api)?;
    let found = state.posts.get_post(id).await.map_err(posts_to_api)?;
    Ok(Json(post_with_related_view(found)))
}

pub async fn update_post(
    State(state): State<ApiState>,
    Path(raw_id): Path<String>,
    payload: Result<Json<PostWriteRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_post_id(&raw_id).map_err(domain_to_api)?;
    let draft = draft_from_request(read_body(payload)?).map_err(domain_to_api)?;
    state
        .posts
        .update_post(id, draft)
        .await
        .map_err(posts_to_api)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn search_by_tag(
    State(state): State<ApiState>,
    query: Result<Query<TagQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let tag = read_query(query)?.tag.unwrap_or_default();
    let posts = state
        .posts
        .search_by_tag(&tag)
        .await
        .map_err(posts_to_api)?;
    Ok(Json(posts.into_iter().map(post_view).collect::<Vec<_>>()))
}

pub async fn search_text(
    State(state): State<ApiState>,
    query: Result<Query<TextQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let q = read_query(query)?.q.unwrap_or_default();
    let documents = state.posts.search_text(&q).await.map_err(posts_to_api)?;
    Ok(Json(
        documents.into_iter().map(document_view).collect::<Vec<_>>(),
    ))
}

pub async fn db_health(State(state): State<ApiState>) -> Response {
    db_health_response(state.db.health_check().await)
}

pub async fn not_found() -> ApiError {
    ApiError::not_found("No such route")
}
