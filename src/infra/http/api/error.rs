use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use postsync_api_types::{ApiErrorBody, ApiErrorMessage};

use crate::application::error::ErrorReport;
use crate::application::posts::PostServiceError;
use crate::application::repos::RepoError;
use crate::domain::error::DomainError;

pub mod codes {
    pub const BAD_REQUEST: &str = "bad_request";
    pub const NOT_FOUND: &str = "not_found";
    pub const INVALID_INPUT: &str = "invalid_input";
    pub const INTEGRITY: &str = "integrity_error";
    pub const DB_TIMEOUT: &str = "db_timeout";
    pub const REPO: &str = "repo_error";
    pub const INDEX_UNAVAILABLE: &str = "index_unavailable";
    pub const TIMEOUT: &str = "timeout";
}

/// JSON error response. `hint` reaches the client; `detail` only reaches the logs.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: &'static str,
    hint: Option<String>,
    detail: Option<String>,
}

impl ApiError {
    pub fn new(
        status: StatusCode,
        code: &'static str,
        message: &'static str,
        hint: Option<String>,
    ) -> Self {
        Self {
            status,
            code,
            message,
            hint,
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn bad_request(message: &'static str, hint: Option<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, codes::BAD_REQUEST, message, hint)
    }

    pub fn not_found(message: &'static str) -> Self {
        Self::new(StatusCode::NOT_FOUND, codes::NOT_FOUND, message, None)
    }

    pub fn timeout() -> Self {
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            codes::TIMEOUT,
            "Request deadline exceeded",
            None,
        )
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn code(&self) -> &'static str {
        self.code
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let diagnostic = self
            .detail
            .as_deref()
            .or(self.hint.as_deref())
            .unwrap_or(self.message);
        let report = ErrorReport::from_message(
            "infra::http::api",
            self.status,
            format!("{}: {diagnostic}", self.code),
        );

        let hint = if self.status.is_client_error() {
            self.hint
        } else {
            None
        };
        let body = ApiErrorBody {
            error: ApiErrorMessage {
                code: self.code.to_string(),
                message: self.message.to_string(),
                hint,
            },
        };
        let mut response = (self.status, Json(body)).into_response();
        report.attach(&mut response);
        response
    }
}

pub(crate) fn domain_to_api(err: DomainError) -> ApiError {
    match err {
        DomainError::Validation { message } => {
            ApiError::bad_request("Invalid request", Some(message))
        }
    }
}

pub(crate) fn repo_to_api(err: RepoError) -> ApiError {
    match err {
        RepoError::NotFound => ApiError::not_found("Resource not found"),
        RepoError::InvalidInput { message } => ApiError::new(
            StatusCode::BAD_REQUEST,
            codes::INVALID_INPUT,
            "Invalid input",
            Some("the record store rejected a field value".into()),
        )
        .with_detail(message),
        RepoError::Integrity { message } => ApiError::new(
            StatusCode::CONFLICT,
            codes::INTEGRITY,
            "Integrity constraint violated",
            Some("the request conflicts with stored data".into()),
        )
        .with_detail(message),
        RepoError::Timeout => ApiError::new(
            StatusCode::SERVICE_UNAVAILABLE,
            codes::DB_TIMEOUT,
            "Database timeout",
            None,
        ),
        RepoError::Persistence(message) => ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            codes::REPO,
            "Persistence error",
            None,
        )
        .with_detail(message),
    }
}

pub(crate) fn posts_to_api(err: PostServiceError) -> ApiError {
    match err {
        PostServiceError::Domain(domain) => domain_to_api(domain),
        PostServiceError::NotFound(id) => {
            ApiError::not_found("Post not found").with_detail(format!("post {id} not found"))
        }
        PostServiceError::Repo(repo) => repo_to_api(repo),
        PostServiceError::IndexWrite { post_id, source } => ApiError::new(
            StatusCode::BAD_GATEWAY,
            codes::INDEX_UNAVAILABLE,
            "Post stored but could not be indexed",
            None,
        )
        .with_detail(format!("post {post_id}: {source}")),
        PostServiceError::Search(source) => ApiError::new(
            StatusCode::BAD_GATEWAY,
            codes::INDEX_UNAVAILABLE,
            "Search is unavailable",
            None,
        )
        .with_detail(source.to_string()),
    }
}
