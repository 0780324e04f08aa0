use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Failure to obtain an answer from the locality directory.
///
/// Distinct from a failed verification, which is a normal result.
#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("locality directory unreachable: {0}")]
    Unreachable(#[source] reqwest::Error),

    #[error("locality directory responded with status {0}")]
    Status(reqwest::StatusCode),

    #[error("malformed locality directory payload: {0}")]
    Payload(#[source] reqwest::Error),
}

#[derive(Error, Debug)]
pub enum ActivityLogError {
    #[error("activity log unreachable: {0}")]
    Unreachable(#[from] reqwest::Error),

    #[error("activity log rejected the request ({status}): {body}")]
    Rejected { status: reqwest::StatusCode, body: String },

    #[error("malformed activity log search payload: {0}")]
    Payload(#[source] reqwest::Error),
}

/// Errors surfaced by the `/api/graphql` route, rendered as a GraphQL style
/// `{"errors": [{"message": ..}]}` envelope.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Failed to verify address")]
    VerifyUpstream(#[source] DirectoryError),

    #[error("Upstream error")]
    SearchUpstream(#[source] DirectoryError),

    #[error("Unknown query")]
    UnknownQuery,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::VerifyUpstream(_) | AppError::SearchUpstream(_) => StatusCode::BAD_GATEWAY,
            AppError::UnknownQuery => StatusCode::BAD_REQUEST,
        };

        (status, Json(json!({ "errors": [{ "message": self.to_string() }] }))).into_response()
    }
}
