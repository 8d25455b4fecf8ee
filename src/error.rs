use axum::response::{IntoResponse, Response};
use http::StatusCode;

#[derive(Debug)]
pub enum AppError {
    AlreadyRecording,
    NotRecording,
    ResourceNotFound,
    MissingPayload,
    MalformedPayload(String),
    SpawnFailure(String),
    ProcessError(String),
    DatabaseError(String),
    InternalServerError(anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::AlreadyRecording => (
                StatusCode::CONFLICT,
                "recording already in progress".to_string(),
            )
                .into_response(),
            AppError::NotRecording => {
                (StatusCode::BAD_REQUEST, "no recording active".to_string()).into_response()
            }
            AppError::ResourceNotFound => {
                (StatusCode::NOT_FOUND, "data not found".to_string()).into_response()
            }
            AppError::MissingPayload => {
                (StatusCode::BAD_REQUEST, "binary data is required".to_string()).into_response()
            }
            AppError::MalformedPayload(msg) => (
                StatusCode::BAD_REQUEST,
                format!("malformed payload: {msg}"),
            )
                .into_response(),
            AppError::SpawnFailure(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("decoder failed to start: {msg}"),
            )
                .into_response(),
            AppError::ProcessError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("decoder process error: {msg}"),
            )
                .into_response(),
            AppError::DatabaseError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("database error: {msg}"),
            )
                .into_response(),
            AppError::InternalServerError(err) => {
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
            }
        }
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        AppError::InternalServerError(err.into())
    }
}
