use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct MessageBody {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub fn ok<T>(data: T) -> Response
where
    T: Serialize,
{
    (StatusCode::OK, Json(data)).into_response()
}

pub fn created<T>(data: T) -> Response
where
    T: Serialize,
{
    (StatusCode::CREATED, Json(data)).into_response()
}

pub fn message(message: impl Into<String>) -> Response {
    let body = MessageBody {
        message: message.into(),
    };
    (StatusCode::OK, Json(body)).into_response()
}

pub fn error(message: impl Into<String>, cause: Option<String>, status: StatusCode) -> Response {
    let body = ApiErrorBody {
        message: message.into(),
        error: cause,
    };

    (status, Json(body)).into_response()
}
