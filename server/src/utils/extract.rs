//! Body extractors whose rejections use the JSON error shape.
//!
//! `ApiJson` and `ApiMultipart` wrap axum's `Json` and `Multipart` and turn
//! their rejections into [`AppError`]s. An oversized body stays a 413, and
//! every other malformed body is a 400.

use axum::async_trait;
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Multipart, Request};
use axum::http::StatusCode;
use axum::Json;
use serde::de::DeserializeOwned;

use crate::utils::error::AppError;

#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection: JsonRejection| {
                rejected(rejection.status(), rejection.body_text())
            })?;
        Ok(ApiJson(value))
    }
}

pub struct ApiMultipart(pub Multipart);

#[async_trait]
impl<S> FromRequest<S> for ApiMultipart
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        Multipart::from_request(req, state)
            .await
            .map(ApiMultipart)
            .map_err(|rejection: MultipartRejection| {
                rejected(rejection.status(), rejection.body_text())
            })
    }
}

/// Failure while reading a field of an accepted multipart body.
pub fn multipart_error(e: MultipartError) -> AppError {
    rejected(e.status(), format!("Invalid form data: {}", e.body_text()))
}

fn rejected(status: StatusCode, message: String) -> AppError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(message)
    } else {
        AppError::ValidationError(message)
    }
}
