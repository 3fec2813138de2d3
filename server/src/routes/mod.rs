use std::any::Any;

use axum::extract::DefaultBodyLimit;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::{create_cors_layer, create_security_headers_layer, Config};
use crate::handlers::{auth, events, health_check};
use crate::state::AppState;
use crate::uploads::PUBLIC_PREFIX;
use crate::utils::error::AppError;

/// API routes, nested under `/api`.
///
/// ```text
/// GET    /events                list_events
/// POST   /events                create_event      (bearer)
/// GET    /events/search/:query  search_events
/// GET    /events/:id            get_event
/// PUT    /events/:id            update_event      (bearer, creator only)
/// DELETE /events/:id            delete_event      (bearer, creator only)
/// GET    /categories            list_categories
/// POST   /auth/register         register
/// POST   /auth/login            login
/// GET    /auth/me               me                (bearer)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/events", get(events::list_events).post(events::create_event))
        .route("/events/search/:query", get(events::search_events))
        .route(
            "/events/:id",
            get(events::get_event)
                .put(events::update_event)
                .delete(events::delete_event),
        )
        .route("/categories", get(events::list_categories))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::me))
}

pub fn create_routes(state: AppState, config: &Config) -> Router {
    let uploads = ServeDir::new(state.images.dir());

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes())
        .nest_service(&format!("/{PUBLIC_PREFIX}"), uploads)
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(create_security_headers_layer(config.production))
        .layer(create_cors_layer(&config.cors_allowed_origins))
        .with_state(state)
}

fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "handler panicked".to_string()
    };

    AppError::InternalServerError(detail).into_response()
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::header::CONTENT_TYPE;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use super::*;

    async fn json_body(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_panic_payload_becomes_json_500() {
        let response = handle_panic(Box::new("boom"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let json = json_body(response).await;
        assert_eq!(json["message"], "Internal server error");
        assert_eq!(json["error"], "boom");
    }

    #[tokio::test]
    async fn test_formatted_panic_message_is_kept() {
        let response = handle_panic(Box::new(format!("index {} out of range", 3)));
        let json = json_body(response).await;
        assert_eq!(json["error"], "index 3 out of range");
    }

    #[tokio::test]
    async fn test_panicking_handler_is_caught() {
        async fn explode() -> &'static str {
            panic!("handler exploded")
        }

        let app = Router::new()
            .route("/explode", get(explode))
            .layer(CatchPanicLayer::custom(handle_panic));

        let response = app
            .oneshot(Request::builder().uri("/explode").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.headers().get(CONTENT_TYPE).unwrap(),
            "application/json"
        );
        let json = json_body(response).await;
        assert_eq!(json["message"], "Internal server error");
        assert_eq!(json["error"], "handler exploded");
    }
}
