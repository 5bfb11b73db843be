// HTTP request handlers
use crate::application::dashboard_service::UserInput;
use crate::presentation::app_state::AppState;
use crate::presentation::published_view::PublishedView;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/view", get(current_view))
        .route("/panel/:index", post(select_panel))
        .route("/gesture", post(submit_gesture))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Latest painted fields, panel position and live charts
pub async fn current_view(State(state): State<Arc<AppState>>) -> Json<PublishedView> {
    Json(state.view.borrow().clone())
}

/// Panel button click
pub async fn select_panel(
    Path(index): Path<i64>,
    State(state): State<Arc<AppState>>,
) -> StatusCode {
    forward(&state, UserInput::Click { index }).await
}

/// Pointer gesture from the slider surface
pub async fn submit_gesture(
    State(state): State<Arc<AppState>>,
    Json(input): Json<UserInput>,
) -> StatusCode {
    forward(&state, input).await
}

async fn forward(state: &AppState, input: UserInput) -> StatusCode {
    match state.inputs.send(input).await {
        Ok(()) => StatusCode::ACCEPTED,
        Err(e) => {
            tracing::warn!("Dashboard loop is gone, dropping {:?}", e.0);
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::renderer::{Field, Renderer};
    use crate::presentation::published_view;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tokio::sync::mpsc;
    use tower::ServiceExt;

    fn app() -> (Router, mpsc::Receiver<UserInput>, published_view::ViewPublisher) {
        let (publisher, _registry, view) = published_view::channel();
        let (inputs, rx) = mpsc::channel(8);
        let state = Arc::new(AppState { view, inputs });
        (router(state), rx, publisher)
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let (app, _rx, _publisher) = app();
        let request = Request::builder().uri("/healthz").body(Body::empty()).unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_view_endpoint() {
        let (app, _rx, mut publisher) = app();
        publisher.set_text(Field::TimeLabel, "System idle");

        let request = Request::builder().uri("/view").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["fields"]["timeLabel"], "System idle");
    }

    #[tokio::test]
    async fn test_panel_click_is_forwarded() {
        let (app, mut rx, _publisher) = app();
        let request = Request::builder()
            .uri("/panel/-3")
            .method("POST")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert_eq!(rx.recv().await, Some(UserInput::Click { index: -3 }));
    }

    #[tokio::test]
    async fn test_gesture_is_forwarded() {
        let (app, mut rx, _publisher) = app();
        let request = Request::builder()
            .uri("/gesture")
            .method("POST")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"kind":"move","x":-210.0}"#))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert_eq!(rx.recv().await, Some(UserInput::Move { x: -210.0 }));
    }

    #[tokio::test]
    async fn test_closed_loop_returns_unavailable() {
        let (app, rx, _publisher) = app();
        drop(rx);
        let request = Request::builder()
            .uri("/panel/1")
            .method("POST")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
