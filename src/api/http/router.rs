// src/api/http/router.rs
// HTTP router composition for the REST API

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use super::{
    chat::rest_chat_handler,
    handlers::{fallback_handler, health_handler, test_message_handler},
    memory::memory_lane_handler,
    music::spotify_handler,
    voice::voice_to_text_handler,
};
use crate::state::AppState;

/// Routes mounted under `/api`.
pub fn http_router(app_state: &AppState) -> Router<Arc<AppState>> {
    let upload_limit = app_state.config.max_upload_bytes;

    let mut router = Router::new()
        // Health
        .route("/health", get(health_handler))

        // Modes
        .route("/chat", post(rest_chat_handler))
        .route("/memory-lane", post(memory_lane_handler))
        .route("/spotify", post(spotify_handler))

        // Voice upload
        .route(
            "/voice-to-text",
            post(voice_to_text_handler).layer(DefaultBodyLimit::max(upload_limit)),
        );

    if app_state.config.debug_endpoints {
        router = router.route("/test-message", post(test_message_handler));
    }

    router
}

fn cors_layer(origin: &str) -> CorsLayer {
    let allow_origin = if origin == "*" {
        AllowOrigin::from(Any)
    } else {
        match HeaderValue::from_str(origin) {
            Ok(value) => AllowOrigin::exact(value),
            Err(_) => {
                warn!(origin, "Invalid CORS origin, allowing any");
                AllowOrigin::from(Any)
            }
        }
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

/// Create the application router with all endpoints
pub fn create_router(app_state: AppState) -> Router {
    let cors = cors_layer(&app_state.config.cors_origin);
    let api = http_router(&app_state);

    Router::new()
        .nest("/api", api)
        .fallback(fallback_handler)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(Arc::new(app_state))
}
