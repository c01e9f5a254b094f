use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::{delete, get, patch, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use super::handlers;
use crate::config::HttpConfig;
use crate::AppState;

/// Room for multipart boundaries and part headers on top of the file itself,
/// so a file just over the limit is reported by the upload handler.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub fn create_router(state: Arc<AppState>) -> Router {
    let upload_limit = (state.config.max_upload_size as usize).saturating_add(MULTIPART_OVERHEAD);

    let mut router = Router::new()
        // Files
        .route("/files", get(handlers::list_files))
        .route(
            "/upload",
            post(handlers::upload_file).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/file/:name", delete(handlers::delete_file))
        .route("/file/:name", patch(handlers::set_rendered))
        // Internal
        .route("/_internal/health", get(handlers::health));

    if state.config.http.serve_static {
        router = router.fallback_service(ServeDir::new(&state.config.http.public_dir));
    }

    router
        .layer(cors_layer(&state.config.http))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(config: &HttpConfig) -> CorsLayer {
    let origin = match config.cors_allow_origin.as_str() {
        "*" => AllowOrigin::any(),
        value => match HeaderValue::from_str(value) {
            Ok(value) => AllowOrigin::exact(value),
            Err(_) => {
                tracing::warn!(origin = %value, "Unusable CORS origin, cross-origin requests will be refused");
                AllowOrigin::list(Vec::<HeaderValue>::new())
            }
        },
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE])
}
