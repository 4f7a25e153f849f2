//! HTTP layer: health endpoint, landing page, static assets, API docs.

pub mod handlers;
pub mod openapi;

use axum::Router;
use tower_http::services::{ServeDir, ServeFile};

use crate::app_state::AppState;
use crate::config::RelayConfig;

/// Builds the HTTP router.
///
/// `GET /` serves the landing page, `/health` reports liveness, and every
/// other path falls through to the static asset directory.
pub fn build_router(config: &RelayConfig) -> Router<AppState> {
    Router::new()
        .merge(handlers::routes())
        .merge(docs_router())
        .route_service("/", ServeFile::new(&config.index_file))
        .fallback_service(ServeDir::new(&config.static_dir))
}

#[cfg(feature = "swagger-ui")]
fn docs_router() -> Router<AppState> {
    use utoipa::OpenApi;
    use utoipa_swagger_ui::SwaggerUi;

    Router::new().merge(
        SwaggerUi::new("/swagger-ui").url(openapi::OPENAPI_PATH, openapi::ApiDoc::openapi()),
    )
}

#[cfg(not(feature = "swagger-ui"))]
fn docs_router() -> Router<AppState> {
    use axum::Json;
    use axum::routing::get;
    use utoipa::OpenApi;

    Router::new().route(
        openapi::OPENAPI_PATH,
        get(|| async { Json(openapi::ApiDoc::openapi()) }),
    )
}
