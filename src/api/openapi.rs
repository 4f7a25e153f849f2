//! OpenAPI document for the HTTP surface.

use utoipa::OpenApi;

use crate::api::handlers::system;
use crate::service::HealthReport;

/// Path at which the OpenAPI JSON document is served.
pub const OPENAPI_PATH: &str = "/api-docs/openapi.json";

/// OpenAPI description of the relay's HTTP endpoints.
#[derive(Debug, OpenApi)]
#[openapi(
    info(title = "fanout-relay", description = "WebSocket fan-out relay"),
    paths(system::health_handler),
    components(schemas(HealthReport)),
    tags((name = "System", description = "Liveness and diagnostics"))
)]
pub struct ApiDoc;
