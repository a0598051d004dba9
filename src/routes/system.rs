//! Liveness and readiness probes.

use axum::{response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use utoipa::openapi::OpenApi as OpenApiDoc;
use utoipa::{OpenApi, ToSchema};

use super::{Route, RouteCollection};

/// Service name reported by the status endpoint.
pub const SERVICE_NAME: &str = "visionvani-backend";

/// Health check response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({"status": "ok"}))]
pub struct HealthResponse {
    /// Status: "ok".
    pub status: String,
}

/// Status response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({"service": "visionvani-backend", "ready": true}))]
pub struct StatusResponse {
    /// Service name.
    pub service: String,
    /// Whether the service is ready to take traffic.
    pub ready: bool,
}

/// Simple liveness probe - always returns 200.
#[utoipa::path(
    get,
    path = "/health",
    tag = "system",
    responses((status = 200, description = "Service is alive", body = HealthResponse))
)]
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Readiness and metadata probe.
// TODO: report not-ready once the service has dependencies worth checking.
#[utoipa::path(
    get,
    path = "/status",
    tag = "system",
    responses((status = 200, description = "Service status", body = StatusResponse))
)]
pub async fn status() -> impl IntoResponse {
    Json(StatusResponse {
        service: SERVICE_NAME.to_string(),
        ready: true,
    })
}

#[derive(OpenApi)]
#[openapi(
    paths(health, status),
    components(schemas(HealthResponse, StatusResponse)),
    tags((name = "system", description = "Liveness and readiness probes"))
)]
struct SystemApi;

/// The `system` route collection: `/health` and `/status`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRoutes;

impl RouteCollection for SystemRoutes {
    fn name(&self) -> &'static str {
        "system"
    }

    fn routes(&self) -> Vec<Route> {
        vec![Route::get("/health", health), Route::get("/status", status)]
    }

    fn openapi(&self) -> OpenApiDoc {
        SystemApi::openapi()
    }
}
