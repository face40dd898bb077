use axum::Json;
use serde::Serialize;

#[derive(Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
}

/// Handler for `GET /healthz` — liveness probe.
pub async fn healthz() -> Json<HealthStatus> {
    Json(HealthStatus { status: "ok" })
}

/// Handler for `GET /readyz` — readiness probe. The service accepts
/// traffic as soon as it is up; database failures surface per request.
pub async fn readyz() -> Json<HealthStatus> {
    Json(HealthStatus { status: "ok" })
}
