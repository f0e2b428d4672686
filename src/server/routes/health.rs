//! Health check and service banner

use axum::Json;

use crate::server::types::{HealthResponse, ServiceInfo};

/// GET /
pub async fn service_info() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        message: "Smart Goal Breaker API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        endpoints: serde_json::json!({
            "create_goal": "POST /api/goals",
            "list_goals": "GET /api/goals",
            "get_goal": "GET /api/goals/{goal_id}",
            "delete_goal": "DELETE /api/goals/{goal_id}"
        }),
    })
}

/// GET /api/health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
