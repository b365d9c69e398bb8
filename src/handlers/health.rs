use axum::{extract::State, http::StatusCode, response::Json};
use chrono::Utc;
use serde_json::{json, Value};

use crate::database::manager;
use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let timestamp = Utc::now().to_rfc3339();

    match manager::health_check(&state.db).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "status": "OK", "timestamp": timestamp, "database": "connected" })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "DEGRADED", "timestamp": timestamp, "database": "unavailable" })),
            )
        }
    }
}

/// GET /
pub async fn root() -> Json<Value> {
    Json(json!({
        "name": "Workforce API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Employee and task management backend",
        "endpoints": {
            "health": "/api/health (public)",
            "auth": "/api/auth/register, /api/auth/login (public), /api/auth/me (protected)",
            "employees": "/api/employees[/:id], /api/employees/departments (reads public, writes protected)",
            "tasks": "/api/tasks[/:id], /api/tasks/stats, /api/tasks/bulk/status (reads public, writes protected)",
            "dashboard": "/api/dashboard/stats, /api/dashboard/performance (public)"
        }
    }))
}

pub async fn not_found() -> ApiError {
    ApiError::not_found("Route not found")
}
