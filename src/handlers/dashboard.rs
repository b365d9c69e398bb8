use axum::extract::State;
use chrono::Utc;

use crate::database::models::EmployeePerformance;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::dashboard_service::DashboardStats;
use crate::services::DashboardService;
use crate::state::AppState;

/// GET /api/dashboard/stats
pub async fn stats(State(state): State<AppState>) -> ApiResult<DashboardStats> {
    let stats = DashboardService::new(&state).stats(Utc::now().date_naive()).await?;
    Ok(ApiResponse::success(stats))
}

/// GET /api/dashboard/performance
pub async fn performance(State(state): State<AppState>) -> ApiResult<Vec<EmployeePerformance>> {
    let rows = DashboardService::new(&state).performance().await?;
    Ok(ApiResponse::success(rows))
}
