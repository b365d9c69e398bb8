use axum::extract::State;
use chrono::Utc;

use crate::api::Paginated;
use crate::database::models::TaskWithEmployee;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, JsonBody, Message, PathParam, QueryParams};
use crate::services::task_service::{BulkStatusPayload, BulkStatusResult, TaskListQuery, TaskPayload, TaskStats};
use crate::services::TaskService;
use crate::state::AppState;

/// GET /api/tasks
pub async fn list(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<TaskListQuery>,
) -> ApiResult<Paginated<TaskWithEmployee>> {
    let page = TaskService::new(&state).select_any(query).await?;
    Ok(ApiResponse::success(page))
}

/// GET /api/tasks/stats
pub async fn stats(State(state): State<AppState>) -> ApiResult<TaskStats> {
    let stats = TaskService::new(&state).stats(Utc::now().date_naive()).await?;
    Ok(ApiResponse::success(stats))
}

/// GET /api/tasks/:id
pub async fn show(State(state): State<AppState>, PathParam(id): PathParam<i64>) -> ApiResult<TaskWithEmployee> {
    let task = TaskService::new(&state).select_404(id).await?;
    Ok(ApiResponse::success(task))
}

/// POST /api/tasks
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    JsonBody(payload): JsonBody<TaskPayload>,
) -> ApiResult<TaskWithEmployee> {
    let input = payload.into_new()?;
    let task = TaskService::new(&state).create_one(input, user.id).await?;
    Ok(ApiResponse::created(task))
}

/// PUT /api/tasks/:id
pub async fn update(
    State(state): State<AppState>,
    _user: AuthUser,
    PathParam(id): PathParam<i64>,
    JsonBody(payload): JsonBody<TaskPayload>,
) -> ApiResult<TaskWithEmployee> {
    let changes = payload.into_changes()?;
    let task = TaskService::new(&state).update_404(id, changes).await?;
    Ok(ApiResponse::success(task))
}

/// DELETE /api/tasks/:id
pub async fn delete(State(state): State<AppState>, _user: AuthUser, PathParam(id): PathParam<i64>) -> ApiResult<Message> {
    TaskService::new(&state).delete_404(id).await?;
    Ok(ApiResponse::success(Message::new("Task deleted successfully")))
}

/// PATCH /api/tasks/bulk/status
pub async fn bulk_status(
    State(state): State<AppState>,
    user: AuthUser,
    JsonBody(payload): JsonBody<BulkStatusPayload>,
) -> ApiResult<BulkStatusResult> {
    let result = TaskService::new(&state).update_status_bulk(payload).await?;
    tracing::debug!("{} ran bulk status update", user.username);
    Ok(ApiResponse::success(result))
}
