use axum::extract::State;

use crate::api::Paginated;
use crate::database::models::{DepartmentCount, Employee, EmployeeWithTasks};
use crate::middleware::{ApiResponse, ApiResult, AuthUser, JsonBody, Message, PathParam, QueryParams};
use crate::services::employee_service::{EmployeeListQuery, EmployeePayload};
use crate::services::EmployeeService;
use crate::state::AppState;

/// GET /api/employees
pub async fn list(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<EmployeeListQuery>,
) -> ApiResult<Paginated<Employee>> {
    let page = EmployeeService::new(&state).select_any(query).await?;
    Ok(ApiResponse::success(page))
}

/// GET /api/employees/departments
pub async fn departments(State(state): State<AppState>) -> ApiResult<Vec<DepartmentCount>> {
    let departments = EmployeeService::new(&state).departments().await?;
    Ok(ApiResponse::success(departments))
}

/// GET /api/employees/:id
pub async fn show(State(state): State<AppState>, PathParam(id): PathParam<i64>) -> ApiResult<EmployeeWithTasks> {
    let employee = EmployeeService::new(&state).select_with_tasks(id).await?;
    Ok(ApiResponse::success(employee))
}

/// POST /api/employees
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    JsonBody(payload): JsonBody<EmployeePayload>,
) -> ApiResult<Employee> {
    let input = payload.into_new()?;
    let employee = EmployeeService::new(&state).create_one(input).await?;
    tracing::debug!("{} created employee {}", user.username, employee.id);
    Ok(ApiResponse::created(employee))
}

/// PUT /api/employees/:id
pub async fn update(
    State(state): State<AppState>,
    _user: AuthUser,
    PathParam(id): PathParam<i64>,
    JsonBody(payload): JsonBody<EmployeePayload>,
) -> ApiResult<Employee> {
    let changes = payload.into_changes()?;
    let employee = EmployeeService::new(&state).update_404(id, changes).await?;
    Ok(ApiResponse::success(employee))
}

/// DELETE /api/employees/:id
pub async fn delete(State(state): State<AppState>, _user: AuthUser, PathParam(id): PathParam<i64>) -> ApiResult<Message> {
    EmployeeService::new(&state).delete_404(id).await?;
    Ok(ApiResponse::success(Message::new("Employee deleted successfully")))
}
