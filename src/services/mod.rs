pub mod auth_service;
pub mod dashboard_service;
pub mod employee_service;
pub mod task_service;

pub use auth_service::AuthService;
pub use dashboard_service::DashboardService;
pub use employee_service::EmployeeService;
pub use task_service::TaskService;

use crate::error::ApiError;

/// Map a UNIQUE constraint failure to a conflict; anything else stays a database error
pub(crate) fn conflict_on_unique(err: sqlx::Error, message: &str) -> ApiError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => ApiError::conflict(message),
        _ => err.into(),
    }
}
