use chrono::NaiveDate;
use serde::Serialize;
use sqlx::SqlitePool;

use crate::database::models::{DepartmentCount, EmployeePerformance, PriorityCount, RecentEmployee, TaskSummary};
use crate::error::ApiError;
use crate::state::AppState;

const RECENT_LIMIT: i64 = 5;
const PERFORMANCE_LIMIT: i64 = 10;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub employees: EmployeeTotals,
    pub tasks: TaskTotals,
    pub recent_activity: RecentActivity,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeTotals {
    pub total: i64,
    pub active: i64,
    pub by_department: Vec<DepartmentCount>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskTotals {
    pub total: i64,
    pub pending: i64,
    pub in_progress: i64,
    pub completed: i64,
    pub overdue: i64,
    pub by_priority: Vec<PriorityCount>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentActivity {
    pub recent_employees: Vec<RecentEmployee>,
    pub recent_tasks: Vec<TaskSummary>,
    pub upcoming_deadlines: Vec<TaskSummary>,
}

pub struct DashboardService {
    pool: SqlitePool,
}

impl DashboardService {
    pub fn new(state: &AppState) -> Self {
        Self { pool: state.db.clone() }
    }

    /// Headline counts and recent activity. Reads share one transaction so
    /// the numbers agree with each other.
    pub async fn stats(&self, today: NaiveDate) -> Result<DashboardStats, ApiError> {
        let mut tx = self.pool.begin().await?;

        let (total_employees, active_employees): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), COALESCE(SUM(CASE WHEN status = 'active' THEN 1 ELSE 0 END), 0) FROM employees",
        )
        .fetch_one(&mut *tx)
        .await?;

        let by_department = sqlx::query_as(
            "SELECT department, COUNT(*) AS count FROM employees GROUP BY department ORDER BY count DESC, department ASC",
        )
        .fetch_all(&mut *tx)
        .await?;

        let (total, pending, in_progress, completed, overdue): (i64, i64, i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COUNT(*),
                COALESCE(SUM(CASE WHEN status = 'pending' THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN status = 'in_progress' THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN status = 'completed' THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN due_date < ? AND status != 'completed' THEN 1 ELSE 0 END), 0)
            FROM tasks
            "#,
        )
        .bind(today)
        .fetch_one(&mut *tx)
        .await?;

        let by_priority =
            sqlx::query_as("SELECT priority, COUNT(*) AS count FROM tasks GROUP BY priority ORDER BY priority")
                .fetch_all(&mut *tx)
                .await?;

        let recent_employees = sqlx::query_as(
            r#"
            SELECT id, first_name, last_name, department, position, created_at
            FROM employees
            ORDER BY created_at DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(RECENT_LIMIT)
        .fetch_all(&mut *tx)
        .await?;

        let recent_tasks = sqlx::query_as(
            r#"
            SELECT t.id, t.title, t.status, t.priority, t.due_date, t.created_at,
                e.first_name AS employee_first_name, e.last_name AS employee_last_name
            FROM tasks t
            LEFT JOIN employees e ON t.employee_id = e.id
            ORDER BY t.created_at DESC, t.id DESC
            LIMIT ?
            "#,
        )
        .bind(RECENT_LIMIT)
        .fetch_all(&mut *tx)
        .await?;

        let upcoming_deadlines = sqlx::query_as(
            r#"
            SELECT t.id, t.title, t.status, t.priority, t.due_date, t.created_at,
                e.first_name AS employee_first_name, e.last_name AS employee_last_name
            FROM tasks t
            LEFT JOIN employees e ON t.employee_id = e.id
            WHERE t.due_date >= ? AND t.status != 'completed'
            ORDER BY t.due_date ASC, t.id ASC
            LIMIT ?
            "#,
        )
        .bind(today)
        .bind(RECENT_LIMIT)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(DashboardStats {
            employees: EmployeeTotals {
                total: total_employees,
                active: active_employees,
                by_department,
            },
            tasks: TaskTotals {
                total,
                pending,
                in_progress,
                completed,
                overdue,
                by_priority,
            },
            recent_activity: RecentActivity {
                recent_employees,
                recent_tasks,
                upcoming_deadlines,
            },
        })
    }

    /// Task counts per employee, most completed first
    pub async fn performance(&self) -> Result<Vec<EmployeePerformance>, ApiError> {
        let rows = sqlx::query_as(
            r#"
            SELECT
                e.id,
                e.first_name,
                e.last_name,
                e.department,
                COUNT(t.id) AS total_tasks,
                COALESCE(SUM(CASE WHEN t.status = 'completed' THEN 1 ELSE 0 END), 0) AS completed_tasks,
                COALESCE(SUM(CASE WHEN t.status = 'in_progress' THEN 1 ELSE 0 END), 0) AS in_progress_tasks,
                COALESCE(SUM(CASE WHEN t.status = 'pending' THEN 1 ELSE 0 END), 0) AS pending_tasks
            FROM employees e
            LEFT JOIN tasks t ON e.id = t.employee_id
            GROUP BY e.id
            ORDER BY completed_tasks DESC, e.id ASC
            LIMIT ?
            "#,
        )
        .bind(PERFORMANCE_LIMIT)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
