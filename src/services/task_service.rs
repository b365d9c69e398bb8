use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::api::{PageRequest, Paginated};
use crate::config::AppConfig;
use crate::database::models::{NewTask, PriorityCount, StatusCount, TaskChanges, TaskSortField, TaskWithEmployee};
use crate::database::QueryBuilder;
use crate::error::ApiError;
use crate::filter::{Filter, FilterOrder, FilterWhere};
use crate::state::AppState;
use crate::types::{double_option, NumberOrText, TaskPriority, TaskStatus};
use crate::validation::{non_blank, Validator};

const TASK_SELECT: &str = "t.*, e.first_name AS employee_first_name, e.last_name AS employee_last_name, \
     e.email AS employee_email, e.department AS employee_department";
const TASK_FROM: &str = "tasks t LEFT JOIN employees e ON t.employee_id = e.id";

/// Raw `GET /api/tasks` query string
#[derive(Debug, Default, Deserialize)]
pub struct TaskListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub employee_id: Option<String>,
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
    #[serde(rename = "sortOrder")]
    pub sort_order: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TaskPayload {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub due_date: Option<String>,
    /// Absent keeps the assignee, `null` clears it
    #[serde(default, deserialize_with = "double_option")]
    pub employee_id: Option<Option<NumberOrText>>,
}

impl TaskPayload {
    pub fn into_new(self) -> Result<NewTask, ApiError> {
        let mut v = Validator::new();
        let title = v.required_text("title", self.title.as_deref());
        let status = v.optional_enum::<TaskStatus>("status", non_blank(self.status.as_deref()));
        let priority = v.optional_enum::<TaskPriority>("priority", non_blank(self.priority.as_deref()));
        let due_date = v.optional_date("due_date", non_blank(self.due_date.as_deref()));
        let employee_id = v.optional_id("employee_id", self.employee_id.flatten());

        match title {
            Some(title) if v.is_ok() => Ok(NewTask {
                title,
                description: non_blank(self.description.as_deref()).map(str::to_string),
                status: status.unwrap_or_default(),
                priority: priority.unwrap_or_default(),
                due_date,
                employee_id,
            }),
            _ => Err(v.into_error()),
        }
    }

    pub fn into_changes(self) -> Result<TaskChanges, ApiError> {
        let mut v = Validator::new();
        let changes = TaskChanges {
            title: v.optional_text("title", self.title.as_deref()),
            description: non_blank(self.description.as_deref()).map(str::to_string),
            status: v.optional_enum("status", non_blank(self.status.as_deref())),
            priority: v.optional_enum("priority", non_blank(self.priority.as_deref())),
            due_date: v.optional_date("due_date", non_blank(self.due_date.as_deref())),
            employee_id: match self.employee_id {
                // Blank form text is treated like an omitted field
                Some(Some(NumberOrText::Text(text))) if text.trim().is_empty() => None,
                Some(raw) => Some(v.optional_id("employee_id", raw)),
                None => None,
            },
        };
        v.finish()?;
        Ok(changes)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct BulkStatusPayload {
    #[serde(rename = "taskIds")]
    pub task_ids: Option<Vec<i64>>,
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BulkStatusResult {
    pub message: String,
    pub updated: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CountOnly {
    pub count: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStats {
    pub by_status: Vec<StatusCount>,
    pub by_priority: Vec<PriorityCount>,
    pub overdue: CountOnly,
    pub due_this_week: CountOnly,
}

pub struct TaskService {
    pool: SqlitePool,
    config: Arc<AppConfig>,
}

impl TaskService {
    pub fn new(state: &AppState) -> Self {
        Self {
            pool: state.db.clone(),
            config: state.config.clone(),
        }
    }

    /// Filtered, sorted page of tasks joined with their assignee
    pub async fn select_any(&self, query: TaskListQuery) -> Result<Paginated<TaskWithEmployee>, ApiError> {
        let page = PageRequest::parse(query.page.as_deref(), query.limit.as_deref(), &self.config.api)?;

        let mut v = Validator::new();
        let status = v.optional_enum::<TaskStatus>("status", non_blank(query.status.as_deref()));
        let priority = v.optional_enum::<TaskPriority>("priority", non_blank(query.priority.as_deref()));
        let employee_id = match non_blank(query.employee_id.as_deref()) {
            None => None,
            Some(raw) => match raw.parse::<i64>() {
                Ok(id) => Some(id),
                Err(_) => {
                    v.push("employee_id", "employee_id must be an integer");
                    None
                }
            },
        };
        v.finish()?;

        let mut conditions = FilterWhere::new();
        conditions.contains_any(&["t.title", "t.description"], query.search.as_deref().unwrap_or_default());
        if let Some(status) = status {
            conditions.eq("t.status", status.as_str());
        }
        if let Some(priority) = priority {
            conditions.eq("t.priority", priority.as_str());
        }
        if let Some(employee_id) = employee_id {
            conditions.eq("t.employee_id", employee_id);
        }

        let order = FilterOrder::resolve::<TaskSortField>(query.sort_by.as_deref(), query.sort_order.as_deref(), "t.id");
        let filter = Filter::new(TASK_SELECT, TASK_FROM).where_clause(conditions).order(order);

        let (rows, total) = QueryBuilder::<TaskWithEmployee>::new(filter)
            .paginate(&self.pool, page.limit, page.offset())
            .await?;

        Ok(Paginated::new(rows, page, total))
    }

    /// Status and priority breakdowns plus deadline counters relative to `today`
    pub async fn stats(&self, today: NaiveDate) -> Result<TaskStats, ApiError> {
        let by_status = sqlx::query_as("SELECT status, COUNT(*) AS count FROM tasks GROUP BY status ORDER BY status")
            .fetch_all(&self.pool)
            .await?;
        let by_priority =
            sqlx::query_as("SELECT priority, COUNT(*) AS count FROM tasks GROUP BY priority ORDER BY priority")
                .fetch_all(&self.pool)
                .await?;

        let mut overdue = FilterWhere::new();
        overdue
            .lt("t.due_date", today)
            .neq("t.status", TaskStatus::Completed.as_str());

        // Due dates are whole days, so "before today + 8" is "within 7 days"
        let mut due_this_week = FilterWhere::new();
        due_this_week
            .gte("t.due_date", today)
            .lt("t.due_date", today + Duration::days(8))
            .neq("t.status", TaskStatus::Completed.as_str());

        let overdue = self.count_where(overdue).await?;
        let due_this_week = self.count_where(due_this_week).await?;

        Ok(TaskStats {
            by_status,
            by_priority,
            overdue: CountOnly { count: overdue },
            due_this_week: CountOnly { count: due_this_week },
        })
    }

    pub async fn select_404(&self, id: i64) -> Result<TaskWithEmployee, ApiError> {
        let mut conditions = FilterWhere::new();
        conditions.eq("t.id", id);
        QueryBuilder::<TaskWithEmployee>::new(Filter::new(TASK_SELECT, TASK_FROM).where_clause(conditions))
            .select_optional(&self.pool)
            .await?
            .ok_or_else(|| ApiError::not_found("Task not found"))
    }

    pub async fn create_one(&self, input: NewTask, created_by: i64) -> Result<TaskWithEmployee, ApiError> {
        if let Some(employee_id) = input.employee_id {
            self.ensure_employee(employee_id).await?;
        }

        let id = sqlx::query(
            r#"
            INSERT INTO tasks (title, description, status, priority, due_date, employee_id, created_by)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&input.title)
        .bind(&input.description)
        .bind(input.status)
        .bind(input.priority)
        .bind(input.due_date)
        .bind(input.employee_id)
        .bind(created_by)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        tracing::info!("User {} created task {}", created_by, id);
        self.select_404(id).await
    }

    /// Apply the provided fields; omitted ones keep their stored value
    pub async fn update_404(&self, id: i64, changes: TaskChanges) -> Result<TaskWithEmployee, ApiError> {
        let existing = self.select_404(id).await?;

        let employee_id = match changes.employee_id {
            Some(Some(employee_id)) => {
                self.ensure_employee(employee_id).await?;
                Some(employee_id)
            }
            Some(None) => None,
            None => existing.task.employee_id,
        };

        sqlx::query(
            r#"
            UPDATE tasks SET
                title = COALESCE(?, title),
                description = COALESCE(?, description),
                status = COALESCE(?, status),
                priority = COALESCE(?, priority),
                due_date = COALESCE(?, due_date),
                employee_id = ?,
                updated_at = CURRENT_TIMESTAMP
            WHERE id = ?
            "#,
        )
        .bind(changes.title)
        .bind(changes.description)
        .bind(changes.status)
        .bind(changes.priority)
        .bind(changes.due_date)
        .bind(employee_id)
        .bind(id)
        .execute(&self.pool)
        .await?;

        self.select_404(id).await
    }

    pub async fn delete_404(&self, id: i64) -> Result<(), ApiError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = ?").bind(id).execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(ApiError::not_found("Task not found"));
        }
        tracing::info!("Deleted task {}", id);
        Ok(())
    }

    /// Set one status on many tasks in a single statement
    pub async fn update_status_bulk(&self, input: BulkStatusPayload) -> Result<BulkStatusResult, ApiError> {
        let mut v = Validator::new();
        let task_ids = match input.task_ids {
            Some(ids) if !ids.is_empty() => Some(ids),
            _ => {
                v.push("taskIds", "taskIds must be a non-empty array of task ids");
                None
            }
        };
        let status = v.required_enum::<TaskStatus>("status", input.status.as_deref());

        let (Some(task_ids), Some(status)) = (task_ids, status) else {
            return Err(v.into_error());
        };

        // Ids are bound as a single JSON array; SQLite caps host parameters per statement
        let ids_json = serde_json::to_string(&task_ids).map_err(|e| {
            tracing::error!("Failed to encode task ids: {}", e);
            ApiError::internal_server_error("Failed to update tasks")
        })?;
        let updated = sqlx::query(
            "UPDATE tasks SET status = ?, updated_at = CURRENT_TIMESTAMP \
             WHERE id IN (SELECT value FROM json_each(?))",
        )
        .bind(status)
        .bind(ids_json)
        .execute(&self.pool)
        .await?
        .rows_affected();

        tracing::info!("Bulk status update: {} of {} tasks set to {}", updated, task_ids.len(), status);
        Ok(BulkStatusResult {
            message: format!("Updated {} tasks to {}", updated, status),
            updated,
        })
    }

    async fn count_where(&self, conditions: FilterWhere) -> Result<i64, ApiError> {
        let filter = Filter::new("t.id", "tasks t").where_clause(conditions);
        Ok(QueryBuilder::<TaskWithEmployee>::new(filter).count(&self.pool).await?)
    }

    async fn ensure_employee(&self, employee_id: i64) -> Result<(), ApiError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM employees WHERE id = ?")
            .bind(employee_id)
            .fetch_one(&self.pool)
            .await?;
        if count == 0 {
            return Err(ApiError::invalid_field("employee_id", "Employee not found"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::employee_service::EmployeeService;
    use crate::testing::TestContext;
    use chrono::Utc;

    fn today() -> NaiveDate {
        Utc::now().date_naive()
    }

    async fn admin_id(ctx: &TestContext) -> i64 {
        sqlx::query_scalar("SELECT id FROM users WHERE username = 'admin'")
            .fetch_one(&ctx.pool)
            .await
            .unwrap()
    }

    #[test]
    fn payload_defaults_and_null_assignee() {
        let payload: TaskPayload = serde_json::from_str(r#"{"title":"  Ship it ","employee_id":null}"#).unwrap();
        let new = payload.into_new().unwrap();
        assert_eq!(new.title, "Ship it");
        assert_eq!(new.status, TaskStatus::Pending);
        assert_eq!(new.priority, TaskPriority::Medium);
        assert_eq!(new.employee_id, None);
    }

    #[test]
    fn payload_rejects_unknown_enums() {
        let payload: TaskPayload =
            serde_json::from_str(r#"{"title":"x","status":"done","priority":"urgent"}"#).unwrap();
        assert!(matches!(payload.into_new(), Err(ApiError::ValidationError(ref e)) if e.len() == 2));
    }

    #[tokio::test]
    async fn lists_with_joined_employee_fields() {
        let ctx = TestContext::seeded().await;
        let service = TaskService::new(&ctx.state());

        let page = service
            .select_any(TaskListQuery {
                status: Some("completed".to_string()),
                sort_by: Some("title".to_string()),
                sort_order: Some("ASC".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(page.pagination.total, 2);
        let titles: Vec<&str> = page.data.iter().map(|t| t.task.title.as_str()).collect();
        assert_eq!(titles, vec!["Bug Fix: Login Issue", "Code Review Sprint 23"]);
        assert!(page.data.iter().all(|t| t.employee_first_name.is_some()));
    }

    #[tokio::test]
    async fn non_numeric_employee_filter_is_rejected() {
        let ctx = TestContext::seeded().await;
        let service = TaskService::new(&ctx.state());

        let err = service
            .select_any(TaskListQuery {
                employee_id: Some("abc".to_string()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::ValidationError(_)));
    }

    #[tokio::test]
    async fn stats_count_relative_to_today() {
        let ctx = TestContext::seeded().await;
        let service = TaskService::new(&ctx.state());

        let stats = service.stats(today()).await.unwrap();
        let completed = stats
            .by_status
            .iter()
            .find(|s| s.status == TaskStatus::Completed)
            .map(|s| s.count);
        assert_eq!(completed, Some(2));
        assert_eq!(stats.by_priority.iter().map(|p| p.count).sum::<i64>(), 10);
        assert_eq!(stats.overdue.count, 0);
        assert_eq!(stats.due_this_week.count, 1);

        // A month on, every open task is past due
        let later = service.stats(today() + Duration::days(40)).await.unwrap();
        assert_eq!(later.overdue.count, 8);
    }

    #[tokio::test]
    async fn update_keeps_assignee_unless_nulled() {
        let ctx = TestContext::seeded().await;
        let service = TaskService::new(&ctx.state());
        let created_by = admin_id(&ctx).await;

        let employee_id: i64 = sqlx::query_scalar("SELECT id FROM employees ORDER BY id LIMIT 1")
            .fetch_one(&ctx.pool)
            .await
            .unwrap();

        let new = TaskPayload {
            title: Some("X".to_string()),
            status: Some("pending".to_string()),
            employee_id: Some(Some(NumberOrText::Integer(employee_id))),
            ..Default::default()
        }
        .into_new()
        .unwrap();
        let task = service.create_one(new, created_by).await.unwrap();
        assert_eq!(task.task.created_by, Some(created_by));

        let changes: TaskPayload = serde_json::from_str(r#"{"status":"completed"}"#).unwrap();
        let updated = service.update_404(task.task.id, changes.into_changes().unwrap()).await.unwrap();
        assert_eq!(updated.task.status, TaskStatus::Completed);
        assert_eq!(updated.task.employee_id, Some(employee_id));
        assert_eq!(updated.employee_first_name, task.employee_first_name);

        let unassign: TaskPayload = serde_json::from_str(r#"{"employee_id":null}"#).unwrap();
        let updated = service.update_404(task.task.id, unassign.into_changes().unwrap()).await.unwrap();
        assert_eq!(updated.task.employee_id, None);
        assert_eq!(updated.employee_first_name, None);
    }

    #[tokio::test]
    async fn unknown_assignee_is_a_validation_error() {
        let ctx = TestContext::seeded().await;
        let service = TaskService::new(&ctx.state());
        let created_by = admin_id(&ctx).await;

        let new = TaskPayload {
            title: Some("Orphan".to_string()),
            employee_id: Some(Some(NumberOrText::Integer(9999))),
            ..Default::default()
        }
        .into_new()
        .unwrap();
        let err = service.create_one(new, created_by).await.unwrap_err();
        assert!(matches!(err, ApiError::ValidationError(ref e) if e[0].message == "Employee not found"));
    }

    #[tokio::test]
    async fn deleting_employee_unassigns_their_tasks() {
        let ctx = TestContext::seeded().await;
        let tasks = TaskService::new(&ctx.state());
        let employees = EmployeeService::new(&ctx.state());

        let assigned = tasks
            .select_any(TaskListQuery {
                search: Some("Server Maintenance".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        let task = &assigned.data[0];
        let employee_id = task.task.employee_id.unwrap();

        employees.delete_404(employee_id).await.unwrap();

        let after = tasks.select_404(task.task.id).await.unwrap();
        assert_eq!(after.task.employee_id, None);
        assert_eq!(after.employee_email, None);
    }

    #[tokio::test]
    async fn bulk_status_reports_rows_changed() {
        let ctx = TestContext::seeded().await;
        let service = TaskService::new(&ctx.state());

        let ids: Vec<i64> = sqlx::query_scalar("SELECT id FROM tasks WHERE status = 'pending' ORDER BY id")
            .fetch_all(&ctx.pool)
            .await
            .unwrap();
        let mut task_ids = ids.clone();
        task_ids.push(424242);

        let result = service
            .update_status_bulk(BulkStatusPayload {
                task_ids: Some(task_ids),
                status: Some("completed".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(result.updated, ids.len() as u64);

        let pending: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tasks WHERE status = 'pending'")
            .fetch_one(&ctx.pool)
            .await
            .unwrap();
        assert_eq!(pending, 0);
    }

    #[tokio::test]
    async fn bulk_status_handles_more_ids_than_sqlite_parameters() {
        let ctx = TestContext::seeded().await;
        let service = TaskService::new(&ctx.state());

        let result = service
            .update_status_bulk(BulkStatusPayload {
                task_ids: Some((1..=40_000).collect()),
                status: Some("in_progress".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(result.updated, 10);

        let in_progress: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tasks WHERE status = 'in_progress'")
            .fetch_one(&ctx.pool)
            .await
            .unwrap();
        assert_eq!(in_progress, 10);
    }

    #[test]
    fn payload_accepts_form_text_assignee() {
        let payload: TaskPayload = serde_json::from_str(r#"{"title":"Wire up","employee_id":"3"}"#).unwrap();
        assert_eq!(payload.into_new().unwrap().employee_id, Some(3));

        let blank: TaskPayload = serde_json::from_str(r#"{"employee_id":""}"#).unwrap();
        assert_eq!(blank.into_changes().unwrap().employee_id, None);

        let bad: TaskPayload = serde_json::from_str(r#"{"title":"Wire up","employee_id":"three"}"#).unwrap();
        let err = bad.into_new().unwrap_err();
        assert!(matches!(err, ApiError::ValidationError(ref e) if e[0].field == "employee_id"));
    }

    #[tokio::test]
    async fn bulk_status_requires_ids_and_valid_status() {
        let ctx = TestContext::seeded().await;
        let service = TaskService::new(&ctx.state());

        let err = service
            .update_status_bulk(BulkStatusPayload {
                task_ids: Some(vec![]),
                status: Some("finished".to_string()),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::ValidationError(ref e) if e.len() == 2));
    }
}
