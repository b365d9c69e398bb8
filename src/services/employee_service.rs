use std::sync::Arc;

use serde::Deserialize;
use sqlx::SqlitePool;

use crate::api::{PageRequest, Paginated};
use crate::config::AppConfig;
use crate::database::models::{
    DepartmentCount, Employee, EmployeeChanges, EmployeeSortField, EmployeeWithTasks, NewEmployee, Task,
};
use crate::database::QueryBuilder;
use crate::error::ApiError;
use crate::filter::{Filter, FilterOrder, FilterWhere};
use crate::state::AppState;
use crate::types::{EmployeeStatus, NumberOrText};
use crate::validation::{non_blank, Validator};

use super::conflict_on_unique;

const SEARCH_COLUMNS: &[&str] = &["first_name", "last_name", "email", "position"];

/// Raw `GET /api/employees` query string
#[derive(Debug, Default, Deserialize)]
pub struct EmployeeListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
    pub department: Option<String>,
    pub status: Option<String>,
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
    #[serde(rename = "sortOrder")]
    pub sort_order: Option<String>,
}

/// Create/update body. Every field is optional at this stage so missing
/// values surface as field errors rather than a JSON rejection.
#[derive(Debug, Default, Deserialize)]
pub struct EmployeePayload {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub salary: Option<NumberOrText>,
    pub hire_date: Option<String>,
    pub status: Option<String>,
    pub avatar: Option<String>,
}

impl EmployeePayload {
    pub fn into_new(self) -> Result<NewEmployee, ApiError> {
        let mut v = Validator::new();
        let first_name = v.required_text("first_name", self.first_name.as_deref());
        let last_name = v.required_text("last_name", self.last_name.as_deref());
        let email = v.email("email", self.email.as_deref());
        let department = v.required_text("department", self.department.as_deref());
        let position = v.required_text("position", self.position.as_deref());
        let hire_date = v.date("hire_date", self.hire_date.as_deref());
        let salary = v.optional_number("salary", self.salary);
        let salary = v.non_negative("salary", salary);
        let status = v.optional_enum::<EmployeeStatus>("status", non_blank(self.status.as_deref()));

        match (first_name, last_name, email, department, position, hire_date) {
            (Some(first_name), Some(last_name), Some(email), Some(department), Some(position), Some(hire_date))
                if v.is_ok() =>
            {
                Ok(NewEmployee {
                    first_name,
                    last_name,
                    email,
                    phone: owned(self.phone.as_deref()),
                    department,
                    position,
                    salary,
                    hire_date,
                    status: status.unwrap_or_default(),
                    avatar: owned(self.avatar.as_deref()),
                })
            }
            _ => Err(v.into_error()),
        }
    }

    pub fn into_changes(self) -> Result<EmployeeChanges, ApiError> {
        let mut v = Validator::new();
        let changes = EmployeeChanges {
            first_name: v.optional_text("first_name", self.first_name.as_deref()),
            last_name: v.optional_text("last_name", self.last_name.as_deref()),
            email: v.optional_email("email", self.email.as_deref()),
            phone: owned(self.phone.as_deref()),
            department: v.optional_text("department", self.department.as_deref()),
            position: v.optional_text("position", self.position.as_deref()),
            salary: {
                let salary = v.optional_number("salary", self.salary);
                v.non_negative("salary", salary)
            },
            hire_date: v.optional_date("hire_date", non_blank(self.hire_date.as_deref())),
            status: v.optional_enum("status", non_blank(self.status.as_deref())),
            avatar: owned(self.avatar.as_deref()),
        };
        v.finish()?;
        Ok(changes)
    }
}

fn owned(value: Option<&str>) -> Option<String> {
    non_blank(value).map(str::to_string)
}

pub struct EmployeeService {
    pool: SqlitePool,
    config: Arc<AppConfig>,
}

impl EmployeeService {
    pub fn new(state: &AppState) -> Self {
        Self {
            pool: state.db.clone(),
            config: state.config.clone(),
        }
    }

    /// Filtered, sorted page of employees
    pub async fn select_any(&self, query: EmployeeListQuery) -> Result<Paginated<Employee>, ApiError> {
        let page = PageRequest::parse(query.page.as_deref(), query.limit.as_deref(), &self.config.api)?;

        let mut v = Validator::new();
        let status = v.optional_enum::<EmployeeStatus>("status", non_blank(query.status.as_deref()));
        v.finish()?;

        let mut conditions = FilterWhere::new();
        conditions.contains_any(SEARCH_COLUMNS, query.search.as_deref().unwrap_or_default());
        if let Some(department) = non_blank(query.department.as_deref()) {
            conditions.eq("department", department);
        }
        if let Some(status) = status {
            conditions.eq("status", status.as_str());
        }

        let order = FilterOrder::resolve::<EmployeeSortField>(
            query.sort_by.as_deref(),
            query.sort_order.as_deref(),
            "id",
        );
        let filter = Filter::new("*", "employees").where_clause(conditions).order(order);

        let (rows, total) = QueryBuilder::<Employee>::new(filter)
            .paginate(&self.pool, page.limit, page.offset())
            .await?;

        Ok(Paginated::new(rows, page, total))
    }

    /// Headcount per department, alphabetical
    pub async fn departments(&self) -> Result<Vec<DepartmentCount>, ApiError> {
        let rows = sqlx::query_as(
            "SELECT department, COUNT(*) AS count FROM employees GROUP BY department ORDER BY department",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn select_one(&self, id: i64) -> Result<Option<Employee>, ApiError> {
        let employee = sqlx::query_as("SELECT * FROM employees WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(employee)
    }

    pub async fn select_404(&self, id: i64) -> Result<Employee, ApiError> {
        self.select_one(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Employee not found"))
    }

    /// The employee plus assigned tasks, earliest due first
    pub async fn select_with_tasks(&self, id: i64) -> Result<EmployeeWithTasks, ApiError> {
        let employee = self.select_404(id).await?;
        let tasks: Vec<Task> = sqlx::query_as("SELECT * FROM tasks WHERE employee_id = ? ORDER BY due_date ASC, id ASC")
            .bind(id)
            .fetch_all(&self.pool)
            .await?;
        Ok(EmployeeWithTasks { employee, tasks })
    }

    pub async fn create_one(&self, input: NewEmployee) -> Result<Employee, ApiError> {
        const DUPLICATE: &str = "Employee with this email already exists";

        let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM employees WHERE email = ?")
            .bind(&input.email)
            .fetch_optional(&self.pool)
            .await?;
        if existing.is_some() {
            return Err(ApiError::conflict(DUPLICATE));
        }

        let id = sqlx::query(
            r#"
            INSERT INTO employees (first_name, last_name, email, phone, department, position, salary, hire_date, status, avatar)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.department)
        .bind(&input.position)
        .bind(input.salary)
        .bind(input.hire_date)
        .bind(input.status)
        .bind(&input.avatar)
        .execute(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, DUPLICATE))?
        .last_insert_rowid();

        tracing::info!("Created employee {}", id);
        self.select_404(id).await
    }

    /// Apply the provided fields; omitted ones keep their stored value
    pub async fn update_404(&self, id: i64, changes: EmployeeChanges) -> Result<Employee, ApiError> {
        const DUPLICATE: &str = "Email already in use";

        let existing = self.select_404(id).await?;

        if let Some(email) = changes.email.as_deref().filter(|e| *e != existing.email) {
            let taken: Option<i64> = sqlx::query_scalar("SELECT id FROM employees WHERE email = ? AND id != ?")
                .bind(email)
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
            if taken.is_some() {
                return Err(ApiError::conflict(DUPLICATE));
            }
        }

        sqlx::query(
            r#"
            UPDATE employees SET
                first_name = COALESCE(?, first_name),
                last_name = COALESCE(?, last_name),
                email = COALESCE(?, email),
                phone = COALESCE(?, phone),
                department = COALESCE(?, department),
                position = COALESCE(?, position),
                salary = COALESCE(?, salary),
                hire_date = COALESCE(?, hire_date),
                status = COALESCE(?, status),
                avatar = COALESCE(?, avatar),
                updated_at = CURRENT_TIMESTAMP
            WHERE id = ?
            "#,
        )
        .bind(changes.first_name)
        .bind(changes.last_name)
        .bind(changes.email)
        .bind(changes.phone)
        .bind(changes.department)
        .bind(changes.position)
        .bind(changes.salary)
        .bind(changes.hire_date)
        .bind(changes.status)
        .bind(changes.avatar)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, DUPLICATE))?;

        self.select_404(id).await
    }

    /// Hard delete; assigned tasks are left unassigned by the foreign key
    pub async fn delete_404(&self, id: i64) -> Result<(), ApiError> {
        let result = sqlx::query("DELETE FROM employees WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(ApiError::not_found("Employee not found"));
        }
        tracing::info!("Deleted employee {}", id);
        Ok(())
    }
}
