use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::filter::SortField;
use crate::types::{TaskPriority, TaskStatus};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: Option<NaiveDate>,
    pub employee_id: Option<i64>,
    pub created_by: Option<i64>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// A task joined with the display fields of its assignee (all null when unassigned)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TaskWithEmployee {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub task: Task,
    pub employee_first_name: Option<String>,
    pub employee_last_name: Option<String>,
    pub employee_email: Option<String>,
    pub employee_department: Option<String>,
}

/// Dashboard row: a task summary with assignee name
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TaskSummary {
    pub id: i64,
    pub title: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: Option<NaiveDate>,
    pub created_at: NaiveDateTime,
    pub employee_first_name: Option<String>,
    pub employee_last_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct StatusCount {
    pub status: TaskStatus,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct PriorityCount {
    pub priority: TaskPriority,
    pub count: i64,
}

/// Validated input for inserting a task
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: Option<NaiveDate>,
    pub employee_id: Option<i64>,
}

/// Validated partial update. `employee_id: Some(None)` unassigns the task.
#[derive(Debug, Clone, Default)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<NaiveDate>,
    pub employee_id: Option<Option<i64>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskSortField {
    Title,
    Status,
    Priority,
    DueDate,
    CreatedAt,
}

impl SortField for TaskSortField {
    const DEFAULT: Self = TaskSortField::CreatedAt;

    fn column(self) -> &'static str {
        match self {
            TaskSortField::Title => "t.title",
            TaskSortField::Status => "t.status",
            TaskSortField::Priority => "t.priority",
            TaskSortField::DueDate => "t.due_date",
            TaskSortField::CreatedAt => "t.created_at",
        }
    }

    fn from_key(key: &str) -> Option<Self> {
        Some(match key {
            "title" => TaskSortField::Title,
            "status" => TaskSortField::Status,
            "priority" => TaskSortField::Priority,
            "due_date" => TaskSortField::DueDate,
            "created_at" => TaskSortField::CreatedAt,
            _ => return None,
        })
    }
}
