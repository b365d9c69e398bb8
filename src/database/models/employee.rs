use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::task::Task;
use crate::filter::SortField;
use crate::types::EmployeeStatus;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Employee {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub department: String,
    pub position: String,
    pub salary: Option<f64>,
    pub hire_date: NaiveDate,
    pub status: EmployeeStatus,
    pub avatar: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Profile view: the employee plus every task assigned to them
#[derive(Debug, Clone, Serialize)]
pub struct EmployeeWithTasks {
    #[serde(flatten)]
    pub employee: Employee,
    pub tasks: Vec<Task>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct DepartmentCount {
    pub department: String,
    pub count: i64,
}

/// Dashboard row for the newest hires
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct RecentEmployee {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub department: String,
    pub position: String,
    pub created_at: NaiveDateTime,
}

/// Task counts per employee, by status
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct EmployeePerformance {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub department: String,
    pub total_tasks: i64,
    pub completed_tasks: i64,
    pub in_progress_tasks: i64,
    pub pending_tasks: i64,
}

/// Validated input for inserting an employee
#[derive(Debug, Clone)]
pub struct NewEmployee {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub department: String,
    pub position: String,
    pub salary: Option<f64>,
    pub hire_date: NaiveDate,
    pub status: EmployeeStatus,
    pub avatar: Option<String>,
}

/// Validated partial update; `None` keeps the stored value
#[derive(Debug, Clone, Default)]
pub struct EmployeeChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub salary: Option<f64>,
    pub hire_date: Option<NaiveDate>,
    pub status: Option<EmployeeStatus>,
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmployeeSortField {
    FirstName,
    LastName,
    Email,
    Department,
    Position,
    Salary,
    HireDate,
    CreatedAt,
}

impl SortField for EmployeeSortField {
    const DEFAULT: Self = EmployeeSortField::CreatedAt;

    fn column(self) -> &'static str {
        match self {
            EmployeeSortField::FirstName => "first_name",
            EmployeeSortField::LastName => "last_name",
            EmployeeSortField::Email => "email",
            EmployeeSortField::Department => "department",
            EmployeeSortField::Position => "position",
            EmployeeSortField::Salary => "salary",
            EmployeeSortField::HireDate => "hire_date",
            EmployeeSortField::CreatedAt => "created_at",
        }
    }

    fn from_key(key: &str) -> Option<Self> {
        Some(match key {
            "first_name" => EmployeeSortField::FirstName,
            "last_name" => EmployeeSortField::LastName,
            "email" => EmployeeSortField::Email,
            "department" => EmployeeSortField::Department,
            "position" => EmployeeSortField::Position,
            "salary" => EmployeeSortField::Salary,
            "hire_date" => EmployeeSortField::HireDate,
            "created_at" => EmployeeSortField::CreatedAt,
            _ => return None,
        })
    }
}
