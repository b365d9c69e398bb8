use chrono::{Duration, NaiveDate, Utc};
use sqlx::SqlitePool;
use tracing::info;

use crate::auth::hash_password;
use crate::types::{TaskPriority, TaskStatus, UserRole};

struct SeedUser {
    username: &'static str,
    email: &'static str,
    password: &'static str,
    role: UserRole,
}

const USERS: &[SeedUser] = &[
    SeedUser { username: "admin", email: "admin@company.com", password: "admin123", role: UserRole::Admin },
    SeedUser { username: "demo", email: "demo@company.com", password: "demo123", role: UserRole::User },
];

// first, last, email, phone, department, position, salary, hire_date
const EMPLOYEES: &[(&str, &str, &str, &str, &str, &str, f64, &str)] = &[
    ("John", "Smith", "john.smith@company.com", "+1-555-0101", "Engineering", "Senior Developer", 95000.0, "2022-03-15"),
    ("Sarah", "Johnson", "sarah.johnson@company.com", "+1-555-0102", "Marketing", "Marketing Manager", 85000.0, "2021-06-20"),
    ("Michael", "Brown", "michael.brown@company.com", "+1-555-0103", "Engineering", "Junior Developer", 65000.0, "2023-01-10"),
    ("Emily", "Davis", "emily.davis@company.com", "+1-555-0104", "HR", "HR Specialist", 70000.0, "2022-08-05"),
    ("David", "Wilson", "david.wilson@company.com", "+1-555-0105", "Sales", "Sales Representative", 60000.0, "2023-04-12"),
    ("Jessica", "Taylor", "jessica.taylor@company.com", "+1-555-0106", "Engineering", "Tech Lead", 110000.0, "2020-11-30"),
    ("Robert", "Anderson", "robert.anderson@company.com", "+1-555-0107", "Finance", "Financial Analyst", 80000.0, "2021-09-18"),
    ("Amanda", "Thomas", "amanda.thomas@company.com", "+1-555-0108", "Marketing", "Content Specialist", 55000.0, "2023-02-28"),
    ("James", "Martinez", "james.martinez@company.com", "+1-555-0109", "Engineering", "DevOps Engineer", 100000.0, "2022-05-22"),
    ("Lisa", "Garcia", "lisa.garcia@company.com", "+1-555-0110", "HR", "HR Manager", 90000.0, "2020-07-14"),
];

// title, description, status, priority, due in days from today, employee index into EMPLOYEES
const TASKS: &[(&str, &str, TaskStatus, TaskPriority, i64, usize)] = &[
    ("Complete Q4 Report", "Prepare and submit the quarterly financial report", TaskStatus::InProgress, TaskPriority::High, 18, 6),
    ("Update Employee Handbook", "Review and update company policies", TaskStatus::Pending, TaskPriority::Medium, 23, 3),
    ("Code Review Sprint 23", "Review all PRs from sprint 23", TaskStatus::Completed, TaskPriority::High, -2, 0),
    ("Marketing Campaign Launch", "Launch the holiday marketing campaign", TaskStatus::InProgress, TaskPriority::High, 4, 1),
    ("Server Maintenance", "Perform scheduled server maintenance", TaskStatus::Pending, TaskPriority::Medium, 8, 8),
    ("New Employee Onboarding", "Onboard three new team members", TaskStatus::InProgress, TaskPriority::Medium, 13, 9),
    ("Bug Fix: Login Issue", "Fix the authentication bug reported by users", TaskStatus::Completed, TaskPriority::High, -7, 2),
    ("Sales Presentation", "Prepare Q1 sales presentation", TaskStatus::Pending, TaskPriority::Low, 33, 4),
    ("API Documentation", "Document all REST API endpoints", TaskStatus::InProgress, TaskPriority::Medium, 11, 5),
    ("Content Calendar", "Plan content for the next quarter", TaskStatus::Pending, TaskPriority::Low, 28, 7),
];

/// Populate an empty database with demo users, employees and tasks.
///
/// Returns `false` without touching anything when any user already exists.
/// Task due dates are relative to today so the dashboard always has upcoming work.
pub async fn seed_demo_data(pool: &SqlitePool, bcrypt_cost: u32) -> anyhow::Result<bool> {
    let user_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users").fetch_one(pool).await?;
    if user_count > 0 {
        info!("Database already seeded");
        return Ok(false);
    }

    // Hash before opening the transaction
    let mut hashed = Vec::with_capacity(USERS.len());
    for user in USERS {
        hashed.push(hash_password(user.password, bcrypt_cost)?);
    }

    let mut tx = pool.begin().await?;

    let mut admin_id = None;
    for (user, password) in USERS.iter().zip(hashed) {
        let id = sqlx::query("INSERT INTO users (username, email, password, role) VALUES (?, ?, ?, ?)")
            .bind(user.username)
            .bind(user.email)
            .bind(password)
            .bind(user.role)
            .execute(&mut *tx)
            .await?
            .last_insert_rowid();
        if user.role == UserRole::Admin {
            admin_id.get_or_insert(id);
        }
    }

    let mut employee_ids = Vec::with_capacity(EMPLOYEES.len());
    for &(first, last, email, phone, department, position, salary, hire_date) in EMPLOYEES {
        let hire_date = NaiveDate::parse_from_str(hire_date, "%Y-%m-%d")?;
        let id = sqlx::query(
            "INSERT INTO employees (first_name, last_name, email, phone, department, position, salary, hire_date, status) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, 'active')",
        )
        .bind(first)
        .bind(last)
        .bind(email)
        .bind(phone)
        .bind(department)
        .bind(position)
        .bind(salary)
        .bind(hire_date)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();
        employee_ids.push(id);
    }

    let today = Utc::now().date_naive();
    for &(title, description, status, priority, due_in_days, employee) in TASKS {
        sqlx::query(
            "INSERT INTO tasks (title, description, status, priority, due_date, employee_id, created_by) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(title)
        .bind(description)
        .bind(status)
        .bind(priority)
        .bind(today + Duration::days(due_in_days))
        .bind(employee_ids.get(employee).copied())
        .bind(admin_id)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    info!(
        "Database seeded with {} users, {} employees and {} tasks",
        USERS.len(),
        EMPLOYEES.len(),
        TASKS.len()
    );
    Ok(true)
}

#[cfg(test)]
mod tests {
    use crate::testing::TestContext;

    #[tokio::test]
    async fn seeds_once() {
        let ctx = TestContext::empty().await;
        assert!(super::seed_demo_data(&ctx.pool, 4).await.unwrap());
        assert!(!super::seed_demo_data(&ctx.pool, 4).await.unwrap());

        let employees: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM employees").fetch_one(&ctx.pool).await.unwrap();
        let tasks: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tasks").fetch_one(&ctx.pool).await.unwrap();
        let unassigned: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tasks WHERE employee_id IS NULL OR created_by IS NULL")
            .fetch_one(&ctx.pool)
            .await
            .unwrap();
        assert_eq!(employees, 10);
        assert_eq!(tasks, 10);
        assert_eq!(unassigned, 0);
    }
}
