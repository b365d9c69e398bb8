pub mod auth;
pub mod dashboard;
pub mod employees;
pub mod health;
pub mod tasks;
