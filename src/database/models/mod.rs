pub mod employee;
pub mod task;
pub mod user;

pub use employee::{
    DepartmentCount, Employee, EmployeeChanges, EmployeePerformance, EmployeeSortField, EmployeeWithTasks, NewEmployee,
    RecentEmployee,
};
pub use task::{
    NewTask, PriorityCount, StatusCount, Task, TaskChanges, TaskSortField, TaskSummary, TaskWithEmployee,
};
pub use user::{User, UserDetails, UserProfile};
