pub mod employees_service;

pub use employees_service::{Employee, EmployeeRole, EmployeesService};
