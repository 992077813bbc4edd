pub mod allocations;
pub mod auth;
pub mod change_requests;
pub mod consultants;
pub mod daily_logs;
pub mod dashboard;
pub mod projects;
pub mod reports;
pub mod schedule;
pub mod scope;
