//! Domain logic for consultant agenda scheduling.
//!
//! No I/O lives here: the persistence and HTTP crates fetch rows, hand them
//! to these functions, and store or serialize the results.

pub mod allocation;
pub mod analytics;
pub mod calendar;
pub mod change_request;
pub mod daily_log;
pub mod error;
pub mod project;
pub mod roles;
pub mod schedule;
pub mod types;
