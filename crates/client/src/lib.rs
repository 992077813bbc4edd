//! Typed HTTP client for the agenda service.
//!
//! [`api::ApiClient`] wraps the REST endpoints. [`board::ScheduleBoard`]
//! holds a local copy of the visible allocations and applies drag-and-drop
//! moves optimistically, reconciling against the server when a write fails.

pub mod api;
pub mod board;
pub mod error;
pub mod session;
pub mod store;
