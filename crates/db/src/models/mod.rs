//! Row structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row
//! - `Deserialize` create / update DTOs where the entity is writable
//! - Joined read models used by listings and reports

pub mod allocation;
pub mod change_request;
pub mod daily_log;
pub mod profile;
pub mod project;
