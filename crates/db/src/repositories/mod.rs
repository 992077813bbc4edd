//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument. Helpers that must run inside a
//! caller's transaction take `&mut PgConnection` instead.

pub mod allocation_repo;
pub mod change_request_repo;
pub mod daily_log_repo;
pub mod profile_repo;
pub mod project_repo;

pub use allocation_repo::AllocationRepo;
pub use change_request_repo::ChangeRequestRepo;
pub use daily_log_repo::DailyLogRepo;
pub use profile_repo::ProfileRepo;
pub use project_repo::ProjectRepo;
