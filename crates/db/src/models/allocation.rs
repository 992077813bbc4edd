//! Allocation entity model and DTOs.

use agendas_core::allocation::{Allocation, EntityRef, InlineConsultant, InlineProject};
use agendas_core::types::{DbId, Day, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// An allocation row from the `allocations` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AllocationRow {
    pub id: DbId,
    pub consultant_id: DbId,
    pub project_id: DbId,
    pub date: Day,
    pub os: Option<String>,
    pub manager: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<AllocationRow> for Allocation {
    fn from(row: AllocationRow) -> Self {
        Allocation {
            id: row.id,
            consultant_id: row.consultant_id,
            project_id: row.project_id,
            date: row.date,
            os: row.os,
            manager: row.manager,
        }
    }
}

/// An allocation joined with its consultant and project.
///
/// The join is a `LEFT JOIN`, so a dangling reference reads as `None`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AllocationDetail {
    pub id: DbId,
    pub consultant_id: DbId,
    pub project_id: DbId,
    pub date: Day,
    pub os: Option<String>,
    pub manager: Option<String>,
    pub consultant_name: Option<String>,
    pub project_name: Option<String>,
    pub project_color: Option<String>,
    pub project_manager: Option<String>,
    /// Missing projects read as not private.
    pub project_is_private: bool,
}

impl AllocationDetail {
    pub fn to_allocation(&self) -> Allocation {
        Allocation {
            id: self.id,
            consultant_id: self.consultant_id,
            project_id: self.project_id,
            date: self.date,
            os: self.os.clone(),
            manager: self.manager.clone(),
        }
    }
}

/// Query filters for allocation listings. All bounds are inclusive.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AllocationFilter {
    pub from: Option<Day>,
    pub to: Option<Day>,
    pub consultant_id: Option<DbId>,
    pub project_id: Option<DbId>,
}

/// DTO for `POST /allocations/range`.
///
/// Consultant and project are each either an existing id or an inline
/// creation payload.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAllocationRange {
    pub consultant: EntityRef<InlineConsultant>,
    pub project: EntityRef<InlineProject>,
    pub start_date: Day,
    pub end_date: Day,
    pub os: Option<String>,
    pub manager: Option<String>,
}

/// DTO for editing an allocation. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateAllocation {
    pub project_id: Option<DbId>,
    pub os: Option<String>,
    pub manager: Option<String>,
}

/// DTO for moving an allocation to another day.
#[derive(Debug, Clone, Deserialize)]
pub struct MoveAllocation {
    pub date: Day,
}
