//! Scheduling grid: consultants (rows) × calendar days (columns).
//!
//! Each cell resolves to the allocations occupying it, or to a single
//! [`Cell::Free`] placeholder that is never persisted and only exists so the
//! UI can render a drop target.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::allocation::Allocation;
use crate::calendar;
use crate::project::UNKNOWN_PROJECT_LABEL;
use crate::types::{DbId, Day};

/// One entry of a resolved grid cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Cell {
    Occupied(Allocation),
    Free { consultant_id: DbId, date: Day },
}

impl Cell {
    pub fn is_free(&self) -> bool {
        matches!(self, Cell::Free { .. })
    }

    pub fn allocation(&self) -> Option<&Allocation> {
        match self {
            Cell::Occupied(a) => Some(a),
            Cell::Free { .. } => None,
        }
    }
}

/// Resolve the cell at `(consultant_id, date)`.
///
/// Returns every allocation matching exactly, in input order, or a single
/// `Free` placeholder when there is none. Pure: the same inputs always give
/// the same output.
pub fn resolve_cell(allocations: &[Allocation], consultant_id: DbId, date: Day) -> Vec<Cell> {
    let occupied: Vec<Cell> = allocations
        .iter()
        .filter(|a| a.consultant_id == consultant_id && a.date == date)
        .cloned()
        .map(Cell::Occupied)
        .collect();

    if occupied.is_empty() {
        vec![Cell::Free {
            consultant_id,
            date,
        }]
    } else {
        occupied
    }
}

// ---------------------------------------------------------------------------
// Grid view
// ---------------------------------------------------------------------------

/// Minimal consultant descriptor for a grid row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GridConsultant {
    pub id: DbId,
    pub name: String,
    pub role: String,
}

/// A resolved cell entry with its project's display name attached.
#[derive(Debug, Clone, Serialize)]
pub struct GridEntry {
    #[serde(flatten)]
    pub cell: Cell,
    pub project_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GridRow {
    pub consultant: GridConsultant,
    /// One entry list per column, aligned with [`GridView::columns`].
    pub cells: Vec<Vec<GridEntry>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GridView {
    pub view: calendar::TimeView,
    pub anchor: Day,
    pub previous_anchor: Day,
    pub next_anchor: Day,
    pub columns: Vec<Day>,
    pub rows: Vec<GridRow>,
}

/// Build the grid for `consultants` over the columns of `view` at `anchor`.
///
/// `project_names` maps project ids to display names; dangling ids render
/// as [`UNKNOWN_PROJECT_LABEL`].
pub fn build_grid(
    view: calendar::TimeView,
    anchor: Day,
    consultants: Vec<GridConsultant>,
    allocations: &[Allocation],
    project_names: &HashMap<DbId, String>,
) -> GridView {
    let columns = calendar::time_columns(view, anchor);

    let rows = consultants
        .into_iter()
        .map(|consultant| {
            let cells = columns
                .iter()
                .map(|day| {
                    resolve_cell(allocations, consultant.id, *day)
                        .into_iter()
                        .map(|cell| {
                            let project_name = cell.allocation().map(|a| {
                                project_names
                                    .get(&a.project_id)
                                    .cloned()
                                    .unwrap_or_else(|| UNKNOWN_PROJECT_LABEL.to_string())
                            });
                            GridEntry { cell, project_name }
                        })
                        .collect()
                })
                .collect();
            GridRow { consultant, cells }
        })
        .collect();

    GridView {
        view,
        anchor,
        previous_anchor: calendar::shift_anchor(view, anchor, -1),
        next_anchor: calendar::shift_anchor(view, anchor, 1),
        columns,
        rows,
    }
}

// ---------------------------------------------------------------------------
// Availability
// ---------------------------------------------------------------------------

/// Month availability of one consultant, counted over business days.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsultantAvailability {
    pub consultant_id: DbId,
    pub name: String,
    pub busy_days: i64,
    pub available_days: i64,
    pub occupancy_pct: i64,
    /// Busy business days per project name. A day with two projects counts
    /// once for each.
    pub project_days: BTreeMap<String, i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AvailabilityOverview {
    pub month: String,
    pub business_days: i64,
    pub consultants: Vec<ConsultantAvailability>,
    pub total_busy: i64,
    pub total_available: i64,
    /// Mean of the per-consultant occupancy percentages, rounded half-up.
    pub average_occupancy_pct: i64,
}

/// Availability of every consultant over the business days of `month`.
pub fn availability(
    month: Day,
    consultants: &[GridConsultant],
    allocations: &[Allocation],
    project_names: &HashMap<DbId, String>,
) -> AvailabilityOverview {
    let work_days: Vec<Day> =
        calendar::days_inclusive(calendar::month_start(month), calendar::month_end(month))
            .into_iter()
            .filter(|d| calendar::is_business_day(*d))
            .collect();
    let total_work_days = work_days.len() as i64;

    let stats: Vec<ConsultantAvailability> = consultants
        .iter()
        .map(|c| {
            let mut busy = 0;
            let mut project_days = BTreeMap::new();
            for day in &work_days {
                let occupied: Vec<&Allocation> = allocations
                    .iter()
                    .filter(|a| a.consultant_id == c.id && a.date == *day)
                    .collect();
                if occupied.is_empty() {
                    continue;
                }
                busy += 1;
                for a in occupied {
                    let name = project_names
                        .get(&a.project_id)
                        .cloned()
                        .unwrap_or_else(|| UNKNOWN_PROJECT_LABEL.to_string());
                    *project_days.entry(name).or_insert(0) += 1;
                }
            }
            ConsultantAvailability {
                consultant_id: c.id,
                name: c.name.clone(),
                busy_days: busy,
                available_days: total_work_days - busy,
                occupancy_pct: crate::analytics::percentage(busy, total_work_days),
                project_days,
            }
        })
        .collect();

    let total_busy = stats.iter().map(|s| s.busy_days).sum();
    let total_available = stats.iter().map(|s| s.available_days).sum();
    let pct_sum: i64 = stats.iter().map(|s| s.occupancy_pct).sum();
    let average_occupancy_pct = crate::analytics::round_ratio(pct_sum, stats.len() as i64);

    AvailabilityOverview {
        month: calendar::format_month(month),
        business_days: total_work_days,
        consultants: stats,
        total_busy,
        total_available,
        average_occupancy_pct,
    }
}
