//! Aggregate analytics over the allocation and daily-log collections.
//!
//! Every function here is pure: callers fetch the rows (already filtered for
//! visibility) and pass them in. Capacity is always
//! `business days × active consultants`; percentages are rounded half-up and
//! are 0 when their denominator is 0.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::allocation::Allocation;
use crate::calendar;
use crate::daily_log;
use crate::project::{ProjectStatus, UNKNOWN_PROJECT_LABEL};
use crate::schedule::GridConsultant;
use crate::types::{DbId, Day};

/// Projects whose deadline is fewer than this many days away are flagged.
pub const DEADLINE_ALERT_DAYS: i64 = 7;

/// Maximum number of slices in the project distribution chart.
pub const PROJECT_DISTRIBUTION_LIMIT: usize = 8;

/// Months shown by the evolution chart, ending at the reference month.
pub const EVOLUTION_MONTHS: u32 = 5;

/// Months shown by the future-availability chart, after the reference month.
pub const FUTURE_MONTHS: u32 = 3;

// ---------------------------------------------------------------------------
// Rounding
// ---------------------------------------------------------------------------

/// `num / den` rounded half-up. 0 when `den <= 0`.
pub fn round_ratio(num: i64, den: i64) -> i64 {
    if den <= 0 {
        return 0;
    }
    (2 * num + den).div_euclid(2 * den)
}

/// `100 × part / whole` rounded half-up. 0 when `whole <= 0`.
pub fn percentage(part: i64, whole: i64) -> i64 {
    round_ratio(100 * part, whole)
}

// ---------------------------------------------------------------------------
// Occupation
// ---------------------------------------------------------------------------

/// Allocation rows dated inside the month of `month`.
pub fn allocated_days_in_month(allocations: &[Allocation], month: Day) -> i64 {
    allocations
        .iter()
        .filter(|a| calendar::same_month(a.date, month))
        .count() as i64
}

/// Team capacity of a month: business days × active consultants.
pub fn capacity(month: Day, active_consultants: usize) -> i64 {
    calendar::business_days_in_month(month) * active_consultants as i64
}

/// Occupation percentage of the team for the month of `month`.
///
/// Not clamped: weekend or stacked allocations can push it above 100.
pub fn occupation_pct(allocations: &[Allocation], month: Day, active_consultants: usize) -> i64 {
    percentage(
        allocated_days_in_month(allocations, month),
        capacity(month, active_consultants),
    )
}

/// Month-over-month change in occupation, in percentage points.
pub fn trend(current_pct: i64, previous_pct: i64) -> i64 {
    current_pct - previous_pct
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConsultantOccupation {
    pub consultant_id: DbId,
    pub name: String,
    pub allocated_days: i64,
    /// Share of the month's business days.
    pub occupation_pct: i64,
    pub available_days: i64,
}

/// Per-consultant occupation for the month, sorted by percentage descending.
pub fn occupation_by_consultant(
    consultants: &[GridConsultant],
    allocations: &[Allocation],
    month: Day,
) -> Vec<ConsultantOccupation> {
    let business_days = calendar::business_days_in_month(month);
    let mut per_consultant: HashMap<DbId, i64> = HashMap::new();
    for a in allocations.iter().filter(|a| calendar::same_month(a.date, month)) {
        *per_consultant.entry(a.consultant_id).or_default() += 1;
    }

    let mut rows: Vec<ConsultantOccupation> = consultants
        .iter()
        .map(|c| {
            let days = per_consultant.get(&c.id).copied().unwrap_or(0);
            ConsultantOccupation {
                consultant_id: c.id,
                name: c.name.clone(),
                allocated_days: days,
                occupation_pct: percentage(days, business_days),
                available_days: business_days - days,
            }
        })
        .collect();
    rows.sort_by(|a, b| b.occupation_pct.cmp(&a.occupation_pct));
    rows
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

/// Allocation-days of one project in the reference month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectShare {
    pub name: String,
    pub days: i64,
}

/// Allocation-days per project name in the month, top
/// [`PROJECT_DISTRIBUTION_LIMIT`] by days. Ties keep name order.
pub fn project_distribution(
    allocations: &[Allocation],
    month: Day,
    project_names: &HashMap<DbId, String>,
) -> Vec<ProjectShare> {
    let mut per_name: HashMap<&str, i64> = HashMap::new();
    for a in allocations.iter().filter(|a| calendar::same_month(a.date, month)) {
        let name = project_names
            .get(&a.project_id)
            .map(String::as_str)
            .unwrap_or(UNKNOWN_PROJECT_LABEL);
        *per_name.entry(name).or_default() += 1;
    }

    let mut shares: Vec<ProjectShare> = per_name
        .into_iter()
        .map(|(name, days)| ProjectShare {
            name: name.to_string(),
            days,
        })
        .collect();
    shares.sort_by(|a, b| b.days.cmp(&a.days).then_with(|| a.name.cmp(&b.name)));
    shares.truncate(PROJECT_DISTRIBUTION_LIMIT);
    shares
}

/// Distinct projects with at least one allocation in the month.
pub fn active_projects_in_month(allocations: &[Allocation], month: Day) -> usize {
    allocations
        .iter()
        .filter(|a| calendar::same_month(a.date, month))
        .map(|a| a.project_id)
        .collect::<HashSet<_>>()
        .len()
}

/// The project fields deadline alerts look at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDeadline {
    pub project_id: DbId,
    pub name: String,
    pub status: ProjectStatus,
    pub deadline: Option<Day>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeadlineAlert {
    pub project_id: DbId,
    pub name: String,
    pub deadline: Day,
    /// Negative when the deadline has passed.
    pub days_remaining: i64,
}

/// Non-completed projects due in fewer than [`DEADLINE_ALERT_DAYS`] days,
/// most urgent first.
pub fn deadline_alerts(projects: &[ProjectDeadline], today: Day) -> Vec<DeadlineAlert> {
    let mut alerts: Vec<DeadlineAlert> = projects
        .iter()
        .filter(|p| p.status != ProjectStatus::Completed)
        .filter_map(|p| {
            let deadline = p.deadline?;
            let days_remaining = (deadline - today).num_days();
            (days_remaining < DEADLINE_ALERT_DAYS).then(|| DeadlineAlert {
                project_id: p.project_id,
                name: p.name.clone(),
                deadline,
                days_remaining,
            })
        })
        .collect();
    alerts.sort_by_key(|a| a.days_remaining);
    alerts
}

// ---------------------------------------------------------------------------
// Logs
// ---------------------------------------------------------------------------

/// The daily-log fields the analytics look at.
#[derive(Debug, Clone, Copy)]
pub struct LogFact<'a> {
    pub date: Day,
    pub description: Option<&'a str>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LogCompletion {
    pub total: i64,
    pub completed: i64,
    pub completion_pct: i64,
}

/// Completion of the logs dated in the month of `month`.
pub fn log_completion(logs: &[LogFact<'_>], month: Day) -> LogCompletion {
    let (total, completed) = logs
        .iter()
        .filter(|l| calendar::same_month(l.date, month))
        .fold((0, 0), |(total, done), l| {
            let done = done + i64::from(daily_log::is_completed(l.description));
            (total + 1, done)
        });
    LogCompletion {
        total,
        completed,
        completion_pct: percentage(completed, total),
    }
}

/// Allocations dated `day` that have no log row.
///
/// `logged` holds the ids of allocations with a log for `day`.
pub fn pending_logs<'a>(
    allocations: &'a [Allocation],
    logged: &HashSet<DbId>,
    day: Day,
) -> Vec<&'a Allocation> {
    allocations
        .iter()
        .filter(|a| a.date == day && !logged.contains(&a.id))
        .collect()
}

// ---------------------------------------------------------------------------
// Time series
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvolutionPoint {
    /// `YYYY-MM`.
    pub month: String,
    pub allocated_days: i64,
    pub logs_recorded: i64,
    pub capacity: i64,
}

/// The [`EVOLUTION_MONTHS`] months ending at `reference`, oldest first.
pub fn monthly_evolution(
    reference: Day,
    allocations: &[Allocation],
    logs: &[LogFact<'_>],
    active_consultants: usize,
) -> Vec<EvolutionPoint> {
    calendar::months_ending_at(reference, EVOLUTION_MONTHS)
        .into_iter()
        .map(|month| EvolutionPoint {
            month: calendar::format_month(month),
            allocated_days: allocated_days_in_month(allocations, month),
            logs_recorded: logs
                .iter()
                .filter(|l| calendar::same_month(l.date, month))
                .count() as i64,
            capacity: capacity(month, active_consultants),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FutureAvailabilityPoint {
    pub month: String,
    pub occupied: i64,
    pub free: i64,
    pub occupation_pct: i64,
}

/// The [`FUTURE_MONTHS`] months after `reference`.
pub fn future_availability(
    reference: Day,
    allocations: &[Allocation],
    active_consultants: usize,
) -> Vec<FutureAvailabilityPoint> {
    calendar::months_after(reference, FUTURE_MONTHS)
        .into_iter()
        .map(|month| {
            let cap = capacity(month, active_consultants);
            let occupied = allocated_days_in_month(allocations, month);
            FutureAvailabilityPoint {
                month: calendar::format_month(month),
                occupied,
                free: (cap - occupied).max(0),
                occupation_pct: percentage(occupied, cap),
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Strategic dashboard
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StrategicKpis {
    pub active_consultants: usize,
    pub active_projects: usize,
    pub total_allocated_days: i64,
    pub total_capacity: i64,
    pub occupation_pct: i64,
    pub occupation_trend: i64,
    pub logs: LogCompletion,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StrategicDashboard {
    pub month: String,
    pub kpis: StrategicKpis,
    pub occupation_by_consultant: Vec<ConsultantOccupation>,
    pub project_distribution: Vec<ProjectShare>,
    pub monthly_evolution: Vec<EvolutionPoint>,
    pub future_availability: Vec<FutureAvailabilityPoint>,
}

/// Inputs of [`strategic_dashboard`].
///
/// `consultants` must already be restricted to active, non-hidden profiles.
pub struct StrategicInput<'a> {
    pub reference: Day,
    pub consultants: &'a [GridConsultant],
    pub allocations: &'a [Allocation],
    pub logs: &'a [LogFact<'a>],
    pub project_names: &'a HashMap<DbId, String>,
}

/// Compute every KPI and chart of the strategic dashboard.
pub fn strategic_dashboard(input: &StrategicInput<'_>) -> StrategicDashboard {
    let month = calendar::month_start(input.reference);
    let previous = calendar::add_months(month, -1);
    let active = input.consultants.len();

    let current_pct = occupation_pct(input.allocations, month, active);
    let previous_pct = occupation_pct(input.allocations, previous, active);

    let kpis = StrategicKpis {
        active_consultants: active,
        active_projects: active_projects_in_month(input.allocations, month),
        total_allocated_days: allocated_days_in_month(input.allocations, month),
        total_capacity: capacity(month, active),
        occupation_pct: current_pct,
        occupation_trend: trend(current_pct, previous_pct),
        logs: log_completion(input.logs, month),
    };

    StrategicDashboard {
        month: calendar::format_month(month),
        kpis,
        occupation_by_consultant: occupation_by_consultant(
            input.consultants,
            input.allocations,
            month,
        ),
        project_distribution: project_distribution(input.allocations, month, input.project_names),
        monthly_evolution: monthly_evolution(month, input.allocations, input.logs, active),
        future_availability: future_availability(month, input.allocations, active),
    }
}

// ---------------------------------------------------------------------------
// Monthly log report
// ---------------------------------------------------------------------------

/// The report-row fields the summary looks at.
#[derive(Debug, Clone, Copy)]
pub struct ReportFact<'a> {
    pub consultant_id: DbId,
    pub project_name: &'a str,
    pub description: Option<&'a str>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub consultants: usize,
    pub projects: usize,
}

pub fn summarize_report<'a>(rows: impl IntoIterator<Item = ReportFact<'a>>) -> ReportSummary {
    let mut summary = ReportSummary::default();
    let mut consultants = HashSet::new();
    let mut projects = HashSet::new();
    for row in rows {
        summary.total += 1;
        if daily_log::is_completed(row.description) {
            summary.completed += 1;
        }
        consultants.insert(row.consultant_id);
        projects.insert(row.project_name);
    }
    summary.pending = summary.total - summary.completed;
    summary.consultants = consultants.len();
    summary.projects = projects.len();
    summary
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn d(y: i32, m: u32, day: u32) -> Day {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn alloc(id: DbId, consultant_id: DbId, project_id: DbId, date: Day) -> Allocation {
        Allocation {
            id,
            consultant_id,
            project_id,
            date,
            os: None,
            manager: None,
        }
    }

    fn consultant(id: DbId, name: &str) -> GridConsultant {
        GridConsultant {
            id,
            name: name.to_string(),
            role: "CONSULTOR".to_string(),
        }
    }

    /// `count` allocations for consultant 1 on project `project_id`, one per
    /// day starting at `start`.
    fn run(first_id: DbId, project_id: DbId, start: Day, count: u64) -> Vec<Allocation> {
        (0..count)
            .map(|i| alloc(first_id + i as DbId, 1, project_id, start + chrono::Days::new(i)))
            .collect()
    }

    // -- rounding -----------------------------------------------------------

    #[test]
    fn percentage_rounds_half_up() {
        assert_eq!(percentage(1, 8), 13); // 12.5
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(5, 5), 100);
        assert_eq!(percentage(0, 5), 0);
    }

    #[test]
    fn zero_denominator_gives_zero() {
        assert_eq!(percentage(10, 0), 0);
        assert_eq!(round_ratio(10, 0), 0);
    }

    #[test]
    fn round_ratio_half_up() {
        assert_eq!(round_ratio(5, 2), 3);
        assert_eq!(round_ratio(4, 3), 1);
        assert_eq!(round_ratio(0, 3), 0);
    }

    // -- occupation ---------------------------------------------------------

    #[test]
    fn occupation_for_february_2024() {
        // 21 business days × 2 consultants = 42; 21 allocated → 50%.
        let allocs = run(1, 10, d(2024, 2, 1), 21);
        assert_eq!(capacity(d(2024, 2, 1), 2), 42);
        assert_eq!(occupation_pct(&allocs, d(2024, 2, 10), 2), 50);
    }

    #[test]
    fn occupation_without_consultants_is_zero() {
        let allocs = run(1, 10, d(2024, 2, 1), 3);
        assert_eq!(occupation_pct(&allocs, d(2024, 2, 1), 0), 0);
    }

    #[test]
    fn occupation_in_range_when_allocations_fit() {
        for n in 0..=21 {
            let allocs = run(1, 10, d(2024, 2, 1), n);
            let pct = occupation_pct(&allocs, d(2024, 2, 1), 1);
            assert!((0..=100).contains(&pct), "n={n} pct={pct}");
        }
    }

    #[test]
    fn only_reference_month_counts() {
        let mut allocs = run(1, 10, d(2024, 1, 30), 4); // 30, 31 Jan; 1, 2 Feb
        allocs.push(alloc(99, 2, 10, d(2023, 2, 5)));
        assert_eq!(allocated_days_in_month(&allocs, d(2024, 2, 1)), 2);
    }

    #[test]
    fn trend_is_difference() {
        assert_eq!(trend(60, 45), 15);
        assert_eq!(trend(30, 45), -15);
    }

    #[test]
    fn occupation_by_consultant_sorted_descending() {
        let mut allocs = run(1, 10, d(2024, 2, 1), 2);
        allocs.extend((0..5).map(|i| alloc(100 + i, 2, 10, d(2024, 2, 5) + chrono::Days::new(i as u64))));
        let rows = occupation_by_consultant(
            &[consultant(1, "Ana"), consultant(2, "Bruno"), consultant(3, "Carla")],
            &allocs,
            d(2024, 2, 1),
        );
        let ids: Vec<DbId> = rows.iter().map(|r| r.consultant_id).collect();
        assert_eq!(ids, vec![2, 1, 3]);
        assert_eq!(rows[0].allocated_days, 5);
        assert_eq!(rows[0].occupation_pct, 24); // 5/21 = 23.8
        assert_eq!(rows[0].available_days, 16);
        assert_eq!(rows[2].allocated_days, 0);
    }

    // -- projects -----------------------------------------------------------

    #[test]
    fn distribution_keeps_top_eight_with_unknown_label() {
        let mut allocs = Vec::new();
        let mut id = 0;
        // Project p gets p allocation-days, p = 1..=10; project 10 is unnamed.
        for p in 1..=10 {
            for i in 0..p {
                id += 1;
                allocs.push(alloc(id, 1, p, d(2024, 3, 1) + chrono::Days::new(i as u64)));
            }
        }
        let names: HashMap<DbId, String> = (1..10).map(|p| (p, format!("P{p}"))).collect();
        let shares = project_distribution(&allocs, d(2024, 3, 1), &names);

        assert_eq!(shares.len(), 8);
        assert_eq!(shares[0].name, UNKNOWN_PROJECT_LABEL);
        assert_eq!(shares[0].days, 10);
        assert_eq!(shares[7].name, "P3");
        assert!(shares.windows(2).all(|w| w[0].days >= w[1].days));
    }

    #[test]
    fn active_projects_are_distinct() {
        let allocs = vec![
            alloc(1, 1, 10, d(2024, 3, 1)),
            alloc(2, 2, 10, d(2024, 3, 2)),
            alloc(3, 1, 11, d(2024, 3, 3)),
            alloc(4, 1, 12, d(2024, 4, 3)),
        ];
        assert_eq!(active_projects_in_month(&allocs, d(2024, 3, 1)), 2);
    }

    #[test]
    fn deadline_alerts_sorted_and_filtered() {
        let today = d(2024, 3, 10);
        let project = |id, status, deadline| ProjectDeadline {
            project_id: id,
            name: format!("P{id}"),
            status,
            deadline,
        };
        let projects = vec![
            project(1, ProjectStatus::InProgress, Some(d(2024, 3, 15))), // 5
            project(2, ProjectStatus::InProgress, Some(d(2024, 3, 8))),  // -2
            project(3, ProjectStatus::Completed, Some(d(2024, 3, 9))),   // completed
            project(4, ProjectStatus::Critical, Some(d(2024, 3, 17))),   // 7, not < 7
            project(5, ProjectStatus::Planning, None),
            project(6, ProjectStatus::Planning, Some(d(2024, 3, 16))),   // 6
        ];
        let alerts = deadline_alerts(&projects, today);
        let got: Vec<(DbId, i64)> = alerts.iter().map(|a| (a.project_id, a.days_remaining)).collect();
        assert_eq!(got, vec![(2, -2), (1, 5), (6, 6)]);
    }

    // -- logs ---------------------------------------------------------------

    #[test]
    fn log_completion_uses_description_rule() {
        let logs = [
            LogFact { date: d(2024, 3, 1), description: Some("feito") },
            LogFact { date: d(2024, 3, 2), description: Some("  ") },
            LogFact { date: d(2024, 3, 3), description: None },
            LogFact { date: d(2024, 3, 4), description: Some("ok") },
            LogFact { date: d(2024, 4, 1), description: Some("outro mês") },
        ];
        let c = log_completion(&logs, d(2024, 3, 1));
        assert_eq!(c.total, 4);
        assert_eq!(c.completed, 2);
        assert_eq!(c.completion_pct, 50);
    }

    #[test]
    fn pending_logs_are_unlogged_allocations_of_the_day() {
        let yesterday = d(2024, 3, 9);
        let allocs = vec![
            alloc(1, 1, 10, yesterday),
            alloc(2, 2, 10, yesterday),
            alloc(3, 1, 10, d(2024, 3, 10)),
        ];
        let logged = HashSet::from([1]);
        let pending: Vec<DbId> = pending_logs(&allocs, &logged, yesterday).iter().map(|a| a.id).collect();
        assert_eq!(pending, vec![2]);
    }

    // -- series -------------------------------------------------------------

    #[test]
    fn evolution_covers_five_months_oldest_first() {
        let allocs = vec![alloc(1, 1, 10, d(2024, 1, 15)), alloc(2, 1, 10, d(2024, 3, 4))];
        let logs = [LogFact { date: d(2024, 3, 4), description: None }];
        let points = monthly_evolution(d(2024, 3, 20), &allocs, &logs, 2);

        let months: Vec<&str> = points.iter().map(|p| p.month.as_str()).collect();
        assert_eq!(months, vec!["2023-11", "2023-12", "2024-01", "2024-02", "2024-03"]);
        assert_eq!(points[2].allocated_days, 1);
        assert_eq!(points[4].allocated_days, 1);
        assert_eq!(points[4].logs_recorded, 1);
        assert_eq!(points[3].capacity, 42);
    }

    #[test]
    fn future_availability_never_negative() {
        // April 2024 has 22 business days; 30 rows for one consultant exceeds it.
        let allocs = run(1, 10, d(2024, 4, 1), 30);
        let points = future_availability(d(2024, 3, 1), &allocs, 1);

        assert_eq!(points.len(), 3);
        assert_eq!(points[0].month, "2024-04");
        assert_eq!(points[0].occupied, 30);
        assert_eq!(points[0].free, 0);
        assert_eq!(points[0].occupation_pct, 136);
        assert_eq!(points[1].occupied, 0);
        assert_eq!(points[1].free, calendar::business_days_in_month(d(2024, 5, 1)));
    }

    #[test]
    fn strategic_dashboard_combines_kpis() {
        let allocs: Vec<Allocation> = run(1, 10, d(2024, 2, 1), 21)
            .into_iter()
            .chain(run(100, 11, d(2024, 1, 1), 11))
            .collect();
        let names = HashMap::from([(10, "PEP".to_string()), (11, "BI".to_string())]);
        let consultants = [consultant(1, "Ana"), consultant(2, "Bruno")];
        let logs = [LogFact { date: d(2024, 2, 2), description: Some("x") }];

        let dash = strategic_dashboard(&StrategicInput {
            reference: d(2024, 2, 14),
            consultants: &consultants,
            allocations: &allocs,
            logs: &logs,
            project_names: &names,
        });

        assert_eq!(dash.month, "2024-02");
        assert_eq!(dash.kpis.active_consultants, 2);
        assert_eq!(dash.kpis.active_projects, 1);
        assert_eq!(dash.kpis.total_capacity, 42);
        assert_eq!(dash.kpis.occupation_pct, 50);
        // January 2024: 23 business days × 2 = 46; 11/46 = 23.9 → 24.
        assert_eq!(dash.kpis.occupation_trend, 26);
        assert_eq!(dash.kpis.logs.completion_pct, 100);
        assert_eq!(dash.project_distribution[0].name, "PEP");
        assert_eq!(dash.monthly_evolution.len(), 5);
        assert_eq!(dash.future_availability.len(), 3);
    }

    // -- report -------------------------------------------------------------

    #[test]
    fn report_summary_counts_distinct_values() {
        let rows = [
            ReportFact { consultant_id: 1, project_name: "PEP", description: Some("ok") },
            ReportFact { consultant_id: 1, project_name: "BI", description: None },
            ReportFact { consultant_id: 2, project_name: "PEP", description: Some(" ") },
        ];
        let s = summarize_report(rows);
        assert_eq!(s.total, 3);
        assert_eq!(s.completed, 1);
        assert_eq!(s.pending, 2);
        assert_eq!(s.consultants, 2);
        assert_eq!(s.projects, 2);
    }
}
