//! Uptime aggregation over a rolling day window.

use chrono::{Duration as ChronoDuration, Utc};
use serde::Serialize;

use crate::db::{Component, DbError, Store};

/// Uptime figures for one component.
#[derive(Debug, Clone, Serialize)]
pub struct ComponentUptime {
    pub component_id: i64,
    pub name: String,
    pub uptime_percentage: f64,
    pub avg_response_time: Option<f64>,
    pub successful_checks: i64,
    pub total_checks: i64,
}

/// Uptime figures for one calendar date.
#[derive(Debug, Clone, Serialize)]
pub struct DailyUptime {
    pub date: String,
    pub uptime_percentage: f64,
    pub successful_checks: i64,
    pub total_checks: i64,
}

/// Full uptime rollup for a project window.
#[derive(Debug, Clone, Serialize)]
pub struct UptimeStats {
    pub overall_uptime: f64,
    pub avg_response_time: Option<f64>,
    pub total_checks: i64,
    pub daily: Vec<DailyUptime>,
    pub components: Vec<ComponentUptime>,
}

/// Uptime ratio as a percentage, rounded to two decimals.
///
/// Zero checks in the window means 100% by policy: an unmonitored component
/// reads as up, never as NaN or an error.
pub fn uptime_percentage(successful: i64, total: i64) -> f64 {
    if total <= 0 {
        return 100.0;
    }
    round2(successful as f64 / total as f64 * 100.0)
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Neutral stats used when the underlying queries fail: all-100%, empty
/// datasets. The public status page renders this instead of an error.
fn neutral_stats() -> UptimeStats {
    UptimeStats {
        overall_uptime: 100.0,
        avg_response_time: None,
        total_checks: 0,
        daily: Vec::new(),
        components: Vec::new(),
    }
}

/// Compute the uptime rollup for a project over the last `days` days.
///
/// Query failures are swallowed on purpose: a broken monitoring query must
/// not take the status page down with it. Every swallowed error is logged
/// so the failure is visible to operators.
pub fn project_uptime_stats(
    store: &Store,
    project_id: i64,
    components: &[Component],
    days: i64,
) -> UptimeStats {
    match compute_uptime_stats(store, project_id, components, days) {
        Ok(stats) => stats,
        Err(e) => {
            tracing::warn!(
                "Uptime aggregation failed for project {}, serving neutral stats: {}",
                project_id,
                e
            );
            neutral_stats()
        }
    }
}

fn compute_uptime_stats(
    store: &Store,
    project_id: i64,
    components: &[Component],
    days: i64,
) -> Result<UptimeStats, DbError> {
    let since = Utc::now() - ChronoDuration::days(days);

    let totals = store.project_uptime_totals(project_id, since)?;

    let daily = store
        .daily_uptime(project_id, since, days)?
        .into_iter()
        .map(|row| DailyUptime {
            uptime_percentage: uptime_percentage(row.successful_checks, row.total_checks),
            date: row.date,
            successful_checks: row.successful_checks,
            total_checks: row.total_checks,
        })
        .collect();

    let mut per_component = Vec::with_capacity(components.len());
    for component in components {
        let t = store.component_uptime_totals(component.id, since)?;
        per_component.push(ComponentUptime {
            component_id: component.id,
            name: component.name.clone(),
            uptime_percentage: uptime_percentage(t.successful_checks, t.total_checks),
            avg_response_time: t.avg_response_time,
            successful_checks: t.successful_checks,
            total_checks: t.total_checks,
        });
    }

    Ok(UptimeStats {
        overall_uptime: uptime_percentage(totals.successful_checks, totals.total_checks),
        avg_response_time: totals.avg_response_time,
        total_checks: totals.total_checks,
        daily,
        components: per_component,
    })
}
