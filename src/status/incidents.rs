//! Incident timelines joined with affected component names.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::Serialize;

use crate::db::{DbError, IncidentImpact, IncidentStatus, IncidentUpdate, Store};

/// An incident annotated for display: full update timeline (newest first)
/// plus the resolved names of its affected components.
#[derive(Debug, Clone, Serialize)]
pub struct IncidentView {
    pub id: i64,
    pub project_id: i64,
    pub title: String,
    pub content: String,
    pub status: IncidentStatus,
    pub impact: IncidentImpact,
    pub affected_components: Vec<i64>,
    pub affected_component_names: Vec<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub updates: Vec<IncidentUpdate>,
}

/// Fetch a project's incidents from the last `days` days, newest first,
/// capped at `limit`, each with its timeline and component names attached.
///
/// The component-name join is best-effort: affected ids are weak references,
/// so ids pointing at deleted components just drop out of the name list.
pub fn incidents_with_timelines(
    store: &Store,
    project_id: i64,
    days: i64,
    limit: i64,
) -> Result<Vec<IncidentView>, DbError> {
    let since = Utc::now() - ChronoDuration::days(days);
    let incidents = store.get_incidents_since(project_id, since, limit)?;

    let mut views = Vec::with_capacity(incidents.len());
    for incident in incidents {
        let updates = store.get_incident_updates(incident.id)?;
        let names = store.get_component_names(&incident.affected_components)?;
        views.push(IncidentView {
            id: incident.id,
            project_id: incident.project_id,
            title: incident.title,
            content: incident.content,
            status: incident.status,
            impact: incident.impact,
            affected_components: incident.affected_components,
            affected_component_names: names,
            start_time: incident.start_time,
            end_time: incident.end_time,
            updates,
        });
    }

    Ok(views)
}
