//! HTTP request handlers.
//!
//! Every endpoint responds with a uniform `{success, data, message}`
//! envelope. Management endpoints are strict (404 on missing rows, 400 on
//! bad payloads); the public status page is deliberately lenient so that a
//! failing aggregation query degrades the data instead of the page.

use super::AppState;
use crate::db::{ComponentStatus, DbError, IncidentImpact, IncidentStatus};
use crate::status::{
    clamp_days, clamp_limit, incidents_with_timelines, project_uptime_stats,
    resolve_overall_status, status_message, uptime_percentage,
};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

// ============================================================================
// Response envelope
// ============================================================================

fn envelope_ok<T: Serialize>(data: T) -> Response {
    (
        StatusCode::OK,
        Json(json!({ "success": true, "data": data, "message": null })),
    )
        .into_response()
}

fn envelope_error(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(json!({ "success": false, "data": null, "message": message })),
    )
        .into_response()
}

fn db_error(e: DbError) -> Response {
    match e {
        DbError::NotFound => envelope_error(StatusCode::NOT_FOUND, "Not found"),
        other => {
            tracing::error!("Store error: {}", other);
            envelope_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
        }
    }
}

// ============================================================================
// Public status page
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct WindowQuery {
    #[serde(default)]
    pub days: Option<i64>,
    #[serde(default)]
    pub limit: Option<i64>,
}

/// `GET /status/{slug}?days=` — the full status page payload.
///
/// The slug lookup is strict; everything downstream of it is lenient so the
/// page always renders.
pub async fn handle_status_page(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<WindowQuery>,
) -> impl IntoResponse {
    let project = match state.store.get_project_by_slug(&slug) {
        Ok(p) => p,
        Err(e) => return db_error(e),
    };
    let days = clamp_days(query.days);

    let components = state.store.get_components(project.id).unwrap_or_else(|e| {
        tracing::warn!("Component listing failed for {}: {}", slug, e);
        Vec::new()
    });
    let counts = state.store.get_status_counts(project.id).unwrap_or_else(|e| {
        tracing::warn!("Status counts failed for {}: {}", slug, e);
        Vec::new()
    });
    let overall_status = resolve_overall_status(&counts);

    let incidents = incidents_with_timelines(&state.store, project.id, days, clamp_limit(None))
        .unwrap_or_else(|e| {
            tracing::warn!("Incident join failed for {}: {}", slug, e);
            Vec::new()
        });

    let uptime_stats = project_uptime_stats(&state.store, project.id, &components, days);

    envelope_ok(json!({
        "project": project,
        "components": components,
        "incidents": incidents,
        "overall_status": overall_status,
        "uptime_stats": uptime_stats,
    }))
}

/// `GET /status/{slug}/summary` — compact status for badges and embeds.
pub async fn handle_status_summary(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> impl IntoResponse {
    let project = match state.store.get_project_by_slug(&slug) {
        Ok(p) => p,
        Err(e) => return db_error(e),
    };

    let counts = state.store.get_status_counts(project.id).unwrap_or_else(|e| {
        tracing::warn!("Status counts failed for {}: {}", slug, e);
        Vec::new()
    });
    let overall_status = resolve_overall_status(&counts);

    let distribution: serde_json::Map<String, serde_json::Value> = counts
        .iter()
        .map(|(status, count)| (status.clone(), json!(count)))
        .collect();

    let active_incidents = state
        .store
        .count_active_incidents(project.id)
        .unwrap_or_else(|e| {
            tracing::warn!("Active incident count failed for {}: {}", slug, e);
            0
        });

    let recent_uptime_24h = state
        .store
        .project_uptime_totals(project.id, Utc::now() - ChronoDuration::days(1))
        .map(|t| uptime_percentage(t.successful_checks, t.total_checks))
        .unwrap_or_else(|e| {
            tracing::warn!("24h uptime failed for {}: {}", slug, e);
            100.0
        });

    envelope_ok(json!({
        "overall_status": overall_status,
        "component_status_distribution": distribution,
        "active_incidents": active_incidents,
        "recent_uptime_24h": recent_uptime_24h,
        "status_message": status_message(overall_status.as_str(), active_incidents),
    }))
}

/// `GET /status/{slug}/incidents?days=&limit=` — incident history with
/// embedded update timelines.
pub async fn handle_status_incidents(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<WindowQuery>,
) -> impl IntoResponse {
    let project = match state.store.get_project_by_slug(&slug) {
        Ok(p) => p,
        Err(e) => return db_error(e),
    };

    let days = clamp_days(query.days);
    let limit = clamp_limit(query.limit);

    match incidents_with_timelines(&state.store, project.id, days, limit) {
        Ok(incidents) => envelope_ok(incidents),
        Err(e) => db_error(e),
    }
}

// ============================================================================
// Management API: projects
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    pub name: String,
    pub slug: String,
}

pub async fn handle_create_project(
    State(state): State<AppState>,
    Json(req): Json<CreateProjectRequest>,
) -> impl IntoResponse {
    if req.name.trim().is_empty() {
        return envelope_error(StatusCode::BAD_REQUEST, "name must not be empty");
    }
    if req.slug.trim().is_empty() {
        return envelope_error(StatusCode::BAD_REQUEST, "slug must not be empty");
    }

    match state.store.add_project(req.name.trim(), req.slug.trim()) {
        Ok(project) => envelope_ok(project),
        Err(e) => db_error(e),
    }
}

pub async fn handle_get_projects(State(state): State<AppState>) -> impl IntoResponse {
    match state.store.get_projects() {
        Ok(projects) => envelope_ok(projects),
        Err(e) => db_error(e),
    }
}

pub async fn handle_get_project(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    match state.store.get_project(id) {
        Ok(project) => envelope_ok(project),
        Err(e) => db_error(e),
    }
}

pub async fn handle_delete_project(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    match state.store.delete_project(id) {
        Ok(()) => envelope_ok(json!(null)),
        Err(e) => db_error(e),
    }
}

// ============================================================================
// Management API: components
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ComponentRequest {
    pub name: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub position: i64,
}

pub async fn handle_create_component(
    State(state): State<AppState>,
    Path(project_id): Path<i64>,
    Json(req): Json<ComponentRequest>,
) -> impl IntoResponse {
    if req.name.trim().is_empty() {
        return envelope_error(StatusCode::BAD_REQUEST, "name must not be empty");
    }
    let status = match parse_component_status(req.status.as_deref()) {
        Ok(s) => s,
        Err(resp) => return resp,
    };

    // Project existence check stands in for the ownership collaborator
    if let Err(e) = state.store.get_project(project_id) {
        return db_error(e);
    }

    match state
        .store
        .add_component(project_id, req.name.trim(), status, req.position)
    {
        Ok(component) => envelope_ok(component),
        Err(e) => db_error(e),
    }
}

pub async fn handle_get_components(
    State(state): State<AppState>,
    Path(project_id): Path<i64>,
) -> impl IntoResponse {
    if let Err(e) = state.store.get_project(project_id) {
        return db_error(e);
    }
    match state.store.get_components(project_id) {
        Ok(components) => envelope_ok(components),
        Err(e) => db_error(e),
    }
}

pub async fn handle_update_component(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<ComponentRequest>,
) -> impl IntoResponse {
    if req.name.trim().is_empty() {
        return envelope_error(StatusCode::BAD_REQUEST, "name must not be empty");
    }
    let status = match parse_component_status(req.status.as_deref()) {
        Ok(s) => s,
        Err(resp) => return resp,
    };

    match state
        .store
        .update_component(id, req.name.trim(), status, req.position)
    {
        Ok(()) => match state.store.get_component(id) {
            Ok(component) => envelope_ok(component),
            Err(e) => db_error(e),
        },
        Err(e) => db_error(e),
    }
}

pub async fn handle_delete_component(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    match state.store.delete_component(id) {
        Ok(()) => envelope_ok(json!(null)),
        Err(e) => db_error(e),
    }
}

fn parse_component_status(status: Option<&str>) -> Result<ComponentStatus, Response> {
    match status {
        None => Ok(ComponentStatus::Operational),
        Some(s) => ComponentStatus::parse(s).ok_or_else(|| {
            envelope_error(StatusCode::BAD_REQUEST, "Invalid component status")
        }),
    }
}

// ============================================================================
// Management API: incidents
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateIncidentRequest {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub impact: Option<String>,
    #[serde(default)]
    pub affected_components: Vec<i64>,
    #[serde(default)]
    pub start_time: Option<String>,
}

pub async fn handle_create_incident(
    State(state): State<AppState>,
    Path(project_id): Path<i64>,
    Json(req): Json<CreateIncidentRequest>,
) -> impl IntoResponse {
    if req.title.trim().is_empty() {
        return envelope_error(StatusCode::BAD_REQUEST, "title must not be empty");
    }

    let status = match req.status.as_deref() {
        None => IncidentStatus::Investigating,
        Some(s) => match IncidentStatus::parse(s) {
            Some(parsed) => parsed,
            None => return envelope_error(StatusCode::BAD_REQUEST, "Invalid incident status"),
        },
    };
    let impact = match req.impact.as_deref() {
        None => IncidentImpact::None,
        Some(s) => match IncidentImpact::parse(s) {
            Some(parsed) => parsed,
            None => return envelope_error(StatusCode::BAD_REQUEST, "Invalid incident impact"),
        },
    };
    let start_time = match &req.start_time {
        None => Utc::now(),
        Some(s) => match DateTime::parse_from_rfc3339(s) {
            Ok(dt) => dt.with_timezone(&Utc),
            Err(_) => {
                return envelope_error(StatusCode::BAD_REQUEST, "start_time must be RFC 3339")
            }
        },
    };

    if let Err(e) = state.store.get_project(project_id) {
        return db_error(e);
    }

    // Affected ids are weak references and are stored unvalidated
    match state.store.create_incident(
        project_id,
        req.title.trim(),
        &req.content,
        status,
        impact,
        &req.affected_components,
        start_time,
    ) {
        Ok(incident) => envelope_ok(incident),
        Err(e) => db_error(e),
    }
}

pub async fn handle_get_incident(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let incident = match state.store.get_incident(id) {
        Ok(i) => i,
        Err(e) => return db_error(e),
    };
    let updates = match state.store.get_incident_updates(id) {
        Ok(u) => u,
        Err(e) => return db_error(e),
    };
    let names = state
        .store
        .get_component_names(&incident.affected_components)
        .unwrap_or_default();

    envelope_ok(json!({
        "incident": incident,
        "updates": updates,
        "affected_component_names": names,
    }))
}

pub async fn handle_delete_incident(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    match state.store.delete_incident(id) {
        Ok(()) => envelope_ok(json!(null)),
        Err(e) => db_error(e),
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateIncidentUpdateRequest {
    pub status: String,
    pub content: String,
}

pub async fn handle_create_incident_update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<CreateIncidentUpdateRequest>,
) -> impl IntoResponse {
    let status = match IncidentStatus::parse(&req.status) {
        Some(s) => s,
        None => return envelope_error(StatusCode::BAD_REQUEST, "Invalid incident status"),
    };

    match state.store.add_incident_update(id, status, &req.content) {
        Ok(update) => envelope_ok(update),
        Err(e) => db_error(e),
    }
}

// ============================================================================
// Management API: uptime checks and log ingestion
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateCheckRequest {
    pub component_id: i64,
    pub name: String,
}

pub async fn handle_create_check(
    State(state): State<AppState>,
    Path(project_id): Path<i64>,
    Json(req): Json<CreateCheckRequest>,
) -> impl IntoResponse {
    if req.name.trim().is_empty() {
        return envelope_error(StatusCode::BAD_REQUEST, "name must not be empty");
    }

    // Checks require a live component, unlike incident references
    let component = match state.store.get_component(req.component_id) {
        Ok(c) => c,
        Err(e) => return db_error(e),
    };
    if component.project_id != project_id {
        return envelope_error(
            StatusCode::BAD_REQUEST,
            "component belongs to a different project",
        );
    }

    match state
        .store
        .add_uptime_check(req.component_id, project_id, req.name.trim())
    {
        Ok(check) => envelope_ok(check),
        Err(e) => db_error(e),
    }
}

pub async fn handle_get_checks(
    State(state): State<AppState>,
    Path(project_id): Path<i64>,
) -> impl IntoResponse {
    if let Err(e) = state.store.get_project(project_id) {
        return db_error(e);
    }
    match state.store.get_uptime_checks(project_id) {
        Ok(checks) => envelope_ok(checks),
        Err(e) => db_error(e),
    }
}

pub async fn handle_delete_check(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    match state.store.delete_uptime_check(id) {
        Ok(()) => envelope_ok(json!(null)),
        Err(e) => db_error(e),
    }
}

#[derive(Debug, Deserialize)]
pub struct LogEntry {
    pub success: bool,
    #[serde(default)]
    pub response_time: Option<f64>,
    #[serde(default)]
    pub checked_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct IngestLogsRequest {
    pub logs: Vec<LogEntry>,
}

/// `POST /api/checks/{id}/logs` — the external prober's write path. Inserts
/// the whole batch in one transaction.
pub async fn handle_ingest_logs(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<IngestLogsRequest>,
) -> impl IntoResponse {
    if let Err(e) = state.store.get_uptime_check(id) {
        return db_error(e);
    }

    let mut rows = Vec::with_capacity(req.logs.len());
    for entry in &req.logs {
        let checked_at = match &entry.checked_at {
            None => Utc::now(),
            Some(s) => match DateTime::parse_from_rfc3339(s) {
                Ok(dt) => dt.with_timezone(&Utc),
                Err(_) => {
                    return envelope_error(StatusCode::BAD_REQUEST, "checked_at must be RFC 3339")
                }
            },
        };
        rows.push((entry.success, entry.response_time, checked_at));
    }

    match state.store.add_uptime_logs(id, &rows) {
        Ok(()) => envelope_ok(json!({ "ingested": rows.len() })),
        Err(e) => db_error(e),
    }
}

/// `GET /api/checks/{id}/logs?days=&limit=` — recorded probe outcomes,
/// newest first.
pub async fn handle_get_logs(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<WindowQuery>,
) -> impl IntoResponse {
    if let Err(e) = state.store.get_uptime_check(id) {
        return db_error(e);
    }

    let since = Utc::now() - ChronoDuration::days(clamp_days(query.days));
    let limit = query.limit.unwrap_or(1000).clamp(1, 10_000);

    match state.store.get_uptime_logs(id, since, limit) {
        Ok(logs) => envelope_ok(logs),
        Err(e) => db_error(e),
    }
}
