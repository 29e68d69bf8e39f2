//! SQLite database store implementation.

use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::{params, Connection, Result as SqlResult};
use std::path::Path;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use super::models::*;

/// Database error types.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(rusqlite::Error),
    #[error("Migration error: {0}")]
    Migration(String),
    #[error("Not found")]
    NotFound,
}

impl From<rusqlite::Error> for DbError {
    fn from(e: rusqlite::Error) -> Self {
        match e {
            rusqlite::Error::QueryReturnedNoRows => DbError::NotFound,
            other => DbError::Sqlite(other),
        }
    }
}

/// A per-day uptime bucket, keyed by calendar date (YYYY-MM-DD).
#[derive(Debug, Clone)]
pub struct DailyUptimeRow {
    pub date: String,
    pub successful_checks: i64,
    pub total_checks: i64,
}

/// Success/total counters for a window, plus the mean response time over
/// successful checks only.
#[derive(Debug, Clone, Default)]
pub struct UptimeTotals {
    pub successful_checks: i64,
    pub total_checks: i64,
    pub avg_response_time: Option<f64>,
}

/// Thread-safe database store.
#[derive(Clone)]
pub struct Store {
    conn: Arc<Mutex<Connection>>,
}

impl Store {
    /// Create a new store with the given database path.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init()?;
        Ok(store)
    }

    /// Initialize the database with migrations.
    fn init(&self) -> Result<(), DbError> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(include_str!("../../migrations/000001_init.up.sql"))
            .map_err(|e| DbError::Migration(format!("Migration 1 failed: {}", e)))?;
        Ok(())
    }

    // --- Project CRUD ---

    /// Add a new project and return it with its assigned ID.
    pub fn add_project(&self, name: &str, slug: &str) -> Result<Project, DbError> {
        let now = Utc::now();
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO projects (name, slug, created_at) VALUES (?1, ?2, ?3)",
            params![name, slug, format_db_time(now)],
        )?;
        Ok(Project {
            id: conn.last_insert_rowid(),
            name: name.to_string(),
            slug: slug.to_string(),
            created_at: now,
        })
    }

    /// Get a project by ID.
    pub fn get_project(&self, id: i64) -> Result<Project, DbError> {
        let conn = self.conn.lock().unwrap();
        let project = conn.query_row(
            "SELECT id, name, slug, created_at FROM projects WHERE id = ?1",
            params![id],
            row_to_project,
        )?;
        Ok(project)
    }

    /// Get a project by its public slug.
    pub fn get_project_by_slug(&self, slug: &str) -> Result<Project, DbError> {
        let conn = self.conn.lock().unwrap();
        let project = conn.query_row(
            "SELECT id, name, slug, created_at FROM projects WHERE slug = ?1",
            params![slug],
            row_to_project,
        )?;
        Ok(project)
    }

    /// Get all projects.
    pub fn get_projects(&self) -> Result<Vec<Project>, DbError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt =
            conn.prepare("SELECT id, name, slug, created_at FROM projects ORDER BY id")?;
        let projects = stmt
            .query_map([], row_to_project)?
            .collect::<SqlResult<Vec<_>>>()?;
        Ok(projects)
    }

    /// Delete a project and everything hanging off it.
    pub fn delete_project(&self, id: i64) -> Result<(), DbError> {
        let conn = self.conn.lock().unwrap();
        let tx = conn.unchecked_transaction()?;
        tx.execute(
            "DELETE FROM incident_updates WHERE incident_id IN (SELECT id FROM incidents WHERE project_id = ?1)",
            params![id],
        )?;
        tx.execute("DELETE FROM incidents WHERE project_id = ?1", params![id])?;
        tx.execute(
            "DELETE FROM uptime_logs WHERE uptime_check_id IN (SELECT id FROM uptime_checks WHERE project_id = ?1)",
            params![id],
        )?;
        tx.execute("DELETE FROM uptime_checks WHERE project_id = ?1", params![id])?;
        tx.execute("DELETE FROM components WHERE project_id = ?1", params![id])?;
        let changed = tx.execute("DELETE FROM projects WHERE id = ?1", params![id])?;
        if changed == 0 {
            return Err(DbError::NotFound);
        }
        tx.commit()?;
        Ok(())
    }

    // --- Component CRUD ---

    /// Add a component to a project.
    pub fn add_component(
        &self,
        project_id: i64,
        name: &str,
        status: ComponentStatus,
        position: i64,
    ) -> Result<Component, DbError> {
        let now = Utc::now();
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO components (project_id, name, status, position, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                project_id,
                name,
                status.as_str(),
                position,
                format_db_time(now),
                format_db_time(now),
            ],
        )?;
        Ok(Component {
            id: conn.last_insert_rowid(),
            project_id,
            name: name.to_string(),
            status,
            position,
            created_at: now,
            updated_at: now,
        })
    }

    /// Update a component's name, status, and position.
    pub fn update_component(
        &self,
        id: i64,
        name: &str,
        status: ComponentStatus,
        position: i64,
    ) -> Result<(), DbError> {
        let conn = self.conn.lock().unwrap();
        let changed = conn.execute(
            "UPDATE components SET name = ?1, status = ?2, position = ?3, updated_at = ?4 WHERE id = ?5",
            params![name, status.as_str(), position, format_db_time(Utc::now()), id],
        )?;
        if changed == 0 {
            return Err(DbError::NotFound);
        }
        Ok(())
    }

    /// Get a component by ID.
    pub fn get_component(&self, id: i64) -> Result<Component, DbError> {
        let conn = self.conn.lock().unwrap();
        let component = conn.query_row(
            "SELECT id, project_id, name, status, position, created_at, updated_at
             FROM components WHERE id = ?1",
            params![id],
            row_to_component,
        )?;
        Ok(component)
    }

    /// Get all components of a project, in display order.
    pub fn get_components(&self, project_id: i64) -> Result<Vec<Component>, DbError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, project_id, name, status, position, created_at, updated_at
             FROM components WHERE project_id = ?1 ORDER BY position, id",
        )?;
        let components = stmt
            .query_map(params![project_id], row_to_component)?
            .collect::<SqlResult<Vec<_>>>()?;
        Ok(components)
    }

    /// Delete a component. Incidents keep referencing its id; the name join
    /// simply stops finding it.
    pub fn delete_component(&self, id: i64) -> Result<(), DbError> {
        let conn = self.conn.lock().unwrap();
        let changed = conn.execute("DELETE FROM components WHERE id = ?1", params![id])?;
        if changed == 0 {
            return Err(DbError::NotFound);
        }
        Ok(())
    }

    /// Count components of a project grouped by their stored status text.
    pub fn get_status_counts(&self, project_id: i64) -> Result<Vec<(String, i64)>, DbError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT status, COUNT(*) FROM components WHERE project_id = ?1 GROUP BY status",
        )?;
        let counts = stmt
            .query_map(params![project_id], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<SqlResult<Vec<_>>>()?;
        Ok(counts)
    }

    /// Look up component names for a set of ids. Ids with no matching row
    /// are skipped, keeping the incident join best-effort.
    pub fn get_component_names(&self, ids: &[i64]) -> Result<Vec<String>, DbError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT name FROM components WHERE id = ?1")?;
        let mut names = Vec::new();
        for id in ids {
            match stmt.query_row(params![id], |row| row.get::<_, String>(0)) {
                Ok(name) => names.push(name),
                Err(rusqlite::Error::QueryReturnedNoRows) => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(names)
    }

    // --- Incident CRUD ---

    /// Create an incident together with its first timeline entry, atomically.
    pub fn create_incident(
        &self,
        project_id: i64,
        title: &str,
        content: &str,
        status: IncidentStatus,
        impact: IncidentImpact,
        affected_components: &[i64],
        start_time: DateTime<Utc>,
    ) -> Result<Incident, DbError> {
        let affected_json =
            serde_json::to_string(affected_components).unwrap_or_else(|_| "[]".to_string());

        let conn = self.conn.lock().unwrap();
        let tx = conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO incidents (project_id, title, content, status, impact, affected_components, start_time, end_time)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, NULL)",
            params![
                project_id,
                title,
                content,
                status.as_str(),
                impact.as_str(),
                affected_json,
                format_db_time(start_time),
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.execute(
            "INSERT INTO incident_updates (incident_id, status, content, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![id, status.as_str(), content, format_db_time(start_time)],
        )?;
        tx.commit()?;

        Ok(Incident {
            id,
            project_id,
            title: title.to_string(),
            content: content.to_string(),
            status,
            impact,
            affected_components: affected_components.to_vec(),
            start_time,
            end_time: None,
        })
    }

    /// Get an incident by ID.
    pub fn get_incident(&self, id: i64) -> Result<Incident, DbError> {
        let conn = self.conn.lock().unwrap();
        let incident = conn.query_row(
            "SELECT id, project_id, title, content, status, impact, affected_components, start_time, end_time
             FROM incidents WHERE id = ?1",
            params![id],
            row_to_incident,
        )?;
        Ok(incident)
    }

    /// Get incidents of a project that started after `since`, newest first.
    pub fn get_incidents_since(
        &self,
        project_id: i64,
        since: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<Incident>, DbError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, project_id, title, content, status, impact, affected_components, start_time, end_time
             FROM incidents WHERE project_id = ?1 AND start_time >= ?2
             ORDER BY start_time DESC LIMIT ?3",
        )?;
        let incidents = stmt
            .query_map(
                params![project_id, format_db_time(since), limit],
                row_to_incident,
            )?
            .collect::<SqlResult<Vec<_>>>()?;
        Ok(incidents)
    }

    /// Append a timeline entry and move the incident to that status,
    /// atomically. A "resolved" entry also stamps end_time.
    pub fn add_incident_update(
        &self,
        incident_id: i64,
        status: IncidentStatus,
        content: &str,
    ) -> Result<IncidentUpdate, DbError> {
        let now = Utc::now();
        let conn = self.conn.lock().unwrap();
        let tx = conn.unchecked_transaction()?;

        let changed = if status == IncidentStatus::Resolved {
            tx.execute(
                "UPDATE incidents SET status = ?1, end_time = ?2 WHERE id = ?3",
                params![status.as_str(), format_db_time(now), incident_id],
            )?
        } else {
            tx.execute(
                "UPDATE incidents SET status = ?1 WHERE id = ?2",
                params![status.as_str(), incident_id],
            )?
        };
        if changed == 0 {
            return Err(DbError::NotFound);
        }

        tx.execute(
            "INSERT INTO incident_updates (incident_id, status, content, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![incident_id, status.as_str(), content, format_db_time(now)],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        Ok(IncidentUpdate {
            id,
            incident_id,
            status,
            content: content.to_string(),
            created_at: now,
        })
    }

    /// Get an incident's timeline, newest first.
    pub fn get_incident_updates(&self, incident_id: i64) -> Result<Vec<IncidentUpdate>, DbError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, incident_id, status, content, created_at
             FROM incident_updates WHERE incident_id = ?1 ORDER BY created_at DESC, id DESC",
        )?;
        let updates = stmt
            .query_map(params![incident_id], |row| {
                let status_str: String = row.get(2)?;
                let time_str: String = row.get(4)?;
                Ok(IncidentUpdate {
                    id: row.get(0)?,
                    incident_id: row.get(1)?,
                    status: IncidentStatus::parse(&status_str)
                        .unwrap_or(IncidentStatus::Investigating),
                    content: row.get(3)?,
                    created_at: parse_db_time(&time_str).unwrap_or_else(Utc::now),
                })
            })?
            .collect::<SqlResult<Vec<_>>>()?;
        Ok(updates)
    }

    /// Delete an incident and its timeline.
    pub fn delete_incident(&self, id: i64) -> Result<(), DbError> {
        let conn = self.conn.lock().unwrap();
        let tx = conn.unchecked_transaction()?;
        tx.execute("DELETE FROM incident_updates WHERE incident_id = ?1", params![id])?;
        let changed = tx.execute("DELETE FROM incidents WHERE id = ?1", params![id])?;
        if changed == 0 {
            return Err(DbError::NotFound);
        }
        tx.commit()?;
        Ok(())
    }

    /// Count a project's unresolved incidents.
    pub fn count_active_incidents(&self, project_id: i64) -> Result<i64, DbError> {
        let conn = self.conn.lock().unwrap();
        let count = conn.query_row(
            "SELECT COUNT(*) FROM incidents WHERE project_id = ?1 AND status != 'resolved'",
            params![project_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    // --- Uptime checks and logs ---

    /// Add an uptime check for a component.
    pub fn add_uptime_check(
        &self,
        component_id: i64,
        project_id: i64,
        name: &str,
    ) -> Result<UptimeCheck, DbError> {
        let now = Utc::now();
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO uptime_checks (component_id, project_id, name, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![component_id, project_id, name, format_db_time(now)],
        )?;
        Ok(UptimeCheck {
            id: conn.last_insert_rowid(),
            component_id,
            project_id,
            name: name.to_string(),
            created_at: now,
        })
    }

    /// Get an uptime check by ID.
    pub fn get_uptime_check(&self, id: i64) -> Result<UptimeCheck, DbError> {
        let conn = self.conn.lock().unwrap();
        let check = conn.query_row(
            "SELECT id, component_id, project_id, name, created_at FROM uptime_checks WHERE id = ?1",
            params![id],
            row_to_uptime_check,
        )?;
        Ok(check)
    }

    /// Get all uptime checks of a project.
    pub fn get_uptime_checks(&self, project_id: i64) -> Result<Vec<UptimeCheck>, DbError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, component_id, project_id, name, created_at
             FROM uptime_checks WHERE project_id = ?1 ORDER BY id",
        )?;
        let checks = stmt
            .query_map(params![project_id], row_to_uptime_check)?
            .collect::<SqlResult<Vec<_>>>()?;
        Ok(checks)
    }

    /// Delete an uptime check and its logs.
    pub fn delete_uptime_check(&self, id: i64) -> Result<(), DbError> {
        let conn = self.conn.lock().unwrap();
        let tx = conn.unchecked_transaction()?;
        tx.execute("DELETE FROM uptime_logs WHERE uptime_check_id = ?1", params![id])?;
        let changed = tx.execute("DELETE FROM uptime_checks WHERE id = ?1", params![id])?;
        if changed == 0 {
            return Err(DbError::NotFound);
        }
        tx.commit()?;
        Ok(())
    }

    /// Add uptime logs in batch for one check.
    pub fn add_uptime_logs(
        &self,
        uptime_check_id: i64,
        logs: &[(bool, Option<f64>, DateTime<Utc>)],
    ) -> Result<(), DbError> {
        if logs.is_empty() {
            return Ok(());
        }

        let conn = self.conn.lock().unwrap();
        let tx = conn.unchecked_transaction()?;

        {
            let mut stmt = tx.prepare(
                "INSERT INTO uptime_logs (uptime_check_id, success, response_time, checked_at)
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for (success, response_time, checked_at) in logs {
                stmt.execute(params![
                    uptime_check_id,
                    *success as i64,
                    response_time,
                    format_db_time(*checked_at),
                ])?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    /// Get logs of one check since `since`, newest first, capped at `limit`.
    pub fn get_uptime_logs(
        &self,
        uptime_check_id: i64,
        since: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<UptimeLog>, DbError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, uptime_check_id, success, response_time, checked_at
             FROM uptime_logs WHERE uptime_check_id = ?1 AND checked_at >= ?2
             ORDER BY checked_at DESC LIMIT ?3",
        )?;
        let logs = stmt
            .query_map(
                params![uptime_check_id, format_db_time(since), limit],
                |row| {
                    let success: i64 = row.get(2)?;
                    let time_str: String = row.get(4)?;
                    Ok(UptimeLog {
                        id: row.get(0)?,
                        uptime_check_id: row.get(1)?,
                        success: success != 0,
                        response_time: row.get(3)?,
                        checked_at: parse_db_time(&time_str).unwrap_or_else(Utc::now),
                    })
                },
            )?
            .collect::<SqlResult<Vec<_>>>()?;
        Ok(logs)
    }

    /// Success/total counters over all logs of a project since `since`.
    pub fn project_uptime_totals(
        &self,
        project_id: i64,
        since: DateTime<Utc>,
    ) -> Result<UptimeTotals, DbError> {
        let conn = self.conn.lock().unwrap();
        let totals = conn.query_row(
            "SELECT COALESCE(SUM(l.success), 0), COUNT(*), AVG(CASE WHEN l.success = 1 THEN l.response_time END)
             FROM uptime_logs l
             JOIN uptime_checks c ON l.uptime_check_id = c.id
             WHERE c.project_id = ?1 AND l.checked_at >= ?2",
            params![project_id, format_db_time(since)],
            |row| {
                Ok(UptimeTotals {
                    successful_checks: row.get(0)?,
                    total_checks: row.get(1)?,
                    avg_response_time: row.get(2)?,
                })
            },
        )?;
        Ok(totals)
    }

    /// Success/total counters for one component since `since`.
    pub fn component_uptime_totals(
        &self,
        component_id: i64,
        since: DateTime<Utc>,
    ) -> Result<UptimeTotals, DbError> {
        let conn = self.conn.lock().unwrap();
        let totals = conn.query_row(
            "SELECT COALESCE(SUM(l.success), 0), COUNT(*), AVG(CASE WHEN l.success = 1 THEN l.response_time END)
             FROM uptime_logs l
             JOIN uptime_checks c ON l.uptime_check_id = c.id
             WHERE c.component_id = ?1 AND l.checked_at >= ?2",
            params![component_id, format_db_time(since)],
            |row| {
                Ok(UptimeTotals {
                    successful_checks: row.get(0)?,
                    total_checks: row.get(1)?,
                    avg_response_time: row.get(2)?,
                })
            },
        )?;
        Ok(totals)
    }

    /// Per-calendar-date success/total counters for a project since `since`,
    /// newest date first, at most `limit` rows.
    pub fn daily_uptime(
        &self,
        project_id: i64,
        since: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<DailyUptimeRow>, DbError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT DATE(l.checked_at), COALESCE(SUM(l.success), 0), COUNT(*)
             FROM uptime_logs l
             JOIN uptime_checks c ON l.uptime_check_id = c.id
             WHERE c.project_id = ?1 AND l.checked_at >= ?2
             GROUP BY DATE(l.checked_at)
             ORDER BY DATE(l.checked_at) DESC
             LIMIT ?3",
        )?;
        let rows = stmt
            .query_map(params![project_id, format_db_time(since), limit], |row| {
                Ok(DailyUptimeRow {
                    date: row.get(0)?,
                    successful_checks: row.get(1)?,
                    total_checks: row.get(2)?,
                })
            })?
            .collect::<SqlResult<Vec<_>>>()?;
        Ok(rows)
    }

    /// Delete uptime logs older than the cutoff. Returns rows deleted.
    pub fn delete_uptime_logs_before(&self, cutoff: DateTime<Utc>) -> Result<usize, DbError> {
        let conn = self.conn.lock().unwrap();
        let deleted = conn.execute(
            "DELETE FROM uptime_logs WHERE checked_at < ?1",
            params![format_db_time(cutoff)],
        )?;
        Ok(deleted)
    }
}

// --- Row mappers ---

fn row_to_project(row: &rusqlite::Row<'_>) -> SqlResult<Project> {
    let time_str: String = row.get(3)?;
    Ok(Project {
        id: row.get(0)?,
        name: row.get(1)?,
        slug: row.get(2)?,
        created_at: parse_db_time(&time_str).unwrap_or_else(Utc::now),
    })
}

fn row_to_component(row: &rusqlite::Row<'_>) -> SqlResult<Component> {
    let status_str: String = row.get(3)?;
    let created_str: String = row.get(5)?;
    let updated_str: String = row.get(6)?;
    Ok(Component {
        id: row.get(0)?,
        project_id: row.get(1)?,
        name: row.get(2)?,
        // Unknown stored text degrades to operational on read.
        status: ComponentStatus::parse(&status_str).unwrap_or_default(),
        position: row.get(4)?,
        created_at: parse_db_time(&created_str).unwrap_or_else(Utc::now),
        updated_at: parse_db_time(&updated_str).unwrap_or_else(Utc::now),
    })
}

fn row_to_incident(row: &rusqlite::Row<'_>) -> SqlResult<Incident> {
    let status_str: String = row.get(4)?;
    let impact_str: String = row.get(5)?;
    let affected_json: String = row.get(6)?;
    let start_str: String = row.get(7)?;
    let end_str: Option<String> = row.get(8)?;
    Ok(Incident {
        id: row.get(0)?,
        project_id: row.get(1)?,
        title: row.get(2)?,
        content: row.get(3)?,
        status: IncidentStatus::parse(&status_str).unwrap_or(IncidentStatus::Investigating),
        impact: IncidentImpact::parse(&impact_str).unwrap_or(IncidentImpact::None),
        affected_components: serde_json::from_str(&affected_json).unwrap_or_default(),
        start_time: parse_db_time(&start_str).unwrap_or_else(Utc::now),
        end_time: end_str.as_deref().and_then(parse_db_time),
    })
}

fn row_to_uptime_check(row: &rusqlite::Row<'_>) -> SqlResult<UptimeCheck> {
    let time_str: String = row.get(4)?;
    Ok(UptimeCheck {
        id: row.get(0)?,
        component_id: row.get(1)?,
        project_id: row.get(2)?,
        name: row.get(3)?,
        created_at: parse_db_time(&time_str).unwrap_or_else(Utc::now),
    })
}

/// Format a datetime the way it is stored in the database.
pub fn format_db_time(dt: DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d %H:%M:%S%.9f").to_string()
}

/// Parse a datetime string from the database.
pub fn parse_db_time(s: &str) -> Option<DateTime<Utc>> {
    // Try various formats
    let formats = [
        "%Y-%m-%d %H:%M:%S%.9f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.9fZ",
        "%Y-%m-%dT%H:%M:%SZ",
    ];

    for fmt in &formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(DateTime::from_naive_utc_and_offset(dt, Utc));
        }
    }

    // Try ISO 8601
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;
    use tempfile::NamedTempFile;

    fn test_store() -> (NamedTempFile, Store) {
        let tmp = NamedTempFile::new().unwrap();
        let store = Store::new(tmp.path()).unwrap();
        (tmp, store)
    }

    #[test]
    fn test_project_crud() {
        let (_tmp, store) = test_store();

        let project = store.add_project("Acme", "acme").unwrap();
        assert!(project.id > 0);

        let by_slug = store.get_project_by_slug("acme").unwrap();
        assert_eq!(by_slug.id, project.id);
        assert_eq!(by_slug.name, "Acme");

        assert!(matches!(
            store.get_project_by_slug("missing"),
            Err(DbError::NotFound)
        ));

        store.delete_project(project.id).unwrap();
        assert!(store.get_project(project.id).is_err());
    }

    #[test]
    fn test_component_crud() {
        let (_tmp, store) = test_store();
        let project = store.add_project("Acme", "acme").unwrap();

        let component = store
            .add_component(project.id, "API", ComponentStatus::Operational, 0)
            .unwrap();
        assert!(component.id > 0);

        store
            .update_component(component.id, "API", ComponentStatus::MajorOutage, 1)
            .unwrap();
        let fetched = store.get_component(component.id).unwrap();
        assert_eq!(fetched.status, ComponentStatus::MajorOutage);
        assert_eq!(fetched.position, 1);

        let counts = store.get_status_counts(project.id).unwrap();
        assert_eq!(counts, vec![("major_outage".to_string(), 1)]);

        store.delete_component(component.id).unwrap();
        assert!(matches!(
            store.get_component(component.id),
            Err(DbError::NotFound)
        ));
    }

    #[test]
    fn test_create_incident_writes_first_update() {
        let (_tmp, store) = test_store();
        let project = store.add_project("Acme", "acme").unwrap();

        let incident = store
            .create_incident(
                project.id,
                "API down",
                "Investigating elevated errors",
                IncidentStatus::Investigating,
                IncidentImpact::Major,
                &[1, 2],
                Utc::now(),
            )
            .unwrap();

        let updates = store.get_incident_updates(incident.id).unwrap();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].status, IncidentStatus::Investigating);

        assert_eq!(store.count_active_incidents(project.id).unwrap(), 1);
    }

    #[test]
    fn test_resolving_update_sets_end_time() {
        let (_tmp, store) = test_store();
        let project = store.add_project("Acme", "acme").unwrap();
        let incident = store
            .create_incident(
                project.id,
                "API down",
                "Looking into it",
                IncidentStatus::Investigating,
                IncidentImpact::Minor,
                &[],
                Utc::now(),
            )
            .unwrap();

        store
            .add_incident_update(incident.id, IncidentStatus::Resolved, "Fixed")
            .unwrap();

        let fetched = store.get_incident(incident.id).unwrap();
        assert_eq!(fetched.status, IncidentStatus::Resolved);
        assert!(fetched.end_time.is_some());
        assert_eq!(store.count_active_incidents(project.id).unwrap(), 0);

        let updates = store.get_incident_updates(incident.id).unwrap();
        assert_eq!(updates.len(), 2);
        // Newest first
        assert_eq!(updates[0].status, IncidentStatus::Resolved);
    }

    #[test]
    fn test_incident_update_on_missing_incident() {
        let (_tmp, store) = test_store();
        assert!(matches!(
            store.add_incident_update(999, IncidentStatus::Monitoring, "?"),
            Err(DbError::NotFound)
        ));
    }

    #[test]
    fn test_component_names_skip_missing_ids() {
        let (_tmp, store) = test_store();
        let project = store.add_project("Acme", "acme").unwrap();
        let a = store
            .add_component(project.id, "API", ComponentStatus::Operational, 0)
            .unwrap();
        let b = store
            .add_component(project.id, "DB", ComponentStatus::Operational, 1)
            .unwrap();

        store.delete_component(b.id).unwrap();

        let names = store.get_component_names(&[a.id, b.id, 9999]).unwrap();
        assert_eq!(names, vec!["API".to_string()]);
    }

    #[test]
    fn test_uptime_totals_and_daily_buckets() {
        let (_tmp, store) = test_store();
        let project = store.add_project("Acme", "acme").unwrap();
        let component = store
            .add_component(project.id, "API", ComponentStatus::Operational, 0)
            .unwrap();
        let check = store
            .add_uptime_check(component.id, project.id, "API health")
            .unwrap();

        let now = Utc::now();
        let mut logs = Vec::new();
        for i in 0..10 {
            logs.push((i < 8, Some(120.0), now - ChronoDuration::minutes(i)));
        }
        store.add_uptime_logs(check.id, &logs).unwrap();

        let since = now - ChronoDuration::days(90);
        let totals = store.project_uptime_totals(project.id, since).unwrap();
        assert_eq!(totals.successful_checks, 8);
        assert_eq!(totals.total_checks, 10);
        assert_eq!(totals.avg_response_time, Some(120.0));

        let per_component = store.component_uptime_totals(component.id, since).unwrap();
        assert_eq!(per_component.total_checks, 10);

        let daily = store.daily_uptime(project.id, since, 90).unwrap();
        assert!(!daily.is_empty());
        assert!(daily.len() <= 2); // Logs span at most two calendar dates
        let bucket_total: i64 = daily.iter().map(|d| d.total_checks).sum();
        assert_eq!(bucket_total, 10);

        let logs = store.get_uptime_logs(check.id, since, 5).unwrap();
        assert_eq!(logs.len(), 5);
        assert!(logs[0].checked_at >= logs[4].checked_at);
        assert!(logs[0].success);
    }

    #[test]
    fn test_uptime_totals_empty_window() {
        let (_tmp, store) = test_store();
        let project = store.add_project("Acme", "acme").unwrap();

        let totals = store
            .project_uptime_totals(project.id, Utc::now() - ChronoDuration::days(90))
            .unwrap();
        assert_eq!(totals.total_checks, 0);
        assert_eq!(totals.successful_checks, 0);
        assert_eq!(totals.avg_response_time, None);
    }

    #[test]
    fn test_uptime_log_retention_delete() {
        let (_tmp, store) = test_store();
        let project = store.add_project("Acme", "acme").unwrap();
        let component = store
            .add_component(project.id, "API", ComponentStatus::Operational, 0)
            .unwrap();
        let check = store
            .add_uptime_check(component.id, project.id, "API health")
            .unwrap();

        let now = Utc::now();
        store
            .add_uptime_logs(
                check.id,
                &[
                    (true, Some(50.0), now - ChronoDuration::days(400)),
                    (true, Some(50.0), now),
                ],
            )
            .unwrap();

        let deleted = store
            .delete_uptime_logs_before(now - ChronoDuration::days(365))
            .unwrap();
        assert_eq!(deleted, 1);

        let totals = store
            .project_uptime_totals(project.id, now - ChronoDuration::days(500))
            .unwrap();
        assert_eq!(totals.total_checks, 1);
    }

    #[test]
    fn test_parse_db_time_formats() {
        assert!(parse_db_time("2024-01-01 12:00:00.000000000").is_some());
        assert!(parse_db_time("2024-01-01 12:00:00").is_some());
        assert!(parse_db_time("2024-01-01T12:00:00Z").is_some());
        assert!(parse_db_time("nonsense").is_none());
    }
}
