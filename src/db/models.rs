//! Database model types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Operational state of a monitored component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentStatus {
    Operational,
    Degraded,
    PartialOutage,
    MajorOutage,
    Maintenance,
}

impl ComponentStatus {
    /// Severity rank used for worst-status resolution. Higher is worse.
    pub fn severity(&self) -> u8 {
        match self {
            ComponentStatus::Operational => 0,
            ComponentStatus::Degraded => 1,
            ComponentStatus::Maintenance => 2,
            ComponentStatus::PartialOutage => 3,
            ComponentStatus::MajorOutage => 4,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentStatus::Operational => "operational",
            ComponentStatus::Degraded => "degraded",
            ComponentStatus::PartialOutage => "partial_outage",
            ComponentStatus::MajorOutage => "major_outage",
            ComponentStatus::Maintenance => "maintenance",
        }
    }

    /// Parse a stored status string. Unrecognized text maps to None; callers
    /// decide whether to reject (writes) or degrade to operational (reads).
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "operational" => Some(ComponentStatus::Operational),
            "degraded" => Some(ComponentStatus::Degraded),
            "partial_outage" => Some(ComponentStatus::PartialOutage),
            "major_outage" => Some(ComponentStatus::MajorOutage),
            "maintenance" => Some(ComponentStatus::Maintenance),
            _ => None,
        }
    }
}

impl Default for ComponentStatus {
    fn default() -> Self {
        ComponentStatus::Operational
    }
}

/// Lifecycle state of an incident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentStatus {
    Investigating,
    Identified,
    Monitoring,
    Resolved,
}

impl IncidentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            IncidentStatus::Investigating => "investigating",
            IncidentStatus::Identified => "identified",
            IncidentStatus::Monitoring => "monitoring",
            IncidentStatus::Resolved => "resolved",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "investigating" => Some(IncidentStatus::Investigating),
            "identified" => Some(IncidentStatus::Identified),
            "monitoring" => Some(IncidentStatus::Monitoring),
            "resolved" => Some(IncidentStatus::Resolved),
            _ => None,
        }
    }
}

/// Advertised impact level of an incident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentImpact {
    None,
    Minor,
    Major,
    Critical,
}

impl IncidentImpact {
    pub fn as_str(&self) -> &'static str {
        match self {
            IncidentImpact::None => "none",
            IncidentImpact::Minor => "minor",
            IncidentImpact::Major => "major",
            IncidentImpact::Critical => "critical",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "none" => Some(IncidentImpact::None),
            "minor" => Some(IncidentImpact::Minor),
            "major" => Some(IncidentImpact::Major),
            "critical" => Some(IncidentImpact::Critical),
            _ => None,
        }
    }
}

/// A status-page project, addressed publicly by slug.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
}

/// A monitored component within a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Component {
    pub id: i64,
    pub project_id: i64,
    pub name: String,
    pub status: ComponentStatus,
    pub position: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A reported disruption. `affected_components` holds component ids as a
/// weak reference: ids are never FK-checked and may point at deleted rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Incident {
    pub id: i64,
    pub project_id: i64,
    pub title: String,
    pub content: String,
    pub status: IncidentStatus,
    pub impact: IncidentImpact,
    pub affected_components: Vec<i64>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
}

/// A single entry in an incident's timeline. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncidentUpdate {
    pub id: i64,
    pub incident_id: i64,
    pub status: IncidentStatus,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// A configured health probe attached to a component.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UptimeCheck {
    pub id: i64,
    pub component_id: i64,
    pub project_id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// One recorded probe outcome. Inserted by an external prober via the
/// ingest endpoint; the aggregation core only reads these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UptimeLog {
    pub id: i64,
    pub uptime_check_id: i64,
    pub success: bool,
    /// Response time in milliseconds; None when the probe never connected.
    pub response_time: Option<f64>,
    pub checked_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_severity_order() {
        assert!(ComponentStatus::MajorOutage.severity() > ComponentStatus::PartialOutage.severity());
        assert!(ComponentStatus::PartialOutage.severity() > ComponentStatus::Maintenance.severity());
        assert!(ComponentStatus::Maintenance.severity() > ComponentStatus::Degraded.severity());
        assert!(ComponentStatus::Degraded.severity() > ComponentStatus::Operational.severity());
    }

    #[test]
    fn test_status_round_trip() {
        for s in [
            ComponentStatus::Operational,
            ComponentStatus::Degraded,
            ComponentStatus::PartialOutage,
            ComponentStatus::MajorOutage,
            ComponentStatus::Maintenance,
        ] {
            assert_eq!(ComponentStatus::parse(s.as_str()), Some(s));
        }
        assert_eq!(ComponentStatus::parse("bogus"), None);
    }

    #[test]
    fn test_incident_status_parse() {
        assert_eq!(IncidentStatus::parse("resolved"), Some(IncidentStatus::Resolved));
        assert_eq!(IncidentStatus::parse(""), None);
        assert_eq!(IncidentImpact::parse("critical"), Some(IncidentImpact::Critical));
    }
}
