//! The one-line status message shown at the top of a status page.

/// Compose the headline message.
///
/// Active incidents always win over component status. Otherwise each status
/// value maps to a fixed sentence; the catch-all covers status text that is
/// not one of the five known values (hand-edited rows, future additions).
pub fn status_message(overall_status: &str, active_incidents: i64) -> String {
    if active_incidents > 0 {
        let plural = if active_incidents > 1 { "s" } else { "" };
        return format!(
            "We are currently experiencing {} active incident{}",
            active_incidents, plural
        );
    }

    match overall_status {
        "operational" => "All systems operational".to_string(),
        "degraded" => "Some systems are experiencing degraded performance".to_string(),
        "partial_outage" => "Some systems are experiencing a partial outage".to_string(),
        "major_outage" => "Some systems are experiencing a major outage".to_string(),
        "maintenance" => "Some systems are under maintenance".to_string(),
        _ => "Status unknown".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_incidents_win() {
        assert_eq!(
            status_message("operational", 1),
            "We are currently experiencing 1 active incident"
        );
        assert_eq!(
            status_message("major_outage", 3),
            "We are currently experiencing 3 active incidents"
        );
    }

    #[test]
    fn test_per_status_messages() {
        assert_eq!(status_message("operational", 0), "All systems operational");
        assert_eq!(
            status_message("degraded", 0),
            "Some systems are experiencing degraded performance"
        );
        assert_eq!(
            status_message("partial_outage", 0),
            "Some systems are experiencing a partial outage"
        );
        assert_eq!(
            status_message("major_outage", 0),
            "Some systems are experiencing a major outage"
        );
        assert_eq!(
            status_message("maintenance", 0),
            "Some systems are under maintenance"
        );
    }

    #[test]
    fn test_unknown_fallback() {
        assert_eq!(status_message("haywire", 0), "Status unknown");
        assert_eq!(status_message("", 0), "Status unknown");
    }
}
