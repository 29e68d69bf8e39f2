//! Status aggregation module.
//!
//! Computes everything a public status page shows: the project-wide worst
//! status, uptime percentages over a rolling window, incident timelines,
//! and the headline status message. All of it is derived from the store at
//! request time; nothing here is cached or stored back.

mod incidents;
mod precedence;
mod summary;
mod uptime;

pub use incidents::*;
pub use precedence::*;
pub use summary::*;
pub use uptime::*;

/// Default rolling window in days.
pub const DEFAULT_WINDOW_DAYS: i64 = 90;

/// Default incident list cap.
pub const DEFAULT_INCIDENT_LIMIT: i64 = 50;

/// Clamp a caller-supplied day window into 1..=365.
pub fn clamp_days(days: Option<i64>) -> i64 {
    days.unwrap_or(DEFAULT_WINDOW_DAYS).clamp(1, 365)
}

/// Clamp a caller-supplied incident limit into 1..=100.
pub fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_INCIDENT_LIMIT).clamp(1, 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_days() {
        assert_eq!(clamp_days(None), 90);
        assert_eq!(clamp_days(Some(30)), 30);
        assert_eq!(clamp_days(Some(0)), 1);
        assert_eq!(clamp_days(Some(-5)), 1);
        assert_eq!(clamp_days(Some(10_000)), 365);
    }

    #[test]
    fn test_clamp_limit() {
        assert_eq!(clamp_limit(None), 50);
        assert_eq!(clamp_limit(Some(10)), 10);
        assert_eq!(clamp_limit(Some(0)), 1);
        assert_eq!(clamp_limit(Some(500)), 100);
    }
}
