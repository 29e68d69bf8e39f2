//! Worst-status resolution across a project's components.

use crate::db::ComponentStatus;

/// Resolve the single project-wide status from per-status component counts,
/// as returned by `Store::get_status_counts`.
///
/// The most severe status present wins: major_outage > partial_outage >
/// maintenance > degraded > operational. A project with no components is
/// operational. Unrecognized stored text counts as operational rather than
/// failing the page.
pub fn resolve_overall_status(counts: &[(String, i64)]) -> ComponentStatus {
    let mut worst = ComponentStatus::Operational;
    for (status, count) in counts {
        if *count <= 0 {
            continue;
        }
        let parsed = ComponentStatus::parse(status).unwrap_or_default();
        if parsed.severity() > worst.severity() {
            worst = parsed;
        }
    }
    worst
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(pairs: &[(&str, i64)]) -> Vec<(String, i64)> {
        pairs.iter().map(|(s, c)| (s.to_string(), *c)).collect()
    }

    #[test]
    fn test_no_components_is_operational() {
        assert_eq!(resolve_overall_status(&[]), ComponentStatus::Operational);
    }

    #[test]
    fn test_worst_status_wins() {
        let mixed = counts(&[("operational", 3), ("major_outage", 1), ("degraded", 2)]);
        assert_eq!(resolve_overall_status(&mixed), ComponentStatus::MajorOutage);

        let partial = counts(&[("degraded", 1), ("partial_outage", 1)]);
        assert_eq!(resolve_overall_status(&partial), ComponentStatus::PartialOutage);
    }

    #[test]
    fn test_maintenance_outranks_degraded() {
        let mixed = counts(&[("degraded", 5), ("maintenance", 1)]);
        assert_eq!(resolve_overall_status(&mixed), ComponentStatus::Maintenance);
    }

    #[test]
    fn test_all_operational() {
        let all_ok = counts(&[("operational", 7)]);
        assert_eq!(resolve_overall_status(&all_ok), ComponentStatus::Operational);
    }

    #[test]
    fn test_unknown_status_counts_as_operational() {
        let weird = counts(&[("haywire", 2), ("degraded", 1)]);
        assert_eq!(resolve_overall_status(&weird), ComponentStatus::Degraded);
    }

    #[test]
    fn test_zero_counts_ignored() {
        let zeroed = counts(&[("major_outage", 0), ("operational", 1)]);
        assert_eq!(resolve_overall_status(&zeroed), ComponentStatus::Operational);
    }
}
