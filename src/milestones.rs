use crate::models::{newest_first, Activities, ApplicationMilestones, HistoryEvent, MilestoneStatus};

/// Derive milestone statuses. Structured activities win over history;
/// history alone can only ever mark a milestone as passed.
pub fn parse(activities: Option<&Activities>, events: Option<&[HistoryEvent]>) -> ApplicationMilestones {
    let mut milestones = ApplicationMilestones::default();

    if let Some(activities) = activities {
        milestones.medical = classify(activities.medical.as_deref());
        milestones.biometrics = classify(activities.biometrics.as_deref());
        milestones.background = classify(activities.background.as_deref());
        milestones.eligibility = classify(activities.eligibility.as_deref());
    } else if let Some(events) = events {
        for event in events {
            let key = event.key.to_uppercase();
            if key.contains("MEDICAL") && key.contains("PASSED") {
                milestones.medical = MilestoneStatus::Passed;
            }
            if key.contains("BIOMETRIC") && (key.contains("COMPLETED") || key.contains("RECEIVED")) {
                milestones.biometrics = MilestoneStatus::Passed;
            }
            if key.contains("BACKGROUND") && key.contains("PASSED") {
                milestones.background = MilestoneStatus::Passed;
            }
            if key.contains("ELIGIBILITY") && key.contains("PASSED") {
                milestones.eligibility = MilestoneStatus::Passed;
            }
        }
    }

    milestones.last_update_date = events
        .and_then(|events| events.iter().min_by(|a, b| newest_first(a, b)))
        .and_then(|newest| newest.date_created.clone());

    milestones
}

/// Map a free-text activity status onto a milestone status
pub fn classify(status: Option<&str>) -> MilestoneStatus {
    let status = match status {
        Some(s) => s.to_uppercase(),
        None => return MilestoneStatus::Unknown,
    };

    if status.contains("PASSED") || status.contains("COMPLETED") || status.contains("MET") {
        MilestoneStatus::Passed
    } else if status.contains("NOT STARTED") {
        MilestoneStatus::Unknown
    } else {
        MilestoneStatus::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn activities(
        medical: Option<&str>,
        biometrics: Option<&str>,
        background: Option<&str>,
        eligibility: Option<&str>,
    ) -> Activities {
        Activities {
            medical: medical.map(str::to_string),
            biometrics: biometrics.map(str::to_string),
            background: background.map(str::to_string),
            eligibility: eligibility.map(str::to_string),
        }
    }

    #[test]
    fn test_activities_mapping() {
        let a = activities(Some("Passed"), Some("InProgress"), None, Some("Not Started"));
        let m = parse(Some(&a), Some(&[][..]));

        assert_eq!(m.medical, MilestoneStatus::Passed);
        assert_eq!(m.biometrics, MilestoneStatus::Pending);
        assert_eq!(m.background, MilestoneStatus::Unknown);
        assert_eq!(m.eligibility, MilestoneStatus::Unknown);
        assert_eq!(m.last_update_date, None);
    }

    #[test]
    fn test_history_fallback() {
        let events = [HistoryEvent::new("MEDICAL_PASSED", Some("2024-02-01"))];
        let m = parse(None, Some(&events[..]));

        assert_eq!(m.medical, MilestoneStatus::Passed);
        assert_eq!(m.biometrics, MilestoneStatus::Unknown);
        assert_eq!(m.background, MilestoneStatus::Unknown);
        assert_eq!(m.eligibility, MilestoneStatus::Unknown);
        assert_eq!(m.last_update_date.as_deref(), Some("2024-02-01"));
    }

    #[test]
    fn test_history_keyword_pairs() {
        let events = [
            HistoryEvent::new("biometrics_received", None),
            HistoryEvent::new("Background Check Passed", None),
            HistoryEvent::new("ELIGIBILITY_REVIEW", None),
        ];
        let m = parse(None, Some(&events[..]));

        assert_eq!(m.biometrics, MilestoneStatus::Passed);
        assert_eq!(m.background, MilestoneStatus::Passed);
        // no PASSED keyword, no inference
        assert_eq!(m.eligibility, MilestoneStatus::Unknown);
    }

    #[test]
    fn test_activities_take_precedence_over_history() {
        let a = activities(Some("In Review"), None, None, None);
        let events = [HistoryEvent::new("MEDICAL_PASSED", None)];
        let m = parse(Some(&a), Some(&events[..]));

        assert_eq!(m.medical, MilestoneStatus::Pending);
    }

    #[test]
    fn test_last_update_is_newest_dated_event() {
        let events = [
            HistoryEvent::new("AOR", Some("2024-01-20")),
            HistoryEvent::new("UNDATED", None),
            HistoryEvent::new("MED_RESULT", Some("2024-03-05T12:00:00Z")),
            HistoryEvent::new("INITIAL", Some("2024-01-15")),
        ];
        let m = parse(None, Some(&events[..]));
        assert_eq!(m.last_update_date.as_deref(), Some("2024-03-05T12:00:00Z"));

        let undated = [HistoryEvent::new("UNDATED", None)];
        assert_eq!(parse(None, Some(&undated[..])).last_update_date, None);
        assert_eq!(parse(None, None), ApplicationMilestones::default());
    }

    #[test]
    fn test_classify_terms() {
        assert_eq!(classify(Some("completed")), MilestoneStatus::Passed);
        assert_eq!(classify(Some("Requirements met")), MilestoneStatus::Passed);
        assert_eq!(classify(Some("not started")), MilestoneStatus::Unknown);
        assert_eq!(classify(Some("")), MilestoneStatus::Pending);
        assert_eq!(classify(None), MilestoneStatus::Unknown);
    }

    #[test]
    fn test_parse_is_repeatable() {
        let a = activities(Some("Passed"), None, Some("Review"), None);
        let events = [HistoryEvent::new("AOR", Some("2024-01-20"))];
        assert_eq!(parse(Some(&a), Some(&events[..])), parse(Some(&a), Some(&events[..])));
    }
}
