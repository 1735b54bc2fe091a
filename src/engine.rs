//! Assembles the details view from one fetch.
//!
//! Milestones and the timeline are computed inline. Insight resolution and
//! the processing-time estimate run as independent tasks; either failing
//! degrades only its own part of the view.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::dictionary::StatusDictionary;
use crate::forecast;
use crate::insights::InsightCache;
use crate::locale::Locale;
use crate::milestones;
use crate::models::{newest_first, ApplicationView, DetailsResponse, HistoryEvent, TimelineEntry};
use crate::processing_time::ProcessingTimeService;
use crate::translator::{format_status, KeyTranslator};

const CLOSED_STATUS: &str = "Closed";

pub struct InsightEngine {
    dictionary: Arc<StatusDictionary>,
    translator: KeyTranslator,
    insights: Arc<InsightCache>,
    processing: Arc<ProcessingTimeService>,
}

impl InsightEngine {
    pub fn new(
        dictionary: Arc<StatusDictionary>,
        insights: Arc<InsightCache>,
        processing: Arc<ProcessingTimeService>,
    ) -> Self {
        Self {
            dictionary,
            translator: KeyTranslator::new(),
            insights,
            processing,
        }
    }

    pub fn dictionary(&self) -> &StatusDictionary {
        &self.dictionary
    }

    pub fn insights(&self) -> &InsightCache {
        &self.insights
    }

    pub fn processing(&self) -> &ProcessingTimeService {
        &self.processing
    }

    pub async fn assemble(&self, details: &DetailsResponse, locale: Locale) -> ApplicationView {
        self.assemble_at(details, locale, Utc::now()).await
    }

    pub async fn assemble_at(
        &self,
        details: &DetailsResponse,
        locale: Locale,
        now: DateTime<Utc>,
    ) -> ApplicationView {
        let app = details.app.clone().unwrap_or_default();
        let relation = details.primary_relation();
        let history = details.history();

        let milestones = milestones::parse(
            relation.and_then(|r| r.activities.as_ref()),
            relation.and_then(|r| r.history.as_deref()),
        );

        let keys: Vec<String> = history.iter().map(|e| e.key.clone()).collect();
        let insights_task = {
            let cache = self.insights.clone();
            let dictionary = self.dictionary.clone();
            tokio::task::spawn_blocking(move || {
                cache.resolve_all(keys.iter().map(String::as_str), dictionary.as_ref())
            })
        };
        let months_task = self.processing.estimate_at(app.lob.as_deref(), now);

        let (insights, estimated_months) = tokio::join!(insights_task, months_task);
        let insights = insights.unwrap_or_else(|e| {
            warn!(error = %e, "insight resolution task failed");
            BTreeMap::new()
        });

        let today = forecast::local_today(now);
        let received = app.date_received.as_deref();
        let timeline = self.timeline(history, &insights, locale);
        let closed = app
            .status
            .as_deref()
            .is_some_and(|s| s.eq_ignore_ascii_case(CLOSED_STATUS));

        info!(
            app_number = app.app_number.as_deref().unwrap_or("-"),
            events = timeline.len(),
            insights = insights.len(),
            estimated_months,
            closed,
            "application view assembled"
        );

        ApplicationView {
            status_label: app.status.as_deref().map(format_status),
            app_number: app.app_number,
            status: app.status,
            closed,
            milestones,
            timeline,
            insights,
            estimated_months,
            forecast: forecast::calculate_forecast_at(received, Some(estimated_months), today),
            comparison: forecast::compare_progress(received, estimated_months, today),
        }
    }

    /// History rows, newest first, with localized text and explanations
    pub fn timeline(
        &self,
        history: &[HistoryEvent],
        insights: &BTreeMap<String, String>,
        locale: Locale,
    ) -> Vec<TimelineEntry> {
        let mut events: Vec<&HistoryEvent> = history.iter().collect();
        events.sort_by(|a, b| newest_first(a, b));

        events
            .into_iter()
            .map(|event| TimelineEntry {
                key: event.key.clone(),
                title: self.translator.title_for(&event.key, locale),
                description: self.translator.description_for(&event.key, locale),
                explanation: insights.get(&event.key).cloned(),
                date_created: event.date_created.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Activities, AppMetadata, MilestoneStatus, Relation};
    use crate::processing_time::DEFAULT_MONTHS;
    use crate::store::MemoryStore;
    use chrono::{Duration, TimeZone};

    fn engine() -> InsightEngine {
        let insights = Arc::new(InsightCache::new(Arc::new(MemoryStore::new())));
        let processing = Arc::new(ProcessingTimeService::new(
            Arc::new(MemoryStore::new()),
            Duration::hours(24),
        ));
        InsightEngine::new(Arc::new(StatusDictionary::new()), insights, processing)
    }

    fn details(status: &str) -> DetailsResponse {
        DetailsResponse {
            app: Some(AppMetadata {
                app_number: Some("E000123".to_string()),
                status: Some(status.to_string()),
                date_received: Some("2024-01-15T00:00:00Z".to_string()),
                lob: Some("Express Entry".to_string()),
                ..Default::default()
            }),
            relations: Some(vec![Relation {
                activities: Some(Activities {
                    medical: Some("Passed".to_string()),
                    ..Default::default()
                }),
                history: Some(vec![
                    HistoryEvent::new("INITIAL", Some("2024-01-15")),
                    HistoryEvent::new("UNMAPPED_EVENT", None),
                    HistoryEvent::new("AOR", Some("2024-02-01")),
                ]),
            }]),
        }
    }

    #[tokio::test]
    async fn test_assemble_full_view() {
        let now = Utc.with_ymd_and_hms(2024, 4, 15, 12, 0, 0).unwrap();
        let view = engine().assemble_at(&details("InProgress"), Locale::English, now).await;

        assert_eq!(view.app_number.as_deref(), Some("E000123"));
        assert_eq!(view.status_label.as_deref(), Some("In progress"));
        assert!(!view.closed);
        assert_eq!(view.milestones.medical, MilestoneStatus::Passed);
        assert_eq!(view.milestones.last_update_date.as_deref(), Some("2024-02-01"));
        assert_eq!(view.estimated_months, 6);

        let keys: Vec<_> = view.timeline.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["AOR", "INITIAL", "UNMAPPED_EVENT"]);
        assert_eq!(view.timeline[0].title, "Acknowledgement of Receipt");
        assert!(view.timeline[0].explanation.is_some());
        assert_eq!(view.timeline[2].title, "Unmapped event");
        assert_eq!(view.timeline[2].explanation, None);
        assert_eq!(view.insights.len(), 2);

        let forecast = view.forecast.unwrap();
        assert_eq!(forecast.estimated_date, "Jul 15, 2024");
        assert!((forecast.progress - 0.5).abs() < 0.01);
        assert_eq!(view.comparison.unwrap().months_elapsed, 3);
    }

    #[tokio::test]
    async fn test_view_forecast_uses_local_today() {
        // late in the UTC day, where a UTC date and a local date can differ
        let now = Utc.with_ymd_and_hms(2024, 4, 15, 23, 30, 0).unwrap();
        let details = details("InProgress");
        let view = engine().assemble_at(&details, Locale::English, now).await;

        let received = details.app.as_ref().and_then(|a| a.date_received.as_deref());
        let today = forecast::local_today(now);
        assert_eq!(view.forecast, forecast::calculate_forecast_at(received, Some(6), today));
        assert_eq!(view.comparison, forecast::compare_progress(received, 6, today));
    }

    #[tokio::test]
    async fn test_assemble_french_closed() {
        let now = Utc.with_ymd_and_hms(2024, 4, 15, 12, 0, 0).unwrap();
        let view = engine().assemble_at(&details("closed"), Locale::French, now).await;

        assert!(view.closed);
        assert_eq!(view.timeline[0].title, "Accusé de Réception");
        assert_eq!(
            view.timeline[0].description.as_deref(),
            Some("Nous avons commencé le traitement de votre demande.")
        );
    }

    #[tokio::test]
    async fn test_assemble_empty_details() {
        let view = engine().assemble(&DetailsResponse::default(), Locale::English).await;

        assert!(view.timeline.is_empty());
        assert!(view.insights.is_empty());
        assert_eq!(view.estimated_months, DEFAULT_MONTHS);
        assert_eq!(view.forecast, None);
        assert_eq!(view.milestones.medical, MilestoneStatus::Unknown);
    }
}
