use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Details-fetch result as returned by the portal
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetailsResponse {
    pub app: Option<AppMetadata>,
    pub relations: Option<Vec<Relation>>,
}

impl DetailsResponse {
    /// `relations[0]`, which carries the activities and history
    pub fn primary_relation(&self) -> Option<&Relation> {
        self.relations.as_ref().and_then(|r| r.first())
    }

    pub fn history(&self) -> &[HistoryEvent] {
        self.primary_relation()
            .and_then(|r| r.history.as_deref())
            .unwrap_or(&[])
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppMetadata {
    pub app_number: Option<String>,
    pub uci: Option<String>,
    pub status: Option<String>,
    pub last_updated: Option<String>,
    /// Wire field is misspelled upstream
    #[serde(rename = "dateRecieved", alias = "dateReceived")]
    pub date_received: Option<String>,
    pub lob: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Relation {
    pub activities: Option<Activities>,
    pub history: Option<Vec<HistoryEvent>>,
}

/// Structured milestone snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activities {
    pub eligibility: Option<String>,
    pub medical: Option<String>,
    pub background: Option<String>,
    pub biometrics: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEvent {
    pub key: String,
    pub date_created: Option<String>,
    #[serde(rename = "actStatus")]
    pub activity_status_code: Option<i32>,
    #[serde(rename = "actType")]
    pub activity_type_code: Option<i32>,
}

impl HistoryEvent {
    pub fn new(key: impl Into<String>, date_created: Option<&str>) -> Self {
        Self {
            key: key.into(),
            date_created: date_created.map(str::to_string),
            activity_status_code: None,
            activity_type_code: None,
        }
    }
}

/// Newest first; events without a date go last, ties keep input order.
pub fn newest_first(a: &HistoryEvent, b: &HistoryEvent) -> Ordering {
    match (&a.date_created, &b.date_created) {
        (Some(x), Some(y)) => y.cmp(x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Dashboard list entry
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationSummary {
    #[serde(rename = "appNum")]
    pub id: String,
    pub status: String,
    pub app_type: String,
    pub last_updated: String,
    pub pa_first_name: String,
    pub pa_last_name: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MilestoneStatus {
    Pending,
    Passed,
    #[default]
    Unknown,
}

/// Per-category review progress, derived on every fetch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationMilestones {
    pub medical: MilestoneStatus,
    pub biometrics: MilestoneStatus,
    pub background: MilestoneStatus,
    pub eligibility: MilestoneStatus,
    pub last_update_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastResult {
    pub estimated_date: String,
    /// Negative once the estimate has passed
    pub days_remaining: i64,
    pub progress: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressComparison {
    pub months_elapsed: u32,
    pub months_remaining: u32,
    pub progress: f32,
}

/// One rendered history row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEntry {
    pub key: String,
    pub title: String,
    pub description: Option<String>,
    pub explanation: Option<String>,
    pub date_created: Option<String>,
}

/// Everything the details screen needs from one fetch
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationView {
    pub app_number: Option<String>,
    pub status: Option<String>,
    pub status_label: Option<String>,
    pub closed: bool,
    pub milestones: ApplicationMilestones,
    pub timeline: Vec<TimelineEntry>,
    pub insights: BTreeMap<String, String>,
    pub estimated_months: u32,
    pub forecast: Option<ForecastResult>,
    pub comparison: Option<ProgressComparison>,
}

/// API Response
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub data: Option<serde_json::Value>,
}

impl ApiResponse {
    pub fn success(message: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            status: "success".to_string(),
            message: message.into(),
            data: Some(data),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            data: None,
        }
    }
}
