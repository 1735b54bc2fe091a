//! Projected completion date and progress from a received date.

use chrono::{DateTime, Datelike, Local, Months, NaiveDate, Utc};

use crate::models::{ForecastResult, ProgressComparison};

const DATE_PREFIX_LEN: usize = 10;
const DISPLAY_FORMAT: &str = "%b %d, %Y";

/// Parse the `YYYY-MM-DD` prefix, so full ISO timestamps are accepted
pub fn parse_received(raw: &str) -> Option<NaiveDate> {
    let prefix = raw.trim().get(..DATE_PREFIX_LEN)?;
    NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()
}

/// Calendar date of `now` on the host clock. Every forecast path takes
/// "today" from here.
pub fn local_today(now: DateTime<Utc>) -> NaiveDate {
    now.with_timezone(&Local).date_naive()
}

/// Forecast against today's local date
pub fn calculate_forecast(received: Option<&str>, months: Option<u32>) -> Option<ForecastResult> {
    calculate_forecast_at(received, months, local_today(Utc::now()))
}

/// `None` when either input is missing, `months` is zero or the date does
/// not parse.
pub fn calculate_forecast_at(
    received: Option<&str>,
    months: Option<u32>,
    today: NaiveDate,
) -> Option<ForecastResult> {
    let months = months.filter(|&m| m > 0)?;
    let received = parse_received(received?)?;
    let completion = received.checked_add_months(Months::new(months))?;

    let days_remaining = (completion - today).num_days();
    let total_days = (completion - received).num_days();
    let days_elapsed = (today - received).num_days();

    let progress = if total_days > 0 {
        days_elapsed as f32 / total_days as f32
    } else {
        0.0
    };

    Some(ForecastResult {
        estimated_date: completion.format(DISPLAY_FORMAT).to_string(),
        days_remaining,
        progress: progress.clamp(0.0, 1.0),
    })
}

/// Whole-month view of the same timeline
pub fn compare_progress(
    received: Option<&str>,
    total_months: u32,
    today: NaiveDate,
) -> Option<ProgressComparison> {
    if total_months == 0 {
        return None;
    }
    let received = parse_received(received?)?;
    let elapsed = months_between(received, today);

    Some(ProgressComparison {
        months_elapsed: elapsed,
        months_remaining: total_months.saturating_sub(elapsed),
        progress: (elapsed as f32 / total_months as f32).clamp(0.0, 1.0),
    })
}

/// Complete calendar months from `start` to `end`, zero if `end` is earlier
fn months_between(start: NaiveDate, end: NaiveDate) -> u32 {
    if end <= start {
        return 0;
    }
    let mut months = (end.year() - start.year()) * 12 + end.month() as i32 - start.month() as i32;
    if end.day() < start.day() {
        months -= 1;
    }
    months.max(0) as u32
}
