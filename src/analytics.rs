//! Analytics rollups over the unified lead feed.
//!
//! Backs the admin dashboard's visualizations: acquisition time series,
//! score histogram and status/source distributions, all derived from the
//! same filtered union the leads feed returns. Same fail-fast policy; a
//! chart computed over a partial union would be silently wrong.

use crate::errors::AppError;
use crate::models::{Lead, PerSource, SourceType};
use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Upper bound on time-series intervals per request. The series is computed
/// in memory, one pass over the lead slice per interval, so an unbounded
/// date range must be rejected up front.
const MAX_TIME_SERIES_INTERVALS: i64 = 1000;

/// Bucketing interval for the acquisition time series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    Day,
    Week,
    Month,
}

impl Granularity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Day => "day",
            Granularity::Week => "week",
            Granularity::Month => "month",
        }
    }
}

/// Raw query parameters for the analytics endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalyticsQueryParams {
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub granularity: Option<String>,
}

/// A validated analytics request. Defaults to the trailing 30 days.
#[derive(Debug, Clone)]
pub struct AnalyticsRequest {
    pub date_from: DateTime<Utc>,
    pub date_to: DateTime<Utc>,
    pub granularity: Granularity,
}

#[derive(Debug, Clone, Serialize)]
pub struct DateRange {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub granularity: &'static str,
}

/// Leads created within one time-series interval, per source plus a total.
#[derive(Debug, Clone, Serialize)]
pub struct TimeSeriesPoint {
    pub date: String,
    #[serde(flatten)]
    pub by_source: PerSource<u64>,
    pub total: u64,
}

/// One bar of the score histogram ("0-10" through "90-100").
#[derive(Debug, Clone, Serialize)]
pub struct ScoreBucket {
    pub range: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusCount {
    pub status: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceCount {
    pub source: SourceType,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsData {
    pub date_range: DateRange,
    pub time_series: Vec<TimeSeriesPoint>,
    pub score_distribution: Vec<ScoreBucket>,
    pub status_distribution: Vec<StatusCount>,
    pub source_distribution: Vec<SourceCount>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsResponse {
    pub success: bool,
    pub data: AnalyticsData,
}

/// Validate raw analytics parameters, applying the trailing-30-days default.
pub fn validate_analytics_request(
    params: &AnalyticsQueryParams,
    now: DateTime<Utc>,
) -> Result<AnalyticsRequest, AppError> {
    let date_from = params
        .date_from
        .as_deref()
        .map(|s| crate::aggregator::parse_date_param(s, false))
        .transpose()?
        .unwrap_or(now - Duration::days(30));
    let date_to = params
        .date_to
        .as_deref()
        .map(|s| crate::aggregator::parse_date_param(s, true))
        .transpose()?
        .unwrap_or(now);
    if date_from > date_to {
        return Err(AppError::Validation(
            "date_from must not be after date_to".to_string(),
        ));
    }

    let granularity = match params.granularity.as_deref() {
        None | Some("day") => Granularity::Day,
        Some("week") => Granularity::Week,
        Some("month") => Granularity::Month,
        Some(other) => {
            return Err(AppError::Validation(format!(
                "granularity must be 'day', 'week' or 'month', got '{}'",
                other
            )))
        }
    };

    let span_days = (date_to - date_from).num_days();
    let intervals = match granularity {
        Granularity::Day => span_days + 1,
        Granularity::Week => span_days / 7 + 1,
        Granularity::Month => span_days / 30 + 1,
    };
    if intervals > MAX_TIME_SERIES_INTERVALS {
        return Err(AppError::Validation(format!(
            "date range spans about {} '{}' intervals, the maximum is {}",
            intervals,
            granularity.as_str(),
            MAX_TIME_SERIES_INTERVALS
        )));
    }

    Ok(AnalyticsRequest {
        date_from,
        date_to,
        granularity,
    })
}

/// Build the full analytics payload from one filtered union.
pub fn build_analytics(leads: &[Lead], request: &AnalyticsRequest) -> AnalyticsData {
    AnalyticsData {
        date_range: DateRange {
            from: request.date_from,
            to: request.date_to,
            granularity: request.granularity.as_str(),
        },
        time_series: time_series(leads, request),
        score_distribution: score_distribution(leads),
        status_distribution: status_distribution(leads),
        source_distribution: source_distribution(leads),
    }
}

/// Histogram of lead scores in ten buckets of 10. Scores of 100 land in the
/// top bucket, so every lead is counted exactly once.
pub fn score_distribution(leads: &[Lead]) -> Vec<ScoreBucket> {
    let mut counts = [0u64; 10];
    for lead in leads {
        let bucket = ((lead.lead_score / 10) as usize).min(9);
        counts[bucket] += 1;
    }
    counts
        .iter()
        .enumerate()
        .map(|(i, &count)| ScoreBucket {
            range: format!("{}-{}", i * 10, (i + 1) * 10),
            count,
        })
        .collect()
}

/// Count per status string, ordered by count descending (status name breaks
/// ties) so repeated calls return the same chart.
pub fn status_distribution(leads: &[Lead]) -> Vec<StatusCount> {
    let mut counts: std::collections::HashMap<&str, u64> = std::collections::HashMap::new();
    for lead in leads {
        *counts.entry(lead.status.as_str()).or_insert(0) += 1;
    }
    let mut distribution: Vec<StatusCount> = counts
        .into_iter()
        .map(|(status, count)| StatusCount {
            status: status.to_string(),
            count,
        })
        .collect();
    distribution.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.status.cmp(&b.status)));
    distribution
}

/// Count per source type, always listing all five.
pub fn source_distribution(leads: &[Lead]) -> Vec<SourceCount> {
    let mut counts: PerSource<u64> = PerSource::default();
    for lead in leads {
        *counts.get_mut(lead.source_type) += 1;
    }
    SourceType::ALL
        .into_iter()
        .map(|source| SourceCount {
            source,
            count: *counts.get(source),
        })
        .collect()
}

/// Lead acquisition per interval between the requested dates.
pub fn time_series(leads: &[Lead], request: &AnalyticsRequest) -> Vec<TimeSeriesPoint> {
    let starts = interval_starts(
        request.date_from.date_naive(),
        request.date_to.date_naive(),
        request.granularity,
    );

    starts
        .iter()
        .map(|&start| {
            let end = next_interval(start, request.granularity);
            let mut by_source: PerSource<u64> = PerSource::default();
            let mut total = 0u64;
            for lead in leads {
                let created = lead.created_at.date_naive();
                if created >= start && created < end {
                    *by_source.get_mut(lead.source_type) += 1;
                    total += 1;
                }
            }
            TimeSeriesPoint {
                date: format_interval(start, request.granularity),
                by_source,
                total,
            }
        })
        .collect()
}

/// Interval start dates covering [from, to]. Weeks start on Monday, months
/// on the 1st, matching the dashboard's original bucketing.
fn interval_starts(from: NaiveDate, to: NaiveDate, granularity: Granularity) -> Vec<NaiveDate> {
    let mut cursor = match granularity {
        Granularity::Day => from,
        Granularity::Week => {
            from - Duration::days(i64::from(from.weekday().num_days_from_monday()))
        }
        Granularity::Month => from.with_day(1).unwrap_or(from),
    };

    let mut starts = Vec::new();
    while cursor <= to {
        starts.push(cursor);
        cursor = next_interval(cursor, granularity);
    }
    starts
}

fn next_interval(start: NaiveDate, granularity: Granularity) -> NaiveDate {
    match granularity {
        Granularity::Day => start + Duration::days(1),
        Granularity::Week => start + Duration::days(7),
        Granularity::Month => start
            .checked_add_months(Months::new(1))
            .unwrap_or(start + Duration::days(31)),
    }
}

fn format_interval(start: NaiveDate, granularity: Granularity) -> String {
    match granularity {
        Granularity::Day | Granularity::Week => start.format("%Y-%m-%d").to_string(),
        Granularity::Month => start.format("%Y-%m").to_string(),
    }
}
