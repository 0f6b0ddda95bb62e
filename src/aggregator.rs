//! Unified lead aggregation.
//!
//! Single entry point for the admin leads feed: validates the request, fans
//! out to the five source readers concurrently under one time budget, unions
//! the results (fail-fast, never a partial union), sorts, computes stats over
//! the full filtered set and slices the requested page.

use crate::errors::AppError;
use crate::models::{
    AggregationRequest, Lead, LeadQueryParams, LeadStats, LeadsResponse, PageMeta, PerSource,
    SortBy, SortOrder, SourceFilter, SourceType,
};
use crate::sources::LeadSources;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use std::time::Duration;

const DEFAULT_PAGE: u32 = 1;
const DEFAULT_PER_PAGE: u32 = 20;
const MAX_PER_PAGE: u32 = 100;

pub struct LeadAggregator {
    sources: LeadSources,
    timeout: Duration,
}

impl LeadAggregator {
    pub fn new(sources: LeadSources, timeout: Duration) -> Self {
        Self { sources, timeout }
    }

    /// Run one aggregation request end to end.
    pub async fn aggregate(&self, request: &AggregationRequest) -> Result<LeadsResponse, AppError> {
        let leads = self.fetch_union(request).await?;
        let response = assemble_response(leads, request);

        tracing::info!(
            "Aggregated {} leads across {} sources (page {}/{})",
            response.meta.total,
            request.source_types.len(),
            response.meta.page,
            response.meta.total_pages
        );

        Ok(response)
    }

    /// Fan out to the requested source readers and join the results.
    ///
    /// The five tables are disjoint and the readers share no mutable state,
    /// so the reads run concurrently. Any single failure aborts the whole
    /// union, and the entire fan-out is bounded by one timeout.
    pub async fn fetch_union(&self, request: &AggregationRequest) -> Result<Vec<Lead>, AppError> {
        let wanted = &request.source_types;
        let filter = &request.filter;

        let union = tokio::time::timeout(self.timeout, async {
            let (library, contacts, demos, events, partnerships) = tokio::join!(
                self.read_if(SourceType::LibraryLead, filter, wanted),
                self.read_if(SourceType::ContactForm, filter, wanted),
                self.read_if(SourceType::DemoRequest, filter, wanted),
                self.read_if(SourceType::EventRegistration, filter, wanted),
                self.read_if(SourceType::Partnership, filter, wanted),
            );
            merge_results(vec![library, contacts, demos, events, partnerships])
        })
        .await
        .map_err(|_| {
            AppError::Timeout(format!(
                "aggregation exceeded {}s time budget",
                self.timeout.as_secs()
            ))
        })??;

        Ok(union)
    }

    /// Read one source if it was requested. An unrequested source
    /// contributes an empty set without touching the database.
    pub async fn read_if(
        &self,
        source: SourceType,
        filter: &SourceFilter,
        wanted: &[SourceType],
    ) -> Result<Vec<Lead>, AppError> {
        if !wanted.contains(&source) {
            return Ok(Vec::new());
        }
        self.sources.read(source, filter).await
    }
}

// ============ Request validation ============

/// Validate raw query parameters into an [`AggregationRequest`].
///
/// Unknown enum values and inconsistent ranges are rejected up front; a typo
/// must fail the request, not silently change its meaning.
pub fn validate_request(params: &LeadQueryParams) -> Result<AggregationRequest, AppError> {
    let page = params.page.unwrap_or(DEFAULT_PAGE);
    if page < 1 {
        return Err(AppError::Validation("page must be at least 1".to_string()));
    }

    let per_page = params.per_page.unwrap_or(DEFAULT_PER_PAGE);
    if !(1..=MAX_PER_PAGE).contains(&per_page) {
        return Err(AppError::Validation(format!(
            "per_page must be between 1 and {}",
            MAX_PER_PAGE
        )));
    }

    let source_types = parse_source_types(params.source_types.as_deref())?;

    let score_min = params.score_min.unwrap_or(0);
    let score_max = params.score_max.unwrap_or(100);
    if !(0..=100).contains(&score_min) || !(0..=100).contains(&score_max) {
        return Err(AppError::Validation(
            "score_min and score_max must be between 0 and 100".to_string(),
        ));
    }
    if score_min > score_max {
        return Err(AppError::Validation(
            "score_min must not exceed score_max".to_string(),
        ));
    }

    let date_from = params
        .date_from
        .as_deref()
        .map(|s| parse_date_param(s, false))
        .transpose()?;
    let date_to = params
        .date_to
        .as_deref()
        .map(|s| parse_date_param(s, true))
        .transpose()?;
    if let (Some(from), Some(to)) = (date_from, date_to) {
        if from > to {
            return Err(AppError::Validation(
                "date_from must not be after date_to".to_string(),
            ));
        }
    }

    let sort_by = match params.sort_by.as_deref() {
        None | Some("score") => SortBy::Score,
        Some("date") => SortBy::Date,
        Some(other) => {
            return Err(AppError::Validation(format!(
                "sort_by must be 'score' or 'date', got '{}'",
                other
            )))
        }
    };
    let sort_order = match params.sort_order.as_deref() {
        None | Some("desc") => SortOrder::Desc,
        Some("asc") => SortOrder::Asc,
        Some(other) => {
            return Err(AppError::Validation(format!(
                "sort_order must be 'asc' or 'desc', got '{}'",
                other
            )))
        }
    };

    Ok(AggregationRequest {
        page,
        per_page,
        source_types,
        filter: SourceFilter {
            search: params.search.clone().filter(|s| !s.trim().is_empty()),
            status: params.status.clone().filter(|s| !s.trim().is_empty()),
            date_from,
            date_to,
        },
        score_min,
        score_max,
        sort_by,
        sort_order,
    })
}

/// Parse a comma-separated source type list. Absent or "ALL" means all five.
fn parse_source_types(raw: Option<&str>) -> Result<Vec<SourceType>, AppError> {
    let Some(raw) = raw.filter(|s| !s.trim().is_empty()) else {
        return Ok(SourceType::ALL.to_vec());
    };
    if raw.trim() == "ALL" {
        return Ok(SourceType::ALL.to_vec());
    }

    let mut types = Vec::new();
    for part in raw.split(',') {
        let source: SourceType = part
            .trim()
            .parse()
            .map_err(AppError::Validation)?;
        if !types.contains(&source) {
            types.push(source);
        }
    }
    Ok(types)
}

/// Accept either an RFC 3339 timestamp or a bare `YYYY-MM-DD` date.
/// A bare end date is widened to end-of-day so the range stays inclusive.
pub(crate) fn parse_date_param(raw: &str, end_of_day: bool) -> Result<DateTime<Utc>, AppError> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        let time = if end_of_day {
            date.and_hms_opt(23, 59, 59).unwrap_or_default()
        } else {
            date.and_hms_opt(0, 0, 0).unwrap_or_default()
        };
        return Ok(Utc.from_utc_datetime(&time));
    }
    Err(AppError::Validation(format!(
        "invalid date '{}': expected RFC 3339 or YYYY-MM-DD",
        raw
    )))
}

// ============ Pure pipeline steps ============

/// Assemble the response from an already-fetched union: apply the score
/// range filter, sort, compute stats over the filtered set and slice the
/// requested page. Split from the async fan-out so the in-memory steps are
/// testable without a database.
pub fn assemble_response(mut leads: Vec<Lead>, request: &AggregationRequest) -> LeadsResponse {
    // Scores are computed at read time, so the score range filter can
    // only be applied after the union
    leads.retain(|lead| {
        lead.lead_score >= request.score_min && lead.lead_score <= request.score_max
    });

    sort_leads(&mut leads, request.sort_by, request.sort_order);
    let stats = compute_stats(&leads);
    let (data, meta) = paginate(leads, request.page, request.per_page);

    LeadsResponse {
        success: true,
        data,
        meta,
        stats,
    }
}

/// Stable sort by the requested key, ties broken by `created_at` descending.
pub fn sort_leads(leads: &mut [Lead], sort_by: SortBy, order: SortOrder) {
    match (sort_by, order) {
        (SortBy::Score, SortOrder::Desc) => leads.sort_by(|a, b| {
            b.lead_score
                .cmp(&a.lead_score)
                .then_with(|| b.created_at.cmp(&a.created_at))
        }),
        (SortBy::Score, SortOrder::Asc) => leads.sort_by(|a, b| {
            a.lead_score
                .cmp(&b.lead_score)
                .then_with(|| b.created_at.cmp(&a.created_at))
        }),
        (SortBy::Date, SortOrder::Desc) => leads.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        (SortBy::Date, SortOrder::Asc) => leads.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
    }
}

/// Compute stats over the filtered-but-unpaginated union.
pub fn compute_stats(leads: &[Lead]) -> LeadStats {
    let mut counts: PerSource<u64> = PerSource::default();
    let mut score_sums: PerSource<i64> = PerSource::default();
    let mut total_score: i64 = 0;

    for lead in leads {
        *counts.get_mut(lead.source_type) += 1;
        *score_sums.get_mut(lead.source_type) += i64::from(lead.lead_score);
        total_score += i64::from(lead.lead_score);
    }

    let avg = |sum: i64, count: u64| -> i32 {
        if count == 0 {
            0
        } else {
            (sum as f64 / count as f64).round() as i32
        }
    };

    let mut avg_by_source: PerSource<i32> = PerSource::default();
    for source in SourceType::ALL {
        *avg_by_source.get_mut(source) =
            avg(*score_sums.get(source), *counts.get(source));
    }

    LeadStats {
        total_leads: leads.len() as u64,
        avg_score: avg(total_score, leads.len() as u64),
        by_source: counts,
        avg_score_by_source: avg_by_source,
    }
}

/// Slice one page out of the sorted union. Pages are 1-based; a page past
/// the end returns an empty data set with correct metadata.
pub fn paginate(leads: Vec<Lead>, page: u32, per_page: u32) -> (Vec<Lead>, PageMeta) {
    let total = leads.len() as u64;
    let total_pages = total.div_ceil(u64::from(per_page));
    let offset = (u64::from(page) - 1) * u64::from(per_page);

    let data: Vec<Lead> = leads
        .into_iter()
        .skip(offset as usize)
        .take(per_page as usize)
        .collect();

    (
        data,
        PageMeta {
            page,
            per_page,
            total,
            total_pages,
        },
    )
}

/// Merge per-source read results into one union, aborting on the first
/// failure. Kept separate from the async fan-out so the fail-fast policy is
/// testable without a live database.
pub fn merge_results(results: Vec<Result<Vec<Lead>, AppError>>) -> Result<Vec<Lead>, AppError> {
    let mut union = Vec::new();
    for result in results {
        union.extend(result?);
    }
    Ok(union)
}
