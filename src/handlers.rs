use crate::aggregator::{validate_request, LeadAggregator};
use crate::analytics::{self, AnalyticsQueryParams, AnalyticsResponse};
use crate::config::Config;
use crate::errors::AppError;
use crate::models::{
    AggregationRequest, LeadQueryParams, LeadsResponse, SortBy, SortOrder, SourceFilter,
    SourceType,
};
use crate::sources::LeadSources;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: PgPool,
    /// Application configuration.
    pub config: Config,
}

impl AppState {
    fn aggregator(&self) -> LeadAggregator {
        LeadAggregator::new(
            LeadSources::new(self.db.clone()),
            Duration::from_secs(self.config.aggregation_timeout_secs),
        )
    }
}

/// Health check endpoint.
///
/// Returns the service status and version.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "glec-leads-api",
            "version": "0.1.0"
        })),
    )
}

/// GET /api/v1/admin/leads
///
/// The unified lead feed: unions all five lead sources, applies the shared
/// filters, sorts, paginates and returns the page together with stats over
/// the full filtered set. Assumes an already-authenticated admin caller.
pub async fn get_leads(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LeadQueryParams>,
) -> Result<Json<LeadsResponse>, AppError> {
    tracing::info!("GET /api/v1/admin/leads - params: {:?}", params);

    let request = validate_request(&params)?;
    let response = state.aggregator().aggregate(&request).await?;

    tracing::info!(
        "Returning {} of {} leads (avg score {})",
        response.data.len(),
        response.meta.total,
        response.stats.avg_score
    );
    Ok(Json(response))
}

/// GET /api/v1/admin/leads/analytics
///
/// Dashboard rollups over the same union: acquisition time series, score
/// histogram, status and source distributions. Defaults to the trailing
/// 30 days.
pub async fn get_lead_analytics(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AnalyticsQueryParams>,
) -> Result<Json<AnalyticsResponse>, AppError> {
    tracing::info!("GET /api/v1/admin/leads/analytics - params: {:?}", params);

    let request = analytics::validate_analytics_request(&params, Utc::now())?;
    let union_request = AggregationRequest {
        page: 1,
        per_page: 20,
        source_types: SourceType::ALL.to_vec(),
        filter: SourceFilter {
            date_from: Some(request.date_from),
            date_to: Some(request.date_to),
            ..Default::default()
        },
        score_min: 0,
        score_max: 100,
        sort_by: SortBy::Score,
        sort_order: SortOrder::Desc,
    };

    let leads = state.aggregator().fetch_union(&union_request).await?;
    let data = analytics::build_analytics(&leads, &request);

    Ok(Json(AnalyticsResponse {
        success: true,
        data,
    }))
}
