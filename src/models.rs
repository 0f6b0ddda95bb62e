use crate::scoring;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

// ============ Source Types ============

/// The originating channel a lead came from. Immutable, assigned at read
/// time, and determines which scoring formula applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SourceType {
    LibraryLead,
    ContactForm,
    DemoRequest,
    EventRegistration,
    Partnership,
}

impl SourceType {
    /// All five source types, in the order the union is assembled.
    pub const ALL: [SourceType; 5] = [
        SourceType::LibraryLead,
        SourceType::ContactForm,
        SourceType::DemoRequest,
        SourceType::EventRegistration,
        SourceType::Partnership,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::LibraryLead => "LIBRARY_LEAD",
            SourceType::ContactForm => "CONTACT_FORM",
            SourceType::DemoRequest => "DEMO_REQUEST",
            SourceType::EventRegistration => "EVENT_REGISTRATION",
            SourceType::Partnership => "PARTNERSHIP",
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceType {
    type Err = String;

    /// Strict parse: unknown values are rejected so a typo in a filter fails
    /// the request instead of silently dropping a source.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LIBRARY_LEAD" => Ok(SourceType::LibraryLead),
            "CONTACT_FORM" => Ok(SourceType::ContactForm),
            "DEMO_REQUEST" => Ok(SourceType::DemoRequest),
            "EVENT_REGISTRATION" => Ok(SourceType::EventRegistration),
            "PARTNERSHIP" => Ok(SourceType::Partnership),
            other => Err(format!("unknown source type: {}", other)),
        }
    }
}

// ============ Unified Lead ============

/// Source-specific attributes carried alongside the common lead fields.
///
/// One variant per source type; serialized flattened into the lead object so
/// the wire shape stays close to the admin UI's flat columns.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum SourceAttributes {
    Library {
        library_category: Option<String>,
        library_item_title: Option<String>,
        marketing_consent: bool,
    },
    Contact {
        inquiry_type: Option<String>,
        message: Option<String>,
    },
    Demo {
        product_interests: Vec<String>,
        additional_message: Option<String>,
    },
    Event {
        event_name: Option<String>,
    },
    Partnership {
        partnership_type: Option<String>,
        proposal: Option<String>,
    },
}

/// A normalized, scored lead. Computed per aggregation request from a live
/// source row; never persisted (the score depends on recency and is
/// recomputed on every call).
#[derive(Debug, Clone, Serialize)]
pub struct Lead {
    pub lead_id: String,
    pub source_type: SourceType,
    pub company_name: String,
    pub contact_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub status: String,
    /// Always within [0, 100]; each scorer clamps its output.
    pub lead_score: i32,
    pub created_at: DateTime<Utc>,
    pub days_old: i64,
    #[serde(flatten)]
    pub attributes: SourceAttributes,
}

fn days_between(now: DateTime<Utc>, created_at: DateTime<Utc>) -> i64 {
    // A row timestamped in the future (clock skew) counts as brand new.
    (now - created_at).num_days().max(0)
}

impl Lead {
    pub fn from_library(row: LibraryLeadRow, now: DateTime<Utc>) -> Self {
        let score = scoring::score_library_lead(
            row.library_category.as_deref(),
            &row.email,
            row.marketing_consent,
            row.phone.is_some(),
            row.utm_source.is_some() || row.utm_medium.is_some() || row.utm_campaign.is_some(),
        );
        Lead {
            lead_id: row.id,
            source_type: SourceType::LibraryLead,
            company_name: row.company_name,
            contact_name: row.contact_name,
            email: row.email,
            phone: row.phone,
            status: row.lead_status,
            lead_score: score,
            created_at: row.created_at,
            days_old: days_between(now, row.created_at),
            attributes: SourceAttributes::Library {
                library_category: row.library_category,
                library_item_title: row.library_item_title,
                marketing_consent: row.marketing_consent,
            },
        }
    }

    pub fn from_contact(row: ContactRow, now: DateTime<Utc>) -> Self {
        let days_old = days_between(now, row.created_at);
        Lead {
            lead_id: row.id,
            source_type: SourceType::ContactForm,
            company_name: row.company_name,
            contact_name: row.contact_name,
            email: row.email,
            phone: row.phone,
            // Contact submissions carry no workflow status of their own
            status: "NEW".to_string(),
            lead_score: scoring::score_contact_form(days_old),
            created_at: row.created_at,
            days_old,
            attributes: SourceAttributes::Contact {
                inquiry_type: row.inquiry_type,
                message: row.message,
            },
        }
    }

    pub fn from_demo_request(row: DemoRequestRow, now: DateTime<Utc>) -> Self {
        let score = scoring::score_demo_request(&row.status);
        Lead {
            lead_id: row.id,
            source_type: SourceType::DemoRequest,
            company_name: row.company_name,
            contact_name: row.contact_name,
            email: row.email,
            phone: row.phone,
            status: row.status,
            lead_score: score,
            created_at: row.created_at,
            days_old: days_between(now, row.created_at),
            attributes: SourceAttributes::Demo {
                product_interests: row.product_interests.unwrap_or_default(),
                additional_message: row.additional_message,
            },
        }
    }

    pub fn from_event_registration(row: EventRegistrationRow, now: DateTime<Utc>) -> Self {
        let score = scoring::score_event_registration(&row.status);
        Lead {
            lead_id: row.id,
            source_type: SourceType::EventRegistration,
            company_name: row.company_name,
            contact_name: row.contact_name,
            email: row.email,
            phone: row.phone,
            status: row.status,
            lead_score: score,
            created_at: row.created_at,
            days_old: days_between(now, row.created_at),
            attributes: SourceAttributes::Event {
                event_name: row.event_name,
            },
        }
    }

    pub fn from_partnership(row: PartnershipRow, now: DateTime<Utc>) -> Self {
        let status = row.status.unwrap_or_else(|| "NEW".to_string());
        let score = scoring::score_partnership(&status);
        Lead {
            lead_id: row.id,
            source_type: SourceType::Partnership,
            company_name: row.company_name,
            contact_name: row.contact_name,
            email: row.email,
            phone: None,
            status,
            lead_score: score,
            created_at: row.created_at,
            days_old: days_between(now, row.created_at),
            attributes: SourceAttributes::Partnership {
                partnership_type: row.partnership_type,
                proposal: row.proposal,
            },
        }
    }
}

// ============ Raw Source Rows ============

/// Raw row from `library_leads`, joined with `library_items` for the
/// category used by the scorer.
#[derive(Debug, Clone, FromRow)]
pub struct LibraryLeadRow {
    pub id: String,
    pub company_name: String,
    pub contact_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub lead_status: String,
    pub marketing_consent: bool,
    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_campaign: Option<String>,
    pub library_item_title: Option<String>,
    pub library_category: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Raw row from `contacts`.
#[derive(Debug, Clone, FromRow)]
pub struct ContactRow {
    pub id: String,
    pub company_name: String,
    pub contact_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub inquiry_type: Option<String>,
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Raw row from `demo_requests`.
#[derive(Debug, Clone, FromRow)]
pub struct DemoRequestRow {
    pub id: String,
    pub company_name: String,
    pub contact_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub status: String,
    pub product_interests: Option<Vec<String>>,
    pub additional_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Raw row from `event_registrations`, joined with `events` for the title.
#[derive(Debug, Clone, FromRow)]
pub struct EventRegistrationRow {
    pub id: String,
    pub company_name: String,
    pub contact_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub status: String,
    pub event_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Raw row from `partnerships`. The table has no phone column and status is
/// nullable for legacy rows.
#[derive(Debug, Clone, FromRow)]
pub struct PartnershipRow {
    pub id: String,
    pub company_name: String,
    pub contact_name: String,
    pub email: String,
    pub status: Option<String>,
    pub partnership_type: Option<String>,
    pub proposal: Option<String>,
    pub created_at: DateTime<Utc>,
}

// ============ API Request/Response Models ============

/// Raw query parameters for `GET /api/v1/admin/leads`, all optional.
/// Validated and normalized into an [`AggregationRequest`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LeadQueryParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    /// Comma-separated list of source types, or absent for all five.
    pub source_types: Option<String>,
    pub status: Option<String>,
    pub search: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub score_min: Option<i32>,
    pub score_max: Option<i32>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

/// Sort key for the unified feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortBy {
    Score,
    Date,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Filters shared by all five source readers.
#[derive(Debug, Clone, Default)]
pub struct SourceFilter {
    pub search: Option<String>,
    pub status: Option<String>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
}

/// A validated aggregation request.
#[derive(Debug, Clone)]
pub struct AggregationRequest {
    pub page: u32,
    pub per_page: u32,
    pub source_types: Vec<SourceType>,
    pub filter: SourceFilter,
    pub score_min: i32,
    pub score_max: i32,
    pub sort_by: SortBy,
    pub sort_order: SortOrder,
}

/// Pagination metadata for the returned page.
#[derive(Debug, Clone, Serialize)]
pub struct PageMeta {
    pub page: u32,
    pub per_page: u32,
    pub total: u64,
    pub total_pages: u64,
}

/// One value per source type, serialized under the wire names.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct PerSource<T> {
    pub library_lead: T,
    pub contact_form: T,
    pub demo_request: T,
    pub event_registration: T,
    pub partnership: T,
}

impl<T> PerSource<T> {
    pub fn get(&self, source: SourceType) -> &T {
        match source {
            SourceType::LibraryLead => &self.library_lead,
            SourceType::ContactForm => &self.contact_form,
            SourceType::DemoRequest => &self.demo_request,
            SourceType::EventRegistration => &self.event_registration,
            SourceType::Partnership => &self.partnership,
        }
    }

    pub fn get_mut(&mut self, source: SourceType) -> &mut T {
        match source {
            SourceType::LibraryLead => &mut self.library_lead,
            SourceType::ContactForm => &mut self.contact_form,
            SourceType::DemoRequest => &mut self.demo_request,
            SourceType::EventRegistration => &mut self.event_registration,
            SourceType::Partnership => &mut self.partnership,
        }
    }
}

/// Aggregate statistics over the filtered-but-unpaginated union, so a
/// dashboard sees correct totals regardless of the requested page.
#[derive(Debug, Clone, Serialize)]
pub struct LeadStats {
    pub total_leads: u64,
    pub avg_score: i32,
    pub by_source: PerSource<u64>,
    pub avg_score_by_source: PerSource<i32>,
}

/// Response payload for the unified leads endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct LeadsResponse {
    pub success: bool,
    pub data: Vec<Lead>,
    pub meta: PageMeta,
    pub stats: LeadStats,
}
