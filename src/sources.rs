use crate::errors::{AppError, ResultExt};
use crate::models::{
    ContactRow, DemoRequestRow, EventRegistrationRow, Lead, LibraryLeadRow, PartnershipRow,
    SourceFilter, SourceType,
};
use chrono::Utc;
use sqlx::{PgPool, Postgres, QueryBuilder};

/// Read-only access to the five lead-producing tables.
///
/// Each reader pushes the shared filters (date range, case-insensitive
/// search, status) down into SQL, maps rows into the unified [`Lead`] shape
/// and invokes the matching scorer. The tables are owned and mutated by
/// unrelated write paths; no reader takes locks or opens a transaction
/// across the union.
pub struct LeadSources {
    pool: PgPool,
}

/// A status filter of "ALL" (or none) matches every row.
fn active_status(filter: &SourceFilter) -> Option<&str> {
    filter.status.as_deref().filter(|s| *s != "ALL")
}

/// Append an inclusive `created_at` range to the WHERE clause.
fn push_date_range(qb: &mut QueryBuilder<'_, Postgres>, column: &str, filter: &SourceFilter) {
    if let Some(from) = filter.date_from {
        qb.push(format!(" AND {} >= ", column)).push_bind(from);
    }
    if let Some(to) = filter.date_to {
        qb.push(format!(" AND {} <= ", column)).push_bind(to);
    }
}

/// Append a case-insensitive substring match over the given columns.
/// LIKE metacharacters in the user's search text are escaped.
fn push_search(qb: &mut QueryBuilder<'_, Postgres>, columns: &[&str], filter: &SourceFilter) {
    let Some(search) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) else {
        return;
    };
    let pattern = format!(
        "%{}%",
        search
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_")
    );
    qb.push(" AND (");
    for (i, column) in columns.iter().enumerate() {
        if i > 0 {
            qb.push(" OR ");
        }
        qb.push(format!("{} ILIKE ", column)).push_bind(pattern.clone());
    }
    qb.push(")");
}

impl LeadSources {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Dispatch to the reader for one source type.
    pub async fn read(
        &self,
        source: SourceType,
        filter: &SourceFilter,
    ) -> Result<Vec<Lead>, AppError> {
        match source {
            SourceType::LibraryLead => self.read_library_leads(filter).await,
            SourceType::ContactForm => self.read_contacts(filter).await,
            SourceType::DemoRequest => self.read_demo_requests(filter).await,
            SourceType::EventRegistration => self.read_event_registrations(filter).await,
            SourceType::Partnership => self.read_partnerships(filter).await,
        }
    }

    /// Library download leads, joined with `library_items` for the category
    /// weighting used by the scorer.
    pub async fn read_library_leads(&self, filter: &SourceFilter) -> Result<Vec<Lead>, AppError> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
            "SELECT ll.id::text AS id, ll.company_name, ll.contact_name, ll.email, ll.phone, \
             ll.lead_status, ll.marketing_consent, ll.utm_source, ll.utm_medium, ll.utm_campaign, \
             ll.library_item_title, li.category::text AS library_category, ll.created_at \
             FROM library_leads ll \
             LEFT JOIN library_items li ON li.id = ll.library_item_id \
             WHERE 1=1",
        );
        push_date_range(&mut qb, "ll.created_at", filter);
        push_search(
            &mut qb,
            &["ll.company_name", "ll.contact_name", "ll.email"],
            filter,
        );
        if let Some(status) = active_status(filter) {
            qb.push(" AND ll.lead_status = ").push_bind(status.to_string());
        }
        qb.push(" ORDER BY ll.created_at DESC");

        let rows: Vec<LibraryLeadRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .context("reading library_leads")?;

        tracing::debug!("library_leads: {} rows after filters", rows.len());
        let now = Utc::now();
        Ok(rows
            .into_iter()
            .map(|row| Lead::from_library(row, now))
            .collect())
    }

    /// Contact-form submissions. The table carries no workflow status; every
    /// row surfaces as NEW, so any other status filter matches nothing.
    pub async fn read_contacts(&self, filter: &SourceFilter) -> Result<Vec<Lead>, AppError> {
        if active_status(filter).is_some_and(|s| s != "NEW") {
            return Ok(Vec::new());
        }

        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
            "SELECT c.id::text AS id, c.company_name, c.contact_name, c.email, c.phone, \
             c.inquiry_type::text AS inquiry_type, c.message, c.created_at \
             FROM contacts c \
             WHERE 1=1",
        );
        push_date_range(&mut qb, "c.created_at", filter);
        push_search(
            &mut qb,
            &["c.company_name", "c.contact_name", "c.email"],
            filter,
        );
        qb.push(" ORDER BY c.created_at DESC");

        let rows: Vec<ContactRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .context("reading contacts")?;

        tracing::debug!("contacts: {} rows after filters", rows.len());
        let now = Utc::now();
        Ok(rows
            .into_iter()
            .map(|row| Lead::from_contact(row, now))
            .collect())
    }

    /// Demo requests, scored from their workflow status.
    pub async fn read_demo_requests(&self, filter: &SourceFilter) -> Result<Vec<Lead>, AppError> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
            "SELECT dr.id::text AS id, dr.company_name, dr.contact_name, dr.email, dr.phone, \
             dr.status::text AS status, dr.product_interests, dr.additional_message, dr.created_at \
             FROM demo_requests dr \
             WHERE 1=1",
        );
        push_date_range(&mut qb, "dr.created_at", filter);
        push_search(
            &mut qb,
            &["dr.company_name", "dr.contact_name", "dr.email"],
            filter,
        );
        if let Some(status) = active_status(filter) {
            qb.push(" AND dr.status::text = ").push_bind(status.to_string());
        }
        qb.push(" ORDER BY dr.created_at DESC");

        let rows: Vec<DemoRequestRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .context("reading demo_requests")?;

        tracing::debug!("demo_requests: {} rows after filters", rows.len());
        let now = Utc::now();
        Ok(rows
            .into_iter()
            .map(|row| Lead::from_demo_request(row, now))
            .collect())
    }

    /// Event registrations, joined with `events` for the event title.
    pub async fn read_event_registrations(
        &self,
        filter: &SourceFilter,
    ) -> Result<Vec<Lead>, AppError> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
            "SELECT er.id::text AS id, er.company_name, er.contact_name, er.email, er.phone, \
             er.status::text AS status, e.title AS event_name, er.created_at \
             FROM event_registrations er \
             LEFT JOIN events e ON e.id = er.event_id \
             WHERE 1=1",
        );
        push_date_range(&mut qb, "er.created_at", filter);
        push_search(
            &mut qb,
            &["er.company_name", "er.contact_name", "er.email"],
            filter,
        );
        if let Some(status) = active_status(filter) {
            qb.push(" AND er.status::text = ").push_bind(status.to_string());
        }
        qb.push(" ORDER BY er.created_at DESC");

        let rows: Vec<EventRegistrationRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .context("reading event_registrations")?;

        tracing::debug!("event_registrations: {} rows after filters", rows.len());
        let now = Utc::now();
        Ok(rows
            .into_iter()
            .map(|row| Lead::from_event_registration(row, now))
            .collect())
    }

    /// Partnership applications. Status is nullable for legacy rows and
    /// defaults to NEW, matching the admin view's COALESCE.
    pub async fn read_partnerships(&self, filter: &SourceFilter) -> Result<Vec<Lead>, AppError> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
            "SELECT p.id::text AS id, p.company_name, p.contact_name, p.email, \
             p.status::text AS status, p.partnership_type::text AS partnership_type, \
             p.proposal, p.created_at \
             FROM partnerships p \
             WHERE 1=1",
        );
        push_date_range(&mut qb, "p.created_at", filter);
        push_search(
            &mut qb,
            &["p.company_name", "p.contact_name", "p.email"],
            filter,
        );
        if let Some(status) = active_status(filter) {
            qb.push(" AND COALESCE(p.status::text, 'NEW') = ")
                .push_bind(status.to_string());
        }
        qb.push(" ORDER BY p.created_at DESC");

        let rows: Vec<PartnershipRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .context("reading partnerships")?;

        tracing::debug!("partnerships: {} rows after filters", rows.len());
        let now = Utc::now();
        Ok(rows
            .into_iter()
            .map(|row| Lead::from_partnership(row, now))
            .collect())
    }
}
