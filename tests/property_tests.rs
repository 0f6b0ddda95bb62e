/// Property-based tests using proptest
/// Tests invariants that should hold for all inputs: score bounds,
/// pagination reassembly and sort determinism
use chrono::{DateTime, Duration, TimeZone, Utc};
use glec_leads_api::aggregator::{compute_stats, paginate, sort_leads};
use glec_leads_api::models::{Lead, SortBy, SortOrder, SourceAttributes, SourceType};
use glec_leads_api::scoring::{
    score_contact_form, score_demo_request, score_event_registration, score_library_lead,
    score_partnership,
};
use proptest::prelude::*;

// Property: every scorer stays within [0, 100] for arbitrary input
proptest! {
    #[test]
    fn library_score_always_in_bounds(
        category in proptest::option::of("[A-Z_]{0,20}"),
        email in "\\PC*",
        consent in proptest::bool::ANY,
        has_phone in proptest::bool::ANY,
        has_utm in proptest::bool::ANY,
    ) {
        let score = score_library_lead(category.as_deref(), &email, consent, has_phone, has_utm);
        prop_assert!((0..=100).contains(&score));
    }

    #[test]
    fn status_scores_always_in_bounds(status in "\\PC*") {
        for score in [
            score_demo_request(&status),
            score_event_registration(&status),
            score_partnership(&status),
        ] {
            prop_assert!((0..=100).contains(&score));
        }
    }

    #[test]
    fn contact_score_in_bounds_and_non_increasing(days in 0i64..10_000) {
        let score = score_contact_form(days);
        prop_assert!((0..=100).contains(&score));
        // Older leads never outscore newer ones
        prop_assert!(score <= score_contact_form(days.saturating_sub(1)));
    }
}

fn arb_lead() -> impl Strategy<Value = Lead> {
    (
        "[a-z0-9]{8}",
        0usize..5,
        0i32..=100,
        0i64..100_000,
    )
        .prop_map(|(id, source_idx, score, minutes)| {
            let created_at: DateTime<Utc> = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
                + Duration::minutes(minutes);
            Lead {
                lead_id: id.clone(),
                source_type: SourceType::ALL[source_idx],
                company_name: "Test Co".to_string(),
                contact_name: "Tester".to_string(),
                email: format!("{}@test.co", id),
                phone: None,
                status: "NEW".to_string(),
                lead_score: score,
                created_at,
                days_old: 0,
                attributes: SourceAttributes::Contact {
                    inquiry_type: None,
                    message: None,
                },
            }
        })
}

proptest! {
    // Property: concatenating all pages in order reproduces the sorted set
    // exactly once per item, and total_pages == ceil(total / per_page)
    #[test]
    fn pagination_reassembles_exactly(
        leads in proptest::collection::vec(arb_lead(), 0..120),
        per_page in 1u32..50,
    ) {
        let mut sorted = leads.clone();
        sort_leads(&mut sorted, SortBy::Score, SortOrder::Desc);
        let expected: Vec<String> = sorted.iter().map(|l| l.lead_id.clone()).collect();

        let total = sorted.len() as u64;
        let expected_pages = total.div_ceil(u64::from(per_page));

        let mut reassembled = Vec::new();
        for page in 1..=expected_pages.max(1) {
            let (data, meta) = paginate(sorted.clone(), page as u32, per_page);
            prop_assert_eq!(meta.total, total);
            prop_assert_eq!(meta.total_pages, expected_pages);
            prop_assert!(data.len() <= per_page as usize);
            reassembled.extend(data.into_iter().map(|l| l.lead_id));
        }

        prop_assert_eq!(reassembled, expected);
    }

    // Property: sorting is deterministic and respects the score ordering
    // with the created_at descending tie-break
    #[test]
    fn sort_is_total_and_deterministic(leads in proptest::collection::vec(arb_lead(), 0..80)) {
        let mut first = leads.clone();
        let mut second = leads.clone();
        sort_leads(&mut first, SortBy::Score, SortOrder::Desc);
        sort_leads(&mut second, SortBy::Score, SortOrder::Desc);

        let ids = |ls: &[Lead]| ls.iter().map(|l| l.lead_id.clone()).collect::<Vec<_>>();
        prop_assert_eq!(ids(&first), ids(&second));

        for pair in first.windows(2) {
            prop_assert!(pair[0].lead_score >= pair[1].lead_score);
            if pair[0].lead_score == pair[1].lead_score {
                prop_assert!(pair[0].created_at >= pair[1].created_at);
            }
        }
    }

    // Property: stats totals always equal the sum of per-source counts, and
    // the average stays within score bounds
    #[test]
    fn stats_internally_consistent(leads in proptest::collection::vec(arb_lead(), 0..120)) {
        let stats = compute_stats(&leads);
        let by_source_sum = stats.by_source.library_lead
            + stats.by_source.contact_form
            + stats.by_source.demo_request
            + stats.by_source.event_registration
            + stats.by_source.partnership;
        prop_assert_eq!(stats.total_leads, leads.len() as u64);
        prop_assert_eq!(stats.total_leads, by_source_sum);
        prop_assert!((0..=100).contains(&stats.avg_score));
    }
}
