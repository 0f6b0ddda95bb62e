/// Unit tests for per-source lead scoring
/// Covers the additive library model, the recency and status lookup tables,
/// score bounds and default branches for unknown input
use glec_leads_api::scoring::{
    company_size_score, score_contact_form, score_demo_request, score_event_registration,
    score_library_lead, score_partnership,
};

#[cfg(test)]
mod library_scoring_tests {
    use super::*;

    #[test]
    fn test_framework_corporate_lead_scores_80() {
        // 30 base + 20 FRAMEWORK + 10 corporate domain + 10 consent + 10 phone + 0 UTM
        let score = score_library_lead(
            Some("FRAMEWORK"),
            "jane.park@greenfreight.co.kr",
            true,
            true,
            false,
        );
        assert_eq!(score, 80);
    }

    #[test]
    fn test_category_weights() {
        let base = |category| score_library_lead(category, "a@b-corp.com", false, false, false);
        assert_eq!(base(Some("FRAMEWORK")), 30 + 20 + 10);
        assert_eq!(base(Some("WHITEPAPER")), 30 + 15 + 10);
        assert_eq!(base(Some("CASE_STUDY")), 30 + 10 + 10);
        assert_eq!(base(Some("WEBINAR")), 30 + 5 + 10);
        assert_eq!(base(None), 30 + 5 + 10);
    }

    #[test]
    fn test_domain_heuristic_tiers() {
        assert_eq!(company_size_score("samsung.com"), 20);
        assert_eq!(company_size_score("lotte.com"), 20);
        assert_eq!(company_size_score("dhl.com"), 18);
        assert_eq!(company_size_score("cjlogistics.com"), 18);
        assert_eq!(company_size_score("gmail.com"), 0);
        assert_eq!(company_size_score("naver.com"), 0);
        assert_eq!(company_size_score("some-smb.io"), 10);
    }

    #[test]
    fn test_free_mail_gets_no_company_points() {
        let corporate = score_library_lead(Some("FRAMEWORK"), "kim@acme.com", true, true, true);
        let free_mail = score_library_lead(Some("FRAMEWORK"), "kim@gmail.com", true, true, true);
        assert_eq!(corporate - free_mail, 10);
    }

    #[test]
    fn test_maximum_combination_clamps_at_100() {
        // 30 + 20 + 20 + 10 + 10 + 10 = 100 exactly
        let score = score_library_lead(Some("FRAMEWORK"), "lead@samsung.com", true, true, true);
        assert_eq!(score, 100);
    }

    #[test]
    fn test_utm_presence_adds_10() {
        let without = score_library_lead(Some("CASE_STUDY"), "a@b-corp.com", false, false, false);
        let with = score_library_lead(Some("CASE_STUDY"), "a@b-corp.com", false, false, true);
        assert_eq!(with - without, 10);
    }
}

#[cfg(test)]
mod status_scoring_tests {
    use super::*;

    #[test]
    fn test_demo_request_monotonicity() {
        // 90 > 80 > 60 > 50 > 20
        assert_eq!(score_demo_request("COMPLETED"), 90);
        assert_eq!(score_demo_request("SCHEDULED"), 80);
        assert_eq!(score_demo_request("CONTACTED"), 60);
        assert_eq!(score_demo_request("NEW"), 50);
        assert_eq!(score_demo_request("CANCELLED"), 20);
        assert!(score_demo_request("COMPLETED") > score_demo_request("SCHEDULED"));
        assert!(score_demo_request("SCHEDULED") > score_demo_request("CONTACTED"));
        assert!(score_demo_request("CONTACTED") > score_demo_request("NEW"));
        assert!(score_demo_request("NEW") > score_demo_request("anything-else"));
    }

    #[test]
    fn test_event_registration_table() {
        assert_eq!(score_event_registration("ATTENDED"), 70);
        assert_eq!(score_event_registration("CONFIRMED"), 50);
        assert_eq!(score_event_registration("PENDING"), 30);
        assert_eq!(score_event_registration("NO_SHOW"), 10);
        assert_eq!(score_event_registration(""), 10);
    }

    #[test]
    fn test_partnership_table() {
        assert_eq!(score_partnership("ACCEPTED"), 100);
        assert_eq!(score_partnership("IN_PROGRESS"), 70);
        assert_eq!(score_partnership("NEW"), 50);
        assert_eq!(score_partnership("REJECTED"), 20);
    }

    #[test]
    fn test_statuses_are_case_sensitive() {
        // Stored enums are uppercase; anything else takes the default branch
        assert_eq!(score_demo_request("completed"), 20);
        assert_eq!(score_partnership("accepted"), 20);
    }
}

#[cfg(test)]
mod recency_scoring_tests {
    use super::*;

    #[test]
    fn test_contact_form_buckets() {
        assert_eq!(score_contact_form(0), 40);
        assert_eq!(score_contact_form(7), 40);
        assert_eq!(score_contact_form(8), 20);
        assert_eq!(score_contact_form(30), 20);
        assert_eq!(score_contact_form(31), 10);
        assert_eq!(score_contact_form(i64::MAX), 10);
    }

    #[test]
    fn test_all_scores_within_bounds() {
        let samples = [
            score_library_lead(Some("FRAMEWORK"), "x@samsung.com", true, true, true),
            score_library_lead(None, "x@gmail.com", false, false, false),
            score_contact_form(0),
            score_contact_form(10_000),
            score_demo_request("COMPLETED"),
            score_demo_request("garbage"),
            score_event_registration("ATTENDED"),
            score_partnership("ACCEPTED"),
            score_partnership(""),
        ];
        for score in samples {
            assert!((0..=100).contains(&score), "score out of bounds: {}", score);
        }
    }
}
