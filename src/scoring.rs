//! Per-source lead scoring.
//!
//! Five pure functions, one per lead source, each returning an integer score
//! in [0, 100]. No I/O, no side effects. Unknown or missing input never
//! fails scoring; every formula has a default branch.

/// Base points for any library download. Downloads signal high intent.
const LIBRARY_BASE_SCORE: i32 = 30;

/// Fortune-500-class corporate domains (highest company-size weight).
const LARGE_CORP_DOMAINS: [&str; 8] = [
    "samsung.com",
    "lg.com",
    "sk.com",
    "hyundai.com",
    "posco.com",
    "hanwha.com",
    "lotte.com",
    "gs.com",
];

/// Logistics operators, the primary sales target.
const LOGISTICS_DOMAINS: [&str; 6] = [
    "dhl.com",
    "fedex.com",
    "ups.com",
    "cjlogistics.com",
    "hanjin.com",
    "kmlogis.com",
];

/// Free-mail providers that carry no company signal.
const FREE_MAIL_DOMAINS: [&str; 5] = [
    "gmail.com",
    "naver.com",
    "daum.net",
    "hotmail.com",
    "outlook.com",
];

/// Infer a company-size weight from an email domain.
///
/// Large corporations score 20, logistics operators 18, free-mail domains 0,
/// and any other (presumed corporate) domain 10.
pub fn company_size_score(domain: &str) -> i32 {
    if LARGE_CORP_DOMAINS.iter().any(|corp| domain.contains(corp)) {
        return 20;
    }
    if LOGISTICS_DOMAINS.iter().any(|log| domain.contains(log)) {
        return 18;
    }
    if FREE_MAIL_DOMAINS.contains(&domain) {
        return 0;
    }
    10
}

/// Score a library download lead.
///
/// Additive model: 30 base, category weight (FRAMEWORK=20, WHITEPAPER=15,
/// CASE_STUDY=10, other=5), company-size heuristic from the email domain,
/// +10 marketing consent, +10 phone provided, +10 any UTM parameter present.
/// Clamped to [0, 100].
pub fn score_library_lead(
    category: Option<&str>,
    email: &str,
    marketing_consent: bool,
    has_phone: bool,
    has_utm: bool,
) -> i32 {
    let mut score = LIBRARY_BASE_SCORE;

    score += match category {
        Some("FRAMEWORK") => 20,
        Some("WHITEPAPER") => 15,
        Some("CASE_STUDY") => 10,
        _ => 5,
    };

    let domain = email.split('@').nth(1).unwrap_or("");
    score += company_size_score(domain);

    if marketing_consent {
        score += 10;
    }
    if has_phone {
        score += 10;
    }
    if has_utm {
        score += 10;
    }

    score.clamp(0, 100)
}

/// Score a contact-form submission by recency alone.
///
/// Within a week: 40, within a month: 20, older: 10. A negative `days_old`
/// (malformed or future-dated row) is treated as brand new by the caller;
/// anything else lands in the oldest bucket.
pub fn score_contact_form(days_old: i64) -> i32 {
    if days_old <= 7 {
        40
    } else if days_old <= 30 {
        20
    } else {
        10
    }
}

/// Score a demo request from its workflow status.
pub fn score_demo_request(status: &str) -> i32 {
    match status {
        "COMPLETED" => 90,
        "SCHEDULED" => 80,
        "CONTACTED" => 60,
        "NEW" => 50,
        _ => 20,
    }
}

/// Score an event registration from its attendance status.
pub fn score_event_registration(status: &str) -> i32 {
    match status {
        "ATTENDED" => 70,
        "CONFIRMED" => 50,
        "PENDING" => 30,
        _ => 10,
    }
}

/// Score a partnership application from its review status.
pub fn score_partnership(status: &str) -> i32 {
    match status {
        "ACCEPTED" => 100,
        "IN_PROGRESS" => 70,
        "NEW" => 50,
        _ => 20,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn library_framework_corporate_full_consent() {
        // 30 base + 20 FRAMEWORK + 10 corporate domain + 10 consent + 10 phone
        let score = score_library_lead(Some("FRAMEWORK"), "kim@acme.co.kr", true, true, false);
        assert_eq!(score, 80);
    }

    #[test]
    fn library_score_never_exceeds_100() {
        // Max everything: 30 + 20 + 20 + 10 + 10 + 10 = 100, clamp holds
        let score = score_library_lead(Some("FRAMEWORK"), "lee@samsung.com", true, true, true);
        assert_eq!(score, 100);
    }

    #[test]
    fn library_free_mail_minimal() {
        // 30 base + 5 other category + 0 free-mail
        let score = score_library_lead(None, "someone@gmail.com", false, false, false);
        assert_eq!(score, 35);
    }

    #[test]
    fn company_size_tiers() {
        assert_eq!(company_size_score("samsung.com"), 20);
        assert_eq!(company_size_score("dhl.com"), 18);
        assert_eq!(company_size_score("gmail.com"), 0);
        assert_eq!(company_size_score("smallbiz.io"), 10);
    }

    #[test]
    fn contact_form_recency_buckets() {
        assert_eq!(score_contact_form(0), 40);
        assert_eq!(score_contact_form(7), 40);
        assert_eq!(score_contact_form(8), 20);
        assert_eq!(score_contact_form(30), 20);
        assert_eq!(score_contact_form(31), 10);
        assert_eq!(score_contact_form(365), 10);
    }

    #[test]
    fn demo_request_status_order() {
        assert!(score_demo_request("COMPLETED") > score_demo_request("SCHEDULED"));
        assert!(score_demo_request("SCHEDULED") > score_demo_request("CONTACTED"));
        assert!(score_demo_request("CONTACTED") > score_demo_request("NEW"));
        assert!(score_demo_request("NEW") > score_demo_request("CANCELLED"));
    }

    #[test]
    fn unknown_statuses_take_default_branch() {
        assert_eq!(score_demo_request("???"), 20);
        assert_eq!(score_event_registration(""), 10);
        assert_eq!(score_partnership("REJECTED"), 20);
    }

    #[test]
    fn email_without_domain_still_scores() {
        let score = score_library_lead(Some("CASE_STUDY"), "not-an-email", false, false, false);
        // 30 base + 10 CASE_STUDY + 10: an empty domain matches no list and
        // falls into the default corporate tier
        assert_eq!(score, 50);
    }
}
