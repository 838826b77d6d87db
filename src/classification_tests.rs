use std::collections::BTreeMap;

use serde_json::json;

use crate::command_policy::{self, CommandCategory};
use crate::hardware::select;
use crate::identity::{generate_for, IdentityProfile, Platform};
use crate::request_policy::{
    IdentityReplacer, Payload, Policy, RealIdentity, ReasonCode, ReplacementKind, RequestClassifier,
};

fn profile() -> IdentityProfile {
    let mut profile = generate_for("classification-fixture", Platform::Windows);
    profile.system.hostname = "DESKTOP-XYZ999".to_string();
    profile.system.username = "user-77aa1122".to_string();
    profile
}

fn real() -> RealIdentity {
    RealIdentity {
        hostname: "DESKTOP-ABC123".to_string(),
        username: "real_alice".to_string(),
        env_username: String::new(),
        env_user: "real_alice".to_string(),
    }
}

fn decide(target: &str, payload: Option<Payload>) -> (Policy, ReasonCode) {
    let decision = RequestClassifier::default().classify(target, payload.as_ref());
    (decision.policy, decision.reason)
}

#[test]
fn essential_beats_identity_verification() {
    assert_eq!(
        decide("https://augmentcode.com/api/auth", None),
        (Policy::Allow, ReasonCode::EssentialFunction)
    );
    assert_eq!(
        decide("https://accounts.example.com/api/auth", None),
        (Policy::ReplaceIdentity, ReasonCode::IdentityVerification)
    );
}

#[test]
fn essential_beats_personal_info_payload() {
    let body = Payload::Json(json!({ "machineId": "abc" }));
    assert_eq!(
        decide("http://localhost:3000/analytics", Some(body)).0,
        Policy::Allow
    );
}

#[test]
fn personal_info_payload_beats_telemetry_target() {
    let body = Payload::from(r#"{"HostName":"box"}"#);
    assert_eq!(
        decide("https://api.segment.io/v1/batch", Some(body)),
        (Policy::ReplaceIdentity, ReasonCode::PersonalInfo)
    );
}

#[test]
fn segment_batch_is_intercepted() {
    assert_eq!(
        decide("https://api.segment.io/v1/batch", None),
        (Policy::Intercept, ReasonCode::Telemetry)
    );
    assert_eq!(
        decide("https://api.segment.io/v1/batch", Some(Payload::from("{\"event\":\"open\"}"))),
        (Policy::Intercept, ReasonCode::Telemetry)
    );
}

#[test]
fn unmatched_and_malformed_targets_are_allowed() {
    for target in ["https://crates.io/api/v1/crates", "", "::not a url::"] {
        assert_eq!(decide(target, None), (Policy::Allow, ReasonCode::Unmatched));
    }
}

#[test]
fn configured_tables_change_decisions() {
    let tables = crate::config::ShieldConfig {
        extra_telemetry: vec!["events.corp.test".to_string()],
        ..Default::default()
    }
    .pattern_tables();
    let classifier = RequestClassifier::new(tables.into_rule_set());
    assert_eq!(
        classifier.classify("https://events.corp.test/ingest", None).policy,
        Policy::Intercept
    );
}

#[test]
fn real_values_replaced_with_profile_values() {
    let replacer = IdentityReplacer::new(&real(), &profile());
    let (text, report) = replacer.replace_text("host is DESKTOP-ABC123 user real_alice");
    assert_eq!(text, "host is DESKTOP-XYZ999 user user-77aa1122");
    // USER equals the OS username and shares its pair
    assert_eq!(report.applied, vec![ReplacementKind::Hostname, ReplacementKind::Username]);
}

#[test]
fn every_occurrence_is_replaced() {
    let replacer = IdentityReplacer::new(&real(), &profile());
    let (text, report) = replacer.replace_text("real_alice@DESKTOP-ABC123:/home/real_alice");
    assert_eq!(text, "user-77aa1122@DESKTOP-XYZ999:/home/user-77aa1122");
    assert_eq!(report.count(), 2);
}

#[test]
fn empty_real_values_never_count() {
    let replacer = IdentityReplacer::new(&RealIdentity::default(), &profile());
    let (text, report) = replacer.replace_text("nothing to see");
    assert_eq!(text, "nothing to see");
    assert_eq!(report.count(), 0);
}

#[test]
fn synthetic_values_are_not_rewritten_again() {
    let real = RealIdentity {
        hostname: "box".to_string(),
        username: "user".to_string(),
        env_username: String::new(),
        env_user: "user".to_string(),
    };
    let replacer = IdentityReplacer::new(&real, &profile());
    assert_eq!(replacer.kinds(), vec![ReplacementKind::Hostname, ReplacementKind::Username]);

    let (text, report) = replacer.replace_text("login user on box");
    assert_eq!(text, "login user-77aa1122 on DESKTOP-XYZ999");
    assert_eq!(report.applied, vec![ReplacementKind::Hostname, ReplacementKind::Username]);
}

#[test]
fn real_value_inside_synthetic_hostname_is_left_alone() {
    let real = RealIdentity {
        hostname: "workstation".to_string(),
        username: "XYZ".to_string(),
        ..RealIdentity::default()
    };
    let replacer = IdentityReplacer::new(&real, &profile());
    let (text, report) = replacer.replace_text("workstation XYZ");
    assert_eq!(text, "DESKTOP-XYZ999 user-77aa1122");
    assert_eq!(report.count(), 2);
}

#[test]
fn longer_real_value_wins_at_same_offset() {
    let real = RealIdentity {
        hostname: "alice-pc".to_string(),
        username: "alice".to_string(),
        ..RealIdentity::default()
    };
    let replacer = IdentityReplacer::new(&real, &profile());
    let (text, report) = replacer.replace_text("alice-pc/alice");
    assert_eq!(text, "DESKTOP-XYZ999/user-77aa1122");
    assert_eq!(report.applied, vec![ReplacementKind::Hostname, ReplacementKind::Username]);
}

#[test]
fn missing_hostname_builds_no_hostname_pair() {
    let real = RealIdentity {
        username: "real_alice".to_string(),
        ..RealIdentity::default()
    };
    let replacer = IdentityReplacer::new(&real, &profile());
    assert_eq!(replacer.kinds(), vec![ReplacementKind::Username]);
    let (text, report) = replacer.replace_text("http://localhost:8080/health");
    assert_eq!(text, "http://localhost:8080/health");
    assert_eq!(report.count(), 0);
}

#[test]
fn json_payload_stays_json() {
    let replacer = IdentityReplacer::new(&real(), &profile());
    let payload = Payload::Json(json!({ "hostname": "DESKTOP-ABC123", "n": 1 }));
    let (rewritten, report) = replacer.replace_payload(&payload);
    assert_eq!(rewritten, Payload::Json(json!({ "hostname": "DESKTOP-XYZ999", "n": 1 })));
    assert_eq!(report.count(), 1);
}

#[test]
fn json_broken_by_rewrite_falls_back_to_text() {
    let real = RealIdentity {
        hostname: ":".to_string(),
        ..RealIdentity::default()
    };
    let replacer = IdentityReplacer::new(&real, &profile());
    let (rewritten, _) = replacer.replace_payload(&Payload::Json(json!({ "k": "v" })));
    assert_eq!(rewritten, Payload::Text(r#"{"k"DESKTOP-XYZ999"v"}"#.to_string()));
}

#[test]
fn only_identity_headers_are_rewritten() {
    let replacer = IdentityReplacer::new(&real(), &profile());
    let mut headers = BTreeMap::new();
    headers.insert("user-agent".to_string(), "app/1.0 (DESKTOP-ABC123)".to_string());
    headers.insert("X-MACHINE-ID".to_string(), "real_alice".to_string());
    headers.insert("Authorization".to_string(), "Bearer real_alice".to_string());
    let report = replacer.rewrite_headers(&mut headers);
    assert_eq!(headers["user-agent"], "app/1.0 (DESKTOP-XYZ999)");
    assert_eq!(headers["X-MACHINE-ID"], "user-77aa1122");
    assert_eq!(headers["Authorization"], "Bearer real_alice");
    assert_eq!(report.count(), 2);
}

#[test]
fn git_email_query_renders_exact_email() {
    let profile = profile();
    let matched = command_policy::classify("git config --get user.email");
    assert!(matched.intercept);
    assert_eq!(matched.category, Some(CommandCategory::GitIdentity));
    assert_eq!(
        command_policy::render(&matched, &profile, select(&profile)),
        profile.git.user_email
    );
}

#[test]
fn git_identity_beats_git_remote() {
    let matched = command_policy::classify("git config remote.origin.user.name");
    assert_eq!(matched.category, Some(CommandCategory::GitIdentity));
}
