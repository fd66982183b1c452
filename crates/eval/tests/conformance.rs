//! Assessment conformance suite.
//!
//! Each case is a fixture pair evaluated against the shared configuration in
//! `conformance/assess/config`:
//! - `<name>.session.json`  -- inventory data, repeat blocks, answers, selections
//! - `<name>.expected.json` -- expected flags, facts, prefill, state, risks, tier, controls
//!
//! The runner loads the configuration and session, runs the full pipeline
//! and compares the projected result against the expected document.

use std::path::{Path, PathBuf};

use riskmap_eval::assess;
use riskmap_interchange::{load_config_dir, load_session};

fn fixture_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("conformance")
        .join("assess")
}

/// Run one assessment fixture.
///
/// 1. Load the shared configuration directory
/// 2. Load `<name>.session.json`
/// 3. Assess
/// 4. Compare against `<name>.expected.json`
fn run_assess_fixture(dir: &Path, name: &str) {
    let config = load_config_dir(&dir.join("config"))
        .unwrap_or_else(|e| panic!("Failed to load config for {}: {}", name, e));
    let session = load_session(&dir.join(format!("{}.session.json", name)))
        .unwrap_or_else(|e| panic!("Failed to load session for {}: {}", name, e));

    let result = assess(&config, &session);
    let full = serde_json::to_value(&result).unwrap();

    // Reasons and fact sources are covered by unit tests; compare the rest.
    let actual = serde_json::json!({
        "flags": full["flags"],
        "facts": full["facts"],
        "prefill": {
            "answers": full["prefill"]["answers"],
            "useCases": full["prefill"]["useCases"],
            "personas": full["prefill"]["personas"],
            "hiddenQuestions": full["prefill"]["hiddenQuestions"],
        },
        "state": full["state"],
        "risks": full["risks"],
        "tier": full["tier"],
        "controls": full["controls"],
    });

    let expected_path = dir.join(format!("{}.expected.json", name));
    let expected_str = std::fs::read_to_string(&expected_path)
        .unwrap_or_else(|e| panic!("Failed to read expected result for {}: {}", name, e));
    let expected: serde_json::Value = serde_json::from_str(&expected_str)
        .unwrap_or_else(|e| panic!("Invalid expected JSON for {}: {}", name, e));

    assert_eq!(
        actual,
        expected,
        "Assessment mismatch for {}\n\nActual:\n{}\n\nExpected:\n{}",
        name,
        serde_json::to_string_pretty(&actual).unwrap(),
        serde_json::to_string_pretty(&expected).unwrap(),
    );
}

#[test]
fn vendor_credit_scoring() {
    run_assess_fixture(&fixture_dir(), "vendor_credit_scoring");
}

#[test]
fn in_house_creator() {
    run_assess_fixture(&fixture_dir(), "in_house_creator");
}

#[test]
fn no_models() {
    run_assess_fixture(&fixture_dir(), "no_models");
}

#[test]
fn fixture_form_state() {
    let dir = fixture_dir();
    let config = load_config_dir(&dir.join("config")).unwrap();

    let session = load_session(&dir.join("no_models.session.json")).unwrap();
    let form = riskmap_eval::resolve_form(&config.inventory, &session.inventory, &session.repeat_blocks);
    let step4 = form.steps.iter().find(|s| s.id == "step4").unwrap();
    assert!(!step4.visible);
    assert!(step4.optional);
    assert!(step4.collapsed_by_default);

    let session = load_session(&dir.join("vendor_credit_scoring.session.json")).unwrap();
    let form = riskmap_eval::resolve_form(&config.inventory, &session.inventory, &session.repeat_blocks);
    let step1 = form.steps.iter().find(|s| s.id == "step1").unwrap();
    let step2 = form.steps.iter().find(|s| s.id == "step2").unwrap();
    let step4 = form.steps.iter().find(|s| s.id == "step4").unwrap();
    assert!(step4.visible);
    assert!(!step4.optional);
    assert!(step2.optional, "no data categories recorded");
    assert!(step1.fields.iter().all(|f| f.visible && f.relevant));
    assert_eq!((step1.filled, step1.total), (2, 3));
    assert_eq!((form.filled, form.total), (2, 4));
    assert_eq!(form.missing_fields, vec!["Vendor", "dataCategories"]);
}
