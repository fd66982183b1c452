//! CLI integration tests for every subcommand.
//!
//! Uses `assert_cmd` to spawn the `riskmap` binary and verify exit codes,
//! stdout content, and stderr content. Commands run from the workspace root
//! so relative paths to the assessment fixtures resolve.

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const CONFIG: &str = "conformance/assess/config";
const VENDOR: &str = "conformance/assess/vendor_credit_scoring.session.json";
const NO_MODELS: &str = "conformance/assess/no_models.session.json";

/// Locate the workspace root by walking up from CARGO_MANIFEST_DIR.
fn workspace_root() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .parent()
        .and_then(|p| p.parent())
        .expect("workspace root")
        .to_path_buf()
}

/// Helper: create a Command for the `riskmap` binary, rooted at workspace.
fn riskmap() -> Command {
    let mut cmd = cargo_bin_cmd!("riskmap");
    cmd.current_dir(workspace_root());
    cmd
}

fn stdout_json(args: &[&str]) -> serde_json::Value {
    let output = riskmap().args(args).output().unwrap();
    assert!(output.status.success(), "{:?}", output);
    serde_json::from_slice(&output.stdout).unwrap()
}

// ──────────────────────────────────────────────
// Help and version
// ──────────────────────────────────────────────

#[test]
fn help_exits_0_with_description() {
    riskmap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("AI risk self-assessment engine"));
}

#[test]
fn version_exits_0() {
    riskmap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("riskmap"));
}

#[test]
fn assess_requires_session() {
    riskmap()
        .args(["assess", "--config", CONFIG])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--session"));
}

// ──────────────────────────────────────────────
// assess
// ──────────────────────────────────────────────

#[test]
fn assess_text_shows_tier_risks_and_controls() {
    riskmap()
        .args(["assess", "--config", CONFIG, "--session", VENDOR])
        .assert()
        .success()
        .stdout(predicate::str::contains("Tier: high (3), baseline 2, escalated"))
        .stdout(predicate::str::contains(
            "escalated by: Autonomous decisions without human review",
        ))
        .stdout(predicate::str::contains("Risks (2):"))
        .stdout(predicate::str::contains("controlUserDataManagement"));
}

#[test]
fn assess_json_matches_engine_output() {
    let json = stdout_json(&["--output", "json", "assess", "--config", CONFIG, "--session", VENDOR]);
    assert_eq!(json["tier"]["label"], "high");
    assert_eq!(json["risks"], serde_json::json!(["MST", "SDD"]));
    assert_eq!(json["state"]["answers"]["vayuThirdParty"], "Yes");
    assert_eq!(json["facts"]["thirdPartyModel"], true);
}

#[test]
fn assess_quiet_prints_nothing() {
    riskmap()
        .args(["--quiet", "assess", "--config", CONFIG, "--session", VENDOR])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn assess_missing_config_dir_exits_1() {
    riskmap()
        .args(["assess", "--config", "does/not/exist", "--session", VENDOR])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("config error"));
}

#[test]
fn assess_malformed_session_json_error() {
    let tmp = TempDir::new().unwrap();
    let session = tmp.path().join("broken.session.json");
    fs::write(&session, "{ not json").unwrap();

    let output = riskmap()
        .args(["--output", "json", "assess", "--config", CONFIG, "--session"])
        .arg(&session)
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    let err: serde_json::Value = serde_json::from_slice(&output.stderr).unwrap();
    assert!(err["error"].as_str().unwrap().contains("session error"));
}

#[test]
fn assess_session_in_yaml() {
    let tmp = TempDir::new().unwrap();
    let session = tmp.path().join("session.yaml");
    fs::write(
        &session,
        "inventory:\n  modelCreator: In-house\nanswers:\n  vayuExternalHosting: \"Yes\"\n",
    )
    .unwrap();

    let json_out = riskmap()
        .args(["--output", "json", "assess", "--config", CONFIG, "--session"])
        .arg(&session)
        .output()
        .unwrap();
    assert!(json_out.status.success());
    let json: serde_json::Value = serde_json::from_slice(&json_out.stdout).unwrap();
    assert_eq!(json["tier"]["baselineTier"], 2);
    assert_eq!(json["tier"]["method"], "baseline");
}

// ──────────────────────────────────────────────
// prefill
// ──────────────────────────────────────────────

#[test]
fn prefill_text_lists_reasons() {
    riskmap()
        .args(["prefill", "--config", CONFIG, "--session", VENDOR])
        .assert()
        .success()
        .stdout(predicate::str::contains("automatedDecisioning  (aiUseCaseType = \"Credit scoring\")"))
        .stdout(predicate::str::contains("personaModelConsumer"))
        .stdout(predicate::str::contains("Hidden questions: vayuTrainingData"));
}

#[test]
fn prefill_json_has_bundle_and_state() {
    let json = stdout_json(&["--output", "json", "prefill", "--config", CONFIG, "--session", VENDOR]);
    assert_eq!(json["prefill"]["answers"]["vayuThirdParty"], "Yes");
    assert_eq!(json["state"]["answers"]["vayuExternalHosting"], "No");
    assert_eq!(json["state"]["selectedUseCases"], serde_json::json!(["automatedDecisioning"]));
}

// ──────────────────────────────────────────────
// form
// ──────────────────────────────────────────────

#[test]
fn form_text_hides_model_step_without_models() {
    riskmap()
        .args(["form", "--config", CONFIG, "--session", NO_MODELS])
        .assert()
        .success()
        .stdout(predicate::str::contains("usesModels = false"))
        .stdout(predicate::str::contains("step4 Models  [hidden, optional, collapsed]"));
}

#[test]
fn form_text_reports_completion() {
    riskmap()
        .args(["form", "--config", CONFIG, "--session", VENDOR])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 / 4 fields completed"))
        .stdout(predicate::str::contains("Missing: Vendor, dataCategories"));
}

#[test]
fn form_json_reports_steps() {
    let json = stdout_json(&["--output", "json", "form", "--config", CONFIG, "--session", VENDOR]);
    let steps = json["steps"].as_array().unwrap();
    assert_eq!(steps.len(), 3);
    let step4 = steps.iter().find(|s| s["id"] == "step4").unwrap();
    assert_eq!(step4["visible"], true);
    assert_eq!(step4["optional"], false);
    assert_eq!(json["missingFields"], serde_json::json!(["Vendor", "dataCategories"]));
}

// ──────────────────────────────────────────────
// check
// ──────────────────────────────────────────────

#[test]
fn check_fixture_config_passes_with_warning() {
    riskmap()
        .args(["check", "--config", CONFIG])
        .assert()
        .success()
        .stdout(predicate::str::contains("Static Analysis Report"))
        .stdout(predicate::str::contains("[references/WARNING]"))
        .stdout(predicate::str::contains("vayuTrainingData"));
}

#[test]
fn check_strict_fails_on_warnings() {
    riskmap()
        .args(["check", "--config", CONFIG, "--strict"])
        .assert()
        .failure()
        .code(1);
}

#[test]
fn check_selected_analysis() {
    let json = stdout_json(&["--output", "json", "check", "--config", CONFIG, "--analysis", "inert"]);
    assert_eq!(json["analysesRun"], serde_json::json!(["inert"]));
    assert!(json["findings"].as_array().unwrap().is_empty());
}

#[test]
fn check_invalid_analysis_exits_1() {
    riskmap()
        .args(["check", "--config", CONFIG, "--analysis", "s1"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("invalid analysis 's1'"));
}

#[test]
fn check_unknown_tier_label_exits_1() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("self-assessment.yaml"),
        "vayu:\n  tiers:\n    - { label: low, value: 1 }\n  baseline:\n    defaultTier: minimal\n",
    )
    .unwrap();

    riskmap()
        .args(["check", "--config"])
        .arg(tmp.path())
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("[references/ERROR]"))
        .stdout(predicate::str::contains("minimal"));
}

#[test]
fn check_bad_condition_shape_is_config_error() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("assessment-routing.json"),
        r#"{ "factRules": [{ "when": { "all": { "field": "x" } }, "setFacts": { "a": true } }] }"#,
    )
    .unwrap();

    riskmap()
        .args(["check", "--config"])
        .arg(tmp.path())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("config error"));
}
