use assert_cmd::Command;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

#[allow(deprecated)]
fn run_cli(workdir: &Path, args: &[&str]) -> (i32, Value) {
    let output = Command::cargo_bin("cdi")
        .expect("binary")
        .current_dir(workdir)
        .arg("--quiet")
        .args(args)
        .output()
        .expect("command run");

    let body: Value = serde_json::from_slice(&output.stdout).expect("valid json");
    (output.status.code().unwrap_or(-1), body)
}

#[test]
fn normalizes_engine_result() {
    let temp = tempdir().unwrap();
    fs::write(
        temp.path().join("chart_07.json"),
        serde_json::to_vec(&json!({
            "file_name": "chart_07.pdf",
            "extraction_data": {"cpt": "29827", "procedure": "Rotator cuff repair"},
            "payer_results": {
                "anthem": {"procedure_results": [
                    {"procedure_name": "Rotator cuff repair"},
                    "garbage"
                ]},
                "broken": 3
            },
            "total_cost": "0.125"
        }))
        .unwrap(),
    )
    .unwrap();

    let (code, body) = run_cli(temp.path(), &["normalize", "--input", "chart_07.json"]);
    assert_eq!(code, 0);
    assert_eq!(body["success"], true);
    assert_eq!(body["display_name"], "chart_07");
    assert_eq!(body["cpt_codes"], json!(["29827"]));
    assert_eq!(body["procedures"], json!(["Rotator cuff repair"]));
    assert_eq!(body["payer_results"]["anthem"]["payer_name"], "anthem");
    assert_eq!(body["payer_results"]["anthem"]["procedure_count"], 1);
    assert_eq!(
        body["payer_results"]["anthem"]["procedure_results"][0]["decision"],
        "-"
    );
    assert!(body["payer_results"].get("broken").is_none());
    assert_eq!(body["results"]["total_cost"], 0.125);
}

#[test]
fn display_name_flag_overrides_stem() {
    let temp = tempdir().unwrap();
    fs::write(temp.path().join("result.json"), "{}").unwrap();

    let (code, body) = run_cli(
        temp.path(),
        &["normalize", "--input", "result.json", "--display-name", "Batch 3"],
    );
    assert_eq!(code, 0);
    assert_eq!(body["display_name"], "Batch 3");
    assert_eq!(body["cpt_codes"], json!([]));
}

#[test]
fn unreadable_input_prints_error_envelope() {
    let temp = tempdir().unwrap();
    fs::write(temp.path().join("bad.json"), "{ nope").unwrap();

    let (code, body) = run_cli(temp.path(), &["normalize", "--input", "bad.json"]);
    assert_eq!(code, 1);
    assert_eq!(body["code"], "internal");
    assert!(body["message"].as_str().unwrap().contains("bad.json"));
}
