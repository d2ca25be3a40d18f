#![cfg(not(target_arch = "wasm32"))]

use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;

fn fixture() -> String {
    format!(
        "{}/../aero-pipeline-inspect/tests/fixtures/forward_pass.json",
        env!("CARGO_MANIFEST_DIR")
    )
}

fn dump() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_aero-pipeline-dump"));
    cmd.env_remove("AERO_PIPELINE_SHOW_DISABLED")
        .env_remove("AERO_PIPELINE_SHOW_EMPTY")
        .env_remove("AERO_PIPELINE_FORMAT")
        .env_remove("AERO_PIPELINE_LOG");
    cmd
}

#[test]
fn prints_text_report_for_fixture() {
    dump()
        .arg(fixture())
        .assert()
        .success()
        .stdout(predicate::str::starts_with("pipeline-report v1"))
        .stdout(predicate::str::contains("VS: VSMain() - mesh.hlsl"))
        .stdout(predicate::str::contains("UV: Wrap, W: Clamp"))
        .stdout(predicate::str::contains(
            "IA bytecode semantic 0 (POSITION0) is 3-wide, VS bytecode semantic 0 (POSITION0) is 4-wide",
        ))
        .stdout(predicate::str::contains("Unused Normal").not());
}

#[test]
fn show_disabled_lists_unused_bindings() {
    dump()
        .arg("--show-disabled")
        .arg(fixture())
        .assert()
        .success()
        .stdout(predicate::str::contains("Unused Normal"));

    dump()
        .env("AERO_PIPELINE_SHOW_DISABLED", "true")
        .arg(fixture())
        .assert()
        .success()
        .stdout(predicate::str::contains("Unused Normal"));
}

#[test]
fn json_output_is_the_resolved_pipeline() {
    let output = dump()
        .args(["--format", "json"])
        .arg(fixture())
        .output()
        .expect("run aero-pipeline-dump");
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(
        value["input_assembler"]["bytecode_label"],
        "MeshLayout (VSMain)"
    );
    assert_eq!(value["stages"].as_array().map(Vec::len), Some(6));
    assert_eq!(value["mismatch"]["lines"].as_array().map(Vec::len), Some(1));
}

#[test]
fn writes_report_to_output_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let out = dir.path().join("report.txt");

    dump()
        .arg("--output")
        .arg(&out)
        .arg(fixture())
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let text = std::fs::read_to_string(&out).unwrap();
    assert!(text.contains("output merger:"));
}

#[test]
fn ambiguous_catalog_exits_nonzero() {
    let mut tmp = tempfile::NamedTempFile::new().expect("tempfile");
    tmp.write_all(br#"{ "catalog": { "textures": [{ "id": 4 }], "buffers": [{ "id": 4 }] } }"#)
        .unwrap();

    dump()
        .arg(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "resource ResourceId::4 appears in both the texture and buffer tables",
        ));
}

#[test]
fn missing_capture_exits_nonzero() {
    dump()
        .arg("/nonexistent/capture.json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("open capture"));
}
