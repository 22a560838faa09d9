use predicates::prelude::*;
use serde_json::Value;
use std::io::Write;
use std::process::Command;
use tempfile::TempDir;

fn cmd() -> assert_cmd::Command {
    assert_cmd::Command::from(Command::new(env!("CARGO_BIN_EXE_roledoc")))
}

fn fixture_path(name: &str) -> String {
    format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

fn fixture(name: &str) -> String {
    std::fs::read_to_string(fixture_path(name)).unwrap()
}

fn stdout_json(assert: &assert_cmd::assert::Assert) -> Value {
    serde_json::from_slice(&assert.get_output().stdout).unwrap()
}

/// (role, target, developer text) of every decoded entry.
fn entries(decoded: &Value) -> Vec<(String, String, String)> {
    decoded["documentations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| {
            (
                d["role"]["name"].as_str().unwrap_or("").to_string(),
                d["target"].as_str().unwrap_or("").to_string(),
                d["texts"]["Developer"].as_str().unwrap_or("").to_string(),
            )
        })
        .collect()
}

fn entry(role: &str, target: &str, text: &str) -> (String, String, String) {
    (role.to_string(), target.to_string(), text.to_string())
}

// -- encode --

#[test]
fn encode_operation_compact() {
    let assert = cmd()
        .args(["encode", &fixture_path("save.signature.json")])
        .assert()
        .success();
    let output = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert_eq!(output, fixture("save.txt"));
}

#[test]
fn encode_bare_lines() {
    cmd()
        .args(["encode", "--bare", &fixture_path("check.signature.json")])
        .assert()
        .success()
        .stdout("@param p\n");
}

#[test]
fn encode_interface_lists_every_comment() {
    cmd()
        .args(["encode", &fixture_path("store.interface.json")])
        .assert()
        .success()
        .stdout(
            "// com.acme.PersonStore\n/**\n * Keeps persons.\n */\n\n\
             // com.acme.PersonStore.count\n/**\n * @return\n */\n\n",
        );
}

#[test]
fn encode_rich_writes_tables() {
    cmd()
        .args(["-f", "rich", "encode", &fixture_path("save.signature.json")])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "<tr><td>Element:</td><td>p:Person/first:String</td></tr>",
        ))
        .stdout(predicate::str::contains("@throws SaveFailed"));
}

// -- decode, stdin mode --

#[test]
fn decode_compact_with_signature() {
    let assert = cmd()
        .args(["decode", "-s", &fixture_path("save.signature.json")])
        .write_stdin(fixture("save.txt"))
        .assert()
        .success();
    assert_eq!(
        entries(&stdout_json(&assert)),
        vec![
            entry("ACTION", "", "Saves a person."),
            entry("OBJECT", "p:Person", "the person to save"),
            entry("SOURCE", "p:Person", "the input form"),
            entry("COMPARISON", "p:Person/first:String", "must not be empty"),
            entry("REPORT", "id:long", "the generated key"),
            entry("REPORT", "SaveFailed:SaveFailed", "if the store rejects it"),
        ]
    );
}

#[test]
fn decode_and_attach_reproduces_signature() {
    let assert = cmd()
        .args(["decode", "--attach", "-s", &fixture_path("save.signature.json")])
        .write_stdin(fixture("save.txt"))
        .assert()
        .success();
    let attached = stdout_json(&assert);
    let original: Value = serde_json::from_str(&fixture("save.signature.json")).unwrap();

    let p = &attached["inputs"]["parameters"][0];
    assert_eq!(p["documentations"].as_array().unwrap().len(), 2);
    assert_eq!(
        p["attributes"][0]["documentations"][0]["texts"],
        original["inputs"]["parameters"][0]["attributes"][0]["documentations"][0]["texts"]
    );
    assert_eq!(p["attributes"][1]["documentations"].as_array().unwrap().len(), 0);
    assert_eq!(
        attached["errors"][0]["parameters"][0]["documentations"][0]["role"]["name"],
        "REPORT"
    );
}

#[test]
fn rich_round_trip_through_the_cli() {
    let encoded = cmd()
        .args(["-f", "rich", "encode", &fixture_path("save.signature.json")])
        .assert()
        .success();
    let comment = encoded.get_output().stdout.clone();

    let assert = cmd()
        .args(["-f", "rich", "decode"])
        .write_stdin(comment)
        .assert()
        .success();
    let decoded = entries(&stdout_json(&assert));
    assert_eq!(decoded.len(), 6);
    assert_eq!(decoded[0], entry("ACTION", "", "Saves a person."));
    assert_eq!(
        decoded[3],
        entry("COMPARISON", "p:Person/first:String", "must not be empty")
    );
}

#[test]
fn decode_without_signature_keeps_structural_tags() {
    let assert = cmd()
        .arg("decode")
        .write_stdin(fixture("is_valid.txt"))
        .assert()
        .success();
    let decoded = stdout_json(&assert);
    assert_eq!(
        entries(&decoded),
        vec![entry("RULE", "", "the amount must be positive")]
    );
    let tags: Vec<_> = decoded["additional_tags"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["tag"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(tags, vec!["param", "return"]);
}

#[test]
fn decode_documented_return_on_void_operation_fails() {
    cmd()
        .args(["decode", "-s", &fixture_path("check.signature.json")])
        .write_stdin("Checks x.\n@return [REPORT] true if valid\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("\"check\""))
        .stderr(predicate::str::contains("\"return\" does not exist"));
}

#[test]
fn decode_orphan_continuation_fails() {
    cmd()
        .args(["decode", "-s", &fixture_path("check.signature.json")])
        .write_stdin("@paraminfo p [OBJECT] x\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("@paraminfo at segment 0"));
}

#[test]
fn decode_plain_comment() {
    let assert = cmd()
        .args(["decode", "--plain"])
        .write_stdin(fixture("plain.txt"))
        .assert()
        .success();
    assert_eq!(
        entries(&stdout_json(&assert)),
        vec![
            entry("", "", "Loads a customer."),
            entry("", "id", "the customer key"),
            entry("", "return", "the customer, never null"),
        ]
    );
}

#[test]
fn unknown_role_is_logged_not_fatal() {
    cmd()
        .args(["decode", "-s", &fixture_path("check.signature.json")])
        .write_stdin("@param p [TIME_TO_LIVE] ten seconds\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("ten seconds"))
        .stderr(predicate::str::contains("unrecognized thematic role"));
}

// -- decode, file mode --

#[test]
fn file_mode_creates_output() {
    let dir = TempDir::new().unwrap();

    cmd()
        .args(["decode", "-o", dir.path().to_str().unwrap()])
        .args(["-s", &fixture_path("save.signature.json")])
        .arg(fixture_path("save.txt"))
        .assert()
        .success();

    let output = std::fs::read_to_string(dir.path().join("save.json")).unwrap();
    let decoded: Value = serde_json::from_str(&output).unwrap();
    assert_eq!(entries(&decoded).len(), 6);
}

#[test]
fn file_mode_scans_directories_and_skips_failing_files() {
    let input = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    std::fs::write(input.path().join("bad.txt"), "@return [REPORT] nothing to return\n").unwrap();
    std::fs::write(input.path().join("good.txt"), "Checks x.\n\n@param p [OBJECT] the input\n").unwrap();
    let mut ignored = std::fs::File::create(input.path().join("notes.md")).unwrap();
    ignored.write_all(b"@param q [OBJECT] never read\n").unwrap();

    cmd()
        .args(["decode", "-o", out.path().to_str().unwrap()])
        .args(["-s", &fixture_path("check.signature.json")])
        .arg(input.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("skipping"));

    assert!(out.path().join("good.json").exists());
    assert!(!out.path().join("bad.json").exists());
    assert!(!out.path().join("notes.json").exists());
}

#[test]
fn file_mode_requires_output() {
    cmd()
        .args(["decode", &fixture_path("save.txt")])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--output is required"));
}

// -- grid, options, global flags --

#[test]
fn grid_name_from_stdin() {
    cmd()
        .arg("grid")
        .write_stdin(fixture("is_valid.txt"))
        .assert()
        .success()
        .stdout("Checking Operations\n");
}

#[test]
fn options_from_custom_catalog() {
    cmd()
        .args(["options", "--catalog", &fixture_path("catalog.json")])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("-tag paraminfo:tcm:\"Parameter-Info:\""))
        .stdout(predicate::str::contains("-tag time_to_live:tcm:\"Time To Live:\""));
}

#[test]
fn unknown_format_is_rejected() {
    cmd()
        .args(["-f", "yaml", "options"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown format: yaml"));
}

#[test]
fn verbose_logs_preserved_tags() {
    cmd()
        .args(["-v", "decode"])
        .write_stdin(fixture("is_valid.txt"))
        .assert()
        .success()
        .stderr(predicate::str::contains("preserving tag"));
}
