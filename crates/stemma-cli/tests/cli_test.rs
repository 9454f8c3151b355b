use assert_cmd::Command;
use std::fs;

fn cli() -> Command {
    Command::cargo_bin("stemma-cli").expect("binary builds")
}

#[test]
fn no_command_prints_usage_and_exits_2() {
    cli().assert().code(2);
}

#[test]
fn new_show_and_list_round_trip() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let dir = tmp.path().to_string_lossy().to_string();

    cli()
        .args(["new", "smith", "--data-dir", &dir])
        .assert()
        .success()
        .stdout("smith\n");

    assert!(tmp.path().join("smith.json").exists());

    let out = cli()
        .args(["show", "smith", "--data-dir", &dir])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let tree: serde_json::Value = serde_json::from_slice(&out).expect("json output");
    assert_eq!(tree["tree_id"], "smith");
    assert_eq!(tree["nodes"].as_array().map(Vec::len), Some(1));
    assert_eq!(tree["nodes"][0]["label"], "smith Family Root");

    cli()
        .args(["list", "--data-dir", &dir])
        .assert()
        .success()
        .stdout("smith\n");
}

#[test]
fn show_on_a_missing_tree_fails_without_creating_it() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let dir = tmp.path().to_string_lossy().to_string();

    cli()
        .args(["show", "smith", "--data-dir", &dir])
        .assert()
        .code(1);
    assert!(!tmp.path().join("smith.json").exists());

    // No root was minted anywhere: a second show fails the same way.
    cli()
        .args(["show", "smith", "--data-dir", &dir])
        .assert()
        .code(1);
}

#[test]
fn creating_an_existing_tree_fails() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let dir = tmp.path().to_string_lossy().to_string();

    cli()
        .args(["new", "smith", "--data-dir", &dir])
        .assert()
        .success();
    cli()
        .args(["new", "smith", "--data-dir", &dir])
        .assert()
        .code(1);
}

#[test]
fn delete_removes_the_tree_and_missing_delete_fails() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let dir = tmp.path().to_string_lossy().to_string();

    cli()
        .args(["new", "smith", "--data-dir", &dir])
        .assert()
        .success();
    cli()
        .args(["delete", "smith", "--data-dir", &dir])
        .assert()
        .success();
    assert!(!tmp.path().join("smith.json").exists());

    cli()
        .args(["delete", "smith", "--data-dir", &dir])
        .assert()
        .code(1);
}

#[test]
fn apply_runs_a_script_from_stdin_and_persists() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let dir = tmp.path().to_string_lossy().to_string();

    // First apply on a missing tree synthesizes the root.
    let out = cli()
        .args(["apply", "smith", "-", "--data-dir", &dir])
        .write_stdin("[]")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let tree: serde_json::Value = serde_json::from_slice(&out).expect("json output");
    let root_id = tree["nodes"][0]["id"].as_str().expect("root id").to_string();

    let script = format!(
        r#"[{{"op":"addChild","parent":"{root_id}"}},{{"op":"toggleCollapse","id":"{root_id}"}}]"#
    );
    let out = cli()
        .args(["apply", "smith", "-", "--data-dir", &dir])
        .write_stdin(script)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let tree: serde_json::Value = serde_json::from_slice(&out).expect("json output");

    assert_eq!(tree["nodes"].as_array().map(Vec::len), Some(2));
    assert_eq!(tree["created"].as_array().map(Vec::len), Some(1));
    assert_eq!(tree["hidden_edges"].as_array().map(Vec::len), Some(1));

    // The save made it to disk: the child is in the stored record too.
    let stored = fs::read_to_string(tmp.path().join("smith.json")).expect("stored tree");
    let record: serde_json::Value = serde_json::from_str(&stored).expect("stored json");
    assert_eq!(record["nodes"].as_array().map(Vec::len), Some(2));
}

#[test]
fn apply_script_from_a_file_with_undo() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let dir = tmp.path().to_string_lossy().to_string();

    cli()
        .args(["new", "smith", "--data-dir", &dir])
        .assert()
        .success();
    let out = cli()
        .args(["apply", "smith", "-", "--data-dir", &dir])
        .write_stdin("[]")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let tree: serde_json::Value = serde_json::from_slice(&out).expect("json output");
    let root_id = tree["nodes"][0]["id"].as_str().expect("root id");

    let script_path = tmp.path().join("script.json");
    fs::write(
        &script_path,
        format!(r#"[{{"op":"addChild","parent":"{root_id}"}},{{"op":"undo"}}]"#),
    )
    .expect("write script");

    let out = cli()
        .args([
            "apply",
            "smith",
            script_path.to_string_lossy().as_ref(),
            "--data-dir",
            &dir,
        ])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let tree: serde_json::Value = serde_json::from_slice(&out).expect("json output");
    assert_eq!(tree["nodes"].as_array().map(Vec::len), Some(1));
}

#[test]
fn apply_rejects_a_malformed_script() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let dir = tmp.path().to_string_lossy().to_string();

    cli()
        .args(["apply", "smith", "-", "--data-dir", &dir])
        .write_stdin(r#"[{"op":"teleport"}]"#)
        .assert()
        .code(1);
}
