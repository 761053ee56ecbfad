use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

#[test]
fn preprocess_rewrites_html_details() {
    let dir = tempdir().unwrap();
    let input_path = dir.path().join("comment.md");
    fs::write(&input_path, "<details><summary>Hello</summary>World</details>").unwrap();

    let mut cmd = cargo_bin_cmd!("richtext");
    cmd.arg("preprocess").arg(input_path.as_os_str());

    cmd.assert()
        .success()
        .stdout("<Details summary=\"Hello\">\n\nWorld\n\n</Details>\n");
}

#[test]
fn postprocess_reads_stdin() {
    let mut cmd = cargo_bin_cmd!("richtext");
    cmd.arg("postprocess")
        .arg("-")
        .write_stdin("<Details summary=\"Hello\">\n\nWorld\n\n</Details>");

    cmd.assert()
        .success()
        .stdout("<details><summary>Hello</summary>\n\nWorld\n\n</details>\n");
}

#[test]
fn import_prints_document_tree() {
    let mut cmd = cargo_bin_cmd!("richtext");
    cmd.arg("import")
        .arg("-")
        .write_stdin("<details><summary>Hello</summary>World</details>");

    let output_pred = predicate::str::contains("\"type\": \"details\"")
        .and(predicate::str::contains("\"text\": \"Hello\""))
        .and(predicate::str::contains("\"text\": \"World\""));

    cmd.assert().success().stdout(output_pred);
}

#[test]
fn import_then_export_round_trips() {
    let dir = tempdir().unwrap();
    let json_path = dir.path().join("doc.json");

    let mut import = cargo_bin_cmd!("richtext");
    import
        .arg("import")
        .arg("-")
        .arg("-o")
        .arg(json_path.as_os_str())
        .write_stdin("Intro\n\n<Details summary=\"**Bold** title\">\n\nBody\n\n</Details>\n");
    import.assert().success();

    let mut export = cargo_bin_cmd!("richtext");
    export.arg("export").arg(json_path.as_os_str());
    export.assert().success().stdout(
        predicate::str::contains("<Details summary=\"**Bold** title\">")
            .and(predicate::str::contains("Intro"))
            .and(predicate::str::contains("DetailsSummary").not()),
    );
}

#[test]
fn export_html_flag_writes_literal_details() {
    let dir = tempdir().unwrap();
    let json_path = dir.path().join("doc.json");

    let mut import = cargo_bin_cmd!("richtext");
    import
        .arg("import")
        .arg("-")
        .arg("-o")
        .arg(json_path.as_os_str())
        .write_stdin("<details><summary>S</summary>C</details>");
    import.assert().success();

    let mut export = cargo_bin_cmd!("richtext");
    export.arg("export").arg(json_path.as_os_str()).arg("--html");
    export
        .assert()
        .success()
        .stdout("<details><summary>S</summary>\n\nC\n\n</details>\n");
}

#[test]
fn export_rejects_invalid_json() {
    let mut cmd = cargo_bin_cmd!("richtext");
    cmd.arg("export").arg("-").write_stdin("not json");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Export error"));
}

#[test]
fn missing_input_file_fails() {
    let mut cmd = cargo_bin_cmd!("richtext");
    cmd.arg("preprocess").arg("/nonexistent/comment.md");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Error reading file"));
}
