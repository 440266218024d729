use assert_cmd::Command;

const TREE: &str = r#"{"id":"root","label":"Root","children":[{"id":"a","label":"Alpha","children":[{"id":"a1","label":"Alpha One"}]},{"id":"b","label":"Beta"}]}"#;

fn cli() -> Command {
    Command::cargo_bin("mapling-cli").unwrap()
}

#[test]
fn render_emits_svg_on_stdout() {
    let output = cli().arg("render").write_stdin(TREE).output().unwrap();
    assert!(output.status.success());
    let svg = String::from_utf8(output.stdout).unwrap();
    assert!(svg.starts_with("<svg"));
    assert!(svg.contains("Alpha One"));
    assert!(svg.contains(r#"class="mindmap-node"#));
}

#[test]
fn render_is_the_default_command() {
    let output = cli().write_stdin(TREE).output().unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8(output.stdout).unwrap().starts_with("<svg"));
}

#[test]
fn layout_prints_one_position_per_visible_node() {
    let output = cli()
        .args(["layout", "--pretty"])
        .write_stdin(TREE)
        .output()
        .unwrap();
    assert!(output.status.success());
    let layout: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(layout["nodes"].as_array().unwrap().len(), 4);
    assert_eq!(layout["edges"].as_array().unwrap().len(), 3);
    assert!(layout["bounds"]["max_x"].as_f64().is_some());
}

#[test]
fn collapsed_flag_prunes_the_subtree() {
    let output = cli()
        .args(["render", "--collapsed", "a"])
        .write_stdin(TREE)
        .output()
        .unwrap();
    assert!(output.status.success());
    let svg = String::from_utf8(output.stdout).unwrap();
    assert!(!svg.contains("Alpha One"));
    assert!(svg.contains(">+</text>"));
}

#[test]
fn export_writes_a_4k_png() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("tree.json");
    std::fs::write(&input, TREE).unwrap();
    let out = dir.path().join("map.png");

    let output = cli()
        .args(["export", "--out"])
        .arg(&out)
        .arg(&input)
        .output()
        .unwrap();
    assert!(output.status.success());

    let file = std::fs::File::open(&out).unwrap();
    let decoder = png::Decoder::new(file);
    let reader = decoder.read_info().unwrap();
    let info = reader.info();
    assert_eq!((info.width, info.height), (3840, 2160));
}

#[test]
fn export_defaults_to_a_png_next_to_the_input() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("tree.json");
    std::fs::write(&input, TREE).unwrap();

    let output = cli().arg("export").arg(&input).output().unwrap();
    assert!(output.status.success());
    assert!(dir.path().join("tree.png").exists());
}

#[test]
fn malformed_json_fails_with_a_message() {
    let output = cli().arg("layout").write_stdin("not json").output().unwrap();
    assert!(!output.status.success());
    assert!(!output.stderr.is_empty());
}

#[test]
fn duplicate_ids_fail_with_the_structural_error() {
    let bad = r#"{"id":"root","label":"Root","children":[{"id":"x","label":"1"},{"id":"x","label":"2"}]}"#;
    let output = cli().arg("render").write_stdin(bad).output().unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("Duplicate node id"));
}

#[test]
fn unknown_flag_prints_usage() {
    let output = cli().arg("--bogus").output().unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("USAGE"));
}
