use assert_cmd::prelude::*;
use predicates::str::contains;
use std::io::Write;
use std::process::Command;
use tempfile::NamedTempFile;

fn write_config(xml: &str) -> NamedTempFile {
    let mut tmp = NamedTempFile::new().expect("temp config");
    tmp.write_all(xml.as_bytes()).expect("write config");
    tmp
}

fn glyphlight() -> Command {
    Command::cargo_bin("glyphlight").expect("binary exists")
}

#[test]
fn default_scene_summary_lists_all_nodes() {
    glyphlight()
        .arg("--summary-only")
        .assert()
        .success()
        .stdout(contains("Loaded scene with 5 nodes (2 glyphs)"))
        .stdout(contains(" - Camera (Camera)"))
        .stdout(contains(" - LightCube (LightCube)"))
        .stdout(contains(" - CubeLight (PointLight)"))
        .stdout(contains(" - Text0 (Text)"))
        .stdout(contains(" - Text1 (Text)"))
        .stdout(contains("Simulated 0 frame(s)"));
}

#[test]
fn holding_w_moves_the_cube_one_tenth_per_frame() {
    glyphlight()
        .args(["--summary-only", "--frames", "7", "--hold", "w"])
        .assert()
        .success()
        .stdout(contains(" - LightCube pos=(0.00, 0.70, 0.00)"))
        .stdout(contains(" - CubeLight pos=(0.00, 0.70, 0.00)"))
        .stdout(contains("Shader light position: (0.00, 0.70, 0.00)"));
}

#[test]
fn camera_keys_move_the_camera_not_the_cube() {
    glyphlight()
        .args(["--summary-only", "--frames", "5", "--hold", "d"])
        .assert()
        .success()
        .stdout(contains(" - Camera pos=(0.50, 0.00, 10.00)"))
        .stdout(contains(" - LightCube pos=(0.00, 0.00, 0.00)"));
}

#[test]
fn disabled_light_refresh_keeps_the_uniform_at_the_origin() {
    let config = write_config(
        r#"<scene>
  <refresh-light>false</refresh-light>
</scene>
"#,
    );
    glyphlight()
        .arg(config.path())
        .args(["--summary-only", "--frames", "4", "--hold", "w"])
        .assert()
        .success()
        .stdout(contains(" - LightCube pos=(0.00, 0.40, 0.00)"))
        .stdout(contains("Shader light position: (0.00, 0.00, 0.00)"));
}

#[test]
fn disabled_input_ignores_held_keys() {
    let config = write_config(
        r#"<scene>
  <input>disabled</input>
</scene>
"#,
    );
    glyphlight()
        .arg(config.path())
        .args(["--summary-only", "--frames", "4", "--hold", "w,d"])
        .assert()
        .success()
        .stdout(contains(" - LightCube pos=(0.00, 0.00, 0.00)"))
        .stdout(contains(" - Camera pos=(0.00, 0.00, 10.00)"));
}

#[test]
fn missing_font_is_reported_and_scene_still_runs() {
    let config = write_config(
        r#"<scene>
  <font>/definitely/not/a/font.ttf</font>
</scene>
"#,
    );
    glyphlight()
        .arg(config.path())
        .args(["--summary-only", "--frames", "1"])
        .assert()
        .success()
        .stdout(contains("Font failed to load; scene has no glyph meshes"))
        .stdout(contains("Final node states:"));
}

#[test]
fn custom_scene_config_overrides_the_glyphs() {
    let config = write_config(
        r#"<scene>
  <text>
    <glyph>z</glyph>
    <finish>metal</finish>
    <color>10 200 30</color>
    <position>0 1 0</position>
  </text>
</scene>
"#,
    );
    glyphlight()
        .arg(config.path())
        .arg("--summary-only")
        .assert()
        .success()
        .stdout(contains("Loaded scene with 4 nodes (1 glyphs)"))
        .stdout(contains(" - Text0 (Text)"));
}

#[test]
fn unknown_flag_is_rejected() {
    glyphlight()
        .arg("--bogus")
        .assert()
        .failure()
        .stderr(contains("Unknown argument"));
}
