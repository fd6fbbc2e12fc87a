use std::fs;
use std::process::Command;

use tempfile::TempDir;

const VALID_SHADER: &str = r#"#version 410
uniform dvec2 screen_size;
uniform double zoom;
uniform int itr;

void mainImage(out vec4 color, in vec2 frag_coord) {
    vec2 uv = frag_coord / screen_size;
    color = vec4(uv * zoom, float(itr) / 256.0, 1.0);
}
"#;

const BROKEN_SHADER: &str = r#"void mainImage(out vec4 color, in vec2 frag_coord) {
    color = vec4(frag_coord, 0.0
}
"#;

fn run_check(file: &std::path::Path) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_fracview"))
        .env("RUST_LOG", "error")
        .env_remove("FRACVIEW_CONFIG")
        .arg("check")
        .arg(file)
        .output()
        .expect("failed to run fracview check")
}

#[test]
fn check_accepts_valid_shader() {
    let root = TempDir::new().unwrap();
    let path = root.path().join("fractal.glsl");
    fs::write(&path, VALID_SHADER).unwrap();

    let output = run_check(&path);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(String::from_utf8_lossy(&output.stdout).contains("ok"));
}

#[test]
fn check_rejects_broken_shader() {
    let root = TempDir::new().unwrap();
    let path = root.path().join("broken.glsl");
    fs::write(&path, BROKEN_SHADER).unwrap();

    let output = run_check(&path);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("broken.glsl"), "stderr: {stderr}");
}

#[test]
fn check_reports_missing_file() {
    let root = TempDir::new().unwrap();
    let output = run_check(&root.path().join("absent.glsl"));
    assert!(!output.status.success());
}

#[test]
fn bundled_shader_passes_check() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../../shaders/fractal.glsl");
    let output = run_check(&path);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}
