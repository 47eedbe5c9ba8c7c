use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use image::{Rgba, RgbaImage};
use tempfile::TempDir;

fn write_image(path: &Path, color: [u8; 4]) {
    RgbaImage::from_pixel(16, 8, Rgba(color)).save(path).unwrap();
}

fn write_deck(dir: &Path, media: [&str; 2]) -> std::path::PathBuf {
    let deck = format!(
        r#"
version = 1

[timing]
transition = "500ms"
auto_slide = "2s"

[display]
width = 64
height = 36

[[slides]]
id = "dawn"
title = "Dawn"
media = "{}"

[[slides]]
id = "dusk"
title = "Dusk"
media = "{}"
"#,
        media[0], media[1]
    );
    let path = dir.join("deck.toml");
    fs::write(&path, deck).unwrap();
    path
}

fn slidewall(config_dir: &Path) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_slidewall"));
    command
        .env("SLIDEWALL_CONFIG_DIR", config_dir)
        .env("RUST_LOG", "warn");
    command
}

fn run_with_stdin(mut command: Command, input: &str) -> Output {
    let mut child = command
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn slidewall");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(input.as_bytes())
        .unwrap();
    child.wait_with_output().expect("failed to wait for slidewall")
}

#[test]
fn effects_lists_catalog() {
    let root = TempDir::new().unwrap();
    let output = slidewall(root.path()).arg("effects").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("glass"));
    assert!(stdout.contains("rippleFrequency"));
    assert!(stdout.contains("Arctic"));

    let json = slidewall(root.path())
        .args(["effects", "--json"])
        .output()
        .unwrap();
    assert!(json.status.success());
    let document: serde_json::Value = serde_json::from_slice(&json.stdout).unwrap();
    assert_eq!(document["effects"].as_array().unwrap().len(), 5);
}

#[test]
fn seeded_randomize_is_deterministic() {
    let root = TempDir::new().unwrap();
    let first = slidewall(root.path())
        .args(["randomize", "--seed", "42"])
        .output()
        .unwrap();
    let second = slidewall(root.path())
        .args(["randomize", "--seed", "42"])
        .output()
        .unwrap();
    assert!(first.status.success());
    assert_eq!(first.stdout, second.stdout);

    let config: serde_json::Value = serde_json::from_slice(&first.stdout).unwrap();
    assert_eq!(config["currentPreset"], "Custom");
}

#[test]
fn render_writes_png_of_requested_size() {
    let root = TempDir::new().unwrap();
    let from = root.path().join("from.png");
    let to = root.path().join("to.png");
    write_image(&from, [255, 0, 0, 255]);
    write_image(&to, [0, 0, 255, 255]);
    let out = root.path().join("out/frame.png");

    let output = slidewall(root.path())
        .args(["render", "--effect", "ripple", "--preset", "Strong"])
        .args(["--set", "rippleAmplitude=0.1", "--progress", "0.5"])
        .args(["--size", "40x20"])
        .arg("--from")
        .arg(&from)
        .arg("--to")
        .arg(&to)
        .arg("--out")
        .arg(&out)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );

    let image = image::open(&out).unwrap();
    assert_eq!((image.width(), image.height()), (40, 20));
}

#[test]
fn render_rejects_unknown_preset() {
    let root = TempDir::new().unwrap();
    let from = root.path().join("from.png");
    write_image(&from, [0, 0, 0, 255]);

    let status = slidewall(root.path())
        .args(["render", "--effect", "glass", "--preset", "Arctic", "--progress", "0.5"])
        .arg("--from")
        .arg(&from)
        .arg("--to")
        .arg(&from)
        .arg("--out")
        .arg(root.path().join("never.png"))
        .output()
        .unwrap()
        .status;
    assert!(!status.success());
    assert!(!root.path().join("never.png").exists());
}

#[test]
fn run_applies_commands_and_saves_state() {
    let root = TempDir::new().unwrap();
    let config_dir = root.path().join("config");
    let media_dir = root.path().join("media");
    fs::create_dir_all(&media_dir).unwrap();
    write_image(&media_dir.join("dawn.png"), [250, 200, 120, 255]);
    write_image(&media_dir.join("dusk.png"), [40, 30, 90, 255]);
    let deck = write_deck(&media_dir, ["dawn.png", "dusk.png"]);

    let mut command = slidewall(&config_dir);
    command
        .args(["run", "--duration", "10s", "--fps", "60"])
        .arg("--config")
        .arg(&deck);
    let output = run_with_stdin(command, "set glassEdgeGlow 1.4\nnext\nstatus\nquit\n");
    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("effect=glass"), "{stdout}");

    let state = fs::read_to_string(config_dir.join("state.toml")).unwrap();
    let edge_glow: f32 = state
        .lines()
        .find_map(|line| line.trim().strip_prefix("glassEdgeGlow ="))
        .unwrap_or_else(|| panic!("glassEdgeGlow missing from {state}"))
        .trim()
        .parse()
        .unwrap();
    assert!((edge_glow - 1.4).abs() < 1e-4, "{state}");
    assert!(state.contains("preset = \"Custom\""), "{state}");
    assert!(state.contains("last_slide = \"dusk\""), "{state}");
}

#[test]
fn run_writes_reference_frames() {
    let root = TempDir::new().unwrap();
    let media_dir = root.path().join("media");
    fs::create_dir_all(&media_dir).unwrap();
    write_image(&media_dir.join("a.png"), [255, 255, 255, 255]);
    write_image(&media_dir.join("b.png"), [0, 0, 0, 255]);
    let deck = write_deck(&media_dir, ["a.png", "b.png"]);
    let frames = root.path().join("frames");

    let mut command = slidewall(&root.path().join("config"));
    command
        .args(["run", "--duration", "300ms", "--fps", "20", "--size", "16x8"])
        .arg("--config")
        .arg(&deck)
        .arg("--frames")
        .arg(&frames);
    let output = run_with_stdin(command, "");
    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(frames.join("frame-000000.png").exists());
}

#[test]
fn run_fails_with_fewer_than_two_loadable_slides() {
    let root = TempDir::new().unwrap();
    let media_dir = root.path().join("media");
    fs::create_dir_all(&media_dir).unwrap();
    write_image(&media_dir.join("present.png"), [10, 10, 10, 255]);
    let deck = write_deck(&media_dir, ["present.png", "missing.png"]);

    let mut command = slidewall(&root.path().join("config"));
    command.args(["run", "--duration", "1s"]).arg("--config").arg(&deck);
    let output = run_with_stdin(command, "");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("at least 2"), "{stderr}");
}

#[test]
fn run_opens_on_last_shown_slide_without_transition() {
    let root = TempDir::new().unwrap();
    let config_dir = root.path().join("config");
    let media_dir = root.path().join("media");
    fs::create_dir_all(&config_dir).unwrap();
    fs::create_dir_all(&media_dir).unwrap();
    write_image(&media_dir.join("dawn.png"), [250, 200, 120, 255]);
    write_image(&media_dir.join("dusk.png"), [40, 30, 90, 255]);
    let deck = write_deck(&media_dir, ["dawn.png", "dusk.png"]);
    fs::write(config_dir.join("state.toml"), "last_slide = \"dusk\"\n").unwrap();

    let mut command = slidewall(&config_dir);
    command
        .args(["run", "--duration", "10s"])
        .arg("--config")
        .arg(&deck);
    let output = run_with_stdin(command, "status\nquit\n");
    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("slide 02/02 Dusk"), "{stdout}");
    assert!(stdout.contains("transitioning=false"), "{stdout}");
}
