//! Integration tests: run the `jigcut` binary and check the stdout JSON
//! contract and exit status.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::Value;

fn scratch(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("jigcut-cli-{name}-{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_source_image(path: &Path) {
    image::RgbaImage::from_pixel(40, 20, image::Rgba([30, 90, 160, 255]))
        .save(path)
        .unwrap();
}

fn jigcut(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_jigcut"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run jigcut")
}

/// The last stdout line, parsed as JSON.
fn last_json_line(output: &Output) -> Value {
    let stdout = String::from_utf8(output.stdout.clone()).unwrap();
    let line = stdout.lines().last().expect("no stdout");
    serde_json::from_str(line).unwrap()
}

fn error_message(output: &Output) -> String {
    assert!(!output.status.success(), "expected failure");
    let value = last_json_line(output);
    value["error"].as_str().expect("no error key").to_owned()
}

fn path_str(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn no_arguments_is_usage_error() {
    let output = jigcut(&[]);
    let message = error_message(&output);
    assert!(
        message.starts_with("Usage: jigcut <image_path> <output_dir> <num_pieces>"),
        "{message}"
    );
}

#[test]
fn extra_argument_is_usage_error() {
    let output = jigcut(&["a.png", "out", "10", "surplus"]);
    assert!(error_message(&output).starts_with("Usage: jigcut"));
}

#[test]
fn non_integer_piece_count_is_rejected() {
    let output = jigcut(&["a.png", "out", "many"]);
    assert_eq!(
        error_message(&output),
        "Invalid piece count: 'many' is not an integer."
    );
}

#[test]
fn too_few_pieces_rejected_before_cutter_runs() {
    let dir = scratch("too-few");
    let image = dir.join("source.png");
    write_source_image(&image);
    let out = dir.join("out");

    for (arg, expected) in [
        ("1", "Need at least 2 pieces, got 1."),
        ("-3", "Need at least 2 pieces, got -3."),
    ] {
        let output = jigcut(&[
            path_str(&image),
            path_str(&out),
            arg,
            "--cutter",
            "jigcut-test-no-such-cutter",
        ]);
        assert_eq!(error_message(&output), expected);
    }
    assert!(!out.exists());
    fs::remove_dir_all(dir).unwrap();
}

#[test]
fn missing_image_is_reported() {
    let dir = scratch("missing-image");
    let image = dir.join("absent.png");
    let output = jigcut(&[path_str(&image), path_str(&dir.join("out")), "10"]);
    assert_eq!(
        error_message(&output),
        format!("Image not found: {}", image.display())
    );
    fs::remove_dir_all(dir).unwrap();
}

#[test]
fn missing_cutter_is_reported() {
    let dir = scratch("missing-cutter");
    let image = dir.join("source.png");
    write_source_image(&image);
    let out = dir.join("out");
    let output = jigcut(&[
        path_str(&image),
        path_str(&out),
        "10",
        "--min-long-side",
        "10",
        "--cutter",
        "jigcut-test-no-such-cutter",
    ]);
    let message = error_message(&output);
    assert!(message.starts_with("piecemaker not found"), "{message}");
    assert!(!dir.join("out_temp").exists());
    fs::remove_dir_all(dir).unwrap();
}

#[test]
fn malformed_config_json_is_usage_error() {
    let output = jigcut(&["a.png", "out", "10", "--config-json", "{nope"]);
    assert!(error_message(&output).starts_with("Error parsing --config-json"));
}

#[test]
fn config_json_zero_timeout_is_usage_error() {
    let output = jigcut(&[
        "a.png",
        "out",
        "10",
        "--config-json",
        r#"{"cutter_timeout_secs": 0}"#,
    ]);
    assert_eq!(
        error_message(&output),
        "Invalid config: cutter_timeout_secs must be at least 1"
    );
}

#[test]
fn zero_timeout_flag_is_usage_error() {
    let output = jigcut(&["a.png", "out", "10", "--timeout-secs", "0"]);
    assert!(error_message(&output).starts_with("Usage:"));
}

#[cfg(unix)]
mod with_fake_piecemaker {
    use std::os::unix::fs::PermissionsExt;

    use super::*;

    /// A stand-in for piecemaker: a 2x2 grid on a 2000x1000 image,
    /// rendered in three size tiers.
    const FAKE_PIECEMAKER: &str = r#"#!/bin/sh
while [ $# -gt 0 ]; do
  case "$1" in
    --dir) dir="$2"; shift 2 ;;
    --number-of-pieces|--scaled-sizes) shift 2 ;;
    *) shift ;;
  esac
done
printf '{"image_width": 2000, "image_height": 1000}' > "$dir/index.json"
printf '{"0": ["1", "2"], "1": ["0", "3"], "2": ["0", "3"], "3": ["1", "2"]}' > "$dir/adjacent.json"
for tier in 100 50 25; do
  mkdir -p "$dir/size-$tier/raster/image-0"
  w=$((1011 * tier / 100)); h=$((511 * tier / 100))
  printf '{"0": [0, 0, 1010, 510, %s, %s], "1": [990, 0, 2000, 510, %s, %s], "2": [0, 490, 1010, 1000, %s, %s], "3": [990, 490, 2000, 1000, %s, %s]}' \
    $w $h $w $h $w $h $w $h > "$dir/size-$tier/pieces.json"
  for id in 0 1 2 3; do
    printf 'tier %s piece %s' $tier $id > "$dir/size-$tier/raster/image-0/$id.png"
  done
done
printf '<svg/>' > "$dir/lines-resized.svg"
echo "generated pieces"
"#;

    fn install_script(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, body).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[test]
    fn end_to_end_success() {
        let dir = scratch("e2e");
        let cutter = install_script(&dir, "piecemaker", FAKE_PIECEMAKER);
        let image = dir.join("image.png");
        write_source_image(&image);
        let out = dir.join("out");

        let output = jigcut(&[
            path_str(&image),
            path_str(&out),
            "50",
            "--cutter",
            path_str(&cutter),
            "--min-long-side",
            "10",
        ]);
        assert!(
            output.status.success(),
            "stderr: {}",
            String::from_utf8_lossy(&output.stderr)
        );

        let stdout_doc = last_json_line(&output);
        let file_doc: Value =
            serde_json::from_str(&fs::read_to_string(out.join("metadata.json")).unwrap()).unwrap();
        assert_eq!(stdout_doc, file_doc);

        let pieces = stdout_doc["pieces"].as_array().unwrap();
        assert_eq!(stdout_doc["piece_count"], pieces.len());
        assert!(pieces.len() <= 50);
        assert_eq!(stdout_doc["requested_pieces"], 50);
        assert_eq!(stdout_doc["image_width"], 2000);
        assert_eq!(stdout_doc["image_height"], 1000);
        assert!(stdout_doc.get("warning").is_none());

        for piece in pieces {
            let filename = piece["filename"].as_str().unwrap();
            let contents = fs::read_to_string(out.join("pieces").join(filename)).unwrap();
            assert!(contents.starts_with("tier 100 "), "{filename}: {contents}");
            assert_eq!(piece["type"], "corner");
            assert_eq!(piece["width"], 1011);
        }
        assert_eq!(pieces[3]["neighbours"], serde_json::json!([1, 2]));

        assert!(out.join("lines.svg").exists());
        assert!(!out.join("lines.png").exists());
        assert!(!dir.join("out_temp").exists());
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn cutter_failure_reports_stderr() {
        let dir = scratch("cutter-fails");
        let cutter = install_script(
            &dir,
            "piecemaker",
            "#!/bin/sh\necho 'cannot identify image file' >&2\nexit 1\n",
        );
        let image = dir.join("image.png");
        write_source_image(&image);

        let output = jigcut(&[
            path_str(&image),
            path_str(&dir.join("out")),
            "12",
            "--cutter",
            path_str(&cutter),
            "--min-long-side",
            "10",
        ]);
        let message = error_message(&output);
        assert!(message.starts_with("piecemaker failed"), "{message}");
        assert!(message.contains("cannot identify image file"), "{message}");
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn cutter_without_output_is_no_output() {
        let dir = scratch("cutter-silent");
        let cutter = install_script(&dir, "piecemaker", "#!/bin/sh\nexit 0\n");
        let image = dir.join("image.png");
        write_source_image(&image);

        let output = jigcut(&[
            path_str(&image),
            path_str(&dir.join("out")),
            "12",
            "--config-json",
            &format!(
                r#"{{"cutter_program": "{}", "min_long_side": 10}}"#,
                path_str(&cutter)
            ),
        ]);
        assert_eq!(
            error_message(&output),
            "No output directory found from piecemaker"
        );
        fs::remove_dir_all(dir).unwrap();
    }
}
