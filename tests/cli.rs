//! End-to-end runs of the `svg-sprite` binary.

use std::fs;
use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

const HOME: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24"><path d="M2 12 12 2l10 10"/></svg>"#;
const ARROW: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="16" height="8"><path id="a" d="M0 4h16"/></svg>"#;

fn run(dir: &Path, args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_svg-sprite"))
        .current_dir(dir)
        .args(args)
        .output()
        .expect("failed to run svg-sprite")
}

fn setup() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("icons/nav")).unwrap();
    fs::write(dir.path().join("icons/home.svg"), HOME).unwrap();
    fs::write(dir.path().join("icons/nav/arrow.svg"), ARROW).unwrap();
    dir
}

fn files_below(dir: &Path) -> Vec<String> {
    let mut files = Vec::new();
    let mut stack = vec![dir.to_path_buf()];
    while let Some(current) = stack.pop() {
        for entry in fs::read_dir(&current).unwrap().flatten() {
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
            } else {
                let rel = path.strip_prefix(dir).unwrap();
                files.push(rel.to_string_lossy().replace('\\', "/"));
            }
        }
    }
    files.sort();
    files
}

#[test]
fn test_default_css_mode() {
    let dir = setup();
    let output = run(dir.path(), &["--color", "never", "icons"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let out = dir.path().join("out");
    let files = files_below(&out);
    assert_eq!(files.len(), 2, "{files:?}");
    assert!(files.contains(&"sprite.css".to_string()));

    let sprite = files.iter().find(|f| f.starts_with("svg/sprite.css-")).unwrap();
    let css = fs::read_to_string(out.join("sprite.css")).unwrap();
    assert!(css.contains(&format!("url(\"{sprite}\")")));
    assert!(css.contains(".svg-home"));
    assert!(css.contains(".svg-nav--arrow"));
}

#[test]
fn test_config_file_and_modes() {
    let dir = setup();
    fs::write(
        dir.path().join("sprite.toml"),
        r#"
dest = "dist"

[shape.spacing]
padding = 2

[mode.symbol]
example = true

[mode.stack]
bust = true
"#,
    )
    .unwrap();

    let output = run(dir.path(), &["-q", "icons"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(output.stdout.is_empty());

    let dist = dir.path().join("dist");
    let files = files_below(&dist);
    assert!(files.contains(&"svg/sprite.symbol.svg".to_string()), "{files:?}");
    assert!(files.contains(&"sprite.symbol.html".to_string()));
    assert!(files.iter().any(|f| f.starts_with("svg/sprite.stack-")));

    let symbol = fs::read_to_string(dist.join("svg/sprite.symbol.svg")).unwrap();
    assert!(symbol.contains(r#"<symbol id="home" viewBox="-2 -2 28 28""#));
    assert!(symbol.contains(r#"<path id="ba""#));
}

#[test]
fn test_mode_selection_and_output_override() {
    let dir = setup();
    let output = run(
        dir.path(),
        &["--mode", "defs", "-o", "build", "icons/home.svg"],
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(
        files_below(&dir.path().join("build")),
        vec!["svg/sprite.defs.svg"]
    );
}

#[test]
fn test_unknown_mode_fails() {
    let dir = setup();
    let output = run(dir.path(), &["--mode", "bogus", "icons"]);
    assert!(!output.status.success());
}

#[test]
fn test_missing_input_fails() {
    let dir = setup();
    let output = run(dir.path(), &["missing.svg"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("input not found"));
}
