use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn run(args: &[&str]) -> Output {
    // `cargo test` sets this for integration tests.
    let bin = env!("CARGO_BIN_EXE_repo-context");
    Command::new(bin)
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("spawn repo-context")
}

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

fn fixture() -> TempDir {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "README.md", "# Fixture\n\nSmoke test repository.\n");
    write(tmp.path(), "Cargo.toml", "[package]\nname = \"fixture\"\nversion = \"0.1.0\"\n");
    write(tmp.path(), "src/main.rs", "fn main() {\n    println!(\"hi\");\n}\n");
    tmp
}

fn without_timestamp(text: &str) -> String {
    text.lines()
        .filter(|l| !l.starts_with("**Generated at:**"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn missing_root_fails_without_output() {
    let tmp = TempDir::new().unwrap();
    let missing = tmp.path().join("does-not-exist");
    let out = run(&[missing.to_str().unwrap()]);

    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("does not exist"));
    assert!(!missing.join("CONTEXT.md").exists());
    assert!(!tmp.path().join("CONTEXT.md").exists());
}

#[test]
fn writes_context_file() {
    let tmp = fixture();
    let out = run(&[tmp.path().to_str().unwrap()]);
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("Context file generated:"));
    assert!(stdout.contains("Detected types: rust"));

    let text = std::fs::read_to_string(tmp.path().join("CONTEXT.md")).unwrap();
    assert!(text.starts_with("# Repository Context\n"));
    assert!(text.contains("Smoke test repository."));
    assert!(text.contains("- **Rust:** `src/main.rs`"));
    assert!(text.contains("\"name\": \"fixture\""));
}

#[test]
fn repeated_runs_match_except_timestamp() {
    let tmp = fixture();
    let root = tmp.path().to_str().unwrap();

    assert!(run(&[root]).status.success());
    let first = std::fs::read_to_string(tmp.path().join("CONTEXT.md")).unwrap();
    assert!(run(&[root]).status.success());
    let second = std::fs::read_to_string(tmp.path().join("CONTEXT.md")).unwrap();

    pretty_assertions::assert_eq!(without_timestamp(&first), without_timestamp(&second));
}

#[test]
fn stdout_mode_writes_nothing() {
    let tmp = fixture();
    let out = run(&["--stdout", "--format", "xml", tmp.path().to_str().unwrap()]);
    assert!(out.status.success());

    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.starts_with("<?xml"));
    assert!(!tmp.path().join("CONTEXT.md").exists());
}

#[test]
fn cli_limits_override_defaults() {
    let tmp = fixture();
    let out = run(&["--max-total-size", "200", "-o", "ctx.md", tmp.path().to_str().unwrap()]);
    assert!(out.status.success());

    let text = std::fs::read_to_string(tmp.path().join("ctx.md")).unwrap();
    assert!(text.contains("*(Reached size limit, some files omitted)*"));
    assert!(!text.contains("## Source Code Samples"));
}
