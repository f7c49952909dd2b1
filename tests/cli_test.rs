// End-to-end tests driving the cpprecon binary

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn cpprecon(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_cpprecon"))
        .args(args)
        .output()
        .expect("Failed to run cpprecon")
}

fn write_source(dir: &Path, name: &str, text: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, text).unwrap();
    path
}

fn reconstructed(path: &Path) -> PathBuf {
    PathBuf::from(format!("{}.reconstructed", path.display()))
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_success_writes_reconstruction() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_source(dir.path(), "main.cpp", "int main(int argc, char* argv[]) { return 0; }\n");

    let output = cpprecon(&[input.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(0), "{}", stdout(&output));

    let text = fs::read_to_string(reconstructed(&input)).unwrap();
    assert_eq!(text, "int main(int argc, char* argv[])\n{\n  return 0;\n}\n");
}

#[test]
fn test_missing_argument_prints_usage() {
    let output = cpprecon(&[]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).contains("Usage"), "{}", stdout(&output));
}

#[test]
fn test_unreadable_input_exits_3() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("absent.cpp");

    let output = cpprecon(&[input.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(3));
    assert!(stdout(&output).starts_with(&format!("Cannot open: {}", input.display())));
    assert!(!reconstructed(&input).exists());
}

#[test]
fn test_parse_failure_exits_2_without_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_source(dir.path(), "broken.cpp", "int main() {\n  return 0;\n");

    let output = cpprecon(&[input.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(2));
    let text = stdout(&output);
    assert!(text.starts_with(&format!("Cannot parse: {}\n", input.display())), "{}", text);
    assert!(text.contains("line 3"), "{}", text);
    assert!(text.contains("end of file"), "{}", text);
    assert!(!reconstructed(&input).exists());
}

#[test]
fn test_parse_failure_leaves_existing_output_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_source(dir.path(), "broken.cpp", "struct S { int x };\n");
    fs::write(reconstructed(&input), "previous").unwrap();

    let output = cpprecon(&[input.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(2));
    assert_eq!(fs::read_to_string(reconstructed(&input)).unwrap(), "previous");
}

#[test]
fn test_formatting_flags_and_verify() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_source(dir.path(), "loop.cpp", "void f(int n) { for (int i = 0; i < n; ++i) { g(i); } }\n");

    let output = cpprecon(&[
        "--indent",
        "4",
        "--brace-style",
        "same-line",
        "--verify",
        input.to_str().unwrap(),
    ]);
    assert_eq!(output.status.code(), Some(0), "{}", stdout(&output));

    let text = fs::read_to_string(reconstructed(&input)).unwrap();
    assert_eq!(text, "void f(int n) {\n    for (int i = 0; i < n; ++i) {\n        g(i);\n    }\n}\n");
}

#[test]
fn test_verbose_logs_to_stderr_only() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_source(dir.path(), "one.cpp", "int x = 1;\n");

    let output = cpprecon(&["-vv", input.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).is_empty());
    assert!(!output.stderr.is_empty());
}

#[test]
fn test_invalid_brace_style_is_usage_error() {
    let output = cpprecon(&["--brace-style", "sideways", "a.cpp"]);
    assert_eq!(output.status.code(), Some(1));
}
