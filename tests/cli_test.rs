mod fixtures;

use std::process::{Command, Output};

use fixtures::get_test_fixture_path;
use pretty_assertions::assert_eq;

fn listests(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_listests"))
        .args(args)
        .current_dir(get_test_fixture_path(None))
        .output()
        .expect("Failed to execute command")
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).unwrap()
}

#[test]
fn test_cli_help() {
    let output = listests(&["--help"]);
    assert!(output.status.success());
    let help = stdout(&output);
    assert!(help.contains("listests"));
    assert!(help.contains("--tags"));
    assert!(help.contains("--vimgrep"));
    assert!(help.contains("--format"));
    assert!(help.contains("--json"));
}

#[test]
fn test_cli_lists_full_names() {
    let output = listests(&["-C", "testmodule", "./subpkg/pkg1"]);
    assert!(output.status.success());
    let out = stdout(&output);
    let lines: Vec<&str> = out.lines().take(4).collect();
    assert_eq!(
        lines,
        vec!["TestSimple", "TestSubTests", "TestSubTests/t1", "TestSubTests/t2"]
    );
}

#[test]
fn test_cli_vimgrep_paths_are_relative_to_cwd() {
    let output = listests(&["-C", "basic", "--tags", "testdata", "--vimgrep"]);
    assert!(output.status.success());
    let out = stdout(&output);
    let first = out.lines().next().unwrap();
    assert_eq!(first, "basic/simple_test.go:7:6:example.com/basic:TestSimple");
}

#[test]
fn test_cli_custom_format() {
    let output = listests(&[
        "-C",
        "basic",
        "--tags",
        "testdata",
        "--format",
        "{{.FullDisplayName}} {{.IsSubtest}}",
        "./kitchensink",
    ]);
    assert!(output.status.success());
    assert!(stdout(&output)
        .lines()
        .any(|l| l == "TestTopLevel4/sub_test_with_spaces true"));
}

#[test]
fn test_cli_json() {
    let output = listests(&["-C", "testmodule", "--json", "./subpkg/pkg1"]);
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let roots = value.as_array().unwrap();
    assert_eq!(roots.len(), 7);
    assert_eq!(roots[0]["name"], "TestSimple");
    assert_eq!(roots[0]["package"], "subpkg/pkg1");
    assert!(roots[0].get("subTests").is_none());
    assert_eq!(roots[1]["subTests"][0]["fullName"], "TestSubTests/t1");
}

#[test]
fn test_cli_rejects_conflicting_formats() {
    let output = listests(&["--vimgrep", "--format", "{{.Name}}"]);
    assert!(!output.status.success());
}

#[test]
fn test_cli_unknown_template_field() {
    let output = listests(&["-C", "testmodule", "-f", "{{.Nope}}", "./subpkg/pkg1"]);
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("unknown template field"));
}

#[test]
fn test_cli_missing_directory() {
    let output = listests(&["-C", "/nonexistent/listests"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("does not exist") || stderr.contains("Invalid arguments"));
}
