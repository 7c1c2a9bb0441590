//! Integration tests for the CLI

use std::{fs, path::Path};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const INPUT_VARS: &[&str] = &[
    "GITHUB_ACTIONS",
    "GITHUB_WORKSPACE",
    "INPUT_FILES",
    "INPUT_INCLUDE-GITIGNORE",
    "INPUT_INCLUDE-GIT",
    "INPUT_IGNORE-DEFAULT",
    "INPUT_PARSE-UNOWNED-FILES",
    "INPUT_GITHUB-TOKEN",
];

fn repo(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (path, content) in files {
        let path = dir.path().join(path);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }
    dir
}

fn cmd(root: &Path) -> Command {
    let mut cmd = Command::cargo_bin("codeowners-coverage").unwrap();
    for var in INPUT_VARS {
        cmd.env_remove(var);
    }
    cmd.env_remove("RUST_LOG");
    cmd.arg("--root").arg(root).args(["--format", "github"]);
    cmd
}

#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("codeowners-coverage").unwrap();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("covered by CODEOWNERS"))
        .stdout(predicate::str::contains("--ignore-default"))
        .stdout(predicate::str::contains("--parse-unowned-files"));
}

#[test]
fn test_full_coverage_succeeds() {
    let dir = repo(&[
        ("CODEOWNERS", "* @org/everyone\n"),
        ("src/lib.rs", ""),
        (".git/HEAD", "ref: refs/heads/main\n"),
    ]);

    cmd(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "::notice title=Coverage,file=CODEOWNERS::2/2(100.00%) files covered by CODEOWNERS",
        ))
        .stdout(predicate::str::contains("::group::All Files: 2"))
        .stdout(predicate::str::contains(".git/HEAD").not());
}

#[test]
fn test_uncovered_files_fail() {
    let dir = repo(&[
        ("CODEOWNERS", "src/a.js @x\n*  @default\n"),
        ("src/a.js", ""),
        ("src/b.js", ""),
        ("README.md", ""),
    ]);

    cmd(dir.path())
        .args(["--files", "src/**", "--ignore-default"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("1/2(50.00%) files covered by CODEOWNERS"))
        .stdout(predicate::str::contains(
            "::error title=CODEOWNERS coverage,file=src/b.js::File not covered by CODEOWNERS: src/b.js",
        ))
        .stdout(predicate::str::contains(
            "::error::Files not covered by CODEOWNERS: %0Asrc/b.js",
        ))
        .stdout(predicate::str::contains("README.md").not());
}

#[test]
fn test_inputs_from_environment() {
    let dir = repo(&[
        (".github/CODEOWNERS", "docs/ @docs\n#?build/**\n"),
        (".gitignore", "*.log\n"),
        ("docs/index.md", ""),
        ("build/out.js", ""),
        ("debug.log", ""),
    ]);

    cmd(dir.path())
        .env("INPUT_FILES", "docs/** build/** debug.log")
        .env("INPUT_INCLUDE-GITIGNORE", "true")
        .env("INPUT_PARSE-UNOWNED-FILES", "true")
        .env("INPUT_IGNORE-DEFAULT", "false")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "file=.github/CODEOWNERS::1/1(100.00%) files covered by CODEOWNERS",
        ))
        .stdout(predicate::str::contains(".gitignore Files: 1"))
        .stdout(predicate::str::contains("::group::Unowned Files: 1"));
}

#[test]
fn test_missing_codeowners() {
    let dir = repo(&[("main.rs", "")]);

    cmd(dir.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains("No CODEOWNERS file found"))
        .stdout(predicate::str::contains("::error::"));
}

#[test]
fn test_explicit_codeowners_file() {
    let dir = repo(&[("OWNERS", "OWNERS @me\nlib.rs @me\n"), ("lib.rs", "")]);

    cmd(dir.path())
        .arg("-f")
        .arg(dir.path().join("OWNERS"))
        .assert()
        .success()
        .stdout(predicate::str::contains("file=OWNERS::2/2(100.00%)"));
}

#[test]
fn test_codeowners_file_relative_to_working_dir() {
    let dir = repo(&[("meta/OWNERS", "* @me\n"), ("lib.rs", "")]);
    let elsewhere = tempfile::tempdir().unwrap();

    cmd(dir.path())
        .current_dir(dir.path())
        .args(["-f", "meta/OWNERS"])
        .assert()
        .success();

    cmd(dir.path())
        .current_dir(elsewhere.path())
        .args(["-f", "meta/OWNERS"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("No CODEOWNERS file found"));
}

#[test]
fn test_plain_format_logs_to_stderr() {
    let dir = repo(&[("CODEOWNERS", "src/ @dev\n"), ("README.md", "")]);

    let mut cmd = Command::cargo_bin("codeowners-coverage").unwrap();
    for var in INPUT_VARS {
        cmd.env_remove(var);
    }
    cmd.env_remove("RUST_LOG")
        .arg("--root")
        .arg(dir.path())
        .args(["--format", "plain"])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("File not covered by CODEOWNERS: README.md"));
}
