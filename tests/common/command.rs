use crate::common::AUTHOR_DATE;
use crate::common::file::{FileSpec, write_file};
use assert_cmd::Command;
use assert_fs::TempDir;
use rstest::fixture;
use std::path::Path;

#[fixture]
pub fn repository_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}

/// A repository with `1.txt`, `a/2.txt` and `a/b/3.txt` committed on `main`.
#[fixture]
pub fn init_repository_dir(repository_dir: TempDir) -> TempDir {
    run_grove_command(repository_dir.path(), &["init"])
        .assert()
        .success();

    write_file(FileSpec::new(
        repository_dir.path().join("1.txt"),
        "one".to_string(),
    ));
    write_file(FileSpec::new(
        repository_dir.path().join("a").join("2.txt"),
        "two".to_string(),
    ));
    write_file(FileSpec::new(
        repository_dir.path().join("a").join("b").join("3.txt"),
        "three".to_string(),
    ));

    run_grove_command(repository_dir.path(), &["add", "."])
        .assert()
        .success();

    grove_commit(repository_dir.path(), "Initial commit")
        .assert()
        .success();

    repository_dir
}

pub fn run_grove_command(dir: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::cargo_bin("grove").expect("Failed to find grove binary");
    cmd.env_remove("GROVE_LOG");
    cmd.current_dir(dir);
    for arg in args {
        cmd.arg(arg);
    }
    cmd
}

pub fn grove_commit(dir: &Path, message: &str) -> Command {
    let mut cmd = run_grove_command(dir, &["commit", "-m", message]);
    cmd.envs(vec![
        ("GROVE_AUTHOR_NAME", "fake_user"),
        ("GROVE_AUTHOR_EMAIL", "fake_email@email.com"),
        ("GROVE_AUTHOR_DATE", AUTHOR_DATE),
    ]);
    cmd
}

/// Stage `file` with `content` and commit it, returning the new commit id.
pub fn commit_file(dir: &Path, file: &str, content: &str, message: &str) -> String {
    write_file(FileSpec::new(dir.join(file), content.to_string()));

    run_grove_command(dir, &["add", file]).assert().success();
    grove_commit(dir, message).assert().success();

    rev_parse(dir, "HEAD")
}

pub fn rev_parse(dir: &Path, revision: &str) -> String {
    let output = run_grove_command(dir, &["rev-parse", revision])
        .output()
        .expect("Failed to run rev-parse");
    assert!(output.status.success(), "rev-parse {revision} failed");

    String::from_utf8_lossy(&output.stdout).trim().to_string()
}
