use crate::common::command::{
    commit_file, grove_commit, init_repository_dir, repository_dir, rev_parse, run_grove_command,
};
use crate::common::file::{FileSpec, write_file};
use crate::common::stdout_lines;
use assert_fs::TempDir;
use fake::Fake;
use fake::faker::lorem::en::Words;
use pretty_assertions::assert_eq;
use predicates::prelude::predicate;
use rstest::rstest;

mod common;

#[rstest]
fn first_commit_is_a_root_commit(repository_dir: TempDir) {
    let dir = repository_dir;
    run_grove_command(dir.path(), &["init"]).assert().success();
    write_file(FileSpec::new(dir.path().join("a.txt"), "x".to_string()));
    run_grove_command(dir.path(), &["add", "a.txt"]).assert().success();

    grove_commit(dir.path(), "Initial commit")
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"^\[main \(root-commit\) [0-9a-f]{7}\] Initial commit\n$").unwrap());

    run_grove_command(dir.path(), &["ls-files"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[rstest]
fn commit_object_records_tree_author_and_message(
    init_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir;
    let message = Words(3..6).fake::<Vec<String>>().join(" ");
    let head = commit_file(dir.path(), "new.txt", "new", &message);
    let parent = rev_parse(dir.path(), "HEAD^");

    let output = run_grove_command(dir.path(), &["cat-file", "-p", &head]).output()?;
    let lines = stdout_lines(&output);

    assert!(lines[0].starts_with("tree "));
    assert_eq!(lines[1], format!("parent {parent}"));
    assert_eq!(
        lines[2],
        "author fake_user <fake_email@email.com> 1672574400"
    );
    assert_eq!(
        lines[3],
        "committer fake_user <fake_email@email.com> 1672574400"
    );
    assert_eq!(lines[4], "");
    assert_eq!(lines[5], message);

    run_grove_command(dir.path(), &["cat-file", "-t", &head])
        .assert()
        .success()
        .stdout(predicate::eq("commit\n"));

    Ok(())
}

#[rstest]
fn committing_without_an_author_fails(repository_dir: TempDir) {
    let dir = repository_dir;
    run_grove_command(dir.path(), &["init"]).assert().success();

    run_grove_command(dir.path(), &["commit", "-m", "anonymous"])
        .env_remove("GROVE_AUTHOR_NAME")
        .assert()
        .failure()
        .stderr(predicate::str::contains("GROVE_AUTHOR_NAME"));
}

#[rstest]
fn ls_tree_of_head_lists_the_committed_files(init_repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir;

    let output = run_grove_command(dir.path(), &["ls-tree", "-r", "HEAD"]).output()?;
    let paths = stdout_lines(&output)
        .into_iter()
        .filter_map(|line| line.split('\t').nth(1).map(str::to_string))
        .collect::<Vec<_>>();

    assert_eq!(paths, vec!["1.txt", "a/2.txt", "a/b/3.txt"]);

    Ok(())
}

#[rstest]
fn rev_parse_follows_parents_and_ancestors(init_repository_dir: TempDir) {
    let dir = init_repository_dir;
    let first = rev_parse(dir.path(), "HEAD");
    let second = commit_file(dir.path(), "2.txt", "two", "second");
    let third = commit_file(dir.path(), "3.txt", "three", "third");

    assert_eq!(rev_parse(dir.path(), "main"), third);
    assert_eq!(rev_parse(dir.path(), "HEAD^"), second);
    assert_eq!(rev_parse(dir.path(), "HEAD~2"), first);
    assert_eq!(rev_parse(dir.path(), "main^^"), first);
    assert_eq!(rev_parse(dir.path(), &third[..7]), third);

    run_grove_command(dir.path(), &["rev-parse", "HEAD~3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("has no parent"));
    run_grove_command(dir.path(), &["rev-parse", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[rstest]
fn committing_on_a_detached_head_moves_only_head(init_repository_dir: TempDir) {
    let dir = init_repository_dir;
    let first = rev_parse(dir.path(), "HEAD");
    let second = commit_file(dir.path(), "2.txt", "two", "second");

    run_grove_command(dir.path(), &["switch", "--detach", &first])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("HEAD is now at "));

    write_file(FileSpec::new(dir.path().join("side.txt"), "side".to_string()));
    run_grove_command(dir.path(), &["add", "side.txt"]).assert().success();
    grove_commit(dir.path(), "side")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("[detached HEAD "));

    let detached = rev_parse(dir.path(), "HEAD");
    assert_ne!(detached, first);
    assert_eq!(rev_parse(dir.path(), "HEAD^"), first);
    assert_eq!(rev_parse(dir.path(), "main"), second);
}
