use crate::common::command::{repository_dir, run_grove_command};
use crate::common::file::{FileSpec, write_file, write_generated_files};
use crate::common::stdout_lines;
use assert_fs::TempDir;
use pretty_assertions::assert_eq;
use predicates::prelude::predicate;
use rstest::{fixture, rstest};

mod common;

#[fixture]
fn empty_repository(repository_dir: TempDir) -> TempDir {
    run_grove_command(repository_dir.path(), &["init"])
        .assert()
        .success();
    repository_dir
}

fn write(dir: &TempDir, path: &str, content: &str) {
    write_file(FileSpec::new(dir.path().join(path), content.to_string()));
}

#[rstest]
fn add_files_from_nested_directories(empty_repository: TempDir) {
    let dir = empty_repository;
    write(&dir, "1.txt", "one");
    write(&dir, "a/2.txt", "two");
    write(&dir, "a/b/3.txt", "three");

    run_grove_command(dir.path(), &["add", "."]).assert().success();

    run_grove_command(dir.path(), &["ls-files"])
        .assert()
        .success()
        .stdout(predicate::eq("1.txt\na/2.txt\na/b/3.txt\n"));
}

#[rstest]
fn add_generated_files_incrementally(empty_repository: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    let dir = empty_repository;
    let files = write_generated_files(dir.path(), 5);

    for file in &files {
        let name = file.path.file_name().unwrap().to_string_lossy().to_string();
        run_grove_command(dir.path(), &["add", &name]).assert().success();
    }

    let output = run_grove_command(dir.path(), &["ls-files"]).output()?;
    let mut expected = files
        .iter()
        .map(|file| file.path.file_name().unwrap().to_string_lossy().to_string())
        .collect::<Vec<_>>();
    expected.sort();

    assert_eq!(stdout_lines(&output), expected);

    Ok(())
}

#[rstest]
fn ls_files_stage_shows_mode_and_blob(empty_repository: TempDir) {
    let dir = empty_repository;
    write(&dir, "hello.txt", "hello");

    run_grove_command(dir.path(), &["add", "hello.txt"]).assert().success();

    run_grove_command(dir.path(), &["ls-files", "--stage"])
        .assert()
        .success()
        .stdout(predicate::eq(
            "100644 b6fc4c620b67d95f953a5c1c1230aaab5db5a1b0\thello.txt\n",
        ));
}

#[rstest]
fn replace_file_with_directory(empty_repository: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    let dir = empty_repository;
    write(&dir, "alice.txt", "alice");
    write(&dir, "bob.txt", "bob");
    run_grove_command(dir.path(), &["add", "."]).assert().success();

    std::fs::remove_file(dir.path().join("alice.txt"))?;
    write(&dir, "alice.txt/nested.txt", "nested");
    run_grove_command(dir.path(), &["add", "alice.txt"]).assert().success();

    run_grove_command(dir.path(), &["ls-files"])
        .assert()
        .success()
        .stdout(predicate::eq("alice.txt/nested.txt\nbob.txt\n"));

    Ok(())
}

#[rstest]
fn replace_directory_with_file(empty_repository: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    let dir = empty_repository;
    write(&dir, "alice.txt", "alice");
    write(&dir, "nested/bob.txt", "bob");
    write(&dir, "nested/inner/claire.txt", "claire");
    run_grove_command(dir.path(), &["add", "."]).assert().success();

    std::fs::remove_dir_all(dir.path().join("nested"))?;
    write(&dir, "nested", "now a file");
    run_grove_command(dir.path(), &["add", "nested"]).assert().success();

    run_grove_command(dir.path(), &["ls-files"])
        .assert()
        .success()
        .stdout(predicate::eq("alice.txt\nnested\n"));

    Ok(())
}

#[rstest]
fn adding_a_missing_path_fails_and_keeps_the_index(empty_repository: TempDir) {
    let dir = empty_repository;
    write(&dir, "kept.txt", "kept");
    run_grove_command(dir.path(), &["add", "kept.txt"]).assert().success();

    run_grove_command(dir.path(), &["add", "ghost.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("ghost.txt"));

    run_grove_command(dir.path(), &["ls-files"])
        .assert()
        .success()
        .stdout(predicate::eq("kept.txt\n"));
}

#[rstest]
fn unstage_removes_files_and_directories(empty_repository: TempDir) {
    let dir = empty_repository;
    write(&dir, "1.txt", "one");
    write(&dir, "a/2.txt", "two");
    write(&dir, "a/b/3.txt", "three");
    run_grove_command(dir.path(), &["add", "."]).assert().success();

    run_grove_command(dir.path(), &["unstage", "a", "not-staged.txt"])
        .assert()
        .success();
    run_grove_command(dir.path(), &["ls-files"])
        .assert()
        .success()
        .stdout(predicate::eq("1.txt\n"));

    run_grove_command(dir.path(), &["unstage", "."]).assert().success();
    run_grove_command(dir.path(), &["ls-files"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[rstest]
fn write_tree_is_independent_of_staging_order(
    repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let first = TempDir::new()?;
    let second = repository_dir;

    for dir in [&first, &second] {
        run_grove_command(dir.path(), &["init"]).assert().success();
        write(dir, "a.txt", "x");
        write(dir, "dir/b.txt", "y");
    }

    run_grove_command(first.path(), &["add", "a.txt", "dir"]).assert().success();
    run_grove_command(second.path(), &["add", "dir"]).assert().success();
    run_grove_command(second.path(), &["add", "a.txt"]).assert().success();

    let first_tree = run_grove_command(first.path(), &["write-tree"]).output()?;
    let second_tree = run_grove_command(second.path(), &["write-tree"]).output()?;

    assert!(first_tree.status.success());
    assert_eq!(stdout_lines(&first_tree), stdout_lines(&second_tree));

    Ok(())
}

#[rstest]
fn ls_tree_lists_one_blob_and_one_subtree(empty_repository: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    let dir = empty_repository;
    write(&dir, "a.txt", "x");
    write(&dir, "dir/b.txt", "y");
    run_grove_command(dir.path(), &["add", "."]).assert().success();

    let output = run_grove_command(dir.path(), &["write-tree"]).output()?;
    let tree = stdout_lines(&output).remove(0);

    let output = run_grove_command(dir.path(), &["ls-tree", &tree]).output()?;
    let lines = stdout_lines(&output);
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("100644 blob "));
    assert!(lines[0].ends_with("\ta.txt"));
    assert!(lines[1].starts_with("040000 tree "));
    assert!(lines[1].ends_with("\tdir"));

    let output = run_grove_command(dir.path(), &["ls-tree", "-r", &tree]).output()?;
    let paths = stdout_lines(&output)
        .into_iter()
        .filter_map(|line| line.split('\t').nth(1).map(str::to_string))
        .collect::<Vec<_>>();
    assert_eq!(paths, vec!["a.txt", "dir/b.txt"]);

    Ok(())
}

#[rstest]
fn index_survives_between_processes(empty_repository: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    let dir = empty_repository;
    write(&dir, "kept.txt", "kept");
    run_grove_command(dir.path(), &["add", "kept.txt"]).assert().success();

    let index = std::fs::read(dir.path().join(".grove").join("index"))?;
    assert_eq!(&index[..4], b"GIDX");
    assert!(!dir.path().join(".grove").join("index.lock").exists());

    Ok(())
}
