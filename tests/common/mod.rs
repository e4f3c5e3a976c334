#![allow(dead_code)]

pub mod command;
pub mod file;

/// Commit date used by every CLI commit, `%Y-%m-%d %H:%M:%S %z`
pub const AUTHOR_DATE: &str = "2023-01-01 12:00:00 +0000";

/// Lines of a command's stdout, trailing newline dropped
pub fn stdout_lines(output: &std::process::Output) -> Vec<String> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::to_string)
        .collect()
}
