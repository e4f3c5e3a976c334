use crate::artifacts::index::entry_mode::FileMode;
use crate::artifacts::index::index_entry::METADATA_DIR;
use crate::error::{Error, IoResultExt, Result};
use bytes::Bytes;
use is_executable::IsExecutable;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Read-only view of the working tree, used to feed the staging index.
#[derive(Debug)]
pub struct Workspace {
    path: Box<Path>,
}

impl Workspace {
    pub fn new(path: Box<Path>) -> Self {
        Workspace { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Files under `root` (the whole worktree if `None`), relative to the
    /// worktree and sorted. The metadata directory is never listed.
    pub fn list_files(&self, root: Option<&Path>) -> Result<Vec<PathBuf>> {
        let root = match root {
            Some(p) => self.path.join(p),
            None => self.path.to_path_buf(),
        };

        if !root.exists() {
            return Err(Error::invalid_path(
                root.to_string_lossy(),
                "no such file or directory",
            ));
        }

        let mut files = Vec::new();
        let walker = WalkDir::new(&root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.file_name() != METADATA_DIR);

        for entry in walker {
            let entry = entry.map_err(|e| Error::Io {
                path: e.path().map(Path::to_path_buf).unwrap_or_else(|| root.clone()),
                source: e.into(),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }

            let relative = entry.path().strip_prefix(&self.path).map_err(|_| {
                Error::invalid_path(entry.path().to_string_lossy(), "path is outside the worktree")
            })?;
            files.push(relative.to_path_buf());
        }

        Ok(files)
    }

    pub fn read_file(&self, file_path: &Path) -> Result<Bytes> {
        let full_path = self.path.join(file_path);
        let content = std::fs::read(&full_path).at_path(&full_path)?;

        Ok(Bytes::from(content))
    }

    pub fn file_mode(&self, file_path: &Path) -> FileMode {
        if self.path.join(file_path).is_executable() {
            FileMode::Executable
        } else {
            FileMode::Regular
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::TempDir;
    use assert_fs::prelude::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn lists_files_but_not_metadata() {
        let dir = TempDir::new().unwrap();
        dir.child("b.txt").write_str("b").unwrap();
        dir.child("src/a.rs").write_str("a").unwrap();
        dir.child(".grove/HEAD").write_str("ref: refs/heads/main\n").unwrap();

        let workspace = Workspace::new(dir.path().into());

        assert_eq!(
            workspace.list_files(None).unwrap(),
            vec![PathBuf::from("b.txt"), PathBuf::from("src/a.rs")]
        );
        assert_eq!(
            workspace.list_files(Some(Path::new("src"))).unwrap(),
            vec![PathBuf::from("src/a.rs")]
        );
        assert_eq!(
            workspace.read_file(Path::new("src/a.rs")).unwrap(),
            Bytes::from_static(b"a")
        );
    }

    #[test]
    fn missing_paths_are_rejected() {
        let dir = TempDir::new().unwrap();
        let workspace = Workspace::new(dir.path().into());

        assert!(workspace.list_files(Some(Path::new("ghost"))).is_err());
    }
}
