//! Lock files guarding mutable repository files
//!
//! A write to `<path>` goes to `<path>.lock`, created exclusively, and is
//! renamed over `<path>` on commit. Readers therefore only ever see the old
//! or the new content. Dropping an uncommitted lock removes the lock file.

use crate::error::{Error, IoResultExt, Result};
use file_guard::{FileGuard, Lock};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct Lockfile {
    target: PathBuf,
    lock_path: PathBuf,
    guard: Option<FileGuard<Box<File>>>,
}

impl Lockfile {
    /// Take the lock for `target`, failing with `Locked` if another writer
    /// holds it.
    pub fn acquire(target: &Path) -> Result<Self> {
        let lock_path = lock_path_for(target);

        if let Some(parent) = lock_path.parent() {
            fs::create_dir_all(parent).at_path(parent)?;
        }

        let file = match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&lock_path)
        {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                return Err(Error::Locked(lock_path));
            }
            Err(e) => return Err(e).at_path(&lock_path),
        };

        let guard = match file_guard::try_lock(Box::new(file), Lock::Exclusive, 0, 1) {
            Ok(guard) => guard,
            Err(_) => {
                let _ = fs::remove_file(&lock_path);
                return Err(Error::Locked(lock_path));
            }
        };

        Ok(Lockfile {
            target: target.to_path_buf(),
            lock_path,
            guard: Some(guard),
        })
    }

    pub fn write_all(&mut self, data: &[u8]) -> Result<()> {
        let lock_path = self.lock_path.clone();
        self.file_mut()?.write_all(data).at_path(&lock_path)
    }

    /// Flush to disk and atomically replace the target.
    pub fn commit(mut self) -> Result<()> {
        let guard = self
            .guard
            .take()
            .ok_or_else(|| Error::Locked(self.lock_path.clone()))?;

        guard.sync_all().at_path(&self.lock_path)?;
        drop(guard);

        fs::rename(&self.lock_path, &self.target).at_path(&self.target)
    }

    fn file_mut(&mut self) -> Result<&mut File> {
        match self.guard.as_mut() {
            Some(guard) => Ok(&mut ***guard),
            None => Err(Error::Locked(self.lock_path.clone())),
        }
    }
}

impl Write for Lockfile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.guard.as_mut() {
            Some(guard) => guard.write(buf),
            None => Err(io::Error::other("lock already released")),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.guard.as_mut() {
            Some(guard) => guard.flush(),
            None => Ok(()),
        }
    }
}

impl Drop for Lockfile {
    fn drop(&mut self) {
        // still holding the guard means commit never happened
        if self.guard.take().is_some() {
            let _ = fs::remove_file(&self.lock_path);
        }
    }
}

fn lock_path_for(target: &Path) -> PathBuf {
    let mut name = target.as_os_str().to_os_string();
    name.push(".lock");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use assert_fs::TempDir;
    use pretty_assertions::assert_eq;

    #[test]
    fn commit_replaces_the_target() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("HEAD");
        fs::write(&target, "old\n").unwrap();

        let mut lock = Lockfile::acquire(&target).unwrap();
        lock.write_all(b"new\n").unwrap();
        // readers still see the old content until commit
        assert_eq!(fs::read_to_string(&target).unwrap(), "old\n");
        lock.commit().unwrap();

        assert_eq!(fs::read_to_string(&target).unwrap(), "new\n");
        assert!(!dir.path().join("HEAD.lock").exists());
    }

    #[test]
    fn second_writer_is_refused() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("refs/heads/main");

        let _held = Lockfile::acquire(&target).unwrap();
        let err = Lockfile::acquire(&target).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Locked);
    }

    #[test]
    fn dropping_without_commit_leaves_the_target_alone() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("index");

        {
            let mut lock = Lockfile::acquire(&target).unwrap();
            lock.write_all(b"partial").unwrap();
        }

        assert!(!target.exists());
        assert!(!dir.path().join("index.lock").exists());
        // the lock is free again
        Lockfile::acquire(&target).unwrap();
    }
}
