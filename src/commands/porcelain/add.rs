use crate::areas::index::Index;
use crate::areas::repository::Repository;
use crate::artifacts::index::entry_mode::{EntryMode, FileMode};
use crate::artifacts::index::index_entry::{IndexEntry, normalize_path};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::error::Result;
use chrono::Utc;
use std::path::{Component, Path, PathBuf};

impl Repository {
    /// Store `content` as a blob and stage it at `path` as a regular file.
    pub fn stage_path(&self, path: &Path, content: &[u8]) -> Result<ObjectId> {
        self.stage_path_with_mode(path, content, FileMode::Regular)
    }

    pub fn stage_path_with_mode(
        &self,
        path: &Path,
        content: &[u8],
        mode: FileMode,
    ) -> Result<ObjectId> {
        let entry = self.prepare_entry(path, content, mode)?;
        let oid = entry.oid.clone();

        self.update_index(|index| {
            index.add(entry);
            Ok(())
        })?;

        Ok(oid)
    }

    /// Drop a path (or everything staged below it) from the index.
    /// Returns whether anything was staged there.
    pub fn unstage_path(&self, path: &Path) -> Result<bool> {
        let name = normalize_path(path)?;

        self.update_index(|index| Ok(index.remove(&name)))
    }

    pub fn clear_staging(&self) -> Result<()> {
        self.update_index(|index| {
            index.clear();
            Ok(())
        })
    }

    /// Lock the index, reload it, apply `change` and write it back. The lock
    /// is released without writing if `change` fails.
    pub(crate) fn update_index<T>(&self, change: impl FnOnce(&mut Index) -> Result<T>) -> Result<T> {
        let mut index = self.index();
        let lock = index.lock()?;

        index.rehydrate()?;
        let output = change(&mut index)?;
        index.write_updates(lock)?;

        Ok(output)
    }

    fn prepare_entry(&self, path: &Path, content: &[u8], mode: FileMode) -> Result<IndexEntry> {
        let name = normalize_path(path)?;
        let oid = self.write_object(ObjectType::Blob, content)?;

        Ok(IndexEntry::new(name, oid, EntryMode::File(mode), Utc::now()))
    }

    /// Stage every file under each of `paths`, taking the index lock once.
    pub fn add(&self, paths: &[PathBuf]) -> anyhow::Result<()> {
        let mut entries = Vec::new();

        for path in paths {
            for file in self.workspace().list_files(Some(path.as_path()))? {
                let content = self.workspace().read_file(&file)?;
                let mode = self.workspace().file_mode(&file);
                let entry = self.prepare_entry(&file, &content, mode)?;
                tracing::debug!(path = %entry.name, oid = %entry.oid, "staging blob");
                entries.push(entry);
            }
        }

        let count = entries.len();
        self.update_index(|index| {
            entries.into_iter().for_each(|entry| index.add(entry));
            Ok(())
        })?;
        tracing::info!(count, "added files to the index");

        Ok(())
    }

    /// `.` unstages everything.
    pub fn unstage(&self, paths: &[PathBuf]) -> anyhow::Result<()> {
        for path in paths {
            let path = path
                .components()
                .filter(|component| *component != Component::CurDir)
                .collect::<PathBuf>();

            if path.as_os_str().is_empty() {
                self.clear_staging()?;
                tracing::debug!("cleared staging index");
            } else {
                let removed = self.unstage_path(&path)?;
                tracing::debug!(path = %path.display(), removed, "unstaged path");
            }
        }

        Ok(())
    }
}
