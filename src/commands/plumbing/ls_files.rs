use crate::areas::repository::Repository;
use crate::artifacts::index::index_entry::IndexEntry;
use crate::error::Result;
use std::io::Write;

impl Repository {
    /// The staged set as persisted, ordered by path.
    pub fn staged_entries(&self) -> Result<Vec<IndexEntry>> {
        let mut index = self.index();
        index.rehydrate()?;

        Ok(index.entries().cloned().collect())
    }

    pub fn ls_files(&self, stage: bool) -> anyhow::Result<()> {
        for entry in self.staged_entries()? {
            if stage {
                writeln!(
                    self.writer(),
                    "{} {}\t{}",
                    entry.mode.as_str(),
                    entry.oid,
                    entry.name
                )?;
            } else {
                writeln!(self.writer(), "{}", entry.name)?;
            }
        }

        Ok(())
    }
}
