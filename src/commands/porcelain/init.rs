use crate::areas::repository::Repository;
use crate::config::CONFIG_FILE;
use crate::error::{IoResultExt, Result};
use std::io::Write;

impl Repository {
    /// Create the metadata layout: the object store, `refs/heads`, an unborn
    /// default branch with HEAD on it, an empty index and `config.toml`.
    ///
    /// Running it again on an existing repository keeps its refs and index.
    pub fn init(&self) -> Result<()> {
        let default_branch = self.config().default_branch()?;

        let objects_path = self.database().objects_path();
        std::fs::create_dir_all(objects_path).at_path(objects_path)?;

        if !self.refs().head_path().is_file() {
            self.refs().init(&default_branch)?;
        }

        self.update_index(|_| Ok(()))?;

        self.config().save(&self.metadata_path().join(CONFIG_FILE))
    }

    pub fn initialize(&self) -> anyhow::Result<()> {
        self.init()?;
        tracing::info!(path = %self.path().display(), "initialized repository");

        writeln!(
            self.writer(),
            "Initialized empty grove repository in {}",
            self.metadata_path().display()
        )?;

        Ok(())
    }
}
