//! Composition root
//!
//! A `Repository` binds the object store, staging index, references and
//! working tree to one `.grove` directory. The operations themselves are
//! `impl Repository` blocks under `commands`.

use crate::areas::database::Database;
use crate::areas::index::Index;
use crate::areas::refs::Refs;
use crate::areas::workspace::Workspace;
use crate::artifacts::index::index_entry::METADATA_DIR;
use crate::config::{CONFIG_FILE, RepositoryConfig};
use crate::error::{Error, IoResultExt, Result};
use std::cell::{RefCell, RefMut};
use std::path::{Path, PathBuf};

pub struct Repository {
    path: Box<Path>,
    writer: RefCell<Box<dyn std::io::Write>>,
    index: RefCell<Index>,
    database: Database,
    workspace: Workspace,
    refs: Refs,
    config: RepositoryConfig,
}

impl Repository {
    /// Bind to the worktree at `path`, creating the directory if needed.
    ///
    /// Nothing under `.grove` is required to exist yet; use [`Repository::open`]
    /// for an existing repository.
    pub fn new(path: &Path, writer: Box<dyn std::io::Write>) -> Result<Self> {
        if !path.exists() {
            std::fs::create_dir_all(path).at_path(path)?;
        }
        let path = path.canonicalize().at_path(path)?;
        let config = RepositoryConfig::load(&path.join(METADATA_DIR).join(CONFIG_FILE))?;

        Ok(Self::assemble(path, writer, config))
    }

    /// Bind to an initialized repository.
    pub fn open(path: &Path, writer: Box<dyn std::io::Write>) -> Result<Self> {
        let repository = Self::new(path, writer)?;

        if !repository.refs.head_path().is_file() {
            return Err(Error::NotARepository(repository.path.to_path_buf()));
        }

        Ok(repository)
    }

    /// Replace the configuration, e.g. before `init` writes it.
    pub fn with_config(self, config: RepositoryConfig) -> Self {
        Self::assemble(self.path.into(), self.writer.into_inner(), config)
    }

    fn assemble(path: PathBuf, writer: Box<dyn std::io::Write>, config: RepositoryConfig) -> Self {
        let metadata_path = path.join(METADATA_DIR);

        let index = Index::new(metadata_path.join("index").into_boxed_path());
        let database = Database::new(
            metadata_path.join("objects").into_boxed_path(),
            config.compression,
        );
        let workspace = Workspace::new(path.clone().into_boxed_path());
        let refs = Refs::new(metadata_path.into_boxed_path());

        Repository {
            path: path.into_boxed_path(),
            writer: RefCell::new(writer),
            index: RefCell::new(index),
            database,
            workspace,
            refs,
            config,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.path.join(METADATA_DIR)
    }

    pub fn writer(&'_ self) -> RefMut<'_, Box<dyn std::io::Write>> {
        self.writer.borrow_mut()
    }

    pub fn index(&'_ self) -> RefMut<'_, Index> {
        self.index.borrow_mut()
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn refs(&self) -> &Refs {
        &self.refs
    }

    pub fn config(&self) -> &RepositoryConfig {
        &self.config
    }
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("path", &self.path)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
