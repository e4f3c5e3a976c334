use crate::areas::repository::Repository;
use crate::artifacts::objects::object::ObjectBox;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::error::{Error, ErrorKind, Result};
use bytes::Bytes;
use std::io::Write;

/// What `cat-file` prints about an object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatFileMode {
    Pretty,
    Type,
}

impl Repository {
    pub fn read_object(&self, oid: &ObjectId) -> Result<(ObjectType, Bytes)> {
        self.database().read(oid)
    }

    pub fn object_exists(&self, oid: &ObjectId) -> bool {
        self.database().exists(oid)
    }

    pub fn kind_of(&self, oid: &ObjectId) -> Result<ObjectType> {
        self.database().kind_of(oid)
    }

    /// Check that `oid` names a stored object of the `expected` kind before
    /// something is made to point at it.
    pub(crate) fn expect_kind(&self, oid: &ObjectId, expected: ObjectType) -> Result<()> {
        let found = match self.kind_of(oid) {
            Ok(kind) if kind == expected => return Ok(()),
            Ok(kind) => Some(kind),
            Err(err) if err.kind() == ErrorKind::NotFound => None,
            Err(err) => return Err(err),
        };

        Err(Error::DanglingReference {
            oid: oid.clone(),
            expected,
            found,
        })
    }

    pub fn cat_file(&self, object: &str, mode: CatFileMode) -> anyhow::Result<()> {
        let oid = self.resolve_object_id(object)?;

        match mode {
            CatFileMode::Type => writeln!(self.writer(), "{}", self.kind_of(&oid)?)?,
            CatFileMode::Pretty => match self.database().parse_object(&oid)? {
                ObjectBox::Blob(blob) => self.writer().write_all(blob.content())?,
                ObjectBox::Tree(tree) => writeln!(self.writer(), "{}", tree.display())?,
                ObjectBox::Commit(commit) => writeln!(self.writer(), "{}", commit.display())?,
            },
        }

        Ok(())
    }
}
