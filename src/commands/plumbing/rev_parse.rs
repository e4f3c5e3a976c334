use crate::areas::database::MIN_PREFIX_LENGTH;
use crate::areas::repository::Repository;
use crate::artifacts::branch::revision::Revision;
use crate::artifacts::objects::OBJECT_ID_LENGTH;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::error::{Error, Result};
use std::io::Write;

impl Repository {
    /// Resolve `HEAD` or a branch name to the commit it points at.
    ///
    /// A ref whose target is missing or not a commit is reported as
    /// `DanglingReference`.
    pub fn resolve_ref(&self, name: &str) -> Result<ObjectId> {
        let oid = self.refs().resolve(name)?;
        self.expect_kind(&oid, ObjectType::Commit)?;

        Ok(oid)
    }

    /// Resolve a revision expression (`main`, `HEAD~2`, `a1b2c3^`, ...) to a
    /// commit id.
    pub fn resolve_revision(&self, revision: &str) -> Result<ObjectId> {
        Revision::try_parse(revision)?.resolve(self)
    }

    /// Like [`Repository::resolve_revision`], but a hex id or prefix may also
    /// name a tree or a blob.
    pub fn resolve_object_id(&self, object: &str) -> Result<ObjectId> {
        let is_hex = object.len() >= MIN_PREFIX_LENGTH
            && object.len() <= OBJECT_ID_LENGTH
            && object.chars().all(|c| c.is_ascii_hexdigit());

        match self.resolve_revision(object) {
            Err(Error::UnknownObjectPrefix(_) | Error::WrongObjectType { .. }) if is_hex => {
                if object.len() == OBJECT_ID_LENGTH {
                    let oid = ObjectId::try_parse(object.to_ascii_lowercase())?;
                    self.kind_of(&oid)?;
                    Ok(oid)
                } else {
                    self.database().resolve_prefix(object)
                }
            }
            result => result,
        }
    }

    pub fn rev_parse(&self, revision: &str) -> anyhow::Result<()> {
        let oid = self.resolve_revision(revision)?;
        writeln!(self.writer(), "{oid}")?;

        Ok(())
    }
}
