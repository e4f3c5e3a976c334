use crate::areas::repository::Repository;
use crate::artifacts::objects::framing;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::error::Result;
use std::io::Write;
use std::path::Path;

impl Repository {
    /// Frame, hash and store a payload. Storing an existing object is a no-op.
    pub fn write_object(&self, kind: ObjectType, payload: &[u8]) -> Result<ObjectId> {
        self.database().write(kind, payload)
    }

    pub fn hash_object(&self, file: &Path, write: bool) -> anyhow::Result<()> {
        let content = self.workspace().read_file(file)?;

        let oid = if write {
            let oid = self.write_object(ObjectType::Blob, &content)?;
            tracing::debug!(%oid, file = %file.display(), size = content.len(), "wrote blob");
            oid
        } else {
            framing::hash_object(ObjectType::Blob, &content)
        };

        writeln!(self.writer(), "{oid}")?;

        Ok(())
    }
}
