//! Content-addressed object store
//!
//! Objects live at `objects/<hh>/<rest-of-id>`, one file per object. A write
//! lands in a temporary file beside its final path and is renamed into
//! place, so a crash never leaves a partial object readable by id.

use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::framing::{self, FrameHeader};
use crate::artifacts::objects::object::{DecodeError, Object, ObjectBox, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tree::Tree;
use crate::config::Compression;
use crate::error::{Error, IoResultExt, Result};
use bytes::Bytes;
use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::path::{Path, PathBuf};

/// First byte of every zlib stream written with the default settings
const ZLIB_MAGIC: u8 = 0x78;

/// Minimum length of an abbreviated object id
pub const MIN_PREFIX_LENGTH: usize = 4;

#[derive(Debug)]
pub struct Database {
    path: Box<Path>,
    compression: Compression,
}

impl Database {
    pub fn new(path: Box<Path>, compression: Compression) -> Self {
        Database { path, compression }
    }

    pub fn objects_path(&self) -> &Path {
        &self.path
    }

    pub fn object_path(&self, object_id: &ObjectId) -> PathBuf {
        self.path.join(object_id.to_path())
    }

    /// Frame, hash and persist a payload.
    ///
    /// Writing an object that is already stored returns its id without
    /// touching the existing file.
    pub fn write(&self, kind: ObjectType, payload: &[u8]) -> Result<ObjectId> {
        let framed = framing::frame(kind, payload);
        let object_id = framing::hash(&framed);
        let object_path = self.object_path(&object_id);

        if object_path.is_file() {
            return Ok(object_id);
        }

        self.write_object(&object_path, &framed)?;
        Ok(object_id)
    }

    pub fn store(&self, object: &impl Object) -> Result<ObjectId> {
        self.write(object.object_type(), &object.serialize())
    }

    pub fn exists(&self, object_id: &ObjectId) -> bool {
        self.object_path(object_id).is_file()
    }

    /// Kind and payload of a stored object, with the frame validated.
    pub fn read(&self, object_id: &ObjectId) -> Result<(ObjectType, Bytes)> {
        let framed = self.read_object(object_id)?;

        framing::unframe(framed).map_err(|e| corrupt(object_id, e))
    }

    /// Kind of a stored object, decoding only its header.
    pub fn kind_of(&self, object_id: &ObjectId) -> Result<ObjectType> {
        let object_path = self.object_path(object_id);
        let mut file = self.open_object(object_id)?;

        let mut magic = [0u8; 1];
        let read = file.read(&mut magic).at_path(&object_path)?;
        let rest = io::Cursor::new(magic[..read].to_vec()).chain(file);

        let header: std::result::Result<FrameHeader, DecodeError> = if magic[0] == ZLIB_MAGIC {
            framing::read_header(BufReader::new(flate2::read::ZlibDecoder::new(rest)))
        } else {
            framing::read_header(BufReader::new(rest))
        };

        header
            .map(|header| header.kind)
            .map_err(|e| corrupt(object_id, e))
    }

    pub fn parse_object(&self, object_id: &ObjectId) -> Result<ObjectBox> {
        let (object_type, payload) = self.read(object_id)?;

        ObjectBox::decode(object_type, payload).map_err(|e| corrupt(object_id, e))
    }

    pub fn parse_object_as_blob(&self, object_id: &ObjectId) -> Result<Blob> {
        let payload = self.read_expecting(object_id, ObjectType::Blob)?;
        Blob::deserialize(payload).map_err(|e| corrupt(object_id, e))
    }

    pub fn parse_object_as_tree(&self, object_id: &ObjectId) -> Result<Tree> {
        let payload = self.read_expecting(object_id, ObjectType::Tree)?;
        Tree::deserialize(payload).map_err(|e| corrupt(object_id, e))
    }

    pub fn parse_object_as_commit(&self, object_id: &ObjectId) -> Result<Commit> {
        let payload = self.read_expecting(object_id, ObjectType::Commit)?;
        Commit::deserialize(payload).map_err(|e| corrupt(object_id, e))
    }

    fn read_expecting(&self, object_id: &ObjectId, expected: ObjectType) -> Result<Bytes> {
        let (found, payload) = self.read(object_id)?;
        if found != expected {
            return Err(Error::WrongObjectType {
                oid: object_id.clone(),
                expected,
                found,
            });
        }

        Ok(payload)
    }

    /// Find all objects whose id starts with the given hex prefix.
    ///
    /// Only the fan-out directory named by the first two characters is
    /// scanned. Prefixes shorter than [`MIN_PREFIX_LENGTH`] are rejected.
    pub fn find_objects_by_prefix(&self, prefix: &str) -> Result<Vec<ObjectId>> {
        if prefix.len() < MIN_PREFIX_LENGTH || !prefix.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(Error::InvalidObjectId(prefix.to_string()));
        }

        let prefix = prefix.to_ascii_lowercase();
        let (dir_name, file_prefix) = prefix.split_at(2);
        let dir_path = self.path.join(dir_name);

        if !dir_path.is_dir() {
            return Ok(vec![]);
        }

        let mut matches = Vec::new();
        for entry in std::fs::read_dir(&dir_path).at_path(&dir_path)? {
            let entry = entry.at_path(&dir_path)?;
            let file_name = entry.file_name();
            let file_name = file_name.to_string_lossy();

            if !file_name.starts_with(file_prefix) {
                continue;
            }
            // temporary files from in-flight writes never parse as ids
            if let Ok(oid) = ObjectId::try_parse(format!("{dir_name}{file_name}")) {
                matches.push(oid);
            }
        }

        matches.sort();
        Ok(matches)
    }

    /// Resolve an abbreviated id to the single object it names.
    pub fn resolve_prefix(&self, prefix: &str) -> Result<ObjectId> {
        let mut matches = self.find_objects_by_prefix(prefix)?;

        match matches.len() {
            0 => Err(Error::UnknownObjectPrefix(prefix.to_string())),
            1 => Ok(matches.remove(0)),
            _ => Err(Error::AmbiguousObjectId {
                prefix: prefix.to_string(),
                candidates: matches,
            }),
        }
    }

    fn open_object(&self, object_id: &ObjectId) -> Result<File> {
        let object_path = self.object_path(object_id);

        File::open(&object_path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => Error::ObjectNotFound(object_id.clone()),
            _ => Error::Io {
                path: object_path.clone(),
                source: e,
            },
        })
    }

    /// Raw frame of an object, inflated if it was stored compressed.
    fn read_object(&self, object_id: &ObjectId) -> Result<Bytes> {
        let object_path = self.object_path(object_id);
        let mut content = Vec::new();
        self.open_object(object_id)?
            .read_to_end(&mut content)
            .at_path(&object_path)?;

        if content.first() == Some(&ZLIB_MAGIC) {
            return Self::decompress(&content)
                .map_err(|e| corrupt(object_id, DecodeError::new(format!("bad zlib stream: {e}"))));
        }

        Ok(Bytes::from(content))
    }

    fn write_object(&self, object_path: &Path, framed: &[u8]) -> Result<()> {
        let object_dir = object_path
            .parent()
            .ok_or_else(|| Error::Io {
                path: object_path.to_path_buf(),
                source: io::Error::other("object path has no parent directory"),
            })?;
        std::fs::create_dir_all(object_dir).at_path(object_dir)?;

        let mut temp_file = tempfile::NamedTempFile::new_in(object_dir).at_path(object_dir)?;
        match self.compression {
            Compression::None => temp_file.write_all(framed).at_path(temp_file.path())?,
            Compression::Zlib => {
                let mut encoder = flate2::write::ZlibEncoder::new(
                    temp_file.as_file_mut(),
                    flate2::Compression::default(),
                );
                encoder.write_all(framed).at_path(object_path)?;
                encoder.finish().at_path(object_path)?;
            }
        }
        temp_file.as_file().sync_all().at_path(temp_file.path())?;

        // rename the temp file to the object file to make it atomic
        temp_file
            .persist(object_path)
            .map_err(|e| e.error)
            .at_path(object_path)?;

        Ok(())
    }

    fn decompress(data: &[u8]) -> io::Result<Bytes> {
        let mut decoder = flate2::read::ZlibDecoder::new(data);
        let mut decompressed_content = Vec::new();
        decoder.read_to_end(&mut decompressed_content)?;

        Ok(decompressed_content.into())
    }
}

fn corrupt(object_id: &ObjectId, error: DecodeError) -> Error {
    Error::CorruptObject {
        oid: object_id.clone(),
        reason: error.to_string(),
    }
}
