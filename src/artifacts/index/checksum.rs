//! SHA-1 checksummed stream over the index file
//!
//! Every byte read or written passes through the running digest; the digest
//! itself is the file's trailer.

use crate::artifacts::index::CHECKSUM_SIZE;
use bytes::Bytes;
use sha1::{Digest, Sha1};
use std::io::{self, Read, Write};

#[derive(Debug)]
pub struct Checksum<S> {
    stream: S,
    digest: Sha1,
}

impl<S> Checksum<S> {
    pub fn new(stream: S) -> Self {
        Checksum {
            stream,
            digest: Sha1::new(),
        }
    }

    pub fn into_inner(self) -> S {
        self.stream
    }
}

impl<S: Read> Checksum<S> {
    /// Read exactly `size` bytes, failing on a short file
    pub fn read(&mut self, size: usize) -> io::Result<Bytes> {
        let mut buffer = vec![0; size];
        self.stream.read_exact(&mut buffer)?;

        self.digest.update(&buffer);
        Ok(Bytes::from(buffer))
    }

    /// Compare the stored trailer against everything read so far.
    ///
    /// Returns `false` on a mismatch or if anything follows the trailer.
    pub fn verify(&mut self) -> io::Result<bool> {
        let mut expected_checksum = [0u8; CHECKSUM_SIZE];
        self.stream.read_exact(&mut expected_checksum)?;

        let actual_checksum = self.digest.clone().finalize();
        if expected_checksum != actual_checksum.as_slice() {
            return Ok(false);
        }

        let mut trailing = [0u8; 1];
        Ok(self.stream.read(&mut trailing)? == 0)
    }
}

impl<S: Write> Checksum<S> {
    pub fn write(&mut self, data: &[u8]) -> io::Result<()> {
        self.stream.write_all(data)?;
        self.digest.update(data);
        Ok(())
    }

    pub fn write_checksum(&mut self) -> io::Result<()> {
        let checksum = self.digest.clone().finalize();
        self.stream.write_all(checksum.as_slice())
    }
}
