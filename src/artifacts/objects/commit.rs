//! Commit object
//!
//! Commits link a tree snapshot to its history through parent ids.
//!
//! ## Format
//!
//! On disk:
//! ```text
//! commit <size>\0
//! tree <tree-id>
//! parent <parent-id>        (zero or more, in parent order)
//! author <name> <unix-seconds>
//! committer <name> <unix-seconds>
//!
//! <message, verbatim>
//! ```
//!
//! The message starts after the first blank line and is never parsed.

use crate::artifacts::objects::object::{DecodeError, Object, Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Context;
use bytes::Bytes;
use chrono::{DateTime, Utc};

/// Author or committer of a commit
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Author {
    name: String,
    timestamp: DateTime<Utc>,
}

impl Author {
    /// Create an author stamped with the current time
    pub fn new(name: String) -> Self {
        Author {
            name,
            timestamp: Utc::now(),
        }
    }

    pub fn new_with_timestamp(name: String, timestamp: DateTime<Utc>) -> Self {
        Author { name, timestamp }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Reason the name cannot be written on a single header line, if any.
    pub fn line_violation(&self) -> Option<&'static str> {
        if self.name.contains(['\n', '\r']) {
            Some("name must not contain line breaks")
        } else if self.name.contains('\0') {
            Some("name must not contain NUL")
        } else {
            None
        }
    }

    /// `<name> <unix-seconds>`, as written in the commit payload
    pub fn display(&self) -> String {
        format!("{} {}", self.name, self.timestamp.timestamp())
    }

    /// Human-readable timestamp, e.g. "Mon Jan 1 12:34:56 2024 +0000"
    pub fn readable_timestamp(&self) -> String {
        self.timestamp
            .format("%a %b %-d %H:%M:%S %Y %z")
            .to_string()
    }

    /// Load author information from environment variables
    ///
    /// Reads GROVE_AUTHOR_NAME, and optionally GROVE_AUTHOR_EMAIL (appended
    /// as `<email>`) and GROVE_AUTHOR_DATE. Without a date the current time
    /// is used.
    pub fn load_from_env() -> anyhow::Result<Self> {
        let name = std::env::var("GROVE_AUTHOR_NAME").context("GROVE_AUTHOR_NAME not set")?;
        let name = match std::env::var("GROVE_AUTHOR_EMAIL") {
            Ok(email) if !email.is_empty() => format!("{name} <{email}>"),
            _ => name,
        };

        let timestamp = std::env::var("GROVE_AUTHOR_DATE").ok().and_then(|date_str| {
            DateTime::parse_from_rfc2822(&date_str)
                .or_else(|_| DateTime::parse_from_str(&date_str, "%Y-%m-%d %H:%M:%S %z"))
                .ok()
        });

        match timestamp {
            Some(ts) => Ok(Author::new_with_timestamp(name, ts.with_timezone(&Utc))),
            None => Ok(Author::new(name)),
        }
    }
}

impl TryFrom<&str> for Author {
    type Error = DecodeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        // the name may itself contain spaces, the timestamp never does
        let (name, timestamp) = value
            .rsplit_once(' ')
            .ok_or_else(|| DecodeError::new("author line has no timestamp"))?;
        let seconds = timestamp
            .parse::<i64>()
            .map_err(|_| DecodeError::new(format!("invalid author timestamp '{timestamp}'")))?;
        let timestamp = DateTime::from_timestamp(seconds, 0)
            .ok_or_else(|| DecodeError::new("author timestamp out of range"))?;

        Ok(Author::new_with_timestamp(name.to_string(), timestamp))
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Commit {
    /// Parent commit ids (empty for a root commit, several for a merge)
    parents: Vec<ObjectId>,
    tree_oid: ObjectId,
    author: Author,
    committer: Author,
    message: String,
}

impl Commit {
    /// Create a commit whose committer is its author
    pub fn new(parents: Vec<ObjectId>, tree_oid: ObjectId, author: Author, message: String) -> Self {
        Commit {
            parents,
            tree_oid,
            committer: author.clone(),
            author,
            message,
        }
    }

    /// First line of the message
    pub fn short_message(&self) -> &str {
        self.message.lines().next().unwrap_or("")
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn tree_oid(&self) -> &ObjectId {
        &self.tree_oid
    }

    pub fn parents(&self) -> &[ObjectId] {
        &self.parents
    }

    pub fn parent(&self) -> Option<&ObjectId> {
        self.parents.first()
    }

    pub fn author(&self) -> &Author {
        &self.author
    }

    pub fn committer(&self) -> &Author {
        &self.committer
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.author.timestamp()
    }

    /// The payload as text, as printed by `cat-file -p`
    pub fn display(&self) -> String {
        let mut lines = vec![format!("tree {}", self.tree_oid)];
        for parent in &self.parents {
            lines.push(format!("parent {parent}"));
        }
        lines.push(format!("author {}", self.author.display()));
        lines.push(format!("committer {}", self.committer.display()));
        lines.push(String::new());
        lines.push(self.message.clone());

        lines.join("\n")
    }
}

impl Packable for Commit {
    fn serialize(&self) -> Bytes {
        Bytes::from(self.display())
    }
}

impl Unpackable for Commit {
    fn deserialize(payload: Bytes) -> Result<Self, DecodeError> {
        let content = std::str::from_utf8(&payload)
            .map_err(|_| DecodeError::new("commit payload is not UTF-8"))?;
        let (headers, message) = content
            .split_once("\n\n")
            .ok_or_else(|| DecodeError::new("commit has no blank line before the message"))?;

        let mut lines = headers.lines();

        let tree_oid = lines
            .next()
            .and_then(|line| line.strip_prefix("tree "))
            .ok_or_else(|| DecodeError::new("missing tree line"))?;
        let tree_oid = parse_oid(tree_oid)?;

        let mut parents = Vec::new();
        let mut next_line = lines
            .next()
            .ok_or_else(|| DecodeError::new("missing author line"))?;
        while let Some(parent) = next_line.strip_prefix("parent ") {
            parents.push(parse_oid(parent)?);
            next_line = lines
                .next()
                .ok_or_else(|| DecodeError::new("missing author line"))?;
        }

        let author = next_line
            .strip_prefix("author ")
            .ok_or_else(|| DecodeError::new("invalid author line"))?;
        let author = Author::try_from(author)?;

        let committer = lines
            .next()
            .and_then(|line| line.strip_prefix("committer "))
            .ok_or_else(|| DecodeError::new("missing committer line"))?;
        let committer = Author::try_from(committer)?;

        if let Some(extra) = lines.next() {
            return Err(DecodeError::new(format!("unexpected commit header '{extra}'")));
        }

        Ok(Commit {
            parents,
            tree_oid,
            author,
            committer,
            message: message.to_string(),
        })
    }
}

fn parse_oid(hex: &str) -> Result<ObjectId, DecodeError> {
    ObjectId::try_parse(hex.to_string())
        .map_err(|_| DecodeError::new(format!("invalid object id '{hex}'")))
}

impl Object for Commit {
    fn object_type(&self) -> ObjectType {
        ObjectType::Commit
    }
}

/// A commit together with the id it is stored under.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct CommitInfo {
    pub oid: ObjectId,
    pub commit: Commit,
}

impl CommitInfo {
    pub fn new(oid: ObjectId, commit: Commit) -> Self {
        CommitInfo { oid, commit }
    }

    pub fn parent(&self) -> Option<&ObjectId> {
        self.commit.parent()
    }
}
