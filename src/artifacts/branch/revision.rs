use crate::areas::database::MIN_PREFIX_LENGTH;
use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::branch::{ANCESTOR_REGEX, HEAD, PARENT_REGEX};
use crate::artifacts::objects::OBJECT_ID_LENGTH;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::error::{Error, ErrorKind, Result};

/// A revision expression identifying a commit.
///
/// Supports:
/// - `HEAD` and branch names: `main`, `feature/new-feature`
/// - Full and abbreviated object ids (4 to 40 hex characters), tried only
///   when no branch of that name exists
/// - Parent notation: `<revision>^`
/// - Ancestor notation: `<revision>~<n>`, following first parents
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Revision {
    /// `HEAD`, a branch, or possibly an object id
    Ref(String),
    /// The Nth first-parent ancestor of a revision
    Ancestor(Box<Revision>, usize),
    /// The first parent of a revision
    Parent(Box<Revision>),
}

impl Revision {
    pub fn try_parse(revision: &str) -> Result<Revision> {
        let parent = regex::Regex::new(PARENT_REGEX)
            .map_err(|e| Error::InvalidRevision(format!("{revision}: {e}")))?;
        let ancestor = regex::Regex::new(ANCESTOR_REGEX)
            .map_err(|e| Error::InvalidRevision(format!("{revision}: {e}")))?;

        if let Some(caps) = parent.captures(revision) {
            let base_revision = Self::try_parse(&caps[1])?;
            Ok(Revision::Parent(Box::new(base_revision)))
        } else if let Some(caps) = ancestor.captures(revision) {
            let generations: usize = caps[2]
                .parse()
                .map_err(|_| Error::InvalidRevision(revision.to_string()))?;
            let base_revision = Self::try_parse(&caps[1])?;

            Ok(Revision::Ancestor(Box::new(base_revision), generations))
        } else if revision == HEAD {
            Ok(Revision::Ref(HEAD.to_string()))
        } else {
            let branch_name = BranchName::try_parse(revision)
                .map_err(|_| Error::InvalidRevision(revision.to_string()))?;
            Ok(Revision::Ref(branch_name.to_string()))
        }
    }

    /// Resolve to the id of a commit.
    pub fn resolve(&self, repository: &Repository) -> Result<ObjectId> {
        match self {
            Revision::Ref(name) => match repository.resolve_ref(name) {
                Ok(oid) => Ok(oid),
                Err(err) if err.kind() == ErrorKind::NotFound && Self::looks_like_oid(name) => {
                    Self::resolve_oid(name, repository)
                }
                Err(err) => Err(err),
            },
            Revision::Parent(base_revision) => {
                Self::resolve_commit_parent(base_revision.resolve(repository)?, repository)
            }
            Revision::Ancestor(base_revision, generations) => {
                let mut oid = base_revision.resolve(repository)?;
                for _ in 0..*generations {
                    oid = Self::resolve_commit_parent(oid, repository)?;
                }

                Ok(oid)
            }
        }
    }

    fn resolve_commit_parent(oid: ObjectId, repository: &Repository) -> Result<ObjectId> {
        let commit = repository.database().parse_object_as_commit(&oid)?;

        commit
            .parent()
            .cloned()
            .ok_or_else(|| Error::InvalidRevision(format!("{oid}^: commit has no parent")))
    }

    fn resolve_oid(oid_str: &str, repository: &Repository) -> Result<ObjectId> {
        if oid_str.len() == OBJECT_ID_LENGTH {
            let oid = ObjectId::try_parse(oid_str.to_string())?;
            Self::validate_oid_is_commit(&oid, repository)?;
            return Ok(oid);
        }

        let matches = repository.database().find_objects_by_prefix(oid_str)?;

        // only commits are candidates for a revision
        let mut commits = Vec::new();
        for oid in matches {
            if repository.database().kind_of(&oid)? == ObjectType::Commit {
                commits.push(oid);
            }
        }

        match commits.len() {
            0 => Err(Error::UnknownObjectPrefix(oid_str.to_string())),
            1 => Ok(commits.remove(0)),
            _ => Err(Error::AmbiguousObjectId {
                prefix: oid_str.to_string(),
                candidates: commits,
            }),
        }
    }

    fn validate_oid_is_commit(oid: &ObjectId, repository: &Repository) -> Result<()> {
        let found = repository.database().kind_of(oid)?;

        if found != ObjectType::Commit {
            return Err(Error::WrongObjectType {
                oid: oid.clone(),
                expected: ObjectType::Commit,
                found,
            });
        }

        Ok(())
    }

    fn looks_like_oid(s: &str) -> bool {
        s.len() >= MIN_PREFIX_LENGTH
            && s.len() <= OBJECT_ID_LENGTH
            && s.chars().all(|c| c.is_ascii_hexdigit())
    }
}
