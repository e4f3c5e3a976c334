//! First-parent history walk and reachability
//!
//! [`History`] follows first-parent links from a start commit down to a
//! root. Each step is explicit: a commit, the end of history, or an error,
//! so reaching a root is never confused with hitting corruption.

use crate::areas::database::Database;
use crate::artifacts::objects::commit::CommitInfo;
use crate::artifacts::objects::object_id::ObjectId;
use crate::config::HistoryMode;
use crate::error::{Error, Result};
use std::collections::{HashSet, VecDeque};

/// Outcome of one step of a history walk
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Commit(CommitInfo),
    /// The previous commit was a root
    End,
}

/// Why a lenient walk stopped before reaching a root
#[derive(Debug)]
pub struct Truncation {
    /// The parent that could not be loaded
    pub oid: ObjectId,
    pub cause: Error,
}

#[derive(Debug)]
pub struct History<'d> {
    database: &'d Database,
    mode: HistoryMode,
    next: Option<ObjectId>,
    started: bool,
    seen: HashSet<ObjectId>,
    truncation: Option<Truncation>,
    failed: bool,
}

impl<'d> History<'d> {
    pub fn new(database: &'d Database, start: ObjectId, mode: HistoryMode) -> Self {
        History {
            database,
            mode,
            next: Some(start),
            started: false,
            seen: HashSet::new(),
            truncation: None,
            failed: false,
        }
    }

    /// Advance the walk by one commit.
    ///
    /// A missing or malformed start commit is reported as is. Past the start,
    /// an unreadable parent is `CorruptGraph` in strict mode and ends the
    /// walk in lenient mode. Revisiting a commit is always `CorruptGraph`.
    pub fn step(&mut self) -> Result<Step> {
        let Some(oid) = self.next.take() else {
            return Ok(Step::End);
        };

        if !self.seen.insert(oid.clone()) {
            return Err(Error::CorruptGraph {
                oid,
                reason: "commit is its own ancestor".to_string(),
            });
        }

        let is_start = !self.started;
        self.started = true;

        let commit = match self.database.parse_object_as_commit(&oid) {
            Ok(commit) => commit,
            Err(err) if is_start => return Err(err),
            Err(cause) => match self.mode {
                HistoryMode::Strict => {
                    return Err(Error::CorruptGraph {
                        oid,
                        reason: format!("unreadable parent: {cause}"),
                    });
                }
                HistoryMode::Lenient => {
                    self.truncation = Some(Truncation { oid, cause });
                    return Ok(Step::End);
                }
            },
        };

        self.next = commit.parent().cloned();
        Ok(Step::Commit(CommitInfo::new(oid, commit)))
    }

    /// Set once a lenient walk stops at an unreadable parent.
    pub fn truncation(&self) -> Option<&Truncation> {
        self.truncation.as_ref()
    }
}

impl Iterator for History<'_> {
    type Item = Result<CommitInfo>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        match self.step() {
            Ok(Step::Commit(info)) => Some(Ok(info)),
            Ok(Step::End) => None,
            Err(err) => {
                self.failed = true;
                Some(Err(err))
            }
        }
    }
}

/// Every commit reachable from `start` through any parent, each once, in
/// breadth-first discovery order.
pub fn reachable(database: &Database, start: ObjectId, mode: HistoryMode) -> Result<Vec<CommitInfo>> {
    let start_commit = database.parse_object_as_commit(&start)?;

    let mut seen = HashSet::from([start.clone()]);
    let mut queue = VecDeque::from([CommitInfo::new(start, start_commit)]);
    let mut commits = Vec::new();

    while let Some(info) = queue.pop_front() {
        for parent in info.commit.parents() {
            if !seen.insert(parent.clone()) {
                continue;
            }

            match database.parse_object_as_commit(parent) {
                Ok(commit) => queue.push_back(CommitInfo::new(parent.clone(), commit)),
                Err(cause) => {
                    if mode == HistoryMode::Strict {
                        return Err(Error::CorruptGraph {
                            oid: parent.clone(),
                            reason: format!("unreadable parent: {cause}"),
                        });
                    }
                }
            }
        }

        commits.push(info);
    }

    Ok(commits)
}
