use crate::areas::repository::Repository;
use crate::artifacts::branch::HEAD;
use crate::artifacts::branch::head_state::HeadState;
use crate::artifacts::objects::commit::CommitInfo;
use crate::artifacts::objects::object_id::ObjectId;
use std::collections::HashMap;
use std::io::Write;

#[derive(Debug, Clone, Default)]
pub struct LogOptions {
    /// Where to start; HEAD when absent
    pub revision: Option<String>,
    /// One abbreviated line per commit
    pub oneline: bool,
    pub abbrev_commit: bool,
    pub decorate: bool,
}

impl Repository {
    /// Print first-parent history, newest first.
    pub fn log(&self, opts: &LogOptions) -> anyhow::Result<()> {
        let head = self.head_state()?;

        let start = match (&opts.revision, &head) {
            // nothing to show on a fresh repository
            (None, HeadState::Unborn { .. }) => return Ok(()),
            (None, _) => self.resolve_ref(HEAD)?,
            (Some(revision), _) => self.resolve_revision(revision)?,
        };

        let decorations = if opts.decorate {
            self.decorations(&head)?
        } else {
            HashMap::new()
        };

        let mut history = self.commit_history(&start);
        let mut first = true;

        for info in history.by_ref() {
            let info = info?;
            let decoration = decorations.get(&info.oid).map(String::as_str);

            if opts.oneline {
                self.show_commit_oneline(&info, true, decoration)?;
            } else {
                if !first {
                    writeln!(self.writer())?;
                }
                self.show_commit_medium(&info, opts.abbrev_commit, decoration)?;
            }
            first = false;
        }

        if let Some(truncation) = history.truncation() {
            tracing::warn!(
                oid = %truncation.oid,
                cause = %truncation.cause,
                "history ends early at an unreadable parent"
            );
        }

        Ok(())
    }

    fn show_commit_medium(
        &self,
        info: &CommitInfo,
        abbrev_commit: bool,
        decoration: Option<&str>,
    ) -> anyhow::Result<()> {
        writeln!(
            self.writer(),
            "commit {}{}",
            Self::abbrev_commit_id(&info.oid, abbrev_commit),
            Self::decoration_suffix(decoration)
        )?;
        writeln!(self.writer(), "Author: {}", info.commit.author().name())?;
        writeln!(
            self.writer(),
            "Date:   {}",
            info.commit.author().readable_timestamp()
        )?;
        writeln!(self.writer())?;
        for message_line in info.commit.message().lines() {
            writeln!(self.writer(), "    {message_line}")?;
        }

        Ok(())
    }

    fn show_commit_oneline(
        &self,
        info: &CommitInfo,
        abbrev_commit: bool,
        decoration: Option<&str>,
    ) -> anyhow::Result<()> {
        writeln!(
            self.writer(),
            "{}{} {}",
            Self::abbrev_commit_id(&info.oid, abbrev_commit),
            Self::decoration_suffix(decoration),
            info.commit.short_message()
        )?;

        Ok(())
    }

    /// Branch names (and HEAD) keyed by the commit they point at.
    fn decorations(&self, head: &HeadState) -> anyhow::Result<HashMap<ObjectId, String>> {
        let mut names: HashMap<ObjectId, Vec<String>> = HashMap::new();

        if let HeadState::Detached(oid) = head {
            names.entry(oid.clone()).or_default().push(HEAD.to_string());
        }

        for branch in self.list_branches()? {
            let Some(oid) = self.refs().read_branch(&branch)? else {
                continue;
            };

            let name = if head.branch() == Some(&branch) {
                format!("{HEAD} -> {branch}")
            } else {
                branch.to_string()
            };
            names.entry(oid).or_default().push(name);
        }

        Ok(names
            .into_iter()
            .map(|(oid, mut names)| {
                // HEAD first, then branches by name
                names.sort_by_key(|name| (!name.starts_with(HEAD), name.clone()));
                (oid, names.join(", "))
            })
            .collect())
    }

    fn decoration_suffix(decoration: Option<&str>) -> String {
        decoration
            .map(|names| format!(" ({names})"))
            .unwrap_or_default()
    }

    fn abbrev_commit_id(oid: &ObjectId, abbrev_commit: bool) -> String {
        if abbrev_commit {
            oid.to_short_oid()
        } else {
            oid.to_string()
        }
    }
}
