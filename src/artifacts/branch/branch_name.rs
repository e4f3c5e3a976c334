use crate::artifacts::branch::{HEAD, INVALID_BRANCH_NAME_REGEX, REF_PREFIX};
use crate::error::{Error, Result};

/// A validated branch name, e.g. `main` or `feature/login`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BranchName(String);

impl BranchName {
    pub fn try_parse(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let invalid = |reason: &str| Error::InvalidBranchName {
            name: name.clone(),
            reason: reason.to_string(),
        };

        if name.is_empty() {
            return Err(invalid("branch name cannot be empty"));
        }
        if name == HEAD {
            return Err(invalid("HEAD is reserved"));
        }

        let re = regex::Regex::new(INVALID_BRANCH_NAME_REGEX)
            .map_err(|e| invalid(&format!("invalid branch name pattern: {e}")))?;
        if re.is_match(&name) {
            return Err(invalid("contains a forbidden character sequence"));
        }

        Ok(Self(name))
    }

    /// Parse the target of a symbolic ref, `refs/heads/<name>`.
    pub fn try_parse_ref_path(ref_path: &str) -> Result<Self> {
        let name = ref_path
            .strip_prefix(REF_PREFIX)
            .ok_or_else(|| Error::InvalidBranchName {
                name: ref_path.to_string(),
                reason: format!("symbolic ref must start with '{REF_PREFIX}'"),
            })?;

        Self::try_parse(name)
    }

    /// `refs/heads/<name>`
    pub fn ref_path(&self) -> String {
        format!("{REF_PREFIX}{}", self.0)
    }
}

impl AsRef<str> for BranchName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BranchName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for BranchName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::try_parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case("main")]
    #[case("feature/login")]
    #[case("release-1.2")]
    #[case("a")]
    fn accepts_ordinary_names(#[case] name: &str) {
        assert_eq!(BranchName::try_parse(name).unwrap().as_ref(), name);
    }

    #[rstest]
    #[case("")]
    #[case("HEAD")]
    #[case(".hidden")]
    #[case("feature/.hidden")]
    #[case("a..b")]
    #[case("/leading")]
    #[case("trailing/")]
    #[case("branch.lock")]
    #[case("at@{brace")]
    #[case("with space")]
    #[case("colon:name")]
    #[case("tilde~1")]
    #[case("caret^")]
    fn rejects_unsafe_names(#[case] name: &str) {
        let err = BranchName::try_parse(name).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn ref_path_round_trips() {
        let name = BranchName::try_parse("feature/x").unwrap();

        assert_eq!(name.ref_path(), "refs/heads/feature/x");
        assert_eq!(BranchName::try_parse_ref_path(&name.ref_path()).unwrap(), name);
        assert!(BranchName::try_parse_ref_path("refs/tags/v1").is_err());
    }

    proptest! {
        #[test]
        fn names_ending_in_lock_are_rejected(prefix in "[a-zA-Z0-9_-]{1,20}") {
            let name = format!("{prefix}.lock");
            prop_assert!(BranchName::try_parse(name).is_err());
        }

        #[test]
        fn simple_names_are_accepted(name in "[a-zA-Z0-9][a-zA-Z0-9_-]{0,30}") {
            prop_assume!(name != "HEAD");
            prop_assert!(BranchName::try_parse(name).is_ok());
        }
    }
}
