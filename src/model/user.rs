use std::fmt::Display;
use std::ops::Deref;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A display name that can be stored in a survey voters cell.
///
/// Voters cells are comma-delimited with no escaping, so a name containing a
/// comma would be split into two voters. Such names are refused here rather
/// than corrupting the sheet later.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VoterId {
    inner: String,
}

impl Deref for VoterId {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl Display for VoterId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.inner.fmt(formatter)
    }
}

impl FromStr for VoterId {
    type Err = VoterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        if name.is_empty() {
            return Err(VoterError::Empty);
        }
        if name.contains(',') {
            return Err(VoterError::MalformedVoterCell(name.to_string()));
        }
        Ok(Self {
            inner: name.to_string(),
        })
    }
}

impl TryFrom<String> for VoterId {
    type Error = VoterError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<VoterId> for String {
    fn from(voter: VoterId) -> Self {
        voter.inner
    }
}

impl PartialEq<String> for VoterId {
    fn eq(&self, other: &String) -> bool {
        &self.inner == other
    }
}

impl PartialEq<str> for VoterId {
    fn eq(&self, other: &str) -> bool {
        self.inner == other
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VoterError {
    #[error("display name is empty")]
    Empty,
    #[error("display name {0:?} contains a comma and cannot be stored in a voters cell")]
    MalformedVoterCell(String),
}

/// Who a signed-in user is, as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Display name; this is what lands in voters and creator cells.
    pub name: VoterId,
    /// Email address; used for sharing trips and spotting ownership.
    pub email: String,
}
