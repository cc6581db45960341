use std::str::FromStr;

use derive_more::{Display, From};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identifier of a [`Profile`](super::Profile).
///
/// Generated once when the record is created and serialized alongside it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ProfileId(Uuid);

impl ProfileId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// The first eight hex digits, enough to tell records apart in a listing.
    pub fn short(&self) -> String {
        let mut simple = self.0.simple().to_string();
        simple.truncate(8);
        simple
    }

    /// Whether `prefix` is a prefix of this id, ignoring case and hyphens.
    pub fn matches_prefix(&self, prefix: &str) -> bool {
        let prefix: String = prefix
            .chars()
            .filter(|c| *c != '-')
            .map(|c| c.to_ascii_lowercase())
            .collect();

        !prefix.is_empty() && self.0.simple().to_string().starts_with(&prefix)
    }
}

impl Default for ProfileId {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for ProfileId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}
