//! Task identifiers
//!
//! Ids are UUID v7 values, so they sort by creation time and the first
//! characters are enough to tell tasks apart in a short list.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Length of the prefix shown in listings
pub const SHORT_ID_LEN: usize = 8;

/// Process-unique task identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(Uuid);

impl TaskId {
    /// Generate a fresh identifier
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Get the underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Get the display prefix
    pub fn short(&self) -> String {
        self.0.simple().to_string()[..SHORT_ID_LEN].to_string()
    }

    /// Check if a user-supplied reference matches this id
    ///
    /// Accepts the full hyphenated form or any prefix of the simple
    /// (unhyphenated) form, case-insensitively.
    pub fn matches(&self, reference: &str) -> bool {
        let reference = reference.trim().to_lowercase();
        if reference.is_empty() {
            return false;
        }

        if self.0.hyphenated().to_string() == reference {
            return true;
        }

        let simple_ref: String = reference.chars().filter(|c| *c != '-').collect();
        self.0.simple().to_string().starts_with(&simple_ref)
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for TaskId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s.trim())?))
    }
}

impl From<Uuid> for TaskId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}
