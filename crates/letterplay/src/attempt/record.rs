use std::fmt;

use serde::{Deserialize, Serialize};

use crate::api::types::{ActivityKind, Letter};

/// Which attempt a record belongs to, relative to the resolved profile.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AttemptKey {
    pub letter: Letter,
    pub activity: ActivityKind,
}

impl AttemptKey {
    pub fn new(letter: impl Into<Letter>, activity: ActivityKind) -> Self {
        Self {
            letter: letter.into(),
            activity,
        }
    }
}

impl fmt::Display for AttemptKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.letter, self.activity)
    }
}

/// The graded state of one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AttemptRecord {
    #[serde(rename = "errors")]
    pub error_count: u32,
    pub finished: bool,
}

impl AttemptRecord {
    pub fn new(error_count: u32, finished: bool) -> Self {
        Self { error_count, finished }
    }
}
