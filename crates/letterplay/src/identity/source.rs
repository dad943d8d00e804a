use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::LocalBoxFuture;

use crate::error::StoreError;

/// The (learner account, active child profile) pair that addresses persisted state.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identity {
    pub learner_account_id: String,
    pub profile_id: String,
}

impl Identity {
    pub fn new(learner_account_id: impl Into<String>, profile_id: impl Into<String>) -> Self {
        Self {
            learner_account_id: learner_account_id.into(),
            profile_id: profile_id.into(),
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.learner_account_id, self.profile_id)
    }
}

/// Flag marking which child profile is active on the learner's account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileFlag {
    /// Explicitly chosen by the learner in the profile picker.
    Selected,
    /// Currently shown on the home screen.
    Displayed,
}

impl ProfileFlag {
    pub fn as_str(self) -> &'static str {
        match self {
            ProfileFlag::Selected => "selected",
            ProfileFlag::Displayed => "displayed",
        }
    }
}

/// Where identity comes from. Implemented by the profile-management layer.
#[async_trait(?Send)]
pub trait IdentitySource {
    /// Account id of the signed-in learner, if any.
    fn current_learner(&self) -> Option<String>;

    /// Profile id already cached by the profile manager for this session.
    fn cached_profile_id(&self) -> Option<String>;

    /// First profile on the learner's account carrying `flag`.
    async fn query_profile(&self, learner: &str, flag: ProfileFlag)
        -> Result<Option<String>, StoreError>;
}

/// Non-blocking sleep, provided by the host (setTimeout in the browser).
pub trait Timer {
    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()>;
}
