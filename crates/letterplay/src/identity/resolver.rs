use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use crate::config::IdentitySettings;
use super::source::{Identity, IdentitySource, ProfileFlag, Timer};

/// Resolves the learner/profile pair needed to address the remote store.
///
/// Strategy, first match wins:
/// 1. a profile id already cached by the profile manager,
/// 2. the profile flagged `selected`,
/// 3. the profile flagged `displayed`.
///
/// Steps are retried every `retry_interval` until `retry_window` has elapsed,
/// after which resolution gives up with `None`. A successful result is cached
/// for the lifetime of the resolver and every clone of it.
#[derive(Clone)]
pub struct IdentityResolver {
    source: Rc<dyn IdentitySource>,
    timer: Rc<dyn Timer>,
    settings: IdentitySettings,
    resolved: Rc<RefCell<Option<Identity>>>,
}

impl IdentityResolver {
    pub fn new(source: Rc<dyn IdentitySource>, timer: Rc<dyn Timer>, settings: IdentitySettings) -> Self {
        Self {
            source,
            timer,
            settings,
            resolved: Rc::new(RefCell::new(None)),
        }
    }

    /// The resolved identity, if resolution already succeeded.
    pub fn cached(&self) -> Option<Identity> {
        self.resolved.borrow().clone()
    }

    pub async fn resolve(&self) -> Option<Identity> {
        if let Some(identity) = self.cached() {
            return Some(identity);
        }

        let interval = self.settings.retry_interval();
        let window = self.settings.retry_window();
        let mut waited = Duration::ZERO;
        let mut attempts = 0u32;

        loop {
            attempts += 1;
            if let Some(identity) = self.try_once().await {
                log::info!("Identity resolved to {} after {} attempt(s)", identity, attempts);
                *self.resolved.borrow_mut() = Some(identity.clone());
                return Some(identity);
            }
            if waited >= window || interval.is_zero() {
                log::warn!(
                    "Identity unresolved after {} attempt(s) over {:?}; attempts will not be saved",
                    attempts,
                    waited
                );
                return None;
            }
            // The last nap ends at the window, not past it.
            let nap = interval.min(window - waited);
            self.timer.sleep(nap).await;
            waited += nap;
        }
    }

    async fn try_once(&self) -> Option<Identity> {
        let learner = self.source.current_learner()?;

        if let Some(profile) = self.source.cached_profile_id() {
            return Some(Identity::new(learner, profile));
        }

        for flag in [ProfileFlag::Selected, ProfileFlag::Displayed] {
            match self.source.query_profile(&learner, flag).await {
                Ok(Some(profile)) => return Some(Identity::new(learner, profile)),
                Ok(None) => {}
                Err(err) => log::warn!("Profile lookup by {} flag failed: {}", flag.as_str(), err),
            }
        }
        None
    }
}
