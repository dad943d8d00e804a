use std::cell::RefCell;
use std::rc::{Rc, Weak};

use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use futures::future::join_all;
use futures::task::{LocalSpawn, LocalSpawnExt};
use futures::StreamExt;
use serde_json::Value;

use crate::api::types::Letter;
use crate::identity::{Identity, IdentityResolver};
use super::record::{AttemptKey, AttemptRecord};
use super::scope::UniquenessScope;
use super::store::{RemoteAttemptStore, StorePath};

/// Outcome of a persistence step, reported back to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptEvent {
    Persisted { error_count: u32, finished: bool },
    Skipped(SkipReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Identity never resolved; gameplay continues without saving.
    NoIdentity,
    /// The remote store rejected or dropped the write.
    StoreFailure,
    /// State changed after the session was closed.
    SessionClosed,
}

impl SkipReason {
    pub fn code(self) -> f32 {
        match self {
            SkipReason::NoIdentity => 1.0,
            SkipReason::StoreFailure => 2.0,
            SkipReason::SessionClosed => 3.0,
        }
    }
}

/// Remote operations, executed strictly in send order by the pipeline task.
enum StoreOp {
    Begin {
        identity: Identity,
        key: AttemptKey,
        scope: UniquenessScope,
    },
    Persist {
        identity: Identity,
        key: AttemptKey,
        record: AttemptRecord,
    },
}

enum IdentityState {
    Pending,
    Ready {
        identity: Identity,
        ops: UnboundedSender<StoreOp>,
    },
    Unavailable,
}

struct ActiveAttempt {
    key: AttemptKey,
    scope: UniquenessScope,
    record: AttemptRecord,
}

struct SessionState {
    identity: IdentityState,
    active: Option<ActiveAttempt>,
    /// `start` ran before identity was known; cleanup + init still owed.
    begin_owed: bool,
    /// Latest state requested before identity was known. One slot, latest wins.
    buffered: Option<AttemptRecord>,
    events: Vec<AttemptEvent>,
    closed: bool,
}

/// Life cycle of graded attempts for one mini-game session.
///
/// Keeps exactly one active attempt per uniqueness scope in the remote store.
/// Calls never block: before identity resolves, the latest requested state is
/// held in a one-slot buffer and flushed once the store can be addressed.
/// All remote work runs on a single spawned task, in call order.
#[derive(Clone)]
pub struct AttemptSession {
    state: Rc<RefCell<SessionState>>,
    store: Rc<dyn RemoteAttemptStore>,
    spawner: Rc<dyn LocalSpawn>,
}

impl AttemptSession {
    pub fn new(store: Rc<dyn RemoteAttemptStore>, spawner: Rc<dyn LocalSpawn>) -> Self {
        Self {
            state: Rc::new(RefCell::new(SessionState {
                identity: IdentityState::Pending,
                active: None,
                begin_owed: false,
                buffered: None,
                events: Vec::new(),
                closed: false,
            })),
            store,
            spawner,
        }
    }

    /// Resolve identity in the background and unblock persistence when done.
    pub fn bind_identity(&self, resolver: IdentityResolver) {
        if let Some(identity) = resolver.cached() {
            self.identity_resolved(Some(identity));
            return;
        }

        let session = self.clone();
        let task = async move {
            let identity = resolver.resolve().await;
            session.identity_resolved(identity);
        };
        if let Err(err) = self.spawner.spawn_local(task) {
            log::warn!("Could not spawn identity resolution: {}", err);
            self.identity_resolved(None);
        }
    }

    /// Feed the identity resolution result. Only the first call has effect.
    pub fn identity_resolved(&self, identity: Option<Identity>) {
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        if !matches!(state.identity, IdentityState::Pending) || state.closed {
            return;
        }

        let Some(identity) = identity else {
            state.identity = IdentityState::Unavailable;
            if state.begin_owed || state.buffered.is_some() {
                log::warn!("No identity; dropping unsaved attempt state");
                state.events.push(AttemptEvent::Skipped(SkipReason::NoIdentity));
            }
            state.begin_owed = false;
            state.buffered = None;
            return;
        };

        let (ops, rx) = mpsc::unbounded();
        if let Some(active) = &state.active {
            if std::mem::take(&mut state.begin_owed) {
                send(&ops, StoreOp::Begin {
                    identity: identity.clone(),
                    key: active.key.clone(),
                    scope: active.scope.clone(),
                });
            }
            if let Some(record) = state.buffered.take() {
                send(&ops, StoreOp::Persist {
                    identity: identity.clone(),
                    key: active.key.clone(),
                    record,
                });
            }
        }
        log::debug!("Attempt persistence ready for {}", identity);
        state.identity = IdentityState::Ready { identity, ops };
        drop(guard);

        let pipeline = run_pipeline(self.store.clone(), rx, Rc::downgrade(&self.state));
        if let Err(err) = self.spawner.spawn_local(pipeline) {
            log::warn!("Could not spawn attempt pipeline: {}", err);
        }
    }

    /// Begin a new attempt for `key`, superseding every other attempt in `scope`.
    pub fn start(&self, key: AttemptKey, scope: UniquenessScope) {
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        if state.closed {
            state.events.push(AttemptEvent::Skipped(SkipReason::SessionClosed));
            return;
        }
        if !scope.contains(&key) {
            log::warn!("Attempt {} is not a member of its own uniqueness scope", key);
        }
        log::info!("Starting attempt {}", key);

        state.buffered = None;
        match &state.identity {
            IdentityState::Ready { identity, ops } => {
                send(ops, StoreOp::Begin {
                    identity: identity.clone(),
                    key: key.clone(),
                    scope: scope.clone(),
                });
            }
            IdentityState::Pending => state.begin_owed = true,
            IdentityState::Unavailable => {
                state.events.push(AttemptEvent::Skipped(SkipReason::NoIdentity));
            }
        }
        state.active = Some(ActiveAttempt {
            key,
            scope,
            record: AttemptRecord::default(),
        });
    }

    /// Count one gameplay error on the active attempt.
    pub fn record_error(&self) {
        self.update(|record| record.error_count += 1);
    }

    /// Mark the active attempt finished. Later calls are ignored until the next `start`.
    pub fn record_finished(&self) {
        self.update(|record| record.finished = true);
    }

    /// Stop accepting state. Operations already queued still run.
    pub fn close(&self) {
        let mut state = self.state.borrow_mut();
        if state.closed {
            return;
        }
        state.closed = true;
        if state.buffered.take().is_some() {
            log::info!("Session closed before identity resolved; buffered attempt dropped");
        }
        if let IdentityState::Ready { ops, .. } = &state.identity {
            ops.close_channel();
        }
    }

    pub fn key(&self) -> Option<AttemptKey> {
        self.state.borrow().active.as_ref().map(|a| a.key.clone())
    }

    /// In-memory state of the active attempt.
    pub fn record(&self) -> Option<AttemptRecord> {
        self.state.borrow().active.as_ref().map(|a| a.record)
    }

    pub fn identity(&self) -> Option<Identity> {
        match &self.state.borrow().identity {
            IdentityState::Ready { identity, .. } => Some(identity.clone()),
            _ => None,
        }
    }

    pub fn is_identity_pending(&self) -> bool {
        matches!(self.state.borrow().identity, IdentityState::Pending)
    }

    /// Take persistence outcomes reported since the last call.
    pub fn drain_events(&self) -> Vec<AttemptEvent> {
        std::mem::take(&mut self.state.borrow_mut().events)
    }

    fn update(&self, change: impl FnOnce(&mut AttemptRecord)) {
        let mut state = self.state.borrow_mut();
        let state = &mut *state;
        if state.closed {
            state.events.push(AttemptEvent::Skipped(SkipReason::SessionClosed));
            return;
        }
        let Some(active) = state.active.as_mut() else {
            log::debug!("No active attempt; ignoring state change");
            return;
        };
        if active.record.finished {
            log::debug!("Attempt {} already finished; ignoring state change", active.key);
            return;
        }

        change(&mut active.record);
        let record = active.record;
        match &state.identity {
            IdentityState::Ready { identity, ops } => send(ops, StoreOp::Persist {
                identity: identity.clone(),
                key: active.key.clone(),
                record,
            }),
            IdentityState::Pending => state.buffered = Some(record),
            IdentityState::Unavailable => {
                state.events.push(AttemptEvent::Skipped(SkipReason::NoIdentity));
            }
        }
    }
}

fn send(ops: &UnboundedSender<StoreOp>, op: StoreOp) {
    if ops.unbounded_send(op).is_err() {
        log::warn!("Attempt pipeline is gone; operation dropped");
    }
}

async fn run_pipeline(
    store: Rc<dyn RemoteAttemptStore>,
    mut ops: UnboundedReceiver<StoreOp>,
    state: Weak<RefCell<SessionState>>,
) {
    while let Some(op) = ops.next().await {
        let outcome = match op {
            StoreOp::Begin { identity, key, scope } => {
                clear_scope(store.as_ref(), &identity, &key, &scope).await;
                persist(store.as_ref(), &identity, &key, AttemptRecord::default()).await
            }
            StoreOp::Persist { identity, key, record } => {
                persist(store.as_ref(), &identity, &key, record).await
            }
        };
        if let Some(state) = state.upgrade() {
            state.borrow_mut().events.push(outcome);
        }
    }
    log::debug!("Attempt pipeline finished");
}

/// Delete every other record in scope, including records under letters the
/// scope does not list but the store holds. Failures are logged and do not
/// stop the attempt from initializing.
async fn clear_scope(
    store: &dyn RemoteAttemptStore,
    identity: &Identity,
    keep: &AttemptKey,
    scope: &UniquenessScope,
) {
    let stored = match store.read(&StorePath::attempts(identity)).await {
        Ok(Some(Value::Object(letters))) => letters.keys().map(|name| Letter::new(name.clone())).collect(),
        Ok(_) => Vec::new(),
        Err(err) => {
            log::warn!("Could not list stored attempts, clearing configured letters only: {}", err);
            Vec::new()
        }
    };
    let kept = StorePath::record(identity, keep);
    let mut paths: Vec<StorePath> = scope
        .covering(stored)
        .siblings(keep)
        .map(|key| StorePath::record(identity, &key))
        .filter(|path| *path != kept)
        .collect();
    paths.sort();
    paths.dedup();
    let results = join_all(paths.iter().map(|path| store.delete(path))).await;
    for (path, result) in paths.iter().zip(results) {
        if let Err(err) = result {
            log::warn!("Could not clear sibling attempt {}: {}", path, err);
        }
    }
}

async fn persist(
    store: &dyn RemoteAttemptStore,
    identity: &Identity,
    key: &AttemptKey,
    record: AttemptRecord,
) -> AttemptEvent {
    let node = StorePath::record(identity, key);
    match record.save(store, &node).await {
        Ok(()) => {
            log::debug!("Saved {} = {:?}", node, record);
            AttemptEvent::Persisted {
                error_count: record.error_count,
                finished: record.finished,
            }
        }
        Err(err) => {
            log::warn!("Could not save attempt {}: {}", key, err);
            AttemptEvent::Skipped(SkipReason::StoreFailure)
        }
    }
}
