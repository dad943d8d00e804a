//! In-process fakes shared by unit tests.

use std::cell::{Cell, RefCell};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use async_trait::async_trait;
use futures::future::{self, FutureExt, LocalBoxFuture};
use serde_json::Value;

use crate::attempt::store::{MemoryAttemptStore, RemoteAttemptStore, StorePath};
use crate::error::StoreError;
use crate::identity::{IdentitySource, ProfileFlag, Timer};

/// Identity source whose answers are set by the test.
pub struct ScriptedIdentity {
    learner: Option<String>,
    cached: RefCell<Option<String>>,
    profiles: RefCell<Vec<(ProfileFlag, Result<Option<String>, StoreError>)>>,
    queries: Cell<usize>,
}

impl ScriptedIdentity {
    pub fn signed_in(learner: &str) -> Self {
        Self {
            learner: Some(learner.to_string()),
            cached: RefCell::new(None),
            profiles: RefCell::new(Vec::new()),
            queries: Cell::new(0),
        }
    }

    pub fn signed_out() -> Self {
        Self {
            learner: None,
            ..Self::signed_in("")
        }
    }

    pub fn set_cached(&self, profile: &str) {
        *self.cached.borrow_mut() = Some(profile.to_string());
    }

    pub fn set_profile(&self, flag: ProfileFlag, profile: &str) {
        self.answer(flag, Ok(Some(profile.to_string())));
    }

    pub fn fail_flag(&self, flag: ProfileFlag, err: StoreError) {
        self.answer(flag, Err(err));
    }

    pub fn query_count(&self) -> usize {
        self.queries.get()
    }

    fn answer(&self, flag: ProfileFlag, result: Result<Option<String>, StoreError>) {
        let mut profiles = self.profiles.borrow_mut();
        profiles.retain(|(f, _)| *f != flag);
        profiles.push((flag, result));
    }
}

#[async_trait(?Send)]
impl IdentitySource for ScriptedIdentity {
    fn current_learner(&self) -> Option<String> {
        self.learner.clone()
    }

    fn cached_profile_id(&self) -> Option<String> {
        self.cached.borrow().clone()
    }

    async fn query_profile(&self, _learner: &str, flag: ProfileFlag) -> Result<Option<String>, StoreError> {
        self.queries.set(self.queries.get() + 1);
        self.profiles
            .borrow()
            .iter()
            .find(|(f, _)| *f == flag)
            .map(|(_, r)| r.clone())
            .unwrap_or(Ok(None))
    }
}

/// Timer that completes immediately and adds up the requested durations.
#[derive(Default)]
pub struct VirtualTimer {
    total: Cell<Duration>,
    calls: Cell<usize>,
    hooks: RefCell<Vec<(usize, Box<dyn Fn()>)>>,
}

impl VirtualTimer {
    pub fn total(&self) -> Duration {
        self.total.get()
    }

    /// Run `hook` during the `nth` sleep (1-based).
    pub fn on_sleep(&self, nth: usize, hook: impl Fn() + 'static) {
        self.hooks.borrow_mut().push((nth, Box::new(hook)));
    }
}

impl Timer for VirtualTimer {
    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()> {
        self.total.set(self.total.get() + duration);
        self.calls.set(self.calls.get() + 1);
        for (nth, hook) in self.hooks.borrow().iter() {
            if *nth == self.calls.get() {
                hook();
            }
        }
        future::ready(()).boxed_local()
    }
}

/// Pending once, then ready: stands in for a network round trip.
#[derive(Default)]
pub struct YieldNow(bool);

impl Future for YieldNow {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.0 {
            Poll::Ready(())
        } else {
            self.0 = true;
            cx.waker().wake_by_ref();
            Poll::Pending
        }
    }
}

/// Memory store that logs every operation and can inject latency and failures.
#[derive(Default)]
pub struct RecordingStore {
    pub inner: MemoryAttemptStore,
    ops: RefCell<Vec<String>>,
    latency: Cell<bool>,
    failing_writes: Cell<usize>,
    failing_deletes: Cell<bool>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_latency(&self, on: bool) {
        self.latency.set(on);
    }

    pub fn fail_next_writes(&self, n: usize) {
        self.failing_writes.set(n);
    }

    pub fn fail_deletes(&self, on: bool) {
        self.failing_deletes.set(on);
    }

    /// `"<op> <path>"` for every call, in issue order.
    pub fn operations(&self) -> Vec<String> {
        self.ops.borrow().clone()
    }

    async fn round_trip(&self) {
        if self.latency.get() {
            YieldNow::default().await;
        }
    }
}

#[async_trait(?Send)]
impl RemoteAttemptStore for RecordingStore {
    async fn read(&self, path: &StorePath) -> Result<Option<Value>, StoreError> {
        self.round_trip().await;
        self.inner.read(path).await
    }

    async fn write(&self, path: &StorePath, value: Value) -> Result<(), StoreError> {
        self.ops.borrow_mut().push(format!("write {path}"));
        self.round_trip().await;
        let failing = self.failing_writes.get();
        if failing > 0 {
            self.failing_writes.set(failing - 1);
            return Err(StoreError::Network("injected".into()));
        }
        self.inner.write(path, value).await
    }

    async fn delete(&self, path: &StorePath) -> Result<(), StoreError> {
        self.ops.borrow_mut().push(format!("delete {path}"));
        self.round_trip().await;
        if self.failing_deletes.get() {
            return Err(StoreError::Network("injected".into()));
        }
        self.inner.delete(path).await
    }
}

/// Services wired to `store`, a signed-in learner with a cached profile
/// (`acct`/`kid`), and the pool's spawner.
pub fn services(pool: &futures::executor::LocalPool, store: std::rc::Rc<RecordingStore>) -> crate::api::game::Services {
    use std::rc::Rc;

    let source = Rc::new(ScriptedIdentity::signed_in("acct"));
    source.set_cached("kid");
    let identity = crate::identity::IdentityResolver::new(
        source,
        Rc::new(VirtualTimer::default()),
        crate::config::IdentitySettings::default(),
    );
    crate::api::game::Services {
        config: Rc::new(crate::config::LetterplayConfig::default()),
        store,
        identity,
        spawner: Rc::new(pool.spawner()),
        session: crate::context::SessionHandle::new(),
    }
}
