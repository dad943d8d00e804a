//! Browser-backed collaborators for the core crate.
//!
//! The host page passes one plain JS object to `game_init`. It must provide:
//!
//! ```text
//! currentLearner()            -> string | null
//! cachedProfileId()           -> string | null
//! queryProfile(learner, flag) -> Promise<string | null>   flag: "selected" | "displayed"
//! read(path)                  -> Promise<any>              null when absent, nested object for inner nodes
//! write(path, value)          -> Promise<void>
//! remove(path)                -> Promise<void>             removes the whole subtree
//! ```

use std::time::Duration;

use async_trait::async_trait;
use futures::future::{FutureExt, LocalBoxFuture};
use futures::task::{LocalFutureObj, LocalSpawn, SpawnError};
use js_sys::{Function, Promise, Reflect, JSON};
use serde_json::Value;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

use letterplay::{IdentitySource, ProfileFlag, RemoteAttemptStore, StoreError, StorePath, Timer};

/// Handle to the host page's bridge object.
#[derive(Clone)]
pub struct JsBridge {
    target: JsValue,
}

impl JsBridge {
    pub fn new(target: JsValue) -> Self {
        Self { target }
    }

    fn method(&self, name: &str) -> Result<Function, JsValue> {
        Reflect::get(&self.target, &JsValue::from_str(name))?
            .dyn_into::<Function>()
            .map_err(|_| JsValue::from_str(&format!("bridge.{name} is not a function")))
    }

    fn call_sync(&self, name: &str) -> Option<String> {
        match self.method(name).and_then(|f| f.call0(&self.target)) {
            Ok(value) => value.as_string(),
            Err(err) => {
                log::warn!("bridge.{} failed: {}", name, describe(&err));
                None
            }
        }
    }

    async fn call_async(&self, name: &str, args: &[JsValue]) -> Result<JsValue, StoreError> {
        let f = self.method(name).map_err(network)?;
        let ret = match args {
            [] => f.call0(&self.target),
            [a] => f.call1(&self.target, a),
            [a, b] => f.call2(&self.target, a, b),
            _ => return Err(StoreError::Network(format!("bridge.{name}: too many arguments"))),
        }
        .map_err(network)?;
        JsFuture::from(Promise::resolve(&ret)).await.map_err(network)
    }
}

fn describe(err: &JsValue) -> String {
    err.as_string().unwrap_or_else(|| format!("{err:?}"))
}

fn network(err: JsValue) -> StoreError {
    StoreError::Network(describe(&err))
}

fn to_js(path: &StorePath, value: &Value) -> Result<JsValue, StoreError> {
    let text = serde_json::to_string(value).map_err(|e| StoreError::Decode {
        path: path.to_string(),
        reason: e.to_string(),
    })?;
    JSON::parse(&text).map_err(|e| StoreError::Decode {
        path: path.to_string(),
        reason: describe(&e),
    })
}

fn from_js(path: &StorePath, value: &JsValue) -> Result<Option<Value>, StoreError> {
    if value.is_null() || value.is_undefined() {
        return Ok(None);
    }
    let decode = |reason: String| StoreError::Decode {
        path: path.to_string(),
        reason,
    };
    let text = JSON::stringify(value)
        .map_err(|e| decode(describe(&e)))?
        .as_string()
        .ok_or_else(|| decode("value is not JSON-serializable".into()))?;
    serde_json::from_str(&text).map(Some).map_err(|e| decode(e.to_string()))
}

#[async_trait(?Send)]
impl RemoteAttemptStore for JsBridge {
    async fn read(&self, path: &StorePath) -> Result<Option<Value>, StoreError> {
        let value = self.call_async("read", &[JsValue::from_str(path.as_str())]).await?;
        from_js(path, &value)
    }

    async fn write(&self, path: &StorePath, value: Value) -> Result<(), StoreError> {
        let js = to_js(path, &value)?;
        self.call_async("write", &[JsValue::from_str(path.as_str()), js]).await?;
        Ok(())
    }

    async fn delete(&self, path: &StorePath) -> Result<(), StoreError> {
        self.call_async("remove", &[JsValue::from_str(path.as_str())]).await?;
        Ok(())
    }
}

#[async_trait(?Send)]
impl IdentitySource for JsBridge {
    fn current_learner(&self) -> Option<String> {
        self.call_sync("currentLearner")
    }

    fn cached_profile_id(&self) -> Option<String> {
        self.call_sync("cachedProfileId")
    }

    async fn query_profile(&self, learner: &str, flag: ProfileFlag) -> Result<Option<String>, StoreError> {
        let value = self
            .call_async(
                "queryProfile",
                &[JsValue::from_str(learner), JsValue::from_str(flag.as_str())],
            )
            .await?;
        Ok(value.as_string())
    }
}

/// `setTimeout`-backed timer. Resolves immediately outside a window context.
pub struct JsTimer;

impl Timer for JsTimer {
    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()> {
        let ms = duration.as_millis().min(i32::MAX as u128) as i32;
        let promise = Promise::new(&mut |resolve, _reject| {
            let scheduled = web_sys::window()
                .map(|w| w.set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms).is_ok())
                .unwrap_or(false);
            if !scheduled {
                let _ = resolve.call0(&JsValue::UNDEFINED);
            }
        });
        async move {
            let _ = JsFuture::from(promise).await;
        }
        .boxed_local()
    }
}

/// Runs spawned tasks on the browser's microtask queue.
pub struct BrowserSpawner;

impl LocalSpawn for BrowserSpawner {
    fn spawn_local_obj(&self, future: LocalFutureObj<'static, ()>) -> Result<(), SpawnError> {
        wasm_bindgen_futures::spawn_local(future);
        Ok(())
    }
}
