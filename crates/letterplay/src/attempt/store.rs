use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::StoreError;
use crate::identity::Identity;
use super::record::{AttemptKey, AttemptRecord};

/// Slash-separated key into the remote tree database.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StorePath(String);

impl StorePath {
    /// Parent of every attempt record of one learner profile, keyed by letter.
    pub fn attempts(identity: &Identity) -> Self {
        Self(format!(
            "learners/{}/profiles/{}/attempts",
            sanitize(&identity.learner_account_id),
            sanitize(&identity.profile_id),
        ))
    }

    /// Node holding one attempt record:
    /// `learners/{learner}/profiles/{profile}/attempts/{letter}/{activity}`.
    pub fn record(identity: &Identity, key: &AttemptKey) -> Self {
        Self::attempts(identity)
            .child(key.letter.as_str())
            .child(key.activity.as_str())
    }

    pub fn child(&self, name: &str) -> Self {
        Self(format!("{}/{}", self.0, sanitize(name)))
    }

    pub fn errors(&self) -> Self {
        self.child("errors")
    }

    pub fn finished(&self) -> Self {
        self.child("finished")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether `other` is this node or lies beneath it.
    pub fn covers(&self, other: &str) -> bool {
        other == self.0
            || (other.starts_with(&self.0) && other.as_bytes().get(self.0.len()) == Some(&b'/'))
    }
}

impl fmt::Display for StorePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Tree databases reserve these characters in key names.
fn sanitize(part: &str) -> String {
    part.chars()
        .map(|c| match c {
            '/' | '.' | '#' | '$' | '[' | ']' => '_',
            c => c,
        })
        .collect()
}

/// Key-path access to the remote tree database.
#[async_trait(?Send)]
pub trait RemoteAttemptStore {
    /// A leaf's value, or an inner node as a nested object of its children.
    async fn read(&self, path: &StorePath) -> Result<Option<Value>, StoreError>;
    async fn write(&self, path: &StorePath, value: Value) -> Result<(), StoreError>;
    /// Remove a node and everything beneath it. Deleting a missing node succeeds.
    async fn delete(&self, path: &StorePath) -> Result<(), StoreError>;
}

impl AttemptRecord {
    /// Write both leaves of the record under `node`. `finished` is written last.
    pub async fn save(&self, store: &dyn RemoteAttemptStore, node: &StorePath) -> Result<(), StoreError> {
        store.write(&node.errors(), Value::from(self.error_count)).await?;
        store.write(&node.finished(), Value::from(self.finished)).await
    }

    /// Read a record back. `None` if neither leaf exists.
    pub async fn load(store: &dyn RemoteAttemptStore, node: &StorePath) -> Result<Option<Self>, StoreError> {
        let errors = store.read(&node.errors()).await?;
        let finished = store.read(&node.finished()).await?;
        if errors.is_none() && finished.is_none() {
            return Ok(None);
        }

        let error_count = match errors {
            None => 0,
            Some(v) => v
                .as_u64()
                .and_then(|n| u32::try_from(n).ok())
                .ok_or_else(|| decode_error(&node.errors(), &v))?,
        };
        let finished = match finished {
            None => false,
            Some(v) => v.as_bool().ok_or_else(|| decode_error(&node.finished(), &v))?,
        };
        Ok(Some(Self { error_count, finished }))
    }
}

fn decode_error(path: &StorePath, value: &Value) -> StoreError {
    StoreError::Decode {
        path: path.to_string(),
        reason: format!("unexpected value {value}"),
    }
}

/// In-process tree store. Backs offline play and tests.
#[derive(Debug, Default)]
pub struct MemoryAttemptStore {
    leaves: RefCell<BTreeMap<String, Value>>,
}

impl MemoryAttemptStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &StorePath) -> Option<Value> {
        self.leaves.borrow().get(path.as_str()).cloned()
    }

    /// Whether any leaf lives at or beneath `path`.
    pub fn exists(&self, path: &StorePath) -> bool {
        self.leaves.borrow().keys().any(|k| path.covers(k))
    }

    pub fn paths(&self) -> Vec<String> {
        self.leaves.borrow().keys().cloned().collect()
    }

    /// Leaves strictly beneath `path` folded into nested objects.
    fn subtree(&self, path: &StorePath) -> Option<Value> {
        let leaves = self.leaves.borrow();
        let mut root = Map::new();
        for (key, value) in leaves.iter().filter(|(k, _)| k.len() > path.0.len() && path.covers(k)) {
            let mut parts = key[path.0.len() + 1..].split('/').peekable();
            let mut node = &mut root;
            while let Some(part) = parts.next() {
                if parts.peek().is_none() {
                    node.insert(part.to_string(), value.clone());
                    break;
                }
                let entry = node
                    .entry(part.to_string())
                    .or_insert_with(|| Value::Object(Map::new()));
                node = match entry {
                    Value::Object(children) => children,
                    _ => break,
                };
            }
        }
        (!root.is_empty()).then_some(Value::Object(root))
    }

    pub fn len(&self) -> usize {
        self.leaves.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.leaves.borrow().is_empty()
    }
}

#[async_trait(?Send)]
impl RemoteAttemptStore for MemoryAttemptStore {
    async fn read(&self, path: &StorePath) -> Result<Option<Value>, StoreError> {
        Ok(self.get(path).or_else(|| self.subtree(path)))
    }

    async fn write(&self, path: &StorePath, value: Value) -> Result<(), StoreError> {
        let mut leaves = self.leaves.borrow_mut();
        // A leaf replaces whatever subtree was there.
        leaves.retain(|k, _| !path.covers(k));
        leaves.insert(path.as_str().to_string(), value);
        Ok(())
    }

    async fn delete(&self, path: &StorePath) -> Result<(), StoreError> {
        self.leaves.borrow_mut().retain(|k, _| !path.covers(k));
        Ok(())
    }
}
