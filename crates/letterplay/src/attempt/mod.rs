pub mod record;
pub mod scope;
pub mod session;
pub mod store;

pub use record::{AttemptKey, AttemptRecord};
pub use scope::UniquenessScope;
pub use session::{AttemptEvent, AttemptSession, SkipReason};
pub use store::{MemoryAttemptStore, RemoteAttemptStore, StorePath};
