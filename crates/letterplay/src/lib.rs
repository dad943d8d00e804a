pub mod api;
pub mod attempt;
pub mod config;
pub mod context;
pub mod error;
pub mod identity;
pub mod input;
pub mod minigames;
pub mod tracing;
pub mod widgets;

#[cfg(test)]
mod testing;

// Re-export key types at crate root for convenience
pub use api::game::{GameConfig, GameContext, MiniGame, Services};
pub use api::types::{event_kind, ActivityKind, GameEvent, Letter};
pub use attempt::{
    AttemptEvent, AttemptKey, AttemptRecord, AttemptSession, MemoryAttemptStore,
    RemoteAttemptStore, SkipReason, StorePath, UniquenessScope,
};
pub use config::{IdentitySettings, LetterplayConfig, ScopePresets, TracingSettings};
pub use context::{SessionContext, SessionHandle};
pub use error::{ConfigError, PathError, StoreError};
pub use identity::{Identity, IdentityResolver, IdentitySource, ProfileFlag, Timer};
pub use input::queue::{InputEvent, InputQueue};
pub use minigames::{ChoiceGame, MatchRule, TracingGame, CUSTOM_CARD_TAP, CUSTOM_RETRY};
pub use tracing::{
    ErrorReason, GestureTracingEngine, Segment, TargetPath, TargetPoint, TraceEvent, TracePhase,
    Trail, ValidZone,
};
pub use widgets::{CheckState, Toggle, ToggleGroup};
