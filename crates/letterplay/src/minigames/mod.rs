pub mod choice;
pub mod tracing;

pub use choice::{ChoiceGame, MatchRule};
pub use tracing::TracingGame;

use crate::api::game::GameContext;
use crate::api::types::{event_kind, GameEvent};
use crate::attempt::session::{AttemptEvent, AttemptSession};

/// Custom event kinds (UI → Rust).
pub const CUSTOM_RETRY: u32 = 1;
pub const CUSTOM_CARD_TAP: u32 = 2;

/// Forward persistence outcomes of `session` to the UI layer.
pub(crate) fn forward_attempt_events(session: &AttemptSession, ctx: &mut GameContext) {
    for event in session.drain_events() {
        let ev = match event {
            AttemptEvent::Persisted { error_count, finished } => GameEvent::new(
                event_kind::ATTEMPT_PERSISTED,
                error_count as f32,
                if finished { 1.0 } else { 0.0 },
                0.0,
            ),
            AttemptEvent::Skipped(reason) => {
                GameEvent::new(event_kind::ATTEMPT_SKIPPED, reason.code(), 0.0, 0.0)
            }
        };
        ctx.emit_event(ev);
    }
}
