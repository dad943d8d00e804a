use std::fmt;

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// The four mini-game kinds that grade attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    /// Retrace the letter shape with a finger or pointer.
    Tracing,
    /// Find an object starting with the letter through the camera.
    Detect,
    /// Say a word starting with the letter.
    Speech,
    /// Pick the right card.
    Cards,
}

impl ActivityKind {
    pub const ALL: [ActivityKind; 4] = [
        ActivityKind::Tracing,
        ActivityKind::Detect,
        ActivityKind::Speech,
        ActivityKind::Cards,
    ];

    /// Node name used in remote store paths.
    pub fn as_str(self) -> &'static str {
        match self {
            ActivityKind::Tracing => "tracing",
            ActivityKind::Detect => "detect",
            ActivityKind::Speech => "speech",
            ActivityKind::Cards => "cards",
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A letter of the alphabet being learned. Kept as a string so alphabets
/// with multi-codepoint letters work unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Letter(pub String);

impl Letter {
    pub fn new(letter: impl Into<String>) -> Self {
        Self(letter.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Letter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<char> for Letter {
    fn from(ch: char) -> Self {
        Self(ch.to_string())
    }
}

impl From<&str> for Letter {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A game event communicated from Rust to JavaScript through a flat f32 buffer.
/// Generic container: `kind` identifies the event, `a/b/c` carry payload.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct GameEvent {
    pub kind: f32,
    pub a: f32,
    pub b: f32,
    pub c: f32,
}

impl GameEvent {
    pub const FLOATS: usize = 4;

    pub fn new(kind: f32, a: f32, b: f32, c: f32) -> Self {
        Self { kind, a, b, c }
    }
}

/// Event kinds written into `GameEvent::kind` (Rust → JS).
pub mod event_kind {
    /// a = segment, b = point index
    pub const POINT_TRACED: f32 = 1.0;
    /// a = segment
    pub const SEGMENT_COMPLETE: f32 = 2.0;
    /// a = error reason code
    pub const ROUND_ERROR: f32 = 3.0;
    pub const ROUND_COMPLETE: f32 = 4.0;
    /// a = error count, b = finished (0/1)
    pub const ATTEMPT_PERSISTED: f32 = 5.0;
    /// a = skip reason code
    pub const ATTEMPT_SKIPPED: f32 = 6.0;
    /// The tracing engine finished its error feedback delay.
    pub const ROUND_RESTARTED: f32 = 7.0;
    /// a = card index, b = checked (0/1)
    pub const CARD_SELECTED: f32 = 8.0;
    /// The round's matching data was rejected; nothing is graded.
    pub const CONFIG_ERROR: f32 = 9.0;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activity_kind_serializes_as_store_node_name() {
        for kind in ActivityKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
    }

    #[test]
    fn game_event_is_four_floats() {
        assert_eq!(std::mem::size_of::<GameEvent>(), GameEvent::FLOATS * 4);
        let ev = GameEvent::new(event_kind::ROUND_ERROR, 2.0, 0.0, 0.0);
        let floats: &[f32] = bytemuck::cast_slice(std::slice::from_ref(&ev));
        assert_eq!(floats, &[3.0, 2.0, 0.0, 0.0]);
    }
}
