use letterplay::*;

use crate::glyphs::{BakedGlyphs, GlyphFrame};

const WORLD_W: f32 = 800.0;
const WORLD_H: f32 = 600.0;
const POINT_RADIUS: f32 = 28.0;
const FALLBACK_LETTER: &str = "A";

const GLYPHS_JSON: &str = include_str!("../assets/glyphs.json");

/// Tracing scene for the letter picked on the map.
pub struct LetterTrace {
    inner: TracingGame,
}

impl LetterTrace {
    pub fn new(services: Services) -> Self {
        let letter = services
            .session
            .take_letter()
            .unwrap_or_else(|| Letter::from(FALLBACK_LETTER));
        let path = load_path(&letter).unwrap_or_default();
        let zones = ValidZone::around_path(&path);
        Self {
            inner: TracingGame::new(services, letter, path, zones),
        }
    }

    pub fn letter(&self) -> &Letter {
        self.inner.letter()
    }
}

/// The letter's target path, or `None` when no glyph is baked for it. An
/// empty path makes the round report a configuration error.
fn load_path(letter: &Letter) -> Option<TargetPath> {
    let glyphs = match BakedGlyphs::from_json(GLYPHS_JSON) {
        Ok(glyphs) => glyphs,
        Err(err) => {
            log::error!("Baked glyphs failed to parse: {}", err);
            return None;
        }
    };
    if !glyphs.has_letter(letter) {
        log::warn!("No baked glyph for {}", letter);
        return None;
    }
    let frame = GlyphFrame::centered(WORLD_W, WORLD_H, POINT_RADIUS);
    glyphs.target_path(letter, &frame)
}

impl MiniGame for LetterTrace {
    fn config(&self) -> GameConfig {
        GameConfig {
            world_width: WORLD_W,
            world_height: WORLD_H,
            ..GameConfig::default()
        }
    }

    fn init(&mut self, ctx: &mut GameContext) {
        self.inner.init(ctx);
    }

    fn update(&mut self, ctx: &mut GameContext, input: &InputQueue) {
        self.inner.update(ctx, input);
    }

    fn teardown(&mut self, ctx: &mut GameContext) {
        self.inner.teardown(ctx);
    }
}
