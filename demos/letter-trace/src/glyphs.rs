use std::collections::HashMap;

use glam::Vec2;
use serde::Deserialize;

use letterplay::{Letter, Segment, TargetPath};

/// Top-level baked glyph data as exported by the glyph editor.
#[derive(Debug, Deserialize)]
pub struct BakedGlyphs {
    #[serde(default)]
    pub meta: GlyphMeta,
    pub glyphs: HashMap<String, GlyphDef>,
}

/// Metadata about the glyph set.
#[derive(Debug, Default, Deserialize)]
pub struct GlyphMeta {
    #[serde(default)]
    pub widths: HashMap<String, u8>,
}

/// Definition of a single glyph.
#[derive(Debug, Deserialize)]
pub struct GlyphDef {
    /// Character width class: 0 (narrow), 1 (standard), 2 (wide). When
    /// absent, `meta.widths` decides.
    #[serde(default)]
    pub width: Option<u8>,
    /// Variant name → list of strokes. Each stroke is a list of [x, y] points
    /// in the unit square, y pointing down.
    /// Lowercase: "Baseline" variant. Uppercase/digits: "Default".
    pub variants: HashMap<String, Vec<Vec<[f32; 2]>>>,
}

/// World-space box a glyph is drawn into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphFrame {
    /// Top-left corner.
    pub origin: Vec2,
    /// Height of the glyph box; standard glyphs are square.
    pub size: f32,
    /// Hit radius of every target point.
    pub radius: f32,
}

impl GlyphFrame {
    /// A square frame centred in a `width` x `height` world, with a margin of 10%.
    pub fn centered(width: f32, height: f32, radius: f32) -> Self {
        let size = width.min(height) * 0.8;
        Self {
            origin: Vec2::new((width - size) * 0.5, (height - size) * 0.5),
            size,
            radius,
        }
    }
}

impl BakedGlyphs {
    /// Parse baked glyph JSON (the format exported by the glyph editor's "Download Baked" button).
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Strokes of a letter, in unit coordinates.
    pub fn strokes(&self, letter: &Letter) -> Option<&Vec<Vec<[f32; 2]>>> {
        let glyph = self.glyphs.get(letter.as_str())?;
        glyph.variants.get(variant_for(letter))
    }

    /// Width class for a letter: the glyph's own, then the meta table, then 1 (standard).
    pub fn width(&self, letter: &Letter) -> u8 {
        self.glyphs
            .get(letter.as_str())
            .and_then(|g| g.width)
            .or_else(|| self.meta.widths.get(letter.as_str()).copied())
            .unwrap_or(1)
    }

    pub fn has_letter(&self, letter: &Letter) -> bool {
        self.glyphs.contains_key(letter.as_str())
    }

    /// The letter's strokes as a tracing path inside `frame`, one segment per
    /// stroke. Narrow and wide glyphs are squeezed or stretched horizontally
    /// about the frame's centre.
    pub fn target_path(&self, letter: &Letter, frame: &GlyphFrame) -> Option<TargetPath> {
        let strokes = self.strokes(letter)?;
        let x_scale = match self.width(letter) {
            0 => 0.6,
            2 => 1.3,
            _ => 1.0,
        };
        let segments = strokes
            .iter()
            .map(|stroke| {
                let positions = stroke.iter().map(|&[x, y]| {
                    let x = 0.5 + (x - 0.5) * x_scale;
                    frame.origin + Vec2::new(x, y) * frame.size
                });
                Segment::from_positions(positions, frame.radius)
            })
            .collect();
        Some(TargetPath::new(segments))
    }
}

fn variant_for(letter: &Letter) -> &'static str {
    if letter.as_str().chars().all(|c| c.is_lowercase()) {
        "Baseline"
    } else {
        "Default"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_JSON: &str = r#"{
        "meta": { "widths": { "i": 0, "m": 2, "w": 2 } },
        "glyphs": {
            "w": {
                "variants": { "Baseline": [[[0.0, 0.5], [1.0, 0.5]]] }
            },
            "a": {
                "width": 1,
                "variants": {
                    "Baseline": [[[0.4, 0.4], [0.6, 0.75]]]
                }
            },
            "m": {
                "width": 2,
                "variants": { "Baseline": [[[0.0, 0.5], [1.0, 0.5]]] }
            },
            "A": {
                "width": 1,
                "variants": {
                    "Default": [[[0.3, 0.75], [0.5, 0.15], [0.7, 0.75]]]
                }
            }
        }
    }"#;

    fn frame() -> GlyphFrame {
        GlyphFrame {
            origin: Vec2::new(100.0, 50.0),
            size: 100.0,
            radius: 12.0,
        }
    }

    #[test]
    fn parse_baked_glyphs() {
        let glyphs = BakedGlyphs::from_json(TEST_JSON).unwrap();
        assert_eq!(glyphs.glyphs.len(), 4);
        assert_eq!(glyphs.meta.widths.get("i"), Some(&0));
    }

    #[test]
    fn variant_follows_case() {
        let glyphs = BakedGlyphs::from_json(TEST_JSON).unwrap();
        assert_eq!(glyphs.strokes(&Letter::from('a')).unwrap().len(), 1);
        assert_eq!(glyphs.strokes(&Letter::from('A')).unwrap()[0].len(), 3);
        assert!(glyphs.strokes(&Letter::from('z')).is_none());
    }

    #[test]
    fn path_is_mapped_into_frame() {
        let glyphs = BakedGlyphs::from_json(TEST_JSON).unwrap();
        let path = glyphs.target_path(&Letter::from('A'), &frame()).unwrap();
        assert_eq!(path.segment_count(), 1);
        let first = path.points().next().unwrap();
        assert!(first.pos.abs_diff_eq(Vec2::new(130.0, 125.0), 1e-3));
        assert_eq!(first.radius, 12.0);
        assert!(path.validate().is_ok());
    }

    #[test]
    fn wide_glyphs_are_stretched() {
        let glyphs = BakedGlyphs::from_json(TEST_JSON).unwrap();
        assert_eq!(glyphs.width(&Letter::from('m')), 2);
        let path = glyphs.target_path(&Letter::from('m'), &frame()).unwrap();
        let xs: Vec<f32> = path.points().map(|p| p.pos.x).collect();
        assert!((xs[0] - 85.0).abs() < 1e-3);
        assert!((xs[1] - 215.0).abs() < 1e-3);
    }

    #[test]
    fn width_lookup_defaults_to_standard() {
        let glyphs = BakedGlyphs::from_json(TEST_JSON).unwrap();
        assert_eq!(glyphs.width(&Letter::from('A')), 1);
        assert_eq!(glyphs.width(&Letter::from('i')), 0);
        assert_eq!(glyphs.width(&Letter::from('z')), 1);
    }

    #[test]
    fn glyph_without_width_uses_meta_table() {
        let glyphs = BakedGlyphs::from_json(TEST_JSON).unwrap();
        assert_eq!(glyphs.glyphs["w"].width, None);
        assert_eq!(glyphs.width(&Letter::from('w')), 2);
        let path = glyphs.target_path(&Letter::from('w'), &frame()).unwrap();
        assert!((path.points().next().unwrap().pos.x - 85.0).abs() < 1e-3);
    }

    #[test]
    fn bundled_glyphs_all_validate() {
        let glyphs = BakedGlyphs::from_json(include_str!("../assets/glyphs.json")).unwrap();
        let frame = GlyphFrame::centered(800.0, 600.0, 28.0);
        for key in glyphs.glyphs.keys() {
            let letter = Letter::new(key.clone());
            let path = glyphs.target_path(&letter, &frame).unwrap();
            assert!(path.validate().is_ok(), "glyph {key}");
        }
    }
}
