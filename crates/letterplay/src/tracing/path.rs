use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::PathError;

/// A single target the pointer must pass through.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetPoint {
    /// Position in the same coordinate space as pointer samples.
    pub pos: Vec2,
    /// Distance within which a sample counts as touching this point.
    pub radius: f32,
}

impl TargetPoint {
    pub fn new(pos: Vec2, radius: f32) -> Self {
        Self { pos, radius }
    }

    /// Whether `sample` lies within `radius * factor` of this point.
    pub fn contains(&self, sample: Vec2, factor: f32) -> bool {
        sample.distance(self.pos) <= self.radius * factor
    }
}

/// An ordered sub-path traced contiguously before the next one starts.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Segment {
    pub points: Vec<TargetPoint>,
}

impl Segment {
    pub fn new(points: Vec<TargetPoint>) -> Self {
        Self { points }
    }

    /// Build a segment from raw positions that share one radius.
    pub fn from_positions(positions: impl IntoIterator<Item = Vec2>, radius: f32) -> Self {
        Self {
            points: positions.into_iter().map(|p| TargetPoint::new(p, radius)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// The full shape of a round: segments in order, each with points in order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetPath {
    pub segments: Vec<Segment>,
}

impl TargetPath {
    pub fn new(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    /// Reject geometry that would make a round meaningless.
    pub fn validate(&self) -> Result<(), PathError> {
        if self.segments.is_empty() {
            return Err(PathError::EmptyPath);
        }
        for (s, segment) in self.segments.iter().enumerate() {
            if segment.is_empty() {
                return Err(PathError::EmptySegment { segment: s });
            }
            for (i, point) in segment.points.iter().enumerate() {
                if !point.pos.is_finite() {
                    return Err(PathError::InvalidPosition { segment: s, index: i });
                }
                if !point.radius.is_finite() || point.radius <= 0.0 {
                    return Err(PathError::InvalidRadius {
                        segment: s,
                        index: i,
                        radius: point.radius,
                    });
                }
            }
        }
        Ok(())
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn point_count(&self) -> usize {
        self.segments.iter().map(Segment::len).sum()
    }

    pub fn points(&self) -> impl Iterator<Item = &TargetPoint> {
        self.segments.iter().flat_map(|s| s.points.iter())
    }
}

/// A region where the pointer is allowed to be while tracing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum ValidZone {
    Circle { center: Vec2, radius: f32 },
    Rect { min: Vec2, max: Vec2 },
    /// Everything within `radius` of the line segment from `a` to `b`.
    Capsule { a: Vec2, b: Vec2, radius: f32 },
}

impl ValidZone {
    pub fn contains(&self, pos: Vec2) -> bool {
        match *self {
            ValidZone::Circle { center, radius } => pos.distance_squared(center) <= radius * radius,
            ValidZone::Rect { min, max } => {
                pos.x >= min.x && pos.x <= max.x && pos.y >= min.y && pos.y <= max.y
            }
            ValidZone::Capsule { a, b, radius } => {
                let ab = b - a;
                let len_sq = ab.length_squared();
                let t = if len_sq > 0.0 {
                    ((pos - a).dot(ab) / len_sq).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                pos.distance_squared(a + ab * t) <= radius * radius
            }
        }
    }

    /// Default zones for a path: a capsule along each stretch between
    /// consecutive points of a segment, so the pointer may travel between
    /// them. Single-point segments get a circle.
    pub fn around_path(path: &TargetPath) -> Vec<ValidZone> {
        let mut zones = Vec::new();
        for segment in &path.segments {
            match segment.points.as_slice() {
                [] => {}
                [only] => zones.push(ValidZone::Circle { center: only.pos, radius: only.radius }),
                points => zones.extend(points.windows(2).map(|pair| ValidZone::Capsule {
                    a: pair[0].pos,
                    b: pair[1].pos,
                    radius: pair[0].radius.max(pair[1].radius),
                })),
            }
        }
        zones
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(n: usize, y: f32) -> Segment {
        Segment::from_positions((0..n).map(|i| Vec2::new(100.0 + i as f32 * 50.0, y)), 20.0)
    }

    #[test]
    fn valid_path_passes() {
        let path = TargetPath::new(vec![line(3, 100.0), line(2, 200.0)]);
        assert!(path.validate().is_ok());
        assert_eq!(path.segment_count(), 2);
        assert_eq!(path.point_count(), 5);
    }

    #[test]
    fn empty_path_rejected() {
        assert_eq!(TargetPath::default().validate(), Err(PathError::EmptyPath));
    }

    #[test]
    fn empty_segment_rejected() {
        let path = TargetPath::new(vec![line(2, 100.0), Segment::default()]);
        assert_eq!(path.validate(), Err(PathError::EmptySegment { segment: 1 }));
    }

    #[test]
    fn zero_radius_rejected() {
        let path = TargetPath::new(vec![Segment::from_positions([Vec2::ZERO], 0.0)]);
        assert!(matches!(
            path.validate(),
            Err(PathError::InvalidRadius { segment: 0, index: 0, .. })
        ));
    }

    #[test]
    fn nan_position_rejected() {
        let path = TargetPath::new(vec![Segment::from_positions([Vec2::new(f32::NAN, 0.0)], 5.0)]);
        assert_eq!(
            path.validate(),
            Err(PathError::InvalidPosition { segment: 0, index: 0 })
        );
    }

    #[test]
    fn zone_containment() {
        let circle = ValidZone::Circle { center: Vec2::ZERO, radius: 10.0 };
        assert!(circle.contains(Vec2::new(6.0, 8.0)));
        assert!(!circle.contains(Vec2::new(8.0, 8.0)));

        let rect = ValidZone::Rect { min: Vec2::ZERO, max: Vec2::new(100.0, 50.0) };
        assert!(rect.contains(Vec2::new(100.0, 0.0)));
        assert!(!rect.contains(Vec2::new(50.0, 51.0)));
    }

    #[test]
    fn default_zones_cover_the_gap_between_points() {
        let path = TargetPath::new(vec![
            Segment::from_positions([Vec2::new(0.0, 0.0), Vec2::new(120.0, 0.0)], 20.0),
            Segment::from_positions([Vec2::new(300.0, 300.0)], 20.0),
        ]);
        let zones = ValidZone::around_path(&path);
        let inside = |pos: Vec2| zones.iter().any(|z| z.contains(pos));

        assert_eq!(zones.len(), 2);
        assert!(inside(Vec2::new(60.0, 15.0)));
        assert!(inside(Vec2::new(-15.0, 0.0)));
        assert!(!inside(Vec2::new(60.0, 25.0)));
        assert!(!inside(Vec2::new(145.0, 0.0)));
        assert!(inside(Vec2::new(310.0, 310.0)));
        assert!(!inside(Vec2::new(200.0, 150.0)));
    }

    #[test]
    fn degenerate_capsule_is_a_circle() {
        let capsule = ValidZone::Capsule { a: Vec2::ONE, b: Vec2::ONE, radius: 5.0 };
        assert!(capsule.contains(Vec2::new(4.0, 5.0)));
        assert!(!capsule.contains(Vec2::new(5.0, 5.0)));
    }

    #[test]
    fn parse_path_and_zones_from_json() {
        let json = r#"[
            [ { "pos": [0.0, 0.0], "radius": 10.0 }, { "pos": [30.0, 0.0], "radius": 10.0 } ]
        ]"#;
        let path: TargetPath = serde_json::from_str(json).unwrap();
        assert_eq!(path.point_count(), 2);

        let zone: ValidZone =
            serde_json::from_str(r#"{ "shape": "rect", "min": [0, 0], "max": [10, 10] }"#).unwrap();
        assert!(zone.contains(Vec2::new(5.0, 5.0)));
    }
}
