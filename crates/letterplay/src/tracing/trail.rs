use glam::Vec2;

/// Polyline of pointer samples drawn behind the finger.
/// Purely visual: nothing in pass/fail logic reads it.
#[derive(Debug, Clone, Default)]
pub struct Trail {
    points: Vec<Vec2>,
    spacing: f32,
}

impl Trail {
    pub fn new(spacing: f32) -> Self {
        Self {
            points: Vec::with_capacity(128),
            spacing,
        }
    }

    /// Append a vertex unless it is within `spacing` of the last one.
    /// Returns whether the vertex was kept.
    pub fn push(&mut self, pos: Vec2) -> bool {
        if let Some(last) = self.points.last() {
            if last.distance(pos) <= self.spacing {
                return false;
            }
        }
        self.points.push(pos);
        true
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
