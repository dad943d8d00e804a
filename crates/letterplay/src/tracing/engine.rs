use glam::Vec2;

use crate::config::TracingSettings;
use crate::error::PathError;
use super::path::{TargetPath, ValidZone};
use super::trail::Trail;

/// Why a round failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorReason {
    /// The first touch of a segment missed its first point.
    WrongStart,
    /// A touch landed on a point that is not next in order.
    OutOfOrder,
    /// The pointer stayed outside every valid zone for too long.
    OutOfBounds,
}

impl ErrorReason {
    /// Numeric code forwarded to the UI layer.
    pub fn code(self) -> f32 {
        match self {
            ErrorReason::WrongStart => 1.0,
            ErrorReason::OutOfOrder => 2.0,
            ErrorReason::OutOfBounds => 3.0,
        }
    }
}

/// Events emitted by the engine, drained once per frame by the controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TraceEvent {
    PointTraced { segment: usize, index: usize },
    SegmentComplete { segment: usize },
    Error(ErrorReason),
    /// The feedback delay after an error elapsed; segment 0 may be started again.
    RoundRestarted,
    RoundComplete,
}

/// Round state machine phases.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TracePhase {
    /// No target path yet.
    Unconfigured,
    /// Waiting for a touch on the first point of the current segment.
    AwaitingSegmentStart,
    /// Points of the current segment are being traced.
    Tracing,
    /// Error feedback is showing; the round restarts once `remaining` hits zero.
    Resetting { remaining: f32 },
    /// Every point traced. Input is no longer accepted.
    Complete,
}

/// Validates a live pointer stream against an ordered multi-segment path.
///
/// All methods are synchronous and cheap; feed input samples as they arrive
/// and call [`tick`](Self::tick) once per frame. Events accumulate until
/// [`drain_events`](Self::drain_events) is called.
pub struct GestureTracingEngine {
    settings: TracingSettings,
    path: TargetPath,
    zones: Vec<ValidZone>,
    phase: TracePhase,
    segment: usize,
    /// traced[segment][point]
    traced: Vec<Vec<bool>>,
    trails: Vec<Trail>,
    out_of_bounds: f32,
    /// Latest sample while the pointer is held down.
    pointer: Option<Vec2>,
    events: Vec<TraceEvent>,
}

impl GestureTracingEngine {
    pub fn new(settings: TracingSettings) -> Self {
        Self {
            settings,
            path: TargetPath::default(),
            zones: Vec::new(),
            phase: TracePhase::Unconfigured,
            segment: 0,
            traced: Vec::new(),
            trails: Vec::new(),
            out_of_bounds: 0.0,
            pointer: None,
            events: Vec::with_capacity(16),
        }
    }

    /// Load a new round. An empty `zones` list means "near any target point".
    ///
    /// Broken geometry is rejected here and leaves the engine unconfigured,
    /// so it never behaves as an instantly-complete round.
    pub fn configure(&mut self, path: TargetPath, zones: Vec<ValidZone>) -> Result<(), PathError> {
        if let Err(err) = path.validate() {
            log::warn!("Rejected target path: {}", err);
            self.path = TargetPath::default();
            self.traced.clear();
            self.trails.clear();
            self.phase = TracePhase::Unconfigured;
            return Err(err);
        }

        self.zones = if zones.is_empty() {
            ValidZone::around_path(&path)
        } else {
            zones
        };
        self.traced = path.segments.iter().map(|s| vec![false; s.len()]).collect();
        self.trails = path
            .segments
            .iter()
            .map(|_| Trail::new(self.settings.point_spacing))
            .collect();
        self.path = path;
        self.events.clear();
        self.restart();
        Ok(())
    }

    /// Handle pointer down.
    pub fn on_pointer_down(&mut self, pos: Vec2) {
        match self.phase {
            TracePhase::AwaitingSegmentStart => {
                let Some(first) = self.next_index() else {
                    return;
                };
                let target = self.path.segments[self.segment].points[first];
                if target.contains(pos, self.settings.start_radius_factor) {
                    self.phase = TracePhase::Tracing;
                    self.pointer = Some(pos);
                    self.out_of_bounds = 0.0;
                    self.sample(pos);
                } else {
                    self.fail(ErrorReason::WrongStart);
                }
            }
            TracePhase::Tracing => {
                self.pointer = Some(pos);
                if self.touches_next(pos) {
                    self.sample(pos);
                    return;
                }

                // Resuming on a traced point is fine; jumping ahead is not.
                let segment = &self.path.segments[self.segment];
                let traced = &self.traced[self.segment];
                let mut on_traced = false;
                let mut on_untraced = false;
                for (i, point) in segment.points.iter().enumerate() {
                    if point.contains(pos, 1.0) {
                        if traced[i] {
                            on_traced = true;
                        } else {
                            on_untraced = true;
                        }
                    }
                }

                if on_traced {
                    self.trails[self.segment].push(pos);
                } else if on_untraced {
                    self.fail(ErrorReason::OutOfOrder);
                }
            }
            _ => {}
        }
    }

    /// Handle pointer move. Only matters while tracing with the pointer held.
    pub fn on_pointer_move(&mut self, pos: Vec2) {
        if self.phase != TracePhase::Tracing || self.pointer.is_none() {
            return;
        }
        self.pointer = Some(pos);
        self.sample(pos);
    }

    /// Handle pointer up. Lifting mid-segment keeps progress.
    pub fn on_pointer_up(&mut self) {
        self.pointer = None;
        self.out_of_bounds = 0.0;
    }

    /// Advance timers by `dt` seconds.
    pub fn tick(&mut self, dt: f32) {
        match self.phase {
            TracePhase::Resetting { remaining } => {
                let remaining = remaining - dt;
                if remaining <= 0.0 {
                    self.restart();
                    self.events.push(TraceEvent::RoundRestarted);
                } else {
                    self.phase = TracePhase::Resetting { remaining };
                }
            }
            TracePhase::Tracing => {
                let Some(pos) = self.pointer else {
                    return;
                };
                if self.in_bounds(pos) {
                    self.out_of_bounds = 0.0;
                } else {
                    self.out_of_bounds += dt;
                    if self.out_of_bounds > self.settings.out_of_bounds_limit {
                        self.fail(ErrorReason::OutOfBounds);
                    }
                }
            }
            _ => {}
        }
    }

    /// Take all events emitted since the last call.
    pub fn drain_events(&mut self) -> Vec<TraceEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn phase(&self) -> TracePhase {
        self.phase
    }

    pub fn current_segment(&self) -> usize {
        self.segment
    }

    pub fn path(&self) -> &TargetPath {
        &self.path
    }

    pub fn is_traced(&self, segment: usize, index: usize) -> bool {
        self.traced
            .get(segment)
            .and_then(|s| s.get(index))
            .copied()
            .unwrap_or(false)
    }

    /// Trail of the given segment, for rendering.
    pub fn trail(&self, segment: usize) -> Option<&Trail> {
        self.trails.get(segment)
    }

    pub fn out_of_bounds_time(&self) -> f32 {
        self.out_of_bounds
    }

    /// Fraction of all target points traced (0.0 to 1.0).
    pub fn progress(&self) -> f32 {
        let total = self.path.point_count();
        if total == 0 {
            return 0.0;
        }
        let done: usize = self
            .traced
            .iter()
            .map(|s| s.iter().filter(|t| **t).count())
            .sum();
        done as f32 / total as f32
    }

    // -- internals --

    fn next_index(&self) -> Option<usize> {
        self.traced.get(self.segment)?.iter().position(|t| !t)
    }

    fn touches_next(&self, pos: Vec2) -> bool {
        self.next_index()
            .map(|i| self.path.segments[self.segment].points[i].contains(pos, 1.0))
            .unwrap_or(false)
    }

    fn in_bounds(&self, pos: Vec2) -> bool {
        self.zones.iter().any(|z| z.contains(pos))
    }

    /// An accepted sample while tracing: extend the trail, trace the next point if reached.
    fn sample(&mut self, pos: Vec2) {
        self.trails[self.segment].push(pos);
        if self.touches_next(pos) {
            if let Some(index) = self.next_index() {
                self.mark(index);
            }
        }
    }

    fn mark(&mut self, index: usize) {
        let segment = self.segment;
        self.traced[segment][index] = true;
        self.events.push(TraceEvent::PointTraced { segment, index });

        if self.traced[segment].iter().all(|t| *t) {
            self.events.push(TraceEvent::SegmentComplete { segment });
            self.pointer = None;
            self.out_of_bounds = 0.0;
            if segment + 1 < self.path.segment_count() {
                self.segment += 1;
                self.phase = TracePhase::AwaitingSegmentStart;
            } else {
                self.phase = TracePhase::Complete;
                self.events.push(TraceEvent::RoundComplete);
                log::debug!("Round complete ({} segments)", self.path.segment_count());
            }
        }
    }

    fn fail(&mut self, reason: ErrorReason) {
        log::debug!(
            "Trace error {:?} at segment {} (progress {:.2})",
            reason,
            self.segment,
            self.progress()
        );
        self.events.push(TraceEvent::Error(reason));
        self.clear_progress();

        if self.settings.feedback_delay > 0.0 {
            self.phase = TracePhase::Resetting {
                remaining: self.settings.feedback_delay,
            };
        } else {
            self.restart();
            self.events.push(TraceEvent::RoundRestarted);
        }
    }

    fn clear_progress(&mut self) {
        for segment in &mut self.traced {
            segment.iter_mut().for_each(|t| *t = false);
        }
        for trail in &mut self.trails {
            trail.clear();
        }
        self.segment = 0;
        self.pointer = None;
        self.out_of_bounds = 0.0;
    }

    fn restart(&mut self) {
        self.clear_progress();
        self.phase = TracePhase::AwaitingSegmentStart;
    }
}
