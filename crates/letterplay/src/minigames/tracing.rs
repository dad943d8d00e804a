use crate::api::game::{GameContext, MiniGame, Services};
use crate::api::types::{event_kind, ActivityKind, GameEvent, Letter};
use crate::attempt::record::AttemptKey;
use crate::attempt::scope::UniquenessScope;
use crate::attempt::session::AttemptSession;
use crate::input::queue::{InputEvent, InputQueue};
use crate::tracing::{GestureTracingEngine, TargetPath, TraceEvent, ValidZone};
use super::{forward_attempt_events, CUSTOM_RETRY};

/// Letter tracing: the learner retraces the letter's strokes in order.
pub struct TracingGame {
    services: Services,
    engine: GestureTracingEngine,
    session: AttemptSession,
    letter: Letter,
    path: TargetPath,
    zones: Vec<ValidZone>,
}

impl TracingGame {
    pub fn new(services: Services, letter: Letter, path: TargetPath, zones: Vec<ValidZone>) -> Self {
        let engine = GestureTracingEngine::new(services.config.tracing);
        let session = services.attempt_session();
        Self {
            services,
            engine,
            session,
            letter,
            path,
            zones,
        }
    }

    pub fn engine(&self) -> &GestureTracingEngine {
        &self.engine
    }

    pub fn session(&self) -> &AttemptSession {
        &self.session
    }

    pub fn letter(&self) -> &Letter {
        &self.letter
    }

    /// Reload the shape and open a fresh attempt for the same letter.
    fn begin_round(&mut self, ctx: &mut GameContext) {
        if let Err(err) = self.engine.configure(self.path.clone(), self.zones.clone()) {
            log::error!("Letter {} has unusable tracing data: {}", self.letter, err);
            ctx.emit_event(GameEvent::new(event_kind::CONFIG_ERROR, 0.0, 0.0, 0.0));
            return;
        }
        let key = AttemptKey::new(self.letter.clone(), ActivityKind::Tracing);
        let scope = UniquenessScope::for_activity(&self.services.config, ActivityKind::Tracing);
        self.session.start(key, scope);
    }
}

impl MiniGame for TracingGame {
    fn init(&mut self, ctx: &mut GameContext) {
        log::info!(
            "Tracing {} ({} segments, {} points)",
            self.letter,
            self.path.segment_count(),
            self.path.point_count()
        );
        self.begin_round(ctx);
    }

    fn update(&mut self, ctx: &mut GameContext, input: &InputQueue) {
        for event in input.iter() {
            match (*event, event.pos()) {
                (InputEvent::PointerDown { .. }, Some(pos)) => self.engine.on_pointer_down(pos),
                (InputEvent::PointerMove { .. }, Some(pos)) => self.engine.on_pointer_move(pos),
                (InputEvent::PointerUp { .. }, _) => self.engine.on_pointer_up(),
                (InputEvent::Custom { kind: CUSTOM_RETRY, .. }, _) => self.begin_round(ctx),
                _ => {}
            }
        }
        self.engine.tick(ctx.dt);

        for event in self.engine.drain_events() {
            let ev = match event {
                TraceEvent::PointTraced { segment, index } => GameEvent::new(
                    event_kind::POINT_TRACED,
                    segment as f32,
                    index as f32,
                    0.0,
                ),
                TraceEvent::SegmentComplete { segment } => {
                    GameEvent::new(event_kind::SEGMENT_COMPLETE, segment as f32, 0.0, 0.0)
                }
                TraceEvent::Error(reason) => {
                    self.session.record_error();
                    GameEvent::new(event_kind::ROUND_ERROR, reason.code(), 0.0, 0.0)
                }
                TraceEvent::RoundRestarted => {
                    GameEvent::new(event_kind::ROUND_RESTARTED, 0.0, 0.0, 0.0)
                }
                TraceEvent::RoundComplete => {
                    self.session.record_finished();
                    GameEvent::new(event_kind::ROUND_COMPLETE, 0.0, 0.0, 0.0)
                }
            };
            ctx.emit_event(ev);
        }

        forward_attempt_events(&self.session, ctx);
    }

    fn teardown(&mut self, _ctx: &mut GameContext) {
        self.session.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attempt::record::AttemptRecord;
    use crate::attempt::store::StorePath;
    use crate::identity::Identity;
    use crate::testing::{services, RecordingStore};
    use crate::tracing::Segment;
    use futures::executor::{block_on, LocalPool};
    use glam::Vec2;
    use std::rc::Rc;

    fn path() -> TargetPath {
        TargetPath::new(vec![Segment::from_positions(
            [Vec2::new(100.0, 100.0), Vec2::new(150.0, 100.0), Vec2::new(200.0, 100.0)],
            20.0,
        )])
    }

    fn stored(store: &RecordingStore, letter: char) -> Option<AttemptRecord> {
        let node = StorePath::record(
            &Identity::new("acct", "kid"),
            &AttemptKey::new(letter, ActivityKind::Tracing),
        );
        block_on(AttemptRecord::load(store, &node)).unwrap()
    }

    fn frame(game: &mut TracingGame, ctx: &mut GameContext, events: &[InputEvent]) {
        let mut input = InputQueue::new();
        for e in events {
            input.push(*e);
        }
        ctx.begin_frame(1.0 / 60.0);
        game.update(ctx, &input);
    }

    fn kinds(ctx: &GameContext) -> Vec<f32> {
        ctx.events.iter().map(|e| e.kind).collect()
    }

    #[test]
    fn clean_trace_saves_finished_attempt() {
        let mut pool = LocalPool::new();
        let store = Rc::new(RecordingStore::new());
        let mut game = TracingGame::new(services(&pool, store.clone()), Letter::from('A'), path(), Vec::new());
        let mut ctx = GameContext::default();
        game.init(&mut ctx);

        frame(&mut game, &mut ctx, &[
            InputEvent::PointerDown { x: 100.0, y: 100.0 },
            InputEvent::PointerMove { x: 150.0, y: 100.0 },
            InputEvent::PointerMove { x: 200.0, y: 100.0 },
            InputEvent::PointerUp { x: 200.0, y: 100.0 },
        ]);
        assert!(kinds(&ctx).contains(&event_kind::ROUND_COMPLETE));

        pool.run_until_stalled();
        frame(&mut game, &mut ctx, &[]);
        assert!(kinds(&ctx).contains(&event_kind::ATTEMPT_PERSISTED));
        assert_eq!(stored(&store, 'A'), Some(AttemptRecord::new(0, true)));
    }

    #[test]
    fn wrong_start_counts_an_error() {
        let mut pool = LocalPool::new();
        let store = Rc::new(RecordingStore::new());
        let mut game = TracingGame::new(services(&pool, store.clone()), Letter::from('B'), path(), Vec::new());
        let mut ctx = GameContext::default();
        game.init(&mut ctx);

        frame(&mut game, &mut ctx, &[InputEvent::PointerDown { x: 150.0, y: 100.0 }]);
        let error = ctx.events.iter().find(|e| e.kind == event_kind::ROUND_ERROR).unwrap();
        assert_eq!(error.a, 1.0);
        assert_eq!(game.session().record(), Some(AttemptRecord::new(1, false)));

        pool.run_until_stalled();
        assert_eq!(stored(&store, 'B'), Some(AttemptRecord::new(1, false)));
    }

    #[test]
    fn broken_path_reports_config_error_and_starts_nothing() {
        let mut pool = LocalPool::new();
        let store = Rc::new(RecordingStore::new());
        let mut game = TracingGame::new(
            services(&pool, store.clone()),
            Letter::from('C'),
            TargetPath::default(),
            Vec::new(),
        );
        let mut ctx = GameContext::default();
        game.init(&mut ctx);
        pool.run_until_stalled();

        assert_eq!(kinds(&ctx), vec![event_kind::CONFIG_ERROR]);
        assert_eq!(game.session().key(), None);
        assert!(store.operations().is_empty());
    }

    #[test]
    fn teardown_closes_session() {
        let pool = LocalPool::new();
        let store = Rc::new(RecordingStore::new());
        let mut game = TracingGame::new(services(&pool, store), Letter::from('A'), path(), Vec::new());
        let mut ctx = GameContext::default();
        game.init(&mut ctx);
        game.teardown(&mut ctx);

        frame(&mut game, &mut ctx, &[InputEvent::PointerDown { x: 150.0, y: 100.0 }]);
        assert!(kinds(&ctx).contains(&event_kind::ATTEMPT_SKIPPED));
    }
}
