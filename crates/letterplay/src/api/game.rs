use std::rc::Rc;

use futures::task::LocalSpawn;

use crate::api::types::GameEvent;
use crate::attempt::session::AttemptSession;
use crate::attempt::store::RemoteAttemptStore;
use crate::config::LetterplayConfig;
use crate::context::SessionHandle;
use crate::identity::IdentityResolver;
use crate::input::queue::InputQueue;

/// Frame-loop configuration, provided by the mini-game.
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// World width in game units.
    pub world_width: f32,
    /// World height in game units.
    pub world_height: f32,
    /// Maximum number of game events per frame (default: 64).
    pub max_events: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            world_width: 800.0,
            world_height: 600.0,
            max_events: 64,
        }
    }
}

/// The contract every mini-game controller fulfills.
pub trait MiniGame {
    /// Return frame-loop configuration. Called once before init.
    fn config(&self) -> GameConfig {
        GameConfig::default()
    }

    /// Set up the round: configure matching rules and start the attempt.
    fn init(&mut self, ctx: &mut GameContext);

    /// One frame: consume input, advance timers, emit events.
    fn update(&mut self, ctx: &mut GameContext, input: &InputQueue);

    /// A free-text answer from an external recognizer (speech transcript,
    /// detected object label).
    fn answer(&mut self, _ctx: &mut GameContext, _answer: &str) {}

    /// The scene is going away. No more input or ticks will arrive.
    fn teardown(&mut self, _ctx: &mut GameContext) {}
}

/// Per-frame state passed to `MiniGame::init` and `MiniGame::update`.
pub struct GameContext {
    /// Seconds since the previous frame.
    pub dt: f32,
    /// Events for the UI layer, cleared at the start of every frame.
    pub events: Vec<GameEvent>,
    max_events: usize,
}

impl GameContext {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            dt: 0.0,
            events: Vec::with_capacity(config.max_events),
            max_events: config.max_events,
        }
    }

    /// Emit a game event to be forwarded to JS. Drops events past the frame cap.
    pub fn emit_event(&mut self, event: GameEvent) {
        if self.events.len() >= self.max_events {
            log::warn!("Event buffer full ({}); dropping {:?}", self.max_events, event);
            return;
        }
        self.events.push(event);
    }

    /// Start a new frame.
    pub fn begin_frame(&mut self, dt: f32) {
        self.dt = dt;
        self.events.clear();
    }
}

impl Default for GameContext {
    fn default() -> Self {
        Self::new(&GameConfig::default())
    }
}

/// Collaborators handed to a mini-game controller at construction.
#[derive(Clone)]
pub struct Services {
    pub config: Rc<LetterplayConfig>,
    pub store: Rc<dyn RemoteAttemptStore>,
    pub identity: IdentityResolver,
    pub spawner: Rc<dyn LocalSpawn>,
    pub session: SessionHandle,
}

impl Services {
    /// A fresh attempt session bound to this service set's identity.
    pub fn attempt_session(&self) -> AttemptSession {
        let session = AttemptSession::new(self.store.clone(), self.spawner.clone());
        session.bind_identity(self.identity.clone());
        session
    }
}
