use letterplay::{GameConfig, GameContext, GameEvent, InputEvent, InputQueue, MiniGame};

/// Generic mini-game runner that wires up the frame loop.
///
/// Each concrete game creates a `thread_local!` MiniGameRunner and exports
/// free functions via `#[wasm_bindgen]`, because wasm-bindgen cannot export
/// generic structs directly.
///
/// Everything the game emits lands in the frame it was produced in: `init`
/// and text answers are deferred to the next `tick` so the event buffer is
/// not cleared before JS gets to read it.
pub struct MiniGameRunner<G: MiniGame> {
    game: G,
    ctx: GameContext,
    input: InputQueue,
    config: GameConfig,
    answers: Vec<String>,
    needs_init: bool,
    initialized: bool,
    torn_down: bool,
}

impl<G: MiniGame> MiniGameRunner<G> {
    pub fn new(game: G) -> Self {
        let config = game.config();
        Self {
            game,
            ctx: GameContext::new(&config),
            input: InputQueue::new(),
            config,
            answers: Vec::new(),
            needs_init: false,
            initialized: false,
            torn_down: false,
        }
    }

    /// Initialize the game. Call once after construction; the game's `init`
    /// runs at the start of the first tick.
    pub fn init(&mut self) {
        self.config = self.game.config();
        self.ctx = GameContext::new(&self.config);
        self.needs_init = true;
        self.initialized = true;
    }

    /// Push an input event into the queue.
    pub fn push_input(&mut self, event: InputEvent) {
        self.input.push(event);
    }

    /// Queue a recognizer answer (transcript, detected label) for the next tick.
    pub fn submit_answer(&mut self, answer: &str) {
        self.answers.push(answer.to_string());
    }

    /// Run one frame: deliver answers, update the game, drain input.
    pub fn tick(&mut self, dt: f32) {
        if !self.initialized || self.torn_down {
            return;
        }

        self.ctx.begin_frame(dt);
        if self.needs_init {
            self.needs_init = false;
            self.game.init(&mut self.ctx);
        }
        for answer in std::mem::take(&mut self.answers) {
            self.game.answer(&mut self.ctx, &answer);
        }
        self.game.update(&mut self.ctx, &self.input);

        // Drain input after update
        self.input.drain();
    }

    /// The scene is leaving. Later ticks and input are ignored.
    pub fn teardown(&mut self) {
        if self.torn_down || !self.initialized {
            return;
        }
        self.torn_down = true;
        self.game.teardown(&mut self.ctx);
        self.input.drain();
        self.answers.clear();
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn events(&self) -> &[GameEvent] {
        &self.ctx.events
    }

    // ---- Pointer accessors for JS reads ----

    pub fn game_events_ptr(&self) -> *const f32 {
        self.ctx.events.as_ptr() as *const f32
    }

    pub fn game_events_len(&self) -> u32 {
        self.ctx.events.len() as u32
    }

    pub fn world_width(&self) -> f32 {
        self.config.world_width
    }

    pub fn world_height(&self) -> f32 {
        self.config.world_height
    }

    pub fn max_events(&self) -> u32 {
        self.config.max_events as u32
    }
}
