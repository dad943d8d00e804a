pub mod js;
pub mod runner;

use std::rc::Rc;

use wasm_bindgen::JsValue;

use letterplay::{IdentityResolver, LetterplayConfig, Services, SessionHandle};

pub use js::{BrowserSpawner, JsBridge, JsTimer};
pub use runner::MiniGameRunner;

thread_local! {
    static SESSION: SessionHandle = SessionHandle::new();
}

/// The page-wide session context shared by every scene in this module.
pub fn session() -> SessionHandle {
    SESSION.with(SessionHandle::clone)
}

/// Parse the page's configuration. Empty input or a rejected document
/// falls back to the defaults.
pub fn load_config(json: &str) -> LetterplayConfig {
    if json.trim().is_empty() {
        return LetterplayConfig::default();
    }
    match LetterplayConfig::from_json(json) {
        Ok(config) => config,
        Err(err) => {
            log::warn!("Rejected configuration, using defaults: {}", err);
            LetterplayConfig::default()
        }
    }
}

/// Wire the core's collaborators to the host page's bridge object.
pub fn browser_services(bridge: JsValue, config_json: &str) -> Services {
    let config = Rc::new(load_config(config_json));
    let bridge = Rc::new(JsBridge::new(bridge));
    let identity = IdentityResolver::new(bridge.clone(), Rc::new(JsTimer), config.identity);
    Services {
        config,
        store: bridge,
        identity,
        spawner: Rc::new(BrowserSpawner),
        session: session(),
    }
}

/// Generate all `#[wasm_bindgen]` exports for a mini-game.
///
/// This macro generates:
/// - `thread_local!` storage for the MiniGameRunner
/// - `with_runner()` helper function
/// - All wasm-bindgen exports (game_init, game_tick, input handlers, answers,
///   session context setters, data accessors)
///
/// # Usage
///
/// ```ignore
/// use wasm_bindgen::prelude::*;
/// use letterplay::*;
///
/// mod game;
/// use game::LetterTrace;
///
/// letterplay_web::export_minigame!(LetterTrace, "letter-trace");
/// ```
///
/// # Arguments
///
/// - `$game_type`: a `letterplay::MiniGame` with `fn new(services: Services) -> Self`
/// - `$game_name`: A string literal used in the initialization log message
#[macro_export]
macro_rules! export_minigame {
    ($game_type:ty, $game_name:literal) => {
        use std::cell::RefCell;

        thread_local! {
            static RUNNER: RefCell<Option<$crate::MiniGameRunner<$game_type>>> = RefCell::new(None);
        }

        fn with_runner<R: Default>(f: impl FnOnce(&mut $crate::MiniGameRunner<$game_type>) -> R) -> R {
            RUNNER.with(|cell| match cell.borrow_mut().as_mut() {
                Some(runner) => f(runner),
                None => {
                    log::warn!("{}: not initialized, call game_init() first", $game_name);
                    R::default()
                }
            })
        }

        #[wasm_bindgen]
        pub fn game_init(bridge: JsValue, config_json: &str) {
            console_error_panic_hook::set_once();
            let _ = console_log::init_with_level(log::Level::Info);

            let services = $crate::browser_services(bridge, config_json);
            let mut runner = $crate::MiniGameRunner::new(<$game_type>::new(services));
            runner.init();

            RUNNER.with(|cell| {
                if let Some(mut previous) = cell.borrow_mut().replace(runner) {
                    previous.teardown();
                }
            });
            log::info!("{}: initialized", $game_name);
        }

        #[wasm_bindgen]
        pub fn game_tick(dt: f32) {
            with_runner(|r| r.tick(dt));
        }

        #[wasm_bindgen]
        pub fn game_teardown() {
            with_runner(|r| r.teardown());
        }

        #[wasm_bindgen]
        pub fn game_pointer_down(x: f32, y: f32) {
            with_runner(|r| r.push_input(InputEvent::PointerDown { x, y }));
        }

        #[wasm_bindgen]
        pub fn game_pointer_up(x: f32, y: f32) {
            with_runner(|r| r.push_input(InputEvent::PointerUp { x, y }));
        }

        #[wasm_bindgen]
        pub fn game_pointer_move(x: f32, y: f32) {
            with_runner(|r| r.push_input(InputEvent::PointerMove { x, y }));
        }

        #[wasm_bindgen]
        pub fn game_custom_event(kind: u32, a: f32, b: f32, c: f32) {
            with_runner(|r| r.push_input(InputEvent::Custom { kind, a, b, c }));
        }

        #[wasm_bindgen]
        pub fn game_submit_answer(answer: &str) {
            with_runner(|r| r.submit_answer(answer));
        }

        // ---- Session context (set before game_init) ----

        #[wasm_bindgen]
        pub fn session_set_letter(letter: &str) {
            $crate::session().set_letter(letter);
        }

        #[wasm_bindgen]
        pub fn session_set_word(word: &str) {
            $crate::session().set_word(word);
        }

        #[wasm_bindgen]
        pub fn session_set_position(x: f32, y: f32) {
            $crate::session().set_position(glam::Vec2::new(x, y));
        }

        // ---- Data accessors ----

        #[wasm_bindgen]
        pub fn get_game_events_ptr() -> *const f32 {
            RUNNER.with(|cell| {
                cell.borrow()
                    .as_ref()
                    .map_or(std::ptr::null(), |r| r.game_events_ptr())
            })
        }

        #[wasm_bindgen]
        pub fn get_game_events_len() -> u32 {
            with_runner(|r| r.game_events_len())
        }

        #[wasm_bindgen]
        pub fn get_world_width() -> f32 {
            with_runner(|r| r.world_width())
        }

        #[wasm_bindgen]
        pub fn get_world_height() -> f32 {
            with_runner(|r| r.world_height())
        }

        #[wasm_bindgen]
        pub fn get_max_events() -> u32 {
            with_runner(|r| r.max_events())
        }
    };
}
