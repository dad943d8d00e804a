use wasm_bindgen::prelude::*;
use letterplay::*;

mod game;
mod glyphs;
use game::LetterTrace;

letterplay_web::export_minigame!(LetterTrace, "letter-trace");
