#![forbid(unsafe_code)]
//! Browser front-end for the Unencountered engine.
//!
//! Browser-only plumbing (canvas, localStorage, DOM listeners, the frame loop)
//! compiles for `wasm32` only. Key translation, frame timing, config loading and
//! log formatting are plain Rust and are tested natively.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
pub mod app;
pub mod canvas;
pub mod clock;
pub mod config;
#[cfg(target_arch = "wasm32")]
pub mod dom;
pub mod input;
pub mod logger;
pub mod storage;
#[cfg(target_arch = "wasm32")]
pub mod test_bridge;

/// Canvas element the game draws into.
pub const CANVAS_ID: &str = "game";

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    logger::init(log::LevelFilter::Info);
    app::boot()
}
