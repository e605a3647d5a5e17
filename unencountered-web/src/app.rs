//! Boot sequence, keyboard listener and frame loop.

use std::cell::RefCell;
use std::rc::Rc;

use unencountered_engine::{Director, FlagStore, MemoryFlagStore};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::KeyboardEvent;

use crate::canvas::CanvasSurface;
use crate::clock::FrameClock;
use crate::config::create_web_game_engine;
use crate::input::{KeyPress, should_prevent_default, translate};
use crate::storage::LocalStorageFlags;
use crate::{CANVAS_ID, dom, test_bridge};

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// Build the director, wire input, and start drawing.
///
/// # Errors
///
/// Returns an error if the canvas is missing or the engine cannot start.
pub fn boot() -> Result<(), JsValue> {
    let director = Rc::new(RefCell::new(build_director()?));
    let font_family = director.borrow().config().font_family.clone();
    let surface = CanvasSurface::from_element_id(CANVAS_ID, &font_family)?;

    if dom::test_mode_enabled() {
        test_bridge::install(&director)?;
        log::info!("test bridge installed");
    }
    attach_keyboard(&director)?;
    start_frame_loop(director, surface)
}

fn build_director() -> Result<Director, JsValue> {
    let flags: Box<dyn FlagStore> = match LocalStorageFlags::open() {
        Ok(store) => Box::new(store),
        Err(err) => {
            log::warn!("{err}; progress will not persist");
            Box::new(MemoryFlagStore::new())
        }
    };
    create_web_game_engine()
        .create_sandbox(flags)
        .map_err(|err| JsValue::from_str(&format!("{err:#}")))
}

fn key_press(event: &KeyboardEvent) -> KeyPress {
    KeyPress {
        key: event.key(),
        code: event.code(),
        repeat: event.repeat(),
        ctrl: event.ctrl_key(),
        meta: event.meta_key(),
        alt: event.alt_key(),
    }
}

fn attach_keyboard(director: &Rc<RefCell<Director>>) -> Result<(), JsValue> {
    let director = Rc::clone(director);
    let on_keydown = Closure::<dyn FnMut(KeyboardEvent)>::new(move |event: KeyboardEvent| {
        let Some(key) = translate(&key_press(&event)) else {
            return;
        };
        if should_prevent_default(&key) {
            event.prevent_default();
        }
        let Ok(mut director) = director.try_borrow_mut() else {
            log::warn!("key {key} dropped while the director was busy");
            return;
        };
        director.handle_key(&key);
    });
    dom::window()?
        .add_event_listener_with_callback("keydown", on_keydown.as_ref().unchecked_ref())?;
    on_keydown.forget();
    Ok(())
}

fn request_frame(callback: &FrameCallback) -> Result<i32, JsValue> {
    let slot = callback.borrow();
    let closure = slot
        .as_ref()
        .ok_or_else(|| JsValue::from_str("frame callback missing"))?;
    dom::window()?.request_animation_frame(closure.as_ref().unchecked_ref())
}

fn start_frame_loop(
    director: Rc<RefCell<Director>>,
    mut surface: CanvasSurface,
) -> Result<(), JsValue> {
    let callback: FrameCallback = Rc::new(RefCell::new(None));
    let next = Rc::clone(&callback);
    let mut clock = FrameClock::new();

    *callback.borrow_mut() = Some(Closure::new(move |now: f64| {
        let dt = clock.tick(now);
        if let Ok(mut director) = director.try_borrow_mut() {
            surface.clear();
            director.frame(dt, &mut surface);
        }
        if let Err(err) = request_frame(&next) {
            dom::console_error(&format!(
                "frame loop stopped: {}",
                dom::js_error_message(&err)
            ));
        }
    }));

    request_frame(&callback)?;
    Ok(())
}
