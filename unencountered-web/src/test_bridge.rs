//! `window.__unencounteredTest`, a scripting hook for browser tests.
//!
//! Only installed when the page is opened with `?test=1`.

use std::cell::RefCell;
use std::rc::Rc;

use unencountered_engine::{Director, Key};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::dom;

pub const BRIDGE_NAME: &str = "__unencounteredTest";

type Shared = Rc<RefCell<Director>>;

fn busy() -> JsValue {
    JsValue::from_str("director is busy")
}

fn snapshot(director: &Shared) -> Result<JsValue, JsValue> {
    let director = director.try_borrow().map_err(|_| busy())?;
    serde_wasm_bindgen::to_value(&director.snapshot()).map_err(Into::into)
}

/// Accepts a single DOM key name or an array of them.
fn press(director: &Shared, keys: &JsValue) -> Result<JsValue, JsValue> {
    let names: Vec<String> = if let Some(name) = keys.as_string() {
        vec![name]
    } else {
        serde_wasm_bindgen::from_value(keys.clone())?
    };
    let mut director = director.try_borrow_mut().map_err(|_| busy())?;
    let mut consumed = false;
    for name in &names {
        consumed |= director.handle_key(&Key::from_dom(name));
    }
    Ok(JsValue::from_bool(consumed))
}

fn set_fn(target: &js_sys::Object, name: &str, value: &JsValue) -> Result<(), JsValue> {
    js_sys::Reflect::set(target, &JsValue::from_str(name), value).map(|_| ())
}

/// Attach the bridge object to `window`.
///
/// # Errors
///
/// Returns an error if the window is unavailable or a property cannot be set.
pub fn install(director: &Shared) -> Result<(), JsValue> {
    let bridge = js_sys::Object::new();

    let shared = Rc::clone(director);
    let state = Closure::wrap(
        Box::new(move || snapshot(&shared)) as Box<dyn FnMut() -> Result<JsValue, JsValue>>
    );
    set_fn(&bridge, "state", state.as_ref().unchecked_ref())?;
    state.forget();

    let shared = Rc::clone(director);
    let key = Closure::wrap(Box::new(move |keys: JsValue| press(&shared, &keys))
        as Box<dyn FnMut(JsValue) -> Result<JsValue, JsValue>>);
    set_fn(&bridge, "key", key.as_ref().unchecked_ref())?;
    key.forget();

    let shared = Rc::clone(director);
    let flag = Closure::wrap(Box::new(move |name: String| {
        shared
            .try_borrow()
            .map(|director| director.flags().get(&name))
            .map_err(|_| busy())
    })
        as Box<dyn FnMut(String) -> Result<Option<String>, JsValue>>);
    set_fn(&bridge, "flag", flag.as_ref().unchecked_ref())?;
    flag.forget();

    let shared = Rc::clone(director);
    let goto = Closure::wrap(Box::new(move |scene: String| {
        let mut director = shared.try_borrow_mut().map_err(|_| busy())?;
        director
            .goto(scene.as_str())
            .map_err(|err| JsValue::from_str(&err.to_string()))
    }) as Box<dyn FnMut(String) -> Result<(), JsValue>>);
    set_fn(&bridge, "goto", goto.as_ref().unchecked_ref())?;
    goto.forget();

    let shared = Rc::clone(director);
    let tick = Closure::wrap(Box::new(move |ms: f64| {
        let mut director = shared.try_borrow_mut().map_err(|_| busy())?;
        director.update(ms);
        Ok(())
    }) as Box<dyn FnMut(f64) -> Result<(), JsValue>>);
    set_fn(&bridge, "tick", tick.as_ref().unchecked_ref())?;
    tick.forget();

    js_sys::Reflect::set(&dom::window()?, &JsValue::from_str(BRIDGE_NAME), &bridge)?;
    Ok(())
}
