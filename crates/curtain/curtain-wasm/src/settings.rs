//! Page-lifetime configuration store.
//!
//! Initialised lazily on first read so an override object the page defines
//! before this module loads (`window.CurtainConfig`) is honored.

use std::cell::RefCell;

use curtain_core::{isolate, AnimationConfig, ConfigStore, CurtainError, Effect};
use serde_wasm_bindgen as swb;
use wasm_bindgen::{JsCast, JsValue};

/// Global a page may define before load to pre-seed the configuration.
pub const PRELOAD_GLOBAL: &str = "CurtainConfig";

thread_local! {
    static STORE: RefCell<Option<ConfigStore>> = const { RefCell::new(None) };
}

fn preload() -> Option<serde_json::Value> {
    let window = web_sys::window()?;
    let raw = js_sys::Reflect::get(&window, &JsValue::from_str(PRELOAD_GLOBAL)).ok()?;
    if raw.is_undefined() || raw.is_null() {
        return None;
    }
    isolate("config preload", || {
        swb::from_value(raw).map_err(|e| CurtainError::InvalidOverride {
            reason: e.to_string(),
        })
    })
}

fn with_store<T>(f: impl FnOnce(&mut ConfigStore) -> T) -> T {
    STORE.with(|cell| {
        let mut slot = cell.borrow_mut();
        let store = slot.get_or_insert_with(|| ConfigStore::with_preload(preload().as_ref()));
        f(store)
    })
}

pub fn current() -> AnimationConfig {
    with_store(|s| s.current())
}

/// Merge an override object and publish the resulting style variables.
pub fn configure(overrides: JsValue) {
    let parsed: serde_json::Value = match swb::from_value(overrides) {
        Ok(v) => v,
        Err(e) => {
            log::debug!("curtain config: unreadable override ignored: {e}");
            serde_json::Value::Null
        }
    };
    let vars = with_store(|s| s.configure(&parsed));
    publish(&vars);
}

/// Write style variables onto the root element.
pub fn publish(vars: &[Effect]) {
    let root = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.document_element())
        .and_then(|el| el.dyn_into::<web_sys::HtmlElement>().ok());
    let Some(root) = root else {
        log::debug!("curtain config: no root element to publish to");
        return;
    };
    let style = root.style();
    for var in vars {
        if let Effect::SetStyleVar { name, value } = var {
            isolate("publish style var", || {
                style
                    .set_property(name, value)
                    .map_err(|e| CurtainError::host_call("style.setProperty", format!("{e:?}")))
            });
        }
    }
}
