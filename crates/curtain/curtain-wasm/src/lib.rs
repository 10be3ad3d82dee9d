//! wasm-bindgen adapter for the curtain entry choreography.
//!
//! Snapshots the live page into the core's document model, forwards pointer,
//! keyboard and `transitionend` events, applies the returned effects and
//! delivers the completion notification.

pub mod controller;
pub mod dom;
pub mod host;
mod logger;
pub mod settings;

use log::LevelFilter;
use serde_wasm_bindgen as swb;
use wasm_bindgen::prelude::*;

pub use controller::CurtainController;
pub use dom::Selectors;

#[wasm_bindgen(start)]
pub fn on_start() {
    console_error_panic_hook::set_once();
    logger::init(LevelFilter::Info);
}

/// Change console log verbosity: "off", "error", "warn", "info", "debug", "trace".
/// Unknown names are ignored.
#[wasm_bindgen]
pub fn set_log_level(level: &str) {
    match level.parse::<LevelFilter>() {
        Ok(filter) => logger::init(filter),
        Err(_) => log::debug!("curtain: unknown log level `{level}`"),
    }
}

/// Merge a partial configuration object, re-publish the style variables and
/// hand the result to every installed controller. Unknown keys and malformed
/// values are ignored.
#[wasm_bindgen]
pub fn configure(overrides: JsValue) {
    settings::configure(overrides);
    controller::reconfigure(&settings::current());
}

/// Current configuration as `{ duration, easing, stagger, baseOffset, mobileOffset }`.
#[wasm_bindgen]
pub fn current_config() -> Result<JsValue, JsError> {
    swb::to_value(&settings::current())
        .map_err(|e| JsError::new(&format!("config error: {e}")))
}

/// Whether the curtain has opened on this page (reads the persistent marker).
#[wasm_bindgen]
pub fn is_opened() -> bool {
    web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.document_element())
        .is_some_and(|el| el.has_attribute(curtain_core::outputs::FINISHED_MARKER))
}

/// Snapshot the page, mount the curtain and return the controller.
#[wasm_bindgen]
pub fn install(options: JsValue) -> Result<CurtainController, JsError> {
    let controller = CurtainController::new(options)?;
    controller.mount();
    Ok(controller)
}

/// Numeric ABI version for compatibility checks at init.
#[wasm_bindgen]
pub fn abi_version() -> u32 {
    1
}
