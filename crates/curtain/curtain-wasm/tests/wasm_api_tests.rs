#![cfg(target_arch = "wasm32")]
use std::cell::Cell;
use std::rc::Rc;

use curtain_wasm::{abi_version, configure, current_config, install, is_opened};
use js_sys::{Function, Reflect};
use serde_json::json;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;
use web_sys::{
    Document, Element, HtmlElement, KeyboardEvent, KeyboardEventInit, TransitionEvent,
    TransitionEventInit,
};

wasm_bindgen_test_configure!(run_in_browser);

const PAGE: &str = r#"
  <div class="curtain">
    <div class="curtain__panel" id="left"></div>
    <div class="curtain__panel" id="right"></div>
    <div class="curtain__clone" id="clone">Welcome</div>
    <p class="curtain__hint" id="hint">Press Enter</p>
  </div>
  <main data-curtain-content>
    <h1 id="title">Title</h1>
    <p>Body copy</p>
    <p>   </p>
  </main>
"#;

fn document() -> Document {
    web_sys::window().unwrap().document().unwrap()
}

fn by_id(id: &str) -> Element {
    document().get_element_by_id(id).unwrap()
}

fn reset_page() {
    let doc = document();
    doc.document_element()
        .unwrap()
        .remove_attribute("data-curtain-opened")
        .unwrap();
    doc.body().unwrap().set_inner_html(PAGE);
}

fn options(reduced_motion: bool) -> JsValue {
    serde_wasm_bindgen::to_value(&json!({ "reducedMotion": reduced_motion })).unwrap()
}

fn press_enter(el: &Element) {
    let init = KeyboardEventInit::new();
    init.set_key("Enter");
    init.set_bubbles(true);
    init.set_cancelable(true);
    let ev = KeyboardEvent::new_with_keyboard_event_init_dict("keydown", &init).unwrap();
    el.dispatch_event(&ev).unwrap();
}

fn transition_end(el: &Element, property: &str) {
    let init = TransitionEventInit::new();
    init.set_property_name(property);
    init.set_bubbles(true);
    let ev = TransitionEvent::new_with_event_init_dict("transitionend", &init).unwrap();
    el.dispatch_event(&ev).unwrap();
}

#[wasm_bindgen_test]
fn abi_is_1() {
    assert_eq!(abi_version(), 1);
}

#[wasm_bindgen_test]
fn configure_merges_and_publishes_style_vars() {
    configure(serde_wasm_bindgen::to_value(&json!({ "duration": 2.0, "bogus": 1 })).unwrap());
    let cfg = current_config().unwrap();
    let duration = Reflect::get(&cfg, &JsValue::from_str("duration")).unwrap();
    assert_eq!(duration.as_f64(), Some(2.0));

    let root: HtmlElement = document().document_element().unwrap().unchecked_into();
    let published = root.style().get_property_value("--curtain-duration").unwrap();
    assert_eq!(published.trim(), "2s");

    // non-object overrides never throw
    configure(JsValue::from_str("nonsense"));
    configure(JsValue::UNDEFINED);
}

#[wasm_bindgen_test]
fn keyboard_activation_runs_full_lifecycle_and_notifies_once() {
    reset_page();
    let controller = install(options(false)).unwrap();
    assert_eq!(controller.state(), "idle");
    let targets: js_sys::Array = controller.targets().unwrap().unchecked_into();
    assert_eq!(targets.length(), 2);

    let events = Rc::new(Cell::new(0));
    let epoch = Rc::new(Cell::new(0.0));
    let (counter, seen_epoch) = (events.clone(), epoch.clone());
    let on_event = Closure::wrap(Box::new(move |ev: web_sys::Event| {
        counter.set(counter.get() + 1);
        let detail = ev.unchecked_into::<web_sys::CustomEvent>().detail();
        let at = Reflect::get(&detail, &JsValue::from_str("epochMs")).unwrap();
        seen_epoch.set(at.as_f64().unwrap_or(0.0));
    }) as Box<dyn FnMut(web_sys::Event)>);
    web_sys::window()
        .unwrap()
        .add_event_listener_with_callback("curtain:opened", on_event.as_ref().unchecked_ref())
        .unwrap();
    on_event.forget();
    controller.set_on_finished(Some(Function::new_no_args(
        "window.__curtainCalls = (window.__curtainCalls || 0) + 1;",
    )));

    press_enter(&by_id("hint"));
    assert_eq!(controller.state(), "preopen");
    press_enter(&by_id("hint"));
    assert_eq!(controller.state(), "preopen");

    transition_end(&by_id("clone"), "opacity");
    assert_eq!(controller.state(), "open");

    transition_end(&by_id("left"), "transform");
    assert!(!controller.is_finished());
    transition_end(&by_id("right"), "transform");
    assert_eq!(controller.state(), "finished");
    assert!(controller.is_finished());

    assert!(document().query_selector(".curtain").unwrap().is_none());
    assert!(is_opened());
    assert_eq!(events.get(), 1);
    // wall-clock time, not time since page load
    assert!(epoch.get() > 1.0e12);
    let calls = Reflect::get(&web_sys::window().unwrap(), &JsValue::from_str("__curtainCalls"))
        .unwrap();
    assert_eq!(calls.as_f64(), Some(1.0));

    // late activation is a no-op
    controller.activate();
    assert_eq!(controller.state(), "finished");
    assert_eq!(events.get(), 1);
}

#[wasm_bindgen_test]
fn reduced_motion_shows_content_and_skips_preopen() {
    reset_page();
    let controller = install(options(true)).unwrap();
    let targets: js_sys::Array = controller.targets().unwrap().unchecked_into();
    assert_eq!(targets.length(), 0);
    assert_eq!(
        by_id("title").get_attribute("data-entrance").as_deref(),
        Some("visible")
    );

    controller.activate();
    assert_eq!(controller.state(), "open");
}

#[wasm_bindgen_test]
fn configure_after_install_reaches_staged_content() {
    reset_page();
    let controller = install(options(false)).unwrap();
    configure(serde_wasm_bindgen::to_value(&json!({ "stagger": 0.3 })).unwrap());

    let root: HtmlElement = document().document_element().unwrap().unchecked_into();
    let stagger = root.style().get_property_value("--curtain-stagger").unwrap();
    assert_eq!(stagger.trim(), "0.3s");

    // staged delays read the published variable, not a frozen value
    let title: HtmlElement = by_id("title").unchecked_into();
    let delay = title.style().get_property_value("transition-delay").unwrap();
    assert!(delay.contains("--curtain-stagger"), "delay was {delay}");

    controller.activate();
    assert_eq!(controller.state(), "preopen");
    configure(serde_wasm_bindgen::to_value(&json!({ "stagger": 0.1 })).unwrap());
}
