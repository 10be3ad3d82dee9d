//! JS-facing controller: owns the core machine, forwards DOM events into it
//! and applies its outputs.
//!
//! Borrows of the shared state are short and never held across a host
//! callback, so callbacks may call back into the controller.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use curtain_core::isolate::Channel;
use curtain_core::{
    isolate, isolate_all, AnimationConfig, CurtainError, CurtainMachine, Effect, ElementId, HostSignal,
    InputAdapter, Intent, Outputs, RawInput,
};
use js_sys::{Function, Object, Reflect};
use serde::Deserialize;
use serde_wasm_bindgen as swb;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CustomEvent, CustomEventInit, Event, EventTarget, KeyboardEvent, TransitionEvent};

use crate::dom::{snapshot, Selectors};
use crate::host::DomHost;
use crate::settings;

/// Global function a page may define to be told the curtain opened.
pub const CALLBACK_GLOBAL: &str = "onCurtainOpened";

const ACTIVATION_EVENTS: [&str; 3] = ["click", "touchend", "keydown"];

fn js(call: &'static str) -> impl Fn(JsValue) -> CurtainError {
    move |e| CurtainError::host_call(call, format!("{e:?}"))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ControllerOptions {
    selectors: Selectors,
    /// Overrides the `prefers-reduced-motion` media query.
    reduced_motion: Option<bool>,
}

struct Listener {
    target: EventTarget,
    kind: &'static str,
    closure: Closure<dyn FnMut(Event)>,
}

struct Inner {
    machine: CurtainMachine,
    input: InputAdapter,
    host: DomHost,
    listeners: Vec<Listener>,
    /// Released closures. A release can happen inside one of them, so they
    /// must outlive the current dispatch.
    retired: Vec<Listener>,
    on_finished: Option<Function>,
}

impl Listener {
    fn detach(&self) {
        isolate("removeEventListener", || {
            self.target
                .remove_event_listener_with_callback(
                    self.kind,
                    self.closure.as_ref().unchecked_ref(),
                )
                .map_err(js("removeEventListener"))
        });
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        // closures are freed with us; the page must not keep calling them
        for listener in &self.listeners {
            listener.detach();
        }
    }
}

type Shared = Rc<RefCell<Inner>>;

thread_local! {
    /// Every controller built on this page, so configuration changes reach them.
    static LIVE: RefCell<Vec<Weak<RefCell<Inner>>>> = const { RefCell::new(Vec::new()) };
}

/// Hand a new configuration to every controller still alive.
pub(crate) fn reconfigure(cfg: &AnimationConfig) {
    LIVE.with(|live| {
        live.borrow_mut().retain(|weak| {
            let Some(shared) = weak.upgrade() else {
                return false;
            };
            match shared.try_borrow_mut() {
                Ok(mut inner) => inner.machine.set_config(cfg.clone()),
                Err(_) => log::warn!("curtain: controller busy, config change not applied"),
            }
            true
        })
    });
}

/// Run `f` against the core with the current host time, then apply its outputs.
fn run(shared: &Shared, f: impl FnOnce(&mut Inner, f64) -> Outputs) {
    let outputs = {
        let Ok(mut inner) = shared.try_borrow_mut() else {
            log::warn!("curtain: re-entrant event dropped");
            return;
        };
        let now = inner.host.now_ms();
        f(&mut *inner, now)
    };
    apply(shared, outputs);
}

fn apply(shared: &Shared, outputs: Outputs) {
    for effect in &outputs.effects {
        match effect {
            Effect::AttachListeners => attach_listeners(shared),
            Effect::ReleaseListeners => release_listeners(shared),
            Effect::ScheduleTimer { at_ms, .. } => schedule_tick(shared, *at_ms),
            other => {
                let mut inner = shared.borrow_mut();
                isolate("apply effect", || inner.host.apply(other));
            }
        }
    }
    for signal in &outputs.signals {
        notify(shared, signal);
    }
}

fn listen(
    inner: &mut Inner,
    target: EventTarget,
    kind: &'static str,
    handler: impl FnMut(Event) + 'static,
) {
    let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
    let added = isolate("addEventListener", || {
        target
            .add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())
            .map_err(js("addEventListener"))
    });
    if added.is_some() {
        inner.listeners.push(Listener {
            target,
            kind,
            closure,
        });
    }
}

fn attach_listeners(shared: &Shared) {
    let weak = Rc::downgrade(shared);
    let mut inner = shared.borrow_mut();
    let targets: Vec<(ElementId, EventTarget)> = inner
        .input
        .targets()
        .iter()
        .filter_map(|id| {
            inner
                .host
                .registry
                .get(*id)
                .map(|el| (*id, el.clone().unchecked_into()))
        })
        .collect();

    for (id, target) in targets {
        for kind in ACTIVATION_EVENTS {
            let weak = weak.clone();
            listen(&mut inner, target.clone(), kind, move |ev| {
                on_activation_event(&weak, id, kind, ev)
            });
        }
    }

    let document: EventTarget = inner.host.document.clone().unchecked_into();
    let weak = weak.clone();
    listen(&mut inner, document, "transitionend", move |ev| {
        on_transition_end(&weak, ev)
    });
}

fn release_listeners(shared: &Shared) {
    let mut inner = shared.borrow_mut();
    let listeners = std::mem::take(&mut inner.listeners);
    for listener in listeners {
        listener.detach();
        inner.retired.push(listener);
    }
}

fn on_activation_event(weak: &Weak<RefCell<Inner>>, target: ElementId, kind: &str, ev: Event) {
    let Some(shared) = weak.upgrade() else {
        return;
    };
    run(&shared, |inner, now| {
        let raw = match kind {
            "keydown" => match ev.dyn_ref::<KeyboardEvent>() {
                Some(k) => RawInput::KeyDown {
                    target,
                    key: k.key(),
                    repeat: k.repeat(),
                    at_ms: now,
                },
                None => return Outputs::default(),
            },
            "touchend" => RawInput::Touch { target, at_ms: now },
            _ => RawInput::Click { target, at_ms: now },
        };
        match inner.input.translate(&raw) {
            Some(Intent::Activate { prevent_default }) => {
                if prevent_default {
                    ev.prevent_default();
                }
                inner.machine.activate(now).clone()
            }
            None => Outputs::default(),
        }
    });
}

fn on_transition_end(weak: &Weak<RefCell<Inner>>, ev: Event) {
    let Some(shared) = weak.upgrade() else {
        return;
    };
    let Some(te) = ev.dyn_ref::<TransitionEvent>() else {
        return;
    };
    let property = te.property_name();
    run(&shared, |inner, now| {
        let element = ev.target().and_then(|t| inner.host.registry.id_of(t.as_ref()));
        match element {
            Some(element) => inner.machine.transition_end(element, &property, now).clone(),
            None => Outputs::default(),
        }
    });
}

fn schedule_tick(shared: &Shared, at_ms: f64) {
    let (window, delay) = {
        let inner = shared.borrow();
        let delay = (at_ms - inner.host.now_ms()).max(0.0).ceil();
        (inner.host.window.clone(), delay as i32)
    };
    let weak = Rc::downgrade(shared);
    let callback = Closure::once_into_js(move || {
        if let Some(shared) = weak.upgrade() {
            // a timer never runs before its own deadline, whatever the clock says
            run(&shared, |inner, now| inner.machine.tick(now.max(at_ms)).clone());
        }
    });
    isolate("setTimeout", || {
        window
            .set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), delay)
            .map(|_| ())
            .map_err(js("setTimeout"))
    });
}

fn global_callback(window: &web_sys::Window) -> Option<Function> {
    Reflect::get(window, &JsValue::from_str(CALLBACK_GLOBAL))
        .ok()
        .and_then(|v| v.dyn_into::<Function>().ok())
}

/// Fan a host signal out to marker, broadcast event and callback, each isolated.
fn notify(shared: &Shared, signal: &HostSignal) {
    let (window, document, registered) = {
        let inner = shared.borrow();
        (
            inner.host.window.clone(),
            inner.host.document.clone(),
            inner.on_finished.clone(),
        )
    };
    let delivered = isolate_all([
        (
            "marker attribute",
            Box::new(|| {
                document
                    .document_element()
                    .ok_or_else(|| CurtainError::unavailable("documentElement"))?
                    .set_attribute(&signal.marker, "true")
                    .map_err(js("setAttribute"))
            }) as Channel<'_>,
        ),
        (
            "broadcast event",
            Box::new(|| {
                let detail = Object::new();
                Reflect::set(
                    &detail,
                    &JsValue::from_str("timestamp"),
                    &JsValue::from_f64(signal.timestamp_ms),
                )
                .map_err(js("Reflect.set"))?;
                // `timestamp` counts from page load
                Reflect::set(
                    &detail,
                    &JsValue::from_str("epochMs"),
                    &JsValue::from_f64(js_sys::Date::now()),
                )
                .map_err(js("Reflect.set"))?;
                let init = CustomEventInit::new();
                init.set_detail(&detail);
                let event = CustomEvent::new_with_event_init_dict(&signal.event, &init)
                    .map_err(js("new CustomEvent"))?;
                window
                    .dispatch_event(&event)
                    .map(|_| ())
                    .map_err(js("dispatchEvent"))
            }) as Channel<'_>,
        ),
        (
            "host callback",
            Box::new(|| match registered.or_else(|| global_callback(&window)) {
                Some(f) => f.call0(&JsValue::UNDEFINED).map(|_| ()).map_err(js("callback")),
                None => Ok(()),
            }) as Channel<'_>,
        ),
    ]);
    log::debug!("curtain: finished, {delivered}/3 notification channels delivered");
}

/// Drives the curtain on the current page.
#[wasm_bindgen]
pub struct CurtainController {
    shared: Shared,
}

#[wasm_bindgen]
impl CurtainController {
    /// Snapshot the page and build the state machine. Pass undefined/null for
    /// defaults, or `{ selectors: {...}, reducedMotion: bool }`.
    #[wasm_bindgen(constructor)]
    pub fn new(options: JsValue) -> Result<CurtainController, JsError> {
        console_error_panic_hook::set_once();

        let opts: ControllerOptions = if options.is_undefined() || options.is_null() {
            ControllerOptions::default()
        } else {
            swb::from_value(options).map_err(|e| JsError::new(&format!("options error: {e}")))?
        };
        let window = web_sys::window().ok_or_else(|| CurtainError::unavailable("window"))?;
        let document = window
            .document()
            .ok_or_else(|| CurtainError::unavailable("document"))?;

        let (doc, registry) = snapshot(&document, &opts.selectors)?;
        let host = DomHost::new(window, document, registry);
        let reduced_motion = opts
            .reduced_motion
            .unwrap_or_else(|| host.prefers_reduced_motion());

        let inner = Inner {
            input: InputAdapter::new(&doc.landmarks),
            machine: CurtainMachine::new(doc, settings::current(), reduced_motion),
            host,
            listeners: Vec::new(),
            retired: Vec::new(),
            on_finished: None,
        };
        let shared = Rc::new(RefCell::new(inner));
        LIVE.with(|live| live.borrow_mut().push(Rc::downgrade(&shared)));
        Ok(CurtainController { shared })
    }

    /// Lock the page, make the overlay focusable and stage the content.
    pub fn mount(&self) {
        run(&self.shared, |inner, now| inner.machine.mount(now).clone());
    }

    /// Programmatic activation; same guards as pointer/keyboard activation.
    pub fn activate(&self) {
        run(&self.shared, |inner, now| inner.machine.activate(now).clone());
    }

    pub fn state(&self) -> String {
        self.shared.borrow().machine.state().as_str().to_string()
    }

    pub fn is_finished(&self) -> bool {
        self.shared.borrow().machine.is_finished()
    }

    /// Register (or clear) a zero-argument callback run once the curtain opened.
    pub fn set_on_finished(&self, callback: Option<Function>) {
        self.shared.borrow_mut().on_finished = callback;
    }

    /// Entrance targets as `[{ element, side, delay_index, prepared }]`.
    pub fn targets(&self) -> Result<JsValue, JsError> {
        swb::to_value(self.shared.borrow().machine.targets())
            .map_err(|e| JsError::new(&format!("targets error: {e}")))
    }
}
