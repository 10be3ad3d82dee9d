//! Applies core effects to the live page.

use curtain_core::{CurtainError, DocTarget, Effect};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlElement, Window};

use crate::dom::ElementRegistry;

fn js(call: &'static str) -> impl Fn(JsValue) -> CurtainError {
    move |e| CurtainError::host_call(call, format!("{e:?}"))
}

fn html(el: &Element) -> Result<&HtmlElement, CurtainError> {
    el.dyn_ref::<HtmlElement>()
        .ok_or_else(|| CurtainError::host_call("style", "element has no inline style"))
}

/// Inline `overflow` values saved while the page is scroll-locked.
#[derive(Default)]
struct SavedScroll {
    root: String,
    body: String,
}

pub struct DomHost {
    pub window: Window,
    pub document: Document,
    pub registry: ElementRegistry,
    saved_scroll: Option<SavedScroll>,
}

impl DomHost {
    pub fn new(window: Window, document: Document, registry: ElementRegistry) -> Self {
        Self {
            window,
            document,
            registry,
            saved_scroll: None,
        }
    }

    pub fn now_ms(&self) -> f64 {
        self.window
            .performance()
            .map(|p| p.now())
            .unwrap_or_else(js_sys::Date::now)
    }

    pub fn prefers_reduced_motion(&self) -> bool {
        curtain_core::isolate("reduced motion query", || {
            self.window
                .match_media("(prefers-reduced-motion: reduce)")
                .map_err(js("matchMedia"))?
                .map(|mql| mql.matches())
                .ok_or_else(|| CurtainError::unavailable("matchMedia"))
        })
        .unwrap_or(false)
    }

    fn root(&self) -> Result<HtmlElement, CurtainError> {
        self.document
            .document_element()
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
            .ok_or_else(|| CurtainError::unavailable("documentElement"))
    }

    fn body(&self) -> Result<HtmlElement, CurtainError> {
        self.document
            .body()
            .ok_or_else(|| CurtainError::unavailable("body"))
    }

    fn doc_target(&self, target: DocTarget) -> Result<HtmlElement, CurtainError> {
        match target {
            DocTarget::Root => self.root(),
        }
    }

    /// Apply one DOM effect. Listener and timer effects belong to the controller.
    pub fn apply(&mut self, effect: &Effect) -> Result<(), CurtainError> {
        match effect {
            Effect::SetAttr {
                element,
                name,
                value,
            } => self
                .registry
                .require(*element)?
                .set_attribute(name, value)
                .map_err(js("setAttribute")),
            Effect::RemoveAttr { element, name } => self
                .registry
                .require(*element)?
                .remove_attribute(name)
                .map_err(js("removeAttribute")),
            Effect::SetDocAttr {
                target,
                name,
                value,
            } => self
                .doc_target(*target)?
                .set_attribute(name, value)
                .map_err(js("setAttribute")),
            Effect::SetStyle {
                element,
                property,
                value,
            } => html(self.registry.require(*element)?)?
                .style()
                .set_property(property, value)
                .map_err(js("style.setProperty")),
            Effect::SetStyleVar { name, value } => self
                .root()?
                .style()
                .set_property(name, value)
                .map_err(js("style.setProperty")),
            Effect::Hide { element } => {
                let el = self.registry.require(*element)?;
                html(el)?
                    .style()
                    .set_property("display", "none")
                    .map_err(js("style.setProperty"))?;
                el.set_attribute("aria-hidden", "true")
                    .map_err(js("setAttribute"))
            }
            Effect::Detach { element } => {
                self.registry.require(*element)?.remove();
                Ok(())
            }
            Effect::LockScroll => self.lock_scroll(),
            Effect::RestoreScroll => self.restore_scroll(),
            Effect::AttachListeners | Effect::ReleaseListeners | Effect::ScheduleTimer { .. } => {
                Ok(())
            }
        }
    }

    fn lock_scroll(&mut self) -> Result<(), CurtainError> {
        if self.saved_scroll.is_some() {
            return Ok(());
        }
        let (root, body) = (self.root()?, self.body()?);
        let saved = SavedScroll {
            root: root.style().get_property_value("overflow").unwrap_or_default(),
            body: body.style().get_property_value("overflow").unwrap_or_default(),
        };
        for el in [&root, &body] {
            el.style()
                .set_property("overflow", "hidden")
                .map_err(js("style.setProperty"))?;
        }
        self.saved_scroll = Some(saved);
        Ok(())
    }

    fn restore_scroll(&mut self) -> Result<(), CurtainError> {
        let saved = self.saved_scroll.take().unwrap_or_default();
        for (el, value) in [(self.root()?, saved.root), (self.body()?, saved.body)] {
            let style = el.style();
            if value.is_empty() {
                style
                    .remove_property("overflow")
                    .map_err(js("style.removeProperty"))?;
            } else {
                style
                    .set_property("overflow", &value)
                    .map_err(js("style.setProperty"))?;
            }
        }
        Ok(())
    }
}
