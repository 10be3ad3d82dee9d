//! Live DOM → [`DocumentSnapshot`] and the element registry behind ElementIds.

use curtain_core::{CurtainError, DocumentSnapshot, ElementId, Landmarks, NodeInfo};
use serde::{Deserialize, Serialize};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element};

/// CSS selectors used to find the curtain collaborators.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Selectors {
    pub overlay: String,
    /// Matched inside the overlay.
    pub panel: String,
    pub clone: String,
    pub center_text: String,
    pub center_text_left: String,
    pub emblem: String,
    pub secondary_target: String,
    pub content_root: String,
    pub control_widget: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            overlay: ".curtain".into(),
            panel: ".curtain__panel".into(),
            clone: ".curtain__clone".into(),
            center_text: ".curtain__center".into(),
            center_text_left: ".curtain__center-left".into(),
            emblem: ".curtain__emblem".into(),
            secondary_target: ".curtain__hint".into(),
            content_root: "[data-curtain-content]".into(),
            control_widget: ".theme-toggle".into(),
        }
    }
}

/// Elements known to the core, indexed by ElementId.
pub struct ElementRegistry {
    elements: Vec<Element>,
    /// Element → id, keyed by object identity.
    index: js_sys::Map,
}

impl ElementRegistry {
    fn new() -> Self {
        Self {
            elements: Vec::new(),
            index: js_sys::Map::new(),
        }
    }

    fn insert(&mut self, el: Element) -> ElementId {
        let id = ElementId(self.elements.len() as u32);
        self.index.set(el.as_ref(), &JsValue::from(id.0));
        self.elements.push(el);
        id
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(id.0 as usize)
    }

    pub fn id_of(&self, value: &JsValue) -> Option<ElementId> {
        self.index.get(value).as_f64().map(|n| ElementId(n as u32))
    }

    pub fn require(&self, id: ElementId) -> Result<&Element, CurtainError> {
        self.get(id)
            .ok_or(CurtainError::ElementDetached { id: id.0 })
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

fn query(scope: &Document, selector: &str) -> Option<Element> {
    scope.query_selector(selector).ok().flatten()
}

fn node_info(registry: &ElementRegistry, id: ElementId, el: &Element) -> NodeInfo {
    let list = el.class_list();
    let classes = (0..list.length()).filter_map(|i| list.item(i)).collect();
    NodeInfo {
        id,
        tag: el.tag_name().to_ascii_lowercase(),
        classes,
        parent: el
            .parent_element()
            .and_then(|p| registry.id_of(p.as_ref())),
        has_box: el.get_client_rects().length() > 0,
        text: el.text_content().unwrap_or_default(),
    }
}

/// Snapshot every element under `<body>` in document order and resolve landmarks.
pub fn snapshot(
    document: &Document,
    selectors: &Selectors,
) -> Result<(DocumentSnapshot, ElementRegistry), CurtainError> {
    let all = document
        .query_selector_all("body *")
        .map_err(|e| CurtainError::host_call("querySelectorAll", format!("{e:?}")))?;

    let mut registry = ElementRegistry::new();
    let mut nodes = Vec::with_capacity(all.length() as usize);
    for i in 0..all.length() {
        let Some(el) = all.get(i).and_then(|n| n.dyn_into::<Element>().ok()) else {
            continue;
        };
        // parents precede children in document order, so they are already indexed
        let id = registry.insert(el.clone());
        nodes.push(node_info(&registry, id, &el));
    }

    let find = |selector: &str| {
        query(document, selector).and_then(|el| registry.id_of(el.as_ref()))
    };
    let overlay_el = query(document, &selectors.overlay);
    let panels = overlay_el
        .as_ref()
        .and_then(|o| o.query_selector_all(&selectors.panel).ok())
        .map(|list| {
            (0..list.length())
                .filter_map(|i| list.get(i))
                .filter_map(|n| registry.id_of(n.as_ref()))
                .collect()
        })
        .unwrap_or_default();
    let content_root = find(&selectors.content_root).or_else(|| find("main"));

    let landmarks = Landmarks {
        overlay: overlay_el.and_then(|el| registry.id_of(el.as_ref())),
        clone: find(&selectors.clone),
        center_text_left: find(&selectors.center_text_left),
        center_text: find(&selectors.center_text),
        emblem: find(&selectors.emblem),
        panels,
        secondary_target: find(&selectors.secondary_target),
        content_root,
        control_widget: find(&selectors.control_widget),
    };
    log::debug!(
        "curtain: snapshot of {} elements, landmarks {:?}",
        registry.len(),
        landmarks
    );
    Ok((DocumentSnapshot { nodes, landmarks }, registry))
}
