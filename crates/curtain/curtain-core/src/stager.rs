//! Entrance staging for the content revealed behind the curtain.
//!
//! `prepare` tags every qualifying content element with an offset/hidden state
//! and a staggered transition delay. `start` later flips one document-level
//! marker; the per-element delays produce the staggered motion.

use serde::{Deserialize, Serialize};

use crate::config::{AnimationConfig, VAR_DURATION, VAR_EASING, VAR_STAGGER};
use crate::document::{DocumentSnapshot, NodeInfo};
use crate::ids::ElementId;
use crate::outputs::{DocTarget, Effect, Outputs, ENTRANCE_MARKER};

pub const ENTRANCE_ATTR: &str = "data-entrance";
pub const SIDE_ATTR: &str = "data-entrance-side";

/// Fixed settle time before the entrance marker flips, on top of one stagger step.
pub const SETTLE_MS: f64 = 60.0;

const ALLOWED_TAGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6", "p", "li", "section"];
const CONTAINER_CLASSES: &[&str] = &["curtain-entrance", "content-block"];

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    fn for_index(index: usize) -> Self {
        if index % 2 == 0 {
            Side::Left
        } else {
            Side::Right
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntranceTarget {
    pub element: ElementId,
    pub side: Side,
    pub delay_index: usize,
    pub prepared: bool,
}

/// How the content was staged. Decided once, at prepare time.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StagingMode {
    Unprepared,
    Animated,
    /// Reduced motion: content shown in place, no targets.
    Static,
}

#[derive(Debug)]
pub struct EntranceStager {
    targets: Vec<EntranceTarget>,
    mode: StagingMode,
    started: bool,
    revealed: bool,
}

impl Default for EntranceStager {
    fn default() -> Self {
        Self {
            targets: Vec::new(),
            mode: StagingMode::Unprepared,
            started: false,
            revealed: false,
        }
    }
}

fn is_candidate(node: &NodeInfo) -> bool {
    ALLOWED_TAGS.contains(&node.tag.as_str()) || CONTAINER_CLASSES.iter().any(|c| node.has_class(c))
}

/// Content elements eligible for the entrance, in document order.
pub fn discover(doc: &DocumentSnapshot) -> Vec<ElementId> {
    let marks = &doc.landmarks;
    doc.content_nodes()
        .filter(|n| is_candidate(n))
        .filter(|n| n.has_box)
        .filter(|n| match marks.overlay {
            Some(o) => !doc.is_inclusive_ancestor(o, n.id),
            None => true,
        })
        .filter(|n| match marks.control_widget {
            // the widget, anything containing it, anything inside it
            Some(w) => !doc.is_inclusive_ancestor(n.id, w) && !doc.is_inclusive_ancestor(w, n.id),
            None => true,
        })
        .filter(|n| !n.text.trim().is_empty())
        .map(|n| n.id)
        .collect()
}

impl EntranceStager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn targets(&self) -> &[EntranceTarget] {
        &self.targets
    }

    pub fn mode(&self) -> StagingMode {
        self.mode
    }

    pub fn is_prepared(&self) -> bool {
        self.mode != StagingMode::Unprepared
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    /// Tag content for the entrance. Calls after the first are no-ops.
    pub fn prepare(
        &mut self,
        doc: &DocumentSnapshot,
        cfg: &AnimationConfig,
        reduced_motion: bool,
        out: &mut Outputs,
    ) {
        if self.is_prepared() {
            return;
        }
        let found = discover(doc);

        if reduced_motion {
            self.mode = StagingMode::Static;
            for element in found {
                out.push(Effect::attr(element, ENTRANCE_ATTR, "visible"));
            }
            log::debug!("curtain entrance: reduced motion, content shown in place");
            return;
        }

        self.mode = StagingMode::Animated;
        let duration = format!("var({VAR_DURATION}, {}s)", cfg.duration_s);
        let easing = format!("var({VAR_EASING}, {})", cfg.easing);
        for (index, element) in found.into_iter().enumerate() {
            let target = EntranceTarget {
                element,
                side: Side::for_index(index),
                delay_index: index,
                prepared: true,
            };
            // delay follows later changes to the published stagger variable
            let delay = format!("calc(var({VAR_STAGGER}, {}s) * {index})", cfg.stagger_s);
            out.extend([
                Effect::attr(element, ENTRANCE_ATTR, "pending"),
                Effect::attr(element, SIDE_ATTR, target.side.as_str()),
                Effect::style(element, "transition-duration", duration.clone()),
                Effect::style(element, "transition-timing-function", easing.clone()),
                Effect::style(element, "transition-delay", delay),
            ]);
            self.targets.push(target);
        }
        log::debug!("curtain entrance: staged {} targets", self.targets.len());
    }

    /// Begin the entrance. Returns the delay (ms) after which the caller must
    /// call [`reveal`](Self::reveal), or `None` when there is nothing to wait for.
    pub fn start(
        &mut self,
        doc: &DocumentSnapshot,
        cfg: &AnimationConfig,
        reduced_motion: bool,
        out: &mut Outputs,
    ) -> Option<f64> {
        self.prepare(doc, cfg, reduced_motion, out);
        if self.started {
            return None;
        }
        self.started = true;
        match self.mode {
            StagingMode::Animated => Some(SETTLE_MS + cfg.stagger_s * 1000.0),
            _ => {
                self.reveal(out);
                None
            }
        }
    }

    /// Flip the page-level entrance marker. Idempotent.
    pub fn reveal(&mut self, out: &mut Outputs) {
        if self.revealed {
            return;
        }
        self.revealed = true;
        out.push(Effect::doc_attr(DocTarget::Root, ENTRANCE_MARKER, "active"));
    }
}
