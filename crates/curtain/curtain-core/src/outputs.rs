//! Output contracts from the core.
//!
//! Outputs carry host mutations ([`Effect`]) in application order and a
//! separate list of [`HostSignal`]s. Adapters (wasm, tests) apply effects to
//! the host and fan signals out to the notification channels.

use serde::{Deserialize, Serialize};

use crate::ids::{ElementId, TimerId};

pub const FINISHED_EVENT: &str = "curtain:opened";
pub const FINISHED_MARKER: &str = "data-curtain-opened";
pub const ENTRANCE_MARKER: &str = "data-curtain-entrance";

/// Where a document-level attribute lands.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocTarget {
    /// The root `<html>` element.
    Root,
}

/// One host mutation. Adapters must apply these in order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Effect {
    SetAttr {
        element: ElementId,
        name: String,
        value: String,
    },
    RemoveAttr {
        element: ElementId,
        name: String,
    },
    SetDocAttr {
        target: DocTarget,
        name: String,
        value: String,
    },
    /// Inline style property on one element.
    SetStyle {
        element: ElementId,
        property: String,
        value: String,
    },
    /// Custom property on the root element.
    SetStyleVar { name: String, value: String },
    Hide { element: ElementId },
    /// Remove the element from the interactive tree.
    Detach { element: ElementId },
    LockScroll,
    RestoreScroll,
    /// Start listening for activation and transition-finished events.
    AttachListeners,
    /// Drop every listener registered by `AttachListeners`.
    ReleaseListeners,
    /// Ask the host to call back into the core at or after `at_ms`.
    ScheduleTimer { id: TimerId, at_ms: f64 },
}

impl Effect {
    pub fn attr(element: ElementId, name: &str, value: impl Into<String>) -> Self {
        Effect::SetAttr {
            element,
            name: name.to_string(),
            value: value.into(),
        }
    }

    pub fn style(element: ElementId, property: &str, value: impl Into<String>) -> Self {
        Effect::SetStyle {
            element,
            property: property.to_string(),
            value: value.into(),
        }
    }

    pub fn doc_attr(target: DocTarget, name: &str, value: impl Into<String>) -> Self {
        Effect::SetDocAttr {
            target,
            name: name.to_string(),
            value: value.into(),
        }
    }
}

/// Completion notification. Emitted exactly once, when Finished is reached.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HostSignal {
    /// Name of the broadcast event.
    pub event: String,
    /// Host clock time (ms) at which Finished was reached. In the browser this
    /// is `performance.now()`, measured from page load rather than the Unix
    /// epoch; the broadcast event also carries `epochMs` for wall-clock use.
    pub timestamp_ms: f64,
    /// Boolean attribute set on the root element for later synchronous queries.
    pub marker: String,
}

impl HostSignal {
    pub fn finished(timestamp_ms: f64) -> Self {
        Self {
            event: FINISHED_EVENT.to_string(),
            timestamp_ms,
            marker: FINISHED_MARKER.to_string(),
        }
    }
}

/// Outputs produced by one call into the state machine.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Outputs {
    #[serde(default)]
    pub effects: Vec<Effect>,
    #[serde(default)]
    pub signals: Vec<HostSignal>,
}

impl Outputs {
    #[inline]
    pub fn clear(&mut self) {
        self.effects.clear();
        self.signals.clear();
    }

    #[inline]
    pub fn push(&mut self, effect: Effect) {
        self.effects.push(effect);
    }

    #[inline]
    pub fn push_signal(&mut self, signal: HostSignal) {
        self.signals.push(signal);
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.effects.is_empty() && self.signals.is_empty()
    }
}

impl Extend<Effect> for Outputs {
    fn extend<I: IntoIterator<Item = Effect>>(&mut self, iter: I) {
        self.effects.extend(iter);
    }
}
