//! Pointer/keyboard translation into a single activation intent.
//!
//! The adapter filters gesture-level duplicates only (key auto-repeat, the
//! click a browser synthesizes after a tap). State-level duplicates are left
//! to the state machine guards.

use serde::{Deserialize, Serialize};

use crate::document::Landmarks;
use crate::ids::ElementId;

/// A tap is followed by a synthesized click within this window.
pub const SYNTHETIC_CLICK_WINDOW_MS: f64 = 600.0;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RawInput {
    Click {
        target: ElementId,
        at_ms: f64,
    },
    Touch {
        target: ElementId,
        at_ms: f64,
    },
    KeyDown {
        target: ElementId,
        key: String,
        #[serde(default)]
        repeat: bool,
        at_ms: f64,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Intent {
    Activate {
        /// Keyboard activations must not also scroll or submit.
        prevent_default: bool,
    },
}

#[derive(Debug, Default)]
pub struct InputAdapter {
    targets: Vec<ElementId>,
    last_touch_ms: Option<f64>,
}

fn is_activation_key(key: &str) -> bool {
    matches!(key, "Enter" | " " | "Space" | "Spacebar")
}

impl InputAdapter {
    /// Activation targets are the overlay and the secondary text target.
    pub fn new(landmarks: &Landmarks) -> Self {
        Self {
            targets: [landmarks.overlay, landmarks.secondary_target]
                .into_iter()
                .flatten()
                .collect(),
            last_touch_ms: None,
        }
    }

    pub fn targets(&self) -> &[ElementId] {
        &self.targets
    }

    pub fn translate(&mut self, raw: &RawInput) -> Option<Intent> {
        match raw {
            RawInput::Touch { target, at_ms } if self.targets.contains(target) => {
                self.last_touch_ms = Some(*at_ms);
                Some(Intent::Activate {
                    prevent_default: false,
                })
            }
            RawInput::Click { target, at_ms } if self.targets.contains(target) => {
                let synthesized = self
                    .last_touch_ms
                    .is_some_and(|t| *at_ms - t >= 0.0 && *at_ms - t < SYNTHETIC_CLICK_WINDOW_MS);
                if synthesized {
                    return None;
                }
                Some(Intent::Activate {
                    prevent_default: false,
                })
            }
            RawInput::KeyDown {
                target,
                key,
                repeat,
                ..
            } if self.targets.contains(target) && !*repeat && is_activation_key(key) => {
                Some(Intent::Activate {
                    prevent_default: true,
                })
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapter() -> InputAdapter {
        InputAdapter::new(&Landmarks {
            overlay: Some(ElementId(1)),
            secondary_target: Some(ElementId(2)),
            ..Landmarks::default()
        })
    }

    fn key(target: u32, key: &str, repeat: bool) -> RawInput {
        RawInput::KeyDown {
            target: ElementId(target),
            key: key.into(),
            repeat,
            at_ms: 0.0,
        }
    }

    #[test]
    fn enter_and_space_activate_with_prevent_default() {
        let mut a = adapter();
        for k in ["Enter", " ", "Spacebar"] {
            assert_eq!(
                a.translate(&key(1, k, false)),
                Some(Intent::Activate {
                    prevent_default: true
                })
            );
        }
        assert!(a.translate(&key(2, "Enter", false)).is_some());
    }

    #[test]
    fn other_keys_repeats_and_foreign_targets_are_dropped() {
        let mut a = adapter();
        assert_eq!(a.translate(&key(1, "Escape", false)), None);
        assert_eq!(a.translate(&key(1, "Enter", true)), None);
        assert_eq!(a.translate(&key(9, "Enter", false)), None);
        assert_eq!(
            a.translate(&RawInput::Click {
                target: ElementId(9),
                at_ms: 0.0
            }),
            None
        );
    }

    #[test]
    fn click_synthesized_after_tap_is_dropped() {
        let mut a = adapter();
        let tap = RawInput::Touch {
            target: ElementId(1),
            at_ms: 1000.0,
        };
        assert!(a.translate(&tap).is_some());
        let ghost = RawInput::Click {
            target: ElementId(1),
            at_ms: 1300.0,
        };
        assert_eq!(a.translate(&ghost), None);
        let later = RawInput::Click {
            target: ElementId(1),
            at_ms: 5000.0,
        };
        assert!(a.translate(&later).is_some());
    }
}
