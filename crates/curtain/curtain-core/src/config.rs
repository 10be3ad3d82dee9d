//! Animation timing configuration and its override contract.
//!
//! The store holds one live [`AnimationConfig`]. Overrides merge per key (whole
//! value replace), invalid or unknown keys are ignored, and every merge
//! re-publishes the five style variables the presentation layer reads.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::outputs::Effect;

pub const VAR_DURATION: &str = "--curtain-duration";
pub const VAR_EASING: &str = "--curtain-easing";
pub const VAR_OFFSET: &str = "--curtain-offset";
pub const VAR_STAGGER: &str = "--curtain-stagger";
pub const VAR_OFFSET_MOBILE: &str = "--curtain-offset-mobile";

/// Resolved timing/animation parameters. Cloned out as an immutable snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnimationConfig {
    /// Entrance transition duration in seconds. Always finite and > 0.
    #[serde(rename = "duration")]
    pub duration_s: f64,
    /// CSS timing function applied to entrance transitions.
    pub easing: String,
    /// Per-element delay step in seconds. Always finite and >= 0.
    #[serde(rename = "stagger")]
    pub stagger_s: f64,
    #[serde(rename = "baseOffset")]
    pub base_offset: f64,
    #[serde(rename = "mobileOffset")]
    pub mobile_offset: f64,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            duration_s: 1.6,
            easing: "cubic-bezier(0.22, 1, 0.36, 1)".to_string(),
            stagger_s: 0.1,
            base_offset: 18.0,
            mobile_offset: 24.0,
        }
    }
}

impl AnimationConfig {
    /// Style variables for the presentation layer, in a fixed order.
    pub fn style_vars(&self) -> Vec<Effect> {
        [
            (VAR_DURATION, format!("{}s", self.duration_s)),
            (VAR_EASING, self.easing.clone()),
            (VAR_OFFSET, format!("{}px", self.base_offset)),
            (VAR_STAGGER, format!("{}s", self.stagger_s)),
            (VAR_OFFSET_MOBILE, format!("{}px", self.mobile_offset)),
        ]
        .into_iter()
        .map(|(name, value)| Effect::SetStyleVar {
            name: name.to_string(),
            value,
        })
        .collect()
    }

    /// Merge one override object. Returns the keys that were applied.
    fn merge(&mut self, overrides: &Map<String, JsonValue>) -> Vec<&'static str> {
        let mut applied = Vec::new();
        for (key, value) in overrides {
            let field = match canonical_key(key) {
                Some(f) => f,
                None => {
                    log::debug!("curtain config: ignoring unknown key `{key}`");
                    continue;
                }
            };
            let ok = match field {
                "duration" => positive(value).map(|v| self.duration_s = v).is_some(),
                "stagger" => non_negative(value).map(|v| self.stagger_s = v).is_some(),
                "baseOffset" => finite(value).map(|v| self.base_offset = v).is_some(),
                "mobileOffset" => finite(value).map(|v| self.mobile_offset = v).is_some(),
                "easing" => value
                    .as_str()
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(|s| self.easing = s.to_string())
                    .is_some(),
                _ => false,
            };
            if ok {
                applied.push(field);
            } else {
                log::debug!("curtain config: ignoring malformed value for `{key}`: {value}");
            }
        }
        applied
    }
}

fn canonical_key(key: &str) -> Option<&'static str> {
    match key {
        "duration" | "durationSeconds" | "duration_s" | "duration_seconds" => Some("duration"),
        "easing" | "easingCurve" | "easing_curve" => Some("easing"),
        "stagger" | "staggerSeconds" | "stagger_s" | "stagger_seconds" => Some("stagger"),
        "baseOffset" | "baseOffsetUnits" | "base_offset" | "offset" => Some("baseOffset"),
        "mobileOffset" | "mobileOffsetUnits" | "mobile_offset" => Some("mobileOffset"),
        _ => None,
    }
}

fn finite(v: &JsonValue) -> Option<f64> {
    v.as_f64().filter(|x| x.is_finite())
}

fn non_negative(v: &JsonValue) -> Option<f64> {
    finite(v).filter(|x| *x >= 0.0)
}

fn positive(v: &JsonValue) -> Option<f64> {
    finite(v).filter(|x| *x > 0.0)
}

/// Page-lifetime configuration holder with a merge-override API.
#[derive(Clone, Debug, Default)]
pub struct ConfigStore {
    current: AnimationConfig,
}

impl ConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store that starts from defaults plus an override supplied before
    /// the first read (for example a global object the page defined early).
    pub fn with_preload(preload: Option<&JsonValue>) -> Self {
        let mut store = Self::new();
        if let Some(overrides) = preload {
            store.configure(overrides);
        }
        store
    }

    /// Pure read of the live configuration.
    pub fn current(&self) -> AnimationConfig {
        self.current.clone()
    }

    /// Merge `overrides` and return the style variable effects to publish.
    /// Non-object overrides are ignored; the current values are still returned.
    pub fn configure(&mut self, overrides: &JsonValue) -> Vec<Effect> {
        match overrides.as_object() {
            Some(map) => {
                let applied = self.current.merge(map);
                log::debug!("curtain config: applied {applied:?}");
            }
            None => log::debug!("curtain config: ignoring non-object override"),
        }
        self.current.style_vars()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn duration_override_leaves_other_fields_at_default() {
        let mut store = ConfigStore::new();
        store.configure(&json!({ "duration": 2.0 }));
        let cfg = store.current();
        let defaults = AnimationConfig::default();
        assert_eq!(cfg.duration_s, 2.0);
        assert_eq!(cfg.easing, defaults.easing);
        assert_eq!(cfg.stagger_s, defaults.stagger_s);
        assert_eq!(cfg.base_offset, defaults.base_offset);
        assert_eq!(cfg.mobile_offset, defaults.mobile_offset);
    }

    #[test]
    fn malformed_and_unknown_keys_are_ignored() {
        let mut store = ConfigStore::new();
        store.configure(&json!({
            "duration": -1.0,
            "stagger": "fast",
            "easing": "   ",
            "colour": "red",
            "mobileOffset": 30
        }));
        let cfg = store.current();
        assert_eq!(cfg.duration_s, 1.6);
        assert_eq!(cfg.stagger_s, 0.1);
        assert_eq!(cfg.easing, AnimationConfig::default().easing);
        assert_eq!(cfg.mobile_offset, 30.0);
    }

    #[test]
    fn camel_case_aliases_are_accepted() {
        let mut store = ConfigStore::new();
        store.configure(&json!({ "staggerSeconds": 0.25, "easingCurve": "linear" }));
        let cfg = store.current();
        assert_eq!(cfg.stagger_s, 0.25);
        assert_eq!(cfg.easing, "linear");
    }

    #[test]
    fn non_object_override_is_a_no_op() {
        let mut store = ConfigStore::new();
        let vars = store.configure(&json!([1, 2, 3]));
        assert_eq!(store.current(), AnimationConfig::default());
        assert_eq!(vars.len(), 5);
    }

    #[test]
    fn style_vars_carry_units() {
        let vars = ConfigStore::with_preload(Some(&json!({ "duration": 2.0 }))).configure(&json!({}));
        assert_eq!(
            vars[0],
            Effect::SetStyleVar {
                name: VAR_DURATION.into(),
                value: "2s".into()
            }
        );
        assert_eq!(
            vars[2],
            Effect::SetStyleVar {
                name: VAR_OFFSET.into(),
                value: "18px".into()
            }
        );
    }
}
