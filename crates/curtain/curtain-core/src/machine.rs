//! Curtain state machine: Idle → Preopen → Open → Finished.
//!
//! Every entry point clears the per-call [`Outputs`], runs the requested
//! transition, fires any timers due at `now_ms`, and returns the outputs for
//! the adapter to apply. Real transition signals and fallback timers race to
//! the same guarded entry functions; whichever loses finds the state already
//! advanced and does nothing.

use serde::{Deserialize, Serialize};

use crate::completion::{Completion, CompletionTracker};
use crate::config::AnimationConfig;
use crate::document::DocumentSnapshot;
use crate::ids::ElementId;
use crate::outputs::{Effect, HostSignal, Outputs};
use crate::stager::{EntranceStager, EntranceTarget};
use crate::timers::TimerQueue;

pub const PREOPEN_FALLBACK_MS: f64 = 950.0;
pub const OPEN_FALLBACK_MS: f64 = 2300.0;
/// One transition-finished signal per curtain panel.
pub const PANEL_SIGNALS: u32 = 2;

pub const STATE_ATTR: &str = "data-curtain-state";

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayState {
    Idle,
    Preopen,
    Open,
    Finished,
}

impl OverlayState {
    /// Transition table. Idle → Open is the reduced-motion shortcut.
    pub fn can_advance_to(self, next: OverlayState) -> bool {
        use OverlayState::*;
        matches!(
            (self, next),
            (Idle, Preopen) | (Idle, Open) | (Preopen, Open) | (Open, Finished)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OverlayState::Idle => "idle",
            OverlayState::Preopen => "preopen",
            OverlayState::Open => "open",
            OverlayState::Finished => "finished",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum TimerKind {
    PreopenFallback,
    OpenFallback,
    EntranceSettle,
}

/// Events the adapter forwards into the machine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Input {
    Activate,
    TransitionEnd { element: ElementId, property: String },
    /// Only fire due timers.
    Tick,
}

#[derive(Debug)]
pub struct CurtainMachine {
    doc: DocumentSnapshot,
    cfg: AnimationConfig,
    reduced_motion: bool,

    state: OverlayState,
    mounted: bool,
    finished: bool,
    activated_at: Option<f64>,
    preopen_watch: Option<ElementId>,
    panels: Option<CompletionTracker>,

    stager: EntranceStager,
    timers: TimerQueue<TimerKind>,

    outputs: Outputs,
}

impl CurtainMachine {
    pub fn new(doc: DocumentSnapshot, cfg: AnimationConfig, reduced_motion: bool) -> Self {
        Self {
            doc,
            cfg,
            reduced_motion,
            state: OverlayState::Idle,
            mounted: false,
            finished: false,
            activated_at: None,
            preopen_watch: None,
            panels: None,
            stager: EntranceStager::new(),
            timers: TimerQueue::new(),
            outputs: Outputs::default(),
        }
    }

    pub fn state(&self) -> OverlayState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn activated_at(&self) -> Option<f64> {
        self.activated_at
    }

    pub fn config(&self) -> &AnimationConfig {
        &self.cfg
    }

    /// Swap in a reconfigured snapshot. Staged targets read the stagger and
    /// timing through style variables, so only the settle wait and anything
    /// not yet staged depend on this value.
    pub fn set_config(&mut self, cfg: AnimationConfig) {
        self.cfg = cfg;
    }

    pub fn stager(&self) -> &EntranceStager {
        &self.stager
    }

    pub fn targets(&self) -> &[EntranceTarget] {
        self.stager.targets()
    }

    /// Earliest timer still waiting to fire.
    pub fn next_deadline(&self) -> Option<f64> {
        self.timers.next_deadline()
    }

    /// Dispatch one input.
    pub fn handle(&mut self, input: Input, now_ms: f64) -> &Outputs {
        match input {
            Input::Activate => self.activate(now_ms),
            Input::TransitionEnd { element, property } => {
                self.transition_end(element, &property, now_ms)
            }
            Input::Tick => self.tick(now_ms),
        }
    }

    /// Lock the page behind the overlay and stage content. Runs once.
    pub fn mount(&mut self, now_ms: f64) -> &Outputs {
        self.outputs.clear();
        if !self.mounted {
            self.mounted = true;
            self.outputs.push(Effect::LockScroll);
            self.outputs.extend(self.cfg.style_vars());

            let marks = &self.doc.landmarks;
            if let Some(overlay) = marks.overlay {
                self.outputs.extend([
                    Effect::attr(overlay, STATE_ATTR, OverlayState::Idle.as_str()),
                    Effect::attr(overlay, "aria-busy", "true"),
                ]);
            }
            for el in [marks.overlay, marks.secondary_target].into_iter().flatten() {
                self.outputs.extend([
                    Effect::attr(el, "tabindex", "0"),
                    Effect::attr(el, "role", "button"),
                ]);
            }
            self.outputs.push(Effect::AttachListeners);
            self.stager
                .prepare(&self.doc, &self.cfg, self.reduced_motion, &mut self.outputs);
        }
        self.fire_due(now_ms);
        &self.outputs
    }

    /// Visitor asked to open the curtain. No-op unless Idle.
    pub fn activate(&mut self, now_ms: f64) -> &Outputs {
        self.outputs.clear();
        if self.state == OverlayState::Idle {
            self.activated_at = Some(now_ms);
            if self.reduced_motion {
                self.enter_open(now_ms);
            } else {
                self.enter_preopen(now_ms);
            }
        } else {
            log::debug!("curtain: activation ignored in {:?}", self.state);
        }
        self.fire_due(now_ms);
        &self.outputs
    }

    /// A declarative transition finished on `element`.
    pub fn transition_end(&mut self, element: ElementId, property: &str, now_ms: f64) -> &Outputs {
        self.outputs.clear();
        match self.state {
            OverlayState::Preopen => {
                let qualifies = self.preopen_watch == Some(element)
                    && matches!(property, "transform" | "opacity");
                if qualifies {
                    self.leave_preopen(now_ms);
                }
            }
            OverlayState::Open => {
                let qualifies =
                    property == "transform" && self.doc.landmarks.panels.contains(&element);
                let counted = self.panels.as_mut().map(|t| t.signal(qualifies));
                if counted == Some(Completion::Fired) {
                    self.finish(now_ms);
                }
            }
            OverlayState::Idle | OverlayState::Finished => {}
        }
        self.fire_due(now_ms);
        &self.outputs
    }

    /// Fire timers due at `now_ms`.
    pub fn tick(&mut self, now_ms: f64) -> &Outputs {
        self.outputs.clear();
        self.fire_due(now_ms);
        &self.outputs
    }

    fn fire_due(&mut self, now_ms: f64) {
        // Handlers may schedule new timers; loop until nothing is due.
        loop {
            let due = self.timers.take_due(now_ms);
            if due.is_empty() {
                break;
            }
            for (_, kind) in due {
                match kind {
                    TimerKind::PreopenFallback => self.leave_preopen(now_ms),
                    TimerKind::OpenFallback => {
                        let forced = self.panels.as_mut().map(CompletionTracker::force);
                        if forced == Some(Completion::Fired) {
                            log::debug!("curtain: panel signals missing, forcing finish");
                            self.finish(now_ms);
                        }
                    }
                    TimerKind::EntranceSettle => self.stager.reveal(&mut self.outputs),
                }
            }
        }
    }

    fn advance(&mut self, next: OverlayState) -> bool {
        if !self.state.can_advance_to(next) {
            return false;
        }
        log::debug!("curtain: {:?} -> {:?}", self.state, next);
        self.state = next;
        if let Some(overlay) = self.doc.landmarks.overlay {
            self.outputs
                .push(Effect::attr(overlay, STATE_ATTR, next.as_str()));
        }
        true
    }

    fn enter_preopen(&mut self, now_ms: f64) {
        if !self.advance(OverlayState::Preopen) {
            return;
        }
        let marks = &self.doc.landmarks;
        self.preopen_watch = marks.clone.or(marks.center_text_left);
        if self.preopen_watch.is_some() {
            self.timers.schedule(
                now_ms + PREOPEN_FALLBACK_MS,
                TimerKind::PreopenFallback,
                &mut self.outputs,
            );
        } else {
            self.leave_preopen(now_ms);
        }
    }

    fn leave_preopen(&mut self, now_ms: f64) {
        if self.state != OverlayState::Preopen {
            return;
        }
        let marks = &self.doc.landmarks;
        let decorations = [
            marks.clone,
            marks.center_text,
            marks.center_text_left,
            marks.emblem,
        ];
        for el in decorations.into_iter().flatten() {
            self.outputs.push(Effect::Hide { element: el });
        }
        self.enter_open(now_ms);
    }

    fn enter_open(&mut self, now_ms: f64) {
        if !self.advance(OverlayState::Open) {
            return;
        }
        if let Some(overlay) = self.doc.landmarks.overlay {
            self.outputs.push(Effect::attr(overlay, "aria-hidden", "true"));
        }
        self.panels = Some(CompletionTracker::new(PANEL_SIGNALS));
        self.timers.schedule(
            now_ms + OPEN_FALLBACK_MS,
            TimerKind::OpenFallback,
            &mut self.outputs,
        );
    }

    fn finish(&mut self, now_ms: f64) {
        if self.finished || !self.advance(OverlayState::Finished) {
            return;
        }
        self.finished = true;

        self.outputs.push(Effect::RestoreScroll);
        if let Some(overlay) = self.doc.landmarks.overlay {
            self.outputs.extend([
                Effect::RemoveAttr {
                    element: overlay,
                    name: "aria-busy".to_string(),
                },
                Effect::Hide { element: overlay },
                Effect::Detach { element: overlay },
            ]);
        }
        self.outputs.push(Effect::ReleaseListeners);

        let settle =
            self.stager
                .start(&self.doc, &self.cfg, self.reduced_motion, &mut self.outputs);
        if let Some(delay_ms) = settle {
            self.timers.schedule(
                now_ms + delay_ms,
                TimerKind::EntranceSettle,
                &mut self.outputs,
            );
        }

        self.outputs.push_signal(HostSignal::finished(now_ms));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_table_is_monotonic() {
        use OverlayState::*;
        let all = [Idle, Preopen, Open, Finished];
        for from in all {
            assert!(!from.can_advance_to(from), "{from:?} must not re-enter");
            assert!(!from.can_advance_to(Idle));
        }
        assert!(Idle.can_advance_to(Preopen));
        assert!(Idle.can_advance_to(Open));
        assert!(!Idle.can_advance_to(Finished));
        assert!(!Preopen.can_advance_to(Finished));
        assert!(!Open.can_advance_to(Preopen));
        assert!(!Finished.can_advance_to(Open));
    }
}
