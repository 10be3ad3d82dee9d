//! Curtain Core (engine-agnostic)
//!
//! Page-entry choreography for a full-screen curtain overlay. The core owns the
//! overlay lifecycle, counts transition-finished signals, stages the content
//! entrance and decides when the host gets notified. It never touches a DOM:
//! adapters hand in a [`DocumentSnapshot`] plus events, and apply the returned
//! [`Outputs`].

pub mod completion;
pub mod config;
pub mod document;
pub mod error;
pub mod ids;
pub mod input;
pub mod isolate;
pub mod machine;
pub mod outputs;
pub mod stager;
pub mod timers;

// Re-exports for consumers (adapters)
pub use completion::{Completion, CompletionTracker};
pub use config::{AnimationConfig, ConfigStore};
pub use document::{DocumentSnapshot, Landmarks, NodeInfo};
pub use error::CurtainError;
pub use ids::{ElementId, TimerId};
pub use input::{InputAdapter, Intent, RawInput};
pub use isolate::{isolate, isolate_all};
pub use machine::{CurtainMachine, Input, OverlayState};
pub use outputs::{DocTarget, Effect, HostSignal, Outputs};
pub use stager::{EntranceStager, EntranceTarget, Side, StagingMode};
