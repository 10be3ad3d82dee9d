//! Error type for host collaborator failures.
//!
//! Nothing in the curtain lifecycle is fatal. These errors exist so adapters can
//! describe what went wrong before [`crate::isolate`] logs and drops them.

/// Failures an adapter can observe while talking to the host page.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum CurtainError {
    /// A required host global (window, document, body) is unavailable.
    #[error("host object unavailable: {what}")]
    HostUnavailable { what: String },

    /// An element handle no longer resolves to a live element.
    #[error("element {id} is not attached")]
    ElementDetached { id: u32 },

    /// The host raised an exception while running a collaborator call.
    #[error("host call `{call}` failed: {reason}")]
    HostCall { call: String, reason: String },

    /// A configuration override could not be read as an object.
    #[error("config override must be an object: {reason}")]
    InvalidOverride { reason: String },
}

impl CurtainError {
    pub fn host_call(call: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::HostCall {
            call: call.into(),
            reason: reason.into(),
        }
    }

    pub fn unavailable(what: impl Into<String>) -> Self {
        Self::HostUnavailable { what: what.into() }
    }
}
