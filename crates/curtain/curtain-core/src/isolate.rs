//! Isolate-and-continue policy for external collaborator calls.
//!
//! Every call that reaches outside the core (DOM mutation, event dispatch, host
//! callback) goes through [`isolate`] so one failing channel cannot stop the
//! rest of the lifecycle.

use crate::error::CurtainError;

/// Run `f`, logging and discarding any error. Returns `Some` on success.
pub fn isolate<T>(channel: &str, f: impl FnOnce() -> Result<T, CurtainError>) -> Option<T> {
    match f() {
        Ok(v) => Some(v),
        Err(err) => {
            log::warn!("curtain: {channel} skipped: {err}");
            None
        }
    }
}

/// One notification or collaborator call, run at most once.
pub type Channel<'a> = Box<dyn FnOnce() -> Result<(), CurtainError> + 'a>;

/// Run every channel in order, isolating each. Returns how many succeeded.
pub fn isolate_all<'a>(channels: impl IntoIterator<Item = (&'a str, Channel<'a>)>) -> usize {
    channels
        .into_iter()
        .filter_map(|(name, f)| isolate(name, f))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn failure_in_one_channel_does_not_stop_the_next() {
        let reached = Cell::new(0);
        let bump = || {
            reached.set(reached.get() + 1);
            Ok(())
        };
        let ok = isolate_all([
            (
                "broadcast",
                Box::new(|| Err(CurtainError::host_call("dispatchEvent", "unsupported")))
                    as Channel<'_>,
            ),
            ("callback", Box::new(bump) as Channel<'_>),
            ("marker", Box::new(bump) as Channel<'_>),
        ]);
        assert_eq!(ok, 2);
        assert_eq!(reached.get(), 2);
    }

    #[test]
    fn isolate_returns_value_on_success() {
        assert_eq!(isolate("read", || Ok(3)), Some(3));
        assert_eq!(
            isolate::<u8>("read", || Err(CurtainError::unavailable("window"))),
            None
        );
    }
}
