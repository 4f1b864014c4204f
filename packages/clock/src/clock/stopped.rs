use std::cell::RefCell;
use std::time::Duration;

use shoal_tracker_primitives::DurationSinceUnixEpoch;

use super::Time;

/// Stopped version, for testing. The clock stands still until a test moves
/// it with [`Stopped::local_set`] or [`Stopped::local_add`].
///
/// The stopped time is thread local, so parallel tests do not interfere with
/// each other.
#[derive(Debug)]
pub struct Stopped;

thread_local! {
    static FIXED_TIME: RefCell<DurationSinceUnixEpoch> = const { RefCell::new(Duration::ZERO) };
}

impl Time for Stopped {
    fn now() -> DurationSinceUnixEpoch {
        FIXED_TIME.with(|time| *time.borrow())
    }
}

impl Stopped {
    /// Sets the stopped time for the current thread.
    pub fn local_set(time: &DurationSinceUnixEpoch) {
        FIXED_TIME.with(|fixed| *fixed.borrow_mut() = *time);
    }

    /// Resets the stopped time for the current thread to the epoch.
    pub fn local_reset() {
        Self::local_set(&Duration::ZERO);
    }

    /// Advances the stopped time for the current thread.
    ///
    /// # Errors
    ///
    /// Will return an error if the addition overflows the duration.
    pub fn local_add(duration: &Duration) -> Result<(), Overflow> {
        FIXED_TIME.with(|fixed| {
            let new_time = fixed.borrow().checked_add(*duration).ok_or(Overflow)?;
            *fixed.borrow_mut() = new_time;
            Ok(())
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Overflow;

impl std::fmt::Display for Overflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "stopped clock overflow")
    }
}

impl std::error::Error for Overflow {}
