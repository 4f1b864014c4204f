use std::time::Duration;

use shoal_tracker_primitives::DurationSinceUnixEpoch;

pub mod stopped;
pub mod working;

pub use stopped::Stopped;
pub use working::Working;

/// A clock the tracker reads "now" from, as a duration since the Unix epoch.
pub trait Time {
    fn now() -> DurationSinceUnixEpoch;

    /// `now` plus `add_time`, or `None` on overflow.
    #[must_use]
    fn now_add(add_time: &Duration) -> Option<DurationSinceUnixEpoch> {
        Self::now().checked_add(*add_time)
    }

    /// `now` minus `sub_time`, or `None` when the subtraction would go
    /// before the epoch.
    #[must_use]
    fn now_sub(sub_time: &Duration) -> Option<DurationSinceUnixEpoch> {
        Self::now().checked_sub(*sub_time)
    }
}
