use std::time::SystemTime;

use shoal_tracker_primitives::DurationSinceUnixEpoch;

use super::Time;

/// Working version, for production. Reads the system clock.
#[derive(Debug)]
pub struct Working;

impl Time for Working {
    fn now() -> DurationSinceUnixEpoch {
        // A system clock set before 1970 yields the epoch itself rather
        // than a panic.
        SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap_or_default()
    }
}
