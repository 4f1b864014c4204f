//! Connection IDs for the UDP tracker.
//!
//! BEP 15 requires the connection ID handed out by `connect` to be
//! unguessable, bound to the client's source address and valid for about two
//! minutes. The tracker keeps no per-client state for this: the ID is a
//! keyed hash over a process-lifetime random secret, the source address and
//! the current two-minute time window, and verification simply recomputes
//! it.
//!
//! An ID is accepted for the window it was minted in and the following one,
//! so its real validity is between two and four minutes. When verification
//! fails, a few older windows are recomputed as well so that a client that
//! kept an ID for too long gets told it expired instead of the generic
//! mismatch.
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use rand::RngExt;
use sha1::{Digest, Sha1};
use shoal_tracker_primitives::DurationSinceUnixEpoch;

/// How long one time window lasts. The standard connection ID lifetime.
pub const COOKIE_LIFETIME: Duration = Duration::from_secs(120);

/// How many windows back a stale ID is still recognized as "expired" rather
/// than reported as a mismatch.
const EXPIRED_WINDOWS: u64 = 6;

/// The process-lifetime key the connection IDs are derived from.
pub type Secret = [u8; 32];

#[must_use]
pub fn make_secret() -> Secret {
    let mut secret = [0u8; 32];
    rand::rng().fill(&mut secret);
    secret
}

/// Mints the connection ID for a source address at a point in time.
#[must_use]
pub fn make(secret: &Secret, source: &SocketAddr, now: DurationSinceUnixEpoch) -> u64 {
    cookie_for_window(secret, source, window_index(now))
}

/// Checks a connection ID received in an `announce` or `scrape` request.
///
/// # Errors
///
/// Will return an error if the ID was not minted for this source address in
/// the current or previous time window.
pub fn check(
    secret: &Secret,
    source: &SocketAddr,
    now: DurationSinceUnixEpoch,
    connection_id: u64,
) -> Result<(), ConnectionCookieError> {
    let current_window = window_index(now);

    let valid_windows = [current_window, current_window.saturating_sub(1)];

    if valid_windows
        .iter()
        .any(|window| cookie_for_window(secret, source, *window) == connection_id)
    {
        return Ok(());
    }

    for age in 2..EXPIRED_WINDOWS {
        let Some(window) = current_window.checked_sub(age) else {
            break;
        };

        if cookie_for_window(secret, source, window) == connection_id {
            return Err(ConnectionCookieError::Expired);
        }
    }

    Err(ConnectionCookieError::Mismatch)
}

/// The error messages are sent verbatim to the client in the BEP 15 `error`
/// response.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionCookieError {
    #[error("Connection ID mismatch.")]
    Mismatch,

    #[error("Connection ID expired.")]
    Expired,
}

fn window_index(now: DurationSinceUnixEpoch) -> u64 {
    now.as_secs() / COOKIE_LIFETIME.as_secs()
}

fn cookie_for_window(secret: &Secret, source: &SocketAddr, window: u64) -> u64 {
    let mut hasher = Sha1::new();

    hasher.update(secret);
    match source.ip() {
        IpAddr::V4(ip) => hasher.update(ip.octets()),
        IpAddr::V6(ip) => hasher.update(ip.octets()),
    }
    hasher.update(source.port().to_be_bytes());
    hasher.update(window.to_be_bytes());

    let digest = hasher.finalize();

    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[0..8]);
    u64::from_be_bytes(bytes)
}
