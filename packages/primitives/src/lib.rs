//! Primitive types shared by all the crates in the `shoal` tracker workspace.
//!
//! This package contains the types used for handling torrent and peer data in
//! the tracker. The types are `BitTorrent` domain types, independent of the
//! delivery layer (UDP, HTTP or WebSocket).
pub mod announce_event;
pub mod core;
pub mod info_hash;
pub mod pagination;
pub mod peer;
pub mod swarm_metadata;
pub mod swarm_metrics;

use std::time::Duration;

/// Duration since the Unix epoch (`1970-01-01 00:00:00 UTC`).
///
/// It's the format used by trackers to store the `updated` timestamp of a
/// peer, and the format returned by the workspace clock.
pub type DurationSinceUnixEpoch = Duration;

/// A number of bytes reported by a peer in an `announce` request
/// (`uploaded`, `downloaded` or `left`).
///
/// The wire encodings are unsigned, but the value is kept as `i64` because
/// that is the field width in the UDP tracker protocol
/// ([BEP 15](https://www.bittorrent.org/beps/bep_0015.html)).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct NumberOfBytes(i64);

impl NumberOfBytes {
    #[must_use]
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    #[must_use]
    pub fn value(&self) -> i64 {
        self.0
    }
}
