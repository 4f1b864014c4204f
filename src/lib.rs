//! A multi-transport `BitTorrent` tracker.
//!
//! The tracker accepts peer announcements over three transports and keeps
//! one shared swarm registry behind all of them:
//!
//! - **UDP** ([BEP 15](https://www.bittorrent.org/beps/bep_0015.html)):
//!   binary packets with a connect handshake. See [`servers::udp`].
//! - **HTTP** ([BEP 3](https://www.bittorrent.org/beps/bep_0003.html) /
//!   [BEP 23](https://www.bittorrent.org/beps/bep_0023.html) /
//!   [BEP 48](https://www.bittorrent.org/beps/bep_0048.html)): `GET`
//!   endpoints with bencoded bodies. See [`servers::http`].
//! - **WebSocket** (WebTorrent signaling): JSON frames with WebRTC
//!   offer/answer relay for browser peers. See [`servers::ws`].
//!
//! The domain logic lives in the `shoal-tracker-core` crate; this crate is
//! the delivery layer plus the [`bootstrap`] assembly that the surrounding
//! CLI/config code drives through `start`/`shutdown`/`stats_snapshot`.
pub mod bootstrap;
pub mod servers;

use shoal_tracker_clock::clock;
/// This code needs to be copied into each crate.
/// Working version, for production.
#[cfg(not(test))]
#[allow(dead_code)]
pub(crate) type CurrentClock = clock::Working;

/// Stopped version, for testing.
#[cfg(test)]
#[allow(dead_code)]
pub(crate) type CurrentClock = clock::Stopped;
