//! Peer data kept by the tracker for each member of a swarm.
//!
//! A sample peer:
//!
//! ```rust
//! use std::net::{IpAddr, Ipv4Addr, SocketAddr};
//!
//! use shoal_tracker_primitives::announce_event::AnnounceEvent;
//! use shoal_tracker_primitives::peer;
//! use shoal_tracker_primitives::{DurationSinceUnixEpoch, NumberOfBytes};
//!
//! let peer = peer::Peer {
//!     peer_id: peer::Id(*b"-qB00000000000000001"),
//!     peer_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::new(126, 0, 0, 1)), 8081),
//!     updated: DurationSinceUnixEpoch::new(1_669_397_478_934, 0),
//!     uploaded: NumberOfBytes::new(0),
//!     downloaded: NumberOfBytes::new(0),
//!     left: NumberOfBytes::new(0),
//!     event: AnnounceEvent::Completed,
//! };
//! ```
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use crate::announce_event::AnnounceEvent;
use crate::{DurationSinceUnixEpoch, NumberOfBytes};

/// The ID the peer chose for itself. ≤ 20 bytes, opaque to the tracker.
///
/// Peer ids are not globally unique; peer identity is always scoped to
/// (infohash, peer id, address). See [`Key`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id(pub [u8; 20]);

impl Id {
    /// Renders the id as 40 hex characters, the representation used in logs
    /// and in the WebSocket signaling messages.
    #[must_use]
    pub fn to_hex(&self) -> String {
        let mut hex = String::with_capacity(40);
        for byte in &self.0 {
            hex.push_str(&format!("{byte:02x}"));
        }
        hex
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "peer::Id({})", self.to_hex())
    }
}

impl TryFrom<&[u8]> for Id {
    type Error = InvalidId;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let bytes: [u8; 20] = bytes.try_into().map_err(|_| InvalidId)?;
        Ok(Self(bytes))
    }
}

impl FromStr for Id {
    type Err = InvalidId;

    /// Parses the 40-character hex representation produced by [`Id::to_hex`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 40 {
            return Err(InvalidId);
        }

        let mut bytes = [0u8; 20];
        for (idx, chunk) in s.as_bytes().chunks_exact(2).enumerate() {
            let hex = std::str::from_utf8(chunk).map_err(|_| InvalidId)?;
            bytes[idx] = u8::from_str_radix(hex, 16).map_err(|_| InvalidId)?;
        }

        Ok(Self(bytes))
    }
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("invalid peer id")]
pub struct InvalidId;

/// The data the tracker stores for each peer in a swarm, as received in the
/// latest `announce` request from that peer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Peer {
    /// The ID used by the downloader peer.
    pub peer_id: Id,
    /// The socket address other peers should contact this peer on. A port of
    /// `0` means the peer is not directly contactable (WebSocket peers, for
    /// instance) and must never be handed out in peer lists.
    pub peer_addr: SocketAddr,
    /// Last time the peer announced (timestamp since the Unix epoch).
    pub updated: DurationSinceUnixEpoch,
    /// Number of bytes the peer has uploaded so far.
    pub uploaded: NumberOfBytes,
    /// Number of bytes the peer has downloaded so far.
    pub downloaded: NumberOfBytes,
    /// The number of bytes this peer still has to download.
    pub left: NumberOfBytes,
    /// The event the peer announced: `started`, `completed`, `stopped` or none.
    pub event: AnnounceEvent,
}

impl Peer {
    /// A peer with a complete copy of the torrent (`left == 0`) is a seeder.
    #[must_use]
    pub fn is_seeder(&self) -> bool {
        self.left.value() == 0
    }

    /// The key the peer is stored under inside its swarm.
    #[must_use]
    pub fn key(&self) -> Key {
        Key {
            peer_id: self.peer_id,
            peer_addr: self.peer_addr,
        }
    }

    pub fn change_ip(&mut self, new_ip: &IpAddr) {
        self.peer_addr = SocketAddr::new(*new_ip, self.peer_addr.port());
    }
}

/// The identity of a peer within one swarm: id plus address.
///
/// Keying on the pair (instead of the id alone) means two clients behind the
/// same NAT that happened to pick the same id cannot evict each other, and a
/// client that reconnects from a new port is a new swarm member until the
/// old entry times out.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key {
    pub peer_id: Id,
    pub peer_addr: SocketAddr,
}
