//! Configuration for the `shoal` tracker.
//!
//! You can control the behavior of the tracker with a TOML file like this
//! one (every key is optional; the values below are the defaults):
//!
//! ```toml
//! [logging]
//! threshold = "info"
//!
//! [core]
//! max_peer_list_length = 50
//! full_scrape_enabled = false
//! tracker_usage_statistics = true
//!
//! [core.announce_policy]
//! interval = 120
//! interval_min = 120
//!
//! [core.tracker_policy]
//! peer_timeout_multiplier = 2
//! inactive_peer_cleanup_interval = 600
//! remove_peerless_swarms = true
//!
//! [core.net]
//! # external_ip = "2.137.87.41"
//!
//! [udp_tracker]
//! enabled = true
//! bind_address = "0.0.0.0:6969"
//!
//! [http_tracker]
//! enabled = true
//! bind_address = "0.0.0.0:7070"
//!
//! [ws_tracker]
//! enabled = true
//! bind_address = "0.0.0.0:8000"
//! max_announces_per_second = 10
//! announce_burst = 30
//! ```
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;

use serde::{Deserialize, Serialize};

/// The maximum number of torrents that can be scraped in a single request.
///
/// The protocol limit from
/// [BEP 15](https://www.bittorrent.org/beps/bep_0015.html): 74 infohashes is
/// the most that fit a scrape packet below the common 1500-byte MTU.
pub const MAX_SCRAPE_TORRENTS: usize = 74;

/// The whole tracker configuration: the core (domain) settings plus one
/// section per delivery transport.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Configuration {
    pub logging: Logging,
    pub core: Core,
    pub udp_tracker: UdpTracker,
    pub http_tracker: HttpTracker,
    pub ws_tracker: WsTracker,
}

impl Configuration {
    /// Loads the configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Will return an error if the file cannot be read or is not valid TOML
    /// for the expected schema.
    pub fn load_from_file(path: &Path) -> Result<Self, Error> {
        let text = std::fs::read_to_string(path).map_err(|source| Error::UnableToReadFile {
            path: path.display().to_string(),
            source,
        })?;

        Self::load_from_str(&text)
    }

    /// Parses the configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Will return an error if the text is not valid TOML for the expected
    /// schema.
    pub fn load_from_str(text: &str) -> Result<Self, Error> {
        toml::from_str(text).map_err(|source| Error::InvalidConfig { source })
    }
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("unable to read config file {path}: {source}")]
    UnableToReadFile {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid config: {source}")]
    InvalidConfig { source: toml::de::Error },
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Logging {
    /// Minimum level of the log lines emitted: `off`, `error`, `warn`,
    /// `info`, `debug` or `trace`.
    pub threshold: String,
}

impl Default for Logging {
    fn default() -> Self {
        Self {
            threshold: "info".to_string(),
        }
    }
}

/// Core (domain layer) settings, shared by all the transports.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Core {
    pub announce_policy: AnnouncePolicy,
    pub tracker_policy: TrackerPolicy,
    pub net: Network,

    /// Maximum number of peers returned in a single announce response. The
    /// `numwant` a client asks for is clamped to this value.
    pub max_peer_list_length: usize,

    /// Whether a scrape request without infohashes returns the metadata of
    /// every known swarm. Disabled by default: a full scrape exposes the
    /// whole torrent list and is expensive on large deployments.
    pub full_scrape_enabled: bool,

    /// Weather the tracker keeps usage statistics (announce/scrape counters
    /// per transport).
    pub tracker_usage_statistics: bool,
}

impl Default for Core {
    fn default() -> Self {
        Self {
            announce_policy: AnnouncePolicy::default(),
            tracker_policy: TrackerPolicy::default(),
            net: Network::default(),
            max_peer_list_length: 50,
            full_scrape_enabled: false,
            tracker_usage_statistics: true,
        }
    }
}

impl Core {
    /// Seconds after which a peer that has not re-announced is expired:
    /// the announce interval times the grace-period multiplier.
    #[must_use]
    pub fn max_peer_timeout(&self) -> u32 {
        self.announce_policy.interval * self.tracker_policy.peer_timeout_multiplier
    }
}

/// The announce policy: how often peers should re-announce.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct AnnouncePolicy {
    /// Interval in seconds that the client should wait between sending
    /// regular announce requests to the tracker.
    pub interval: u32,

    /// Minimum announce interval. Clients must not reannounce more
    /// frequently than this.
    pub interval_min: u32,
}

impl Default for AnnouncePolicy {
    fn default() -> Self {
        Self {
            interval: 120,
            interval_min: 120,
        }
    }
}

/// The policy for expiring peers and evicting empty swarms.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct TrackerPolicy {
    /// A peer is expired when it has not announced for
    /// `interval × peer_timeout_multiplier` seconds. `2` is the standard
    /// tracker grace period.
    pub peer_timeout_multiplier: u32,

    /// Seconds between runs of the inactive-peer cleanup job.
    pub inactive_peer_cleanup_interval: u64,

    /// Whether swarms left without peers after a cleanup are evicted.
    pub remove_peerless_swarms: bool,
}

impl Default for TrackerPolicy {
    fn default() -> Self {
        Self {
            peer_timeout_multiplier: 2,
            inactive_peer_cleanup_interval: 600,
            remove_peerless_swarms: true,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Network {
    /// The external IP address of the tracker. When set, peers announcing
    /// from a loopback address are stored with this IP instead, so that a
    /// tracker and client running on the same host still produce contactable
    /// peer entries.
    pub external_ip: Option<IpAddr>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct UdpTracker {
    pub enabled: bool,
    /// The address the UDP tracker binds to. Port 0 binds an ephemeral port.
    pub bind_address: SocketAddr,
}

impl Default for UdpTracker {
    fn default() -> Self {
        Self {
            enabled: true,
            bind_address: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 6969),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpTracker {
    pub enabled: bool,
    pub bind_address: SocketAddr,
}

impl Default for HttpTracker {
    fn default() -> Self {
        Self {
            enabled: true,
            bind_address: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 7070),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct WsTracker {
    pub enabled: bool,
    pub bind_address: SocketAddr,

    /// Sustained announce rate allowed per WebSocket session.
    pub max_announces_per_second: u32,

    /// Burst of announces allowed per WebSocket session before the sustained
    /// rate applies.
    pub announce_burst: u32,
}

impl Default for WsTracker {
    fn default() -> Self {
        Self {
            enabled: true,
            bind_address: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 8000),
            max_announces_per_second: 10,
            announce_burst: 30,
        }
    }
}
