//! The core `shoal-tracker-core` crate contains the generic `BitTorrent`
//! tracker logic which is independent of the delivery layer.
//!
//! It contains the tracker services and their dependencies. It's a domain layer
//! which does not specify how the end user should connect to the tracker.
//!
//! Typically this crate is intended to be used by higher components like:
//!
//! - A UDP tracker
//! - A HTTP tracker
//! - A WebSocket tracker for browser peers
//!
//! ```text
//!    Delivery layer  |   Domain layer
//! ------------------------------------
//!      HTTP tracker  |
//!       UDP tracker  |-> Core tracker
//! WebSocket tracker  |
//! ```
//!
//! # Introduction
//!
//! The main purpose of this crate is to provide a generic `BitTorrent`
//! tracker: the coordination service that lets the peers participating in a
//! swarm discover each other.
//!
//! It has two main responsibilities:
//!
//! - To handle **announce** requests: the [`announce_handler`] registers the
//!   peer in the swarm and returns the peers it can download from.
//! - To handle **scrape** requests: the [`scrape_handler`] returns aggregate
//!   metadata about swarms in bulk.
//!
//! The crate has also other features:
//!
//! - **Swarms**: the [`swarm`] module keeps the in-memory swarm entries and
//!   expires peers that stop announcing.
//! - **Statistics**: the [`statistics`] module keeps and serves the tracker
//!   usage counters.
//!
//! Everything is in memory on purpose. Tracker state is soft: peers
//! re-announce on every interval, so a restarted tracker converges back to
//! the real swarm picture within one announce interval and nothing needs to
//! be persisted.
//!
//! # Configuration
//!
//! You can control the behavior of this crate with the `Core` settings:
//!
//! ```toml
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
//! ```
//!
//! Refer to the `shoal-tracker-configuration` crate docs to get more
//! information about all the options.
pub mod announce_handler;
pub mod scrape_handler;
pub mod statistics;
pub mod swarm;

pub mod test_helpers;

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
