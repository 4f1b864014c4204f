//! Scrape handler.
//!
//! The `scrape` request allows clients to query metadata about the swarm in bulk.
//!
//! An `scrape` request includes a list of infohashes whose swarm metadata you
//! want to collect.
//!
//! The returned struct is:
//!
//! ```rust,no_run
//! use shoal_tracker_primitives::info_hash::InfoHash;
//! use std::collections::HashMap;
//!
//! pub struct ScrapeData {
//!     pub files: HashMap<InfoHash, SwarmMetadata>,
//! }
//!
//! pub struct SwarmMetadata {
//!     pub complete: u32,   // The number of active peers that have completed downloading (seeders)
//!     pub downloaded: u32, // The number of peers that have ever completed downloading
//!     pub incomplete: u32, // The number of active peers that have not completed downloading (leechers)
//! }
//! ```
//!
//! Infohashes that the tracker does not know about yield zeroed metadata,
//! never an error.
//!
//! A scrape request without infohashes means "every swarm the tracker
//! knows". That form is expensive and exposes the full torrent list, so it
//! is only served when the tracker is configured with
//! `full_scrape_enabled = true`.
//!
//! ## References:
//!
//! Refer to `BitTorrent` BEPs and other sites for more information about the `scrape` request:
//!
//! - [BEP 48. Tracker Protocol Extension: Scrape](https://www.bittorrent.org/beps/bep_0048.html)
//! - [BEP 15. UDP Tracker Protocol for `BitTorrent`. Scrape section](https://www.bittorrent.org/beps/bep_0015.html)
//! - [Vuze docs](https://wiki.vuze.com/w/Scrape)
use std::sync::Arc;

use shoal_tracker_configuration::Core;
use shoal_tracker_primitives::core::ScrapeData;
use shoal_tracker_primitives::info_hash::InfoHash;

use super::swarm::repository::in_memory::InMemorySwarmRepository;

/// Handles scrape requests, providing swarm metadata.
pub struct ScrapeHandler {
    /// The tracker configuration.
    config: Core,

    /// The in-memory swarms repository.
    in_memory_swarm_repository: Arc<InMemorySwarmRepository>,
}

impl ScrapeHandler {
    /// Creates a new `ScrapeHandler` instance.
    #[must_use]
    pub fn new(config: &Core, in_memory_swarm_repository: &Arc<InMemorySwarmRepository>) -> Self {
        Self {
            config: config.clone(),
            in_memory_swarm_repository: in_memory_swarm_repository.clone(),
        }
    }

    /// Handles a scrape request for multiple torrents.
    ///
    /// - Returns metadata for each requested torrent.
    /// - If a torrent doesn't exist, returns zeroed stats.
    ///
    /// # BEP Reference:
    ///
    /// [BEP 48: Scrape Protocol](https://www.bittorrent.org/beps/bep_0048.html)
    #[must_use]
    pub fn scrape(&self, info_hashes: &Vec<InfoHash>) -> ScrapeData {
        let mut scrape_data = ScrapeData::empty();

        for info_hash in info_hashes {
            let swarm_metadata = self.in_memory_swarm_repository.get_swarm_metadata(info_hash);
            scrape_data.add_file(info_hash, swarm_metadata);
        }

        scrape_data
    }

    /// Handles a scrape request without infohashes: the metadata of every
    /// known swarm.
    ///
    /// # Errors
    ///
    /// Will return an error if full scrapes are disabled in the tracker
    /// configuration.
    pub fn scrape_all(&self) -> Result<ScrapeData, FullScrapeDisabled> {
        if !self.config.full_scrape_enabled {
            return Err(FullScrapeDisabled);
        }

        let mut scrape_data = ScrapeData::empty();

        for (info_hash, swarm_metadata) in self.in_memory_swarm_repository.get_paginated(None) {
            scrape_data.add_file(&info_hash, swarm_metadata);
        }

        Ok(scrape_data)
    }
}

/// Returned when a scrape without infohashes arrives and full scrapes are
/// not enabled.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("full scrape disabled")]
pub struct FullScrapeDisabled;
