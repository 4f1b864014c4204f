//! The transport-agnostic structs returned by the announce and scrape
//! handlers. The delivery layer re-encodes them into the wire format of the
//! transport the request arrived on.
use std::collections::HashMap;
use std::sync::Arc;

use derive_more::Constructor;
use shoal_tracker_configuration::AnnouncePolicy;

use crate::info_hash::InfoHash;
use crate::peer;
use crate::swarm_metadata::SwarmMetadata;

/// How an announce changed the swarm, from the swarm's point of view.
///
/// The value is attached to the [`AnnounceData`] so that the surrounding
/// stats/logging code can react to peer lifecycle transitions without the
/// tracker keeping any callback registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnnounceOutcome {
    /// The peer was not in the swarm before and has been added.
    Started,
    /// The peer was already in the swarm and its entry has been refreshed.
    Updated,
    /// A previously known peer reported it finished downloading; the swarm's
    /// `downloaded` counter advanced.
    Completed,
    /// The peer announced `stopped` and has been removed from the swarm.
    Stopped,
}

/// Structure that holds the data returned by the `announce` request.
#[derive(Clone, Debug, PartialEq, Constructor)]
pub struct AnnounceData {
    /// The list of peers that are downloading the same torrent.
    /// It excludes the peer that made the request.
    pub peers: Vec<Arc<peer::Peer>>,
    /// Swarm statistics.
    pub stats: SwarmMetadata,
    /// The tracker announce policy (re-announce intervals).
    pub policy: AnnouncePolicy,
    /// What the announce did to the swarm.
    pub outcome: AnnounceOutcome,
}

/// Structure that holds the data returned by the `scrape` request.
#[derive(Debug, PartialEq, Default)]
pub struct ScrapeData {
    /// A map of infohashes and swarm metadata for each torrent.
    pub files: HashMap<InfoHash, SwarmMetadata>,
}

impl ScrapeData {
    /// Creates a new empty `ScrapeData` with no files (torrents).
    #[must_use]
    pub fn empty() -> Self {
        Self { files: HashMap::new() }
    }

    /// Creates a new `ScrapeData` with zeroed metadata for each torrent.
    #[must_use]
    pub fn zeroed(info_hashes: &Vec<InfoHash>) -> Self {
        let mut scrape_data = Self::empty();

        for info_hash in info_hashes {
            scrape_data.add_file_with_zeroed_metadata(info_hash);
        }

        scrape_data
    }

    /// Adds a torrent to the `ScrapeData`.
    pub fn add_file(&mut self, info_hash: &InfoHash, swarm_metadata: SwarmMetadata) {
        self.files.insert(*info_hash, swarm_metadata);
    }

    /// Adds a torrent to the `ScrapeData` with zeroed metadata.
    pub fn add_file_with_zeroed_metadata(&mut self, info_hash: &InfoHash) {
        self.files.insert(*info_hash, SwarmMetadata::zeroed());
    }
}

#[cfg(test)]
mod tests {

    mod the_scrape_data {
        use crate::core::ScrapeData;
        use crate::info_hash::InfoHash;
        use crate::swarm_metadata::SwarmMetadata;

        fn sample_info_hash() -> InfoHash {
            "3b245504cf5f11bbdbe1201cea6a6bf45aee1bc0"
                .parse::<InfoHash>()
                .expect("String should be a valid info hash")
        }

        #[test]
        fn it_should_be_empty_when_created() {
            assert!(ScrapeData::empty().files.is_empty());
        }

        #[test]
        fn it_should_zero_all_requested_files() {
            let scrape_data = ScrapeData::zeroed(&vec![sample_info_hash()]);

            assert_eq!(scrape_data.files.get(&sample_info_hash()), Some(&SwarmMetadata::zeroed()));
        }
    }
}
