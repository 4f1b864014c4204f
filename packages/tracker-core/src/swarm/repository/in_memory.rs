//! The in-memory swarms repository.
use std::sync::Arc;

use crossbeam_skiplist::SkipMap;
use parking_lot::Mutex;
use shoal_tracker_primitives::announce_event::AnnounceEvent;
use shoal_tracker_primitives::info_hash::InfoHash;
use shoal_tracker_primitives::pagination::Pagination;
use shoal_tracker_primitives::peer::{self, Peer};
use shoal_tracker_primitives::swarm_metadata::SwarmMetadata;
use shoal_tracker_primitives::swarm_metrics::SwarmsMetrics;
use shoal_tracker_primitives::DurationSinceUnixEpoch;

use crate::swarm::entry::{SwarmEntry, Upserted};

/// The in-memory swarms repository: one entry per active infohash.
///
/// Entries live in a lock-free skip map and each entry carries its own
/// mutex, so mutual exclusion is per swarm. A request announcing to one
/// swarm never waits for traffic on another, and the cleanup sweep locks
/// one swarm at a time instead of stopping the world.
#[derive(Debug, Default)]
pub struct InMemorySwarmRepository {
    swarms: SkipMap<InfoHash, Arc<Mutex<SwarmEntry>>>,
}

impl InMemorySwarmRepository {
    /// It inserts (or updates if it's already in the list) the peer in the
    /// swarm entry, creating the swarm on its first peer.
    ///
    /// A `stopped` announce never creates a swarm: removing an absent peer
    /// from an absent swarm is a no-op.
    pub fn upsert_peer(&self, info_hash: &InfoHash, peer: &Peer) -> Upserted {
        if peer.event == AnnounceEvent::Stopped {
            return match self.swarms.get(info_hash) {
                None => Upserted {
                    previously_known: false,
                    downloaded_stats_updated: false,
                },
                Some(entry) => entry.value().lock().upsert_peer(peer),
            };
        }

        let entry = self
            .swarms
            .get_or_insert_with(*info_hash, || Arc::new(Mutex::new(SwarmEntry::default())));

        let upserted = entry.value().lock().upsert_peer(peer);

        upserted
    }

    #[cfg(test)]
    pub(crate) fn remove(&self, key: &InfoHash) -> bool {
        self.swarms.remove(key).is_some()
    }

    #[cfg(test)]
    pub(crate) fn contains(&self, key: &InfoHash) -> bool {
        self.swarms.contains_key(key)
    }

    /// Removes, in every swarm, the peers whose last announce is older than
    /// the cutoff.
    pub fn remove_inactive_peers(&self, current_cutoff: DurationSinceUnixEpoch) {
        for entry in self.swarms.iter() {
            entry.value().lock().remove_inactive_peers(current_cutoff);
        }
    }

    /// Evicts the swarms whose peer map is empty.
    ///
    /// An announce racing with the eviction of the same swarm can land on
    /// the detached entry and be lost; the peer reappears on its next
    /// re-announce. Swarm state is soft.
    pub fn remove_peerless_swarms(&self) {
        for entry in self.swarms.iter() {
            if entry.value().lock().peers_is_empty() {
                entry.remove();
            }
        }
    }

    /// It returns the data for a `scrape` response, or zeroed metadata if
    /// the swarm is not found.
    #[must_use]
    pub fn get_swarm_metadata(&self, info_hash: &InfoHash) -> SwarmMetadata {
        match self.swarms.get(info_hash) {
            Some(entry) => entry.value().lock().get_swarm_metadata(),
            None => SwarmMetadata::zeroed(),
        }
    }

    /// Get swarm peers for a given torrent and client.
    ///
    /// It filters out the client making the request and the peers that are
    /// not contactable (port 0).
    #[must_use]
    pub fn get_peers_for(&self, info_hash: &InfoHash, client: &peer::Key, limit: usize) -> Vec<Arc<Peer>> {
        match self.swarms.get(info_hash) {
            None => vec![],
            Some(entry) => entry.value().lock().get_peers_for_client(client, limit),
        }
    }

    /// Get the peers for a given swarm.
    #[must_use]
    pub fn get_swarm_peers(&self, info_hash: &InfoHash, limit: Option<usize>) -> Vec<Arc<Peer>> {
        match self.swarms.get(info_hash) {
            None => vec![],
            Some(entry) => entry.value().lock().get_peers(limit),
        }
    }

    /// Returns a page of (infohash, metadata) pairs, in infohash order.
    #[must_use]
    pub fn get_paginated(&self, pagination: Option<&Pagination>) -> Vec<(InfoHash, SwarmMetadata)> {
        let (offset, limit) = match pagination {
            Some(pagination) => (pagination.offset as usize, pagination.limit as usize),
            None => (0, usize::MAX),
        };

        self.swarms
            .iter()
            .skip(offset)
            .take(limit)
            .map(|entry| (*entry.key(), entry.value().lock().get_swarm_metadata()))
            .collect()
    }

    /// It calculates and returns the general [`SwarmsMetrics`].
    #[must_use]
    pub fn get_metrics(&self) -> SwarmsMetrics {
        let mut metrics = SwarmsMetrics::default();

        for entry in self.swarms.iter() {
            let metadata = entry.value().lock().get_swarm_metadata();
            metrics.complete += u64::from(metadata.complete);
            metrics.downloaded += u64::from(metadata.downloaded);
            metrics.incomplete += u64::from(metadata.incomplete);
            metrics.swarms += 1;
        }

        metrics
    }
}

#[cfg(test)]
mod tests {

    mod the_in_memory_swarm_repository {

        mod maintaining_the_peer_lists {
            use std::sync::Arc;

            use crate::swarm::repository::in_memory::InMemorySwarmRepository;
            use crate::test_helpers::tests::{sample_info_hash, sample_peer};

            #[test]
            fn it_should_add_the_first_peer_to_the_swarm_peer_list() {
                let repository = Arc::new(InMemorySwarmRepository::default());

                let info_hash = sample_info_hash();

                let _unused = repository.upsert_peer(&info_hash, &sample_peer());

                assert!(repository.contains(&info_hash));
            }

            #[test]
            fn it_should_allow_adding_the_same_peer_twice_to_the_swarm_peer_list() {
                let repository = Arc::new(InMemorySwarmRepository::default());

                let info_hash = sample_info_hash();

                let _unused = repository.upsert_peer(&info_hash, &sample_peer());
                let upserted = repository.upsert_peer(&info_hash, &sample_peer());

                assert!(upserted.previously_known);
                assert_eq!(repository.get_swarm_peers(&info_hash, None).len(), 1);
            }

            #[test]
            fn it_should_not_create_a_swarm_for_a_stopped_event_on_an_unknown_infohash() {
                let repository = Arc::new(InMemorySwarmRepository::default());

                let mut peer = sample_peer();
                peer.event = shoal_tracker_primitives::announce_event::AnnounceEvent::Stopped;

                let _unused = repository.upsert_peer(&sample_info_hash(), &peer);

                assert!(!repository.contains(&sample_info_hash()));
            }
        }

        mod returning_peer_lists_for_a_swarm {
            use std::sync::Arc;

            use crate::swarm::repository::in_memory::InMemorySwarmRepository;
            use crate::test_helpers::tests::{sample_info_hash, sample_peer};

            #[test]
            fn it_should_return_an_empty_peer_list_for_a_non_existing_swarm() {
                let repository = Arc::new(InMemorySwarmRepository::default());

                let peers = repository.get_peers_for(&sample_info_hash(), &sample_peer().key(), 50);

                assert_eq!(peers, vec![]);
            }

            #[test]
            fn it_should_return_the_peers_for_a_given_swarm_excluding_the_client() {
                let repository = Arc::new(InMemorySwarmRepository::default());

                let info_hash = sample_info_hash();
                let peer = sample_peer();

                let _unused = repository.upsert_peer(&info_hash, &peer);

                let peers = repository.get_peers_for(&info_hash, &peer.key(), 50);

                assert_eq!(peers, vec![]);
            }
        }

        mod maintaining_the_swarm_entries {
            use std::sync::Arc;
            use std::time::Duration;

            use crate::swarm::repository::in_memory::InMemorySwarmRepository;
            use crate::test_helpers::tests::{sample_info_hash, sample_peer};

            #[test]
            fn it_should_remove_peers_that_have_not_been_updated_after_a_cutoff_time() {
                let repository = Arc::new(InMemorySwarmRepository::default());

                let info_hash = sample_info_hash();
                let mut peer = sample_peer();
                peer.updated = Duration::from_secs(0);

                let _unused = repository.upsert_peer(&info_hash, &peer);

                // Cut off time is 1 second after the peer was updated
                repository.remove_inactive_peers(peer.updated + Duration::from_secs(1));

                assert!(repository.get_swarm_peers(&info_hash, None).is_empty());
            }

            #[test]
            fn it_should_remove_swarms_without_peers() {
                let repository = Arc::new(InMemorySwarmRepository::default());

                let info_hash = sample_info_hash();
                let mut peer = sample_peer();
                peer.updated = Duration::from_secs(0);

                let _unused = repository.upsert_peer(&info_hash, &peer);
                repository.remove_inactive_peers(peer.updated + Duration::from_secs(1));

                repository.remove_peerless_swarms();

                assert!(!repository.contains(&info_hash));
            }

            #[test]
            fn it_should_never_remove_a_swarm_that_still_has_peers() {
                let repository = Arc::new(InMemorySwarmRepository::default());

                let info_hash = sample_info_hash();
                let _unused = repository.upsert_peer(&info_hash, &sample_peer());

                repository.remove_peerless_swarms();

                assert!(repository.contains(&info_hash));
            }
        }

        mod returning_swarm_metadata {
            use std::sync::Arc;

            use shoal_tracker_primitives::swarm_metadata::SwarmMetadata;

            use crate::swarm::repository::in_memory::InMemorySwarmRepository;
            use crate::test_helpers::tests::{leecher, sample_info_hash};

            #[test]
            fn it_should_get_swarm_metadata_for_an_existing_swarm() {
                let repository = Arc::new(InMemorySwarmRepository::default());

                let info_hash = sample_info_hash();

                let _unused = repository.upsert_peer(&info_hash, &leecher());

                let swarm_metadata = repository.get_swarm_metadata(&info_hash);

                assert_eq!(
                    swarm_metadata,
                    SwarmMetadata {
                        complete: 0,
                        downloaded: 0,
                        incomplete: 1,
                    }
                );
            }

            #[test]
            fn it_should_return_zeroed_swarm_metadata_for_a_non_existing_swarm() {
                let repository = Arc::new(InMemorySwarmRepository::default());

                let swarm_metadata = repository.get_swarm_metadata(&sample_info_hash());

                assert_eq!(swarm_metadata, SwarmMetadata::zeroed());
            }
        }

        mod returning_swarm_metrics {
            use std::sync::Arc;

            use shoal_tracker_primitives::info_hash::fixture::gen_seeded_infohash;
            use shoal_tracker_primitives::swarm_metrics::SwarmsMetrics;

            use crate::swarm::repository::in_memory::InMemorySwarmRepository;
            use crate::test_helpers::tests::{leecher, sample_info_hash, seeder};

            #[test]
            fn it_should_get_empty_swarm_metrics_when_there_are_no_swarms() {
                let repository = Arc::new(InMemorySwarmRepository::default());

                assert_eq!(repository.get_metrics(), SwarmsMetrics::default());
            }

            #[test]
            fn it_should_return_the_swarm_metrics_when_there_is_a_leecher_and_a_seeder() {
                let repository = Arc::new(InMemorySwarmRepository::default());

                let _unused = repository.upsert_peer(&sample_info_hash(), &leecher());
                let _unused = repository.upsert_peer(&gen_seeded_infohash(&1), &seeder());

                let metrics = repository.get_metrics();

                assert_eq!(
                    metrics,
                    SwarmsMetrics {
                        complete: 1,
                        downloaded: 0,
                        incomplete: 1,
                        swarms: 2,
                    }
                );
                assert_eq!(metrics.peers(), 2);
            }
        }

        mod returning_paginated_swarms {
            use std::sync::Arc;

            use shoal_tracker_primitives::pagination::Pagination;

            use crate::swarm::repository::in_memory::InMemorySwarmRepository;
            use crate::test_helpers::tests::{sample_info_hash_one, sample_info_hash_two, sample_peer};

            #[test]
            fn it_should_return_the_requested_page() {
                let repository = Arc::new(InMemorySwarmRepository::default());

                let _unused = repository.upsert_peer(&sample_info_hash_one(), &sample_peer());
                let _unused = repository.upsert_peer(&sample_info_hash_two(), &sample_peer());

                let first_page = repository.get_paginated(Some(&Pagination { offset: 0, limit: 1 }));
                let second_page = repository.get_paginated(Some(&Pagination { offset: 1, limit: 1 }));

                assert_eq!(first_page.len(), 1);
                assert_eq!(second_page.len(), 1);
                assert_eq!(first_page[0].0, sample_info_hash_one());
                assert_eq!(second_page[0].0, sample_info_hash_two());
            }

            #[test]
            fn it_should_return_all_the_swarms_without_pagination() {
                let repository = Arc::new(InMemorySwarmRepository::default());

                let _unused = repository.upsert_peer(&sample_info_hash_one(), &sample_peer());
                let _unused = repository.upsert_peer(&sample_info_hash_two(), &sample_peer());

                assert_eq!(repository.get_paginated(None).len(), 2);
            }
        }
    }
}
