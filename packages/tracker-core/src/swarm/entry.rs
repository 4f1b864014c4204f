//! A single swarm: the set of peers currently sharing one infohash.
use std::collections::BTreeMap;
use std::sync::Arc;

use rand::seq::IteratorRandom;
use shoal_tracker_primitives::announce_event::AnnounceEvent;
use shoal_tracker_primitives::peer::{self, Peer};
use shoal_tracker_primitives::swarm_metadata::SwarmMetadata;
use shoal_tracker_primitives::DurationSinceUnixEpoch;

/// The information the tracker stores for one torrent: the peer list plus
/// the historical count of completed downloads.
///
/// Seeder and leecher counts are always derived from the peer list, so
/// `complete + incomplete` equals the number of tracked peers by
/// construction.
#[derive(Debug, Default)]
pub struct SwarmEntry {
    /// Peers keyed by (peer id, address).
    peers: BTreeMap<peer::Key, Arc<Peer>>,

    /// Monotonic count of completed-download events announced to this swarm.
    downloaded: u32,
}

/// What [`SwarmEntry::upsert_peer`] did to the swarm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Upserted {
    /// The peer was already in the swarm before this announce.
    pub previously_known: bool,

    /// The `downloaded` counter advanced because of this announce.
    pub downloaded_stats_updated: bool,
}

impl SwarmEntry {
    #[must_use]
    pub fn get_swarm_metadata(&self) -> SwarmMetadata {
        let seeders = self.peers.values().filter(|peer| peer.is_seeder()).count();
        let leechers = self.peers.len() - seeders;

        #[allow(clippy::cast_possible_truncation)]
        SwarmMetadata {
            downloaded: self.downloaded,
            complete: seeders as u32,
            incomplete: leechers as u32,
        }
    }

    /// It inserts or updates the peer, or removes it when the announced
    /// event is `stopped`.
    ///
    /// A `completed` event only advances the `downloaded` counter when the
    /// peer was previously known and had not already completed; a peer
    /// cannot inflate the counter by repeating the event.
    pub fn upsert_peer(&mut self, peer: &Peer) -> Upserted {
        match peer.event {
            AnnounceEvent::Stopped => {
                let previous = self.peers.remove(&peer.key());

                Upserted {
                    previously_known: previous.is_some(),
                    downloaded_stats_updated: false,
                }
            }
            AnnounceEvent::Completed => {
                let previous = self.peers.insert(peer.key(), Arc::new(*peer));

                let counted = previous.as_ref().is_some_and(|p| p.event != AnnounceEvent::Completed);
                if counted {
                    self.downloaded += 1;
                }

                Upserted {
                    previously_known: previous.is_some(),
                    downloaded_stats_updated: counted,
                }
            }
            _ => {
                let previous = self.peers.insert(peer.key(), Arc::new(*peer));

                Upserted {
                    previously_known: previous.is_some(),
                    downloaded_stats_updated: false,
                }
            }
        }
    }

    #[must_use]
    pub fn peers_is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    #[must_use]
    pub fn get_peers_len(&self) -> usize {
        self.peers.len()
    }

    /// Returns up to `limit` peers, in key order.
    #[must_use]
    pub fn get_peers(&self, limit: Option<usize>) -> Vec<Arc<Peer>> {
        match limit {
            Some(limit) => self.peers.values().take(limit).cloned().collect(),
            None => self.peers.values().cloned().collect(),
        }
    }

    /// Returns up to `limit` peers for an announce response: a uniform
    /// random sample without replacement, never containing the requesting
    /// peer and never a peer that declared itself not contactable
    /// (port 0).
    ///
    /// Sampling instead of truncating the (ordered) map spreads the load:
    /// repeated requests do not all hit the same head-of-map peers.
    #[must_use]
    pub fn get_peers_for_client(&self, client: &peer::Key, limit: usize) -> Vec<Arc<Peer>> {
        let mut rng = rand::rng();

        self.peers
            .values()
            .filter(|peer| peer.key() != *client && peer.peer_addr.port() != 0)
            .cloned()
            .choose_multiple(&mut rng, limit)
    }

    /// Removes the peers whose last announce is older than the cutoff.
    pub fn remove_inactive_peers(&mut self, current_cutoff: DurationSinceUnixEpoch) {
        self.peers.retain(|_, peer| peer.updated >= current_cutoff);
    }
}
