//! The live WebSocket session registry.
//!
//! The swarm repository knows *that* a browser peer exists; this registry
//! knows *how to reach it* (the outbound channel of its socket task). It is
//! what makes offer/answer relay possible.
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use rand::seq::IteratorRandom;
use shoal_tracker_primitives::info_hash::InfoHash;
use shoal_tracker_primitives::peer;
use tokio::sync::mpsc;

pub type SessionId = u64;

#[derive(Debug)]
struct Session {
    sender: mpsc::UnboundedSender<String>,
    /// Every (swarm, peer id) this session has announced under, for the
    /// implicit stop on disconnect.
    memberships: HashSet<(InfoHash, peer::Id)>,
}

/// Live sessions plus a per-swarm index of which session serves which peer
/// id.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    next_session_id: AtomicU64,
    sessions: DashMap<SessionId, Session>,
    swarms: DashMap<InfoHash, HashMap<peer::Id, SessionId>>,
}

impl SessionRegistry {
    /// Adds a connected session and returns its id.
    pub fn register(&self, sender: mpsc::UnboundedSender<String>) -> SessionId {
        let session_id = self.next_session_id.fetch_add(1, Ordering::Relaxed);

        self.sessions.insert(
            session_id,
            Session {
                sender,
                memberships: HashSet::new(),
            },
        );

        session_id
    }

    /// Records that a session announced to a swarm under a peer id.
    ///
    /// A peer id that was previously served by another session is taken
    /// over: the latest announce wins, like an address change on re-announce.
    pub fn record_announce(&self, session_id: SessionId, info_hash: InfoHash, peer_id: peer::Id) {
        if let Some(mut session) = self.sessions.get_mut(&session_id) {
            session.memberships.insert((info_hash, peer_id));
        }

        self.swarms.entry(info_hash).or_default().insert(peer_id, session_id);
    }

    /// Queues a frame on a session's socket. Returns `false` when the
    /// session is gone; the frame is dropped, never an error.
    pub fn send_to(&self, session_id: SessionId, frame: String) -> bool {
        match self.sessions.get(&session_id) {
            Some(session) => session.sender.send(frame).is_ok(),
            None => false,
        }
    }

    /// The session currently serving a peer id within a swarm.
    #[must_use]
    pub fn lookup(&self, info_hash: &InfoHash, peer_id: &peer::Id) -> Option<SessionId> {
        self.swarms.get(info_hash)?.get(peer_id).copied()
    }

    /// A uniform random sample of swarm members, excluding the requesting
    /// peer, for offer fan-out.
    #[must_use]
    pub fn sample_swarm_sessions(&self, info_hash: &InfoHash, exclude: &peer::Id, amount: usize) -> Vec<(peer::Id, SessionId)> {
        let Some(members) = self.swarms.get(info_hash) else {
            return vec![];
        };

        let mut rng = rand::rng();

        members
            .iter()
            .filter(|(peer_id, _)| *peer_id != exclude)
            .map(|(peer_id, session_id)| (*peer_id, *session_id))
            .choose_multiple(&mut rng, amount)
    }

    /// Removes a session and returns the memberships it held, so the caller
    /// can run the implicit `stopped` announces.
    pub fn deregister(&self, session_id: SessionId) -> Vec<(InfoHash, peer::Id)> {
        let Some((_, session)) = self.sessions.remove(&session_id) else {
            return vec![];
        };

        let memberships: Vec<(InfoHash, peer::Id)> = session.memberships.into_iter().collect();

        for (info_hash, peer_id) in &memberships {
            let now_empty = match self.swarms.get_mut(info_hash) {
                Some(mut members) => {
                    // Only drop the index entry if this session still owns it.
                    if members.get(peer_id) == Some(&session_id) {
                        members.remove(peer_id);
                    }
                    members.is_empty()
                }
                None => false,
            };

            // The guard above must be released before touching the map
            // entry itself.
            if now_empty {
                self.swarms.remove_if(info_hash, |_, members| members.is_empty());
            }
        }

        memberships
    }
}

#[cfg(test)]
mod tests {

    mod the_session_registry {
        use shoal_tracker_primitives::info_hash::InfoHash;
        use shoal_tracker_primitives::peer;
        use tokio::sync::mpsc;

        use crate::servers::ws::registry::SessionRegistry;

        fn sample_info_hash() -> InfoHash {
            [0x3b; 20].into()
        }

        fn peer_id(number: u8) -> peer::Id {
            let mut id = *b"-qB00000000000000000";
            id[19] = b'0' + number;
            peer::Id(id)
        }

        #[test]
        fn it_should_index_announced_peers_by_swarm() {
            let registry = SessionRegistry::default();

            let (sender, _receiver) = mpsc::unbounded_channel();
            let session_id = registry.register(sender);

            registry.record_announce(session_id, sample_info_hash(), peer_id(1));

            assert_eq!(registry.lookup(&sample_info_hash(), &peer_id(1)), Some(session_id));
        }

        #[test]
        fn it_should_deliver_frames_to_a_live_session() {
            let registry = SessionRegistry::default();

            let (sender, mut receiver) = mpsc::unbounded_channel();
            let session_id = registry.register(sender);

            assert!(registry.send_to(session_id, "hello".to_string()));
            assert_eq!(receiver.try_recv().unwrap(), "hello");
        }

        #[test]
        fn it_should_sample_swarm_members_excluding_the_requester() {
            let registry = SessionRegistry::default();

            let (sender, _receiver) = mpsc::unbounded_channel();
            let requester = registry.register(sender.clone());
            registry.record_announce(requester, sample_info_hash(), peer_id(1));

            let other = registry.register(sender);
            registry.record_announce(other, sample_info_hash(), peer_id(2));

            for _ in 0..20 {
                let sample = registry.sample_swarm_sessions(&sample_info_hash(), &peer_id(1), 10);

                assert_eq!(sample.len(), 1);
                assert_eq!(sample[0].0, peer_id(2));
            }
        }

        #[test]
        fn it_should_return_the_memberships_when_a_session_disconnects() {
            let registry = SessionRegistry::default();

            let (sender, _receiver) = mpsc::unbounded_channel();
            let session_id = registry.register(sender);
            registry.record_announce(session_id, sample_info_hash(), peer_id(1));

            let memberships = registry.deregister(session_id);

            assert_eq!(memberships, vec![(sample_info_hash(), peer_id(1))]);
            assert_eq!(registry.lookup(&sample_info_hash(), &peer_id(1)), None);
        }

        #[test]
        fn it_should_not_drop_a_peer_id_taken_over_by_a_newer_session() {
            let registry = SessionRegistry::default();

            let (sender, _receiver) = mpsc::unbounded_channel();
            let old_session = registry.register(sender.clone());
            registry.record_announce(old_session, sample_info_hash(), peer_id(1));

            let new_session = registry.register(sender);
            registry.record_announce(new_session, sample_info_hash(), peer_id(1));

            // The old session dying must not unmap the peer id now owned by
            // the new session.
            let _memberships = registry.deregister(old_session);

            assert_eq!(registry.lookup(&sample_info_hash(), &peer_id(1)), Some(new_session));
        }
    }
}
