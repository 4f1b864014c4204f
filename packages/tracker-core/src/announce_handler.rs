//! Announce handler.
//!
//! Handling `announce` requests is the most important task for a `BitTorrent`
//! tracker.
//!
//! A `BitTorrent` swarm is a network of peers that are all trying to download
//! the same torrent. When a peer wants to find other peers it announces itself
//! to the swarm via the tracker. The peer sends its data to the tracker so that
//! the tracker can add it to the swarm. The tracker responds to the peer with
//! the list of other peers in the swarm so that the peer can contact them to
//! start downloading pieces of the file from them.
//!
//! The handler returns the list of peers for the swarm, filtering out the
//! peer that is making the `announce` request, plus the swarm statistics and
//! an [`AnnounceOutcome`](shoal_tracker_primitives::core::AnnounceOutcome)
//! describing what the announce did to the swarm.
//!
//! > **NOTICE**: the peer argument is mutable because the handler can change
//! > the peer IP if the peer is using a loopback IP.
//!
//! The `remote_client_ip` argument is the resolved peer ip. It's a common
//! practice that trackers ignore the peer ip in the `announce` request
//! params, and resolve the peer ip using the IP of the client making the
//! request. As the tracker is a domain service, the peer IP must be provided
//! by the handler user, which is usually a higher component with access to
//! the request metadata, for example, connection data or proxy headers.
//!
//! ## Related BEPs:
//!
//! Refer to `BitTorrent` BEPs and other sites for more information about the
//! `announce` request:
//!
//! - [BEP 3. The `BitTorrent` Protocol Specification](https://www.bittorrent.org/beps/bep_0003.html)
//! - [BEP 23. Tracker Returns Compact Peer Lists](https://www.bittorrent.org/beps/bep_0023.html)
//! - [Vuze docs](https://wiki.vuze.com/w/Announce)
use std::net::IpAddr;
use std::sync::Arc;

use shoal_tracker_configuration::Core;
use shoal_tracker_primitives::announce_event::AnnounceEvent;
use shoal_tracker_primitives::core::{AnnounceData, AnnounceOutcome};
use shoal_tracker_primitives::info_hash::InfoHash;
use shoal_tracker_primitives::peer;

use super::swarm::repository::in_memory::InMemorySwarmRepository;

/// Handles `announce` requests from `BitTorrent` clients.
pub struct AnnounceHandler {
    /// The tracker configuration.
    config: Core,

    /// The in-memory swarms repository.
    in_memory_swarm_repository: Arc<InMemorySwarmRepository>,
}

impl AnnounceHandler {
    /// Creates a new `AnnounceHandler`.
    #[must_use]
    pub fn new(config: &Core, in_memory_swarm_repository: &Arc<InMemorySwarmRepository>) -> Self {
        Self {
            config: config.clone(),
            in_memory_swarm_repository: in_memory_swarm_repository.clone(),
        }
    }

    /// Processes an announce request from a peer.
    ///
    /// BEP 03: [The `BitTorrent` Protocol Specification](https://www.bittorrent.org/beps/bep_0003.html).
    ///
    /// # Parameters
    ///
    /// - `info_hash`: The unique identifier of the torrent.
    /// - `peer`: The peer announcing itself (may be updated if IP is adjusted).
    /// - `remote_client_ip`: The IP address of the client making the request.
    /// - `peers_wanted`: Specifies how many peers the client wants in the response.
    pub fn announce(
        &self,
        info_hash: &InfoHash,
        peer: &mut peer::Peer,
        remote_client_ip: &IpAddr,
        peers_wanted: &PeersWanted,
    ) -> AnnounceData {
        tracing::debug!("Before: {peer:?}");
        peer.change_ip(&assign_ip_address_to_peer(remote_client_ip, self.config.net.external_ip));
        tracing::debug!("After: {peer:?}");

        let upserted = self.in_memory_swarm_repository.upsert_peer(info_hash, peer);
        let stats = self.in_memory_swarm_repository.get_swarm_metadata(info_hash);

        let outcome = match peer.event {
            AnnounceEvent::Stopped => AnnounceOutcome::Stopped,
            _ if upserted.downloaded_stats_updated => AnnounceOutcome::Completed,
            _ if !upserted.previously_known => AnnounceOutcome::Started,
            _ => AnnounceOutcome::Updated,
        };

        // A departing peer gets no peer list.
        let peers = if peer.event == AnnounceEvent::Stopped {
            vec![]
        } else {
            self.in_memory_swarm_repository.get_peers_for(
                info_hash,
                &peer.key(),
                peers_wanted.limit(self.config.max_peer_list_length),
            )
        };

        AnnounceData {
            peers,
            stats,
            policy: self.config.announce_policy,
            outcome,
        }
    }
}

/// Specifies how many peers a client wants in the announce response.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum PeersWanted {
    /// Request as many peers as possible (default behavior).
    #[default]
    AsManyAsPossible,

    /// Request a specific number of peers.
    Only { amount: usize },
}

impl PeersWanted {
    /// Request a specific number of peers.
    #[must_use]
    pub fn only(limit: u32) -> Self {
        limit.into()
    }

    /// Returns the number of peers to hand out, given the tracker's
    /// configured maximum. A client can ask for fewer peers than the
    /// maximum, never for more.
    #[must_use]
    pub fn limit(&self, max_peer_list_length: usize) -> usize {
        match self {
            PeersWanted::AsManyAsPossible => max_peer_list_length,
            PeersWanted::Only { amount } => (*amount).min(max_peer_list_length),
        }
    }
}

impl From<u32> for PeersWanted {
    fn from(value: u32) -> Self {
        if value == 0 {
            return PeersWanted::AsManyAsPossible;
        }

        PeersWanted::Only {
            amount: value as usize,
        }
    }
}

impl From<i32> for PeersWanted {
    fn from(value: i32) -> Self {
        if value <= 0 {
            return PeersWanted::AsManyAsPossible;
        }

        // This conversion is safe because `value > 0`
        let amount = usize::try_from(value).unwrap_or_default();

        PeersWanted::Only { amount }
    }
}

/// Assigns the correct IP address to a peer based on tracker settings.
///
/// If the client IP is a loopback address and the tracker has an external IP
/// configured, the external IP will be assigned to the peer.
#[must_use]
fn assign_ip_address_to_peer(remote_client_ip: &IpAddr, tracker_external_ip: Option<IpAddr>) -> IpAddr {
    if let Some(host_ip) = tracker_external_ip.filter(|_| remote_client_ip.is_loopback()) {
        host_ip
    } else {
        *remote_client_ip
    }
}
