use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::sync::Arc;

use shoal_tracker_configuration::Configuration;
use shoal_tracker_core::announce_handler::{AnnounceHandler, PeersWanted};
use shoal_tracker_core::scrape_handler::ScrapeHandler;
use shoal_tracker_core::swarm::repository::in_memory::InMemorySwarmRepository;
use shoal_tracker_primitives::announce_event::AnnounceEvent;
use shoal_tracker_primitives::info_hash::InfoHash;
use shoal_tracker_primitives::peer::{Id, Peer};
use shoal_tracker_primitives::{DurationSinceUnixEpoch, NumberOfBytes};

/// # Panics
///
/// Will panic if the string representation of the info hash is not a valid infohash.
#[must_use]
pub fn sample_info_hash() -> InfoHash {
    "3b245504cf5f11bbdbe1201cea6a6bf45aee1bc0"
        .parse::<InfoHash>()
        .expect("String should be a valid info hash")
}

/// Sample peer whose state is not relevant for the tests.
#[must_use]
pub fn sample_peer() -> Peer {
    Peer {
        peer_id: Id(*b"-qB00000000000000000"),
        peer_addr: SocketAddr::new(remote_client_ip(), 8080),
        updated: DurationSinceUnixEpoch::new(1_669_397_478_934, 0),
        uploaded: NumberOfBytes::new(0),
        downloaded: NumberOfBytes::new(0),
        left: NumberOfBytes::new(0), // No bytes left to download
        event: AnnounceEvent::Completed,
    }
}

// The client peer IP.
#[must_use]
fn remote_client_ip() -> IpAddr {
    IpAddr::V4(Ipv4Addr::from_str("126.0.0.1").unwrap())
}

struct Container {
    pub announce_handler: Arc<AnnounceHandler>,
    pub scrape_handler: Arc<ScrapeHandler>,
}

impl Container {
    pub fn initialize(config: &Configuration) -> Self {
        let in_memory_swarm_repository = Arc::new(InMemorySwarmRepository::default());

        let announce_handler = Arc::new(AnnounceHandler::new(&config.core, &in_memory_swarm_repository));
        let scrape_handler = Arc::new(ScrapeHandler::new(&config.core, &in_memory_swarm_repository));

        Self {
            announce_handler,
            scrape_handler,
        }
    }
}

#[tokio::test]
async fn test_announce_and_scrape_requests() {
    let config = Configuration::default();

    let container = Container::initialize(&config);

    let info_hash = sample_info_hash();

    let mut peer = sample_peer();

    // Announce

    // First announce: download started
    peer.event = AnnounceEvent::Started;
    peer.left = NumberOfBytes::new(1000);
    let announce_data =
        container
            .announce_handler
            .announce(&info_hash, &mut peer, &remote_client_ip(), &PeersWanted::AsManyAsPossible);

    // NOTICE: you don't get back the peer making the request.
    assert_eq!(announce_data.peers.len(), 0);
    assert_eq!(announce_data.stats.downloaded, 0);
    assert_eq!(announce_data.stats.incomplete, 1);

    // Second announce: download completed
    peer.event = AnnounceEvent::Completed;
    peer.left = NumberOfBytes::new(0);
    let announce_data =
        container
            .announce_handler
            .announce(&info_hash, &mut peer, &remote_client_ip(), &PeersWanted::AsManyAsPossible);

    assert_eq!(announce_data.peers.len(), 0);
    assert_eq!(announce_data.stats.downloaded, 1);
    assert_eq!(announce_data.stats.complete, 1);

    // Scrape

    let scrape_data = container.scrape_handler.scrape(&vec![info_hash]);

    assert!(scrape_data.files.contains_key(&info_hash));
    assert_eq!(scrape_data.files.get(&info_hash).unwrap().downloaded, 1);
}

#[tokio::test]
async fn test_the_seeder_and_leecher_scenario() {
    let config = Configuration::default();

    let container = Container::initialize(&config);

    let info_hash = sample_info_hash();

    // A seeder announces.
    let mut seeder = sample_peer();
    seeder.peer_id = Id(*b"-qB00000000000000001");
    seeder.peer_addr = SocketAddr::new(remote_client_ip(), 6881);
    seeder.left = NumberOfBytes::new(0);
    seeder.event = AnnounceEvent::Started;

    let announce_data =
        container
            .announce_handler
            .announce(&info_hash, &mut seeder, &remote_client_ip(), &PeersWanted::AsManyAsPossible);

    assert_eq!(announce_data.stats.complete, 1);
    assert_eq!(announce_data.stats.incomplete, 0);

    // A leecher announces and receives the seeder.
    let mut leecher = sample_peer();
    leecher.peer_id = Id(*b"-qB00000000000000002");
    leecher.peer_addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::new(126, 0, 0, 2)), 6882);
    leecher.left = NumberOfBytes::new(1000);
    leecher.event = AnnounceEvent::Started;

    let announce_data =
        container
            .announce_handler
            .announce(&info_hash, &mut leecher, &IpAddr::V4(Ipv4Addr::new(126, 0, 0, 2)), &PeersWanted::AsManyAsPossible);

    assert_eq!(announce_data.stats.complete, 1);
    assert_eq!(announce_data.stats.incomplete, 1);
    assert_eq!(announce_data.peers.len(), 1);
    assert_eq!(announce_data.peers[0].peer_addr, seeder.peer_addr);

    // The seeder stops.
    seeder.event = AnnounceEvent::Stopped;
    container
        .announce_handler
        .announce(&info_hash, &mut seeder, &remote_client_ip(), &PeersWanted::AsManyAsPossible);

    let scrape_data = container.scrape_handler.scrape(&vec![info_hash]);
    assert_eq!(scrape_data.files.get(&info_hash).unwrap().complete, 0);
    assert_eq!(scrape_data.files.get(&info_hash).unwrap().incomplete, 1);

    // The leecher's next announce gets an empty peer list.
    let announce_data =
        container
            .announce_handler
            .announce(&info_hash, &mut leecher, &IpAddr::V4(Ipv4Addr::new(126, 0, 0, 2)), &PeersWanted::AsManyAsPossible);

    assert!(announce_data.peers.is_empty());
}
