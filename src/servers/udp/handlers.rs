//! Handlers for the UDP tracker requests.
use std::net::SocketAddr;
use std::sync::Arc;

use shoal_tracker_clock::clock::Time;
use shoal_tracker_core::announce_handler::{AnnounceHandler, PeersWanted};
use shoal_tracker_core::scrape_handler::ScrapeHandler;
use shoal_tracker_core::statistics;
use shoal_tracker_primitives::peer::Peer;

use super::connection_cookie::{self, Secret};
use super::request::{AnnounceRequest, ConnectRequest, Request, ScrapeRequest};
use super::response::{AnnounceResponse, Response, ScrapeEntry, ScrapeResponse};
use crate::CurrentClock;

/// The shared services one UDP tracker instance dispatches into.
pub struct UdpServices {
    pub announce_handler: Arc<AnnounceHandler>,
    pub scrape_handler: Arc<ScrapeHandler>,
    pub stats_event_sender: Arc<Option<Box<dyn statistics::event::EventSender>>>,
    pub cookie_secret: Secret,
}

/// Decodes and dispatches one datagram. `None` means the packet was
/// malformed and must be dropped without a reply.
pub async fn handle_packet(data: &[u8], source: SocketAddr, services: &UdpServices) -> Option<Response> {
    let request = match Request::parse(data) {
        Ok(request) => request,
        Err(error) => {
            tracing::debug!(%source, %error, "dropping malformed udp packet");
            return None;
        }
    };

    match request {
        Request::Connect(request) => Some(handle_connect(&request, source, services)),
        Request::Announce(request) => Some(handle_announce(&request, source, services)),
        Request::Scrape(request) => Some(handle_scrape(&request, source, services)),
    }
}

fn handle_connect(request: &ConnectRequest, source: SocketAddr, services: &UdpServices) -> Response {
    let connection_id = connection_cookie::make(&services.cookie_secret, &source, CurrentClock::now());

    send_stats_event(
        services,
        if source.is_ipv4() {
            statistics::event::Event::Udp4Connect
        } else {
            statistics::event::Event::Udp6Connect
        },
    );

    Response::Connect {
        transaction_id: request.transaction_id,
        connection_id,
    }
}

fn handle_announce(request: &AnnounceRequest, source: SocketAddr, services: &UdpServices) -> Response {
    if let Err(error) = connection_cookie::check(&services.cookie_secret, &source, CurrentClock::now(), request.connection_id)
    {
        return error_response(request.transaction_id, source, services, &error.to_string());
    }

    let mut peer = Peer {
        peer_id: request.peer_id,
        peer_addr: SocketAddr::new(source.ip(), request.port),
        updated: CurrentClock::now(),
        uploaded: request.uploaded,
        downloaded: request.downloaded,
        left: request.left,
        event: request.event,
    };

    let peers_wanted = PeersWanted::from(request.num_want);

    let announce_data = services
        .announce_handler
        .announce(&request.info_hash, &mut peer, &source.ip(), &peers_wanted);

    // Compact entries are fixed-width per address family; only hand back
    // addresses the requester can encode.
    let peers = announce_data
        .peers
        .iter()
        .filter(|peer| peer.peer_addr.is_ipv4() == source.is_ipv4())
        .map(|peer| peer.peer_addr)
        .collect();

    send_stats_event(
        services,
        if source.is_ipv4() {
            statistics::event::Event::Udp4Announce
        } else {
            statistics::event::Event::Udp6Announce
        },
    );

    tracing::debug!(info_hash = %request.info_hash, outcome = ?announce_data.outcome, "udp announce");

    Response::Announce(AnnounceResponse {
        transaction_id: request.transaction_id,
        interval: announce_data.policy.interval,
        leechers: announce_data.stats.incomplete,
        seeders: announce_data.stats.complete,
        peers,
    })
}

fn handle_scrape(request: &ScrapeRequest, source: SocketAddr, services: &UdpServices) -> Response {
    if let Err(error) = connection_cookie::check(&services.cookie_secret, &source, CurrentClock::now(), request.connection_id)
    {
        return error_response(request.transaction_id, source, services, &error.to_string());
    }

    let scrape_data = services.scrape_handler.scrape(&request.info_hashes);

    // Entries must come back in request order; the scrape data is a map.
    let entries = request
        .info_hashes
        .iter()
        .map(|info_hash| {
            let metadata = scrape_data.files.get(info_hash).copied().unwrap_or_default();

            ScrapeEntry {
                seeders: metadata.complete,
                completed: metadata.downloaded,
                leechers: metadata.incomplete,
            }
        })
        .collect();

    send_stats_event(
        services,
        if source.is_ipv4() {
            statistics::event::Event::Udp4Scrape
        } else {
            statistics::event::Event::Udp6Scrape
        },
    );

    Response::Scrape(ScrapeResponse {
        transaction_id: request.transaction_id,
        entries,
    })
}

fn error_response(transaction_id: u32, source: SocketAddr, services: &UdpServices, message: &str) -> Response {
    send_stats_event(
        services,
        if source.is_ipv4() {
            statistics::event::Event::Udp4Error
        } else {
            statistics::event::Event::Udp6Error
        },
    );

    Response::Error {
        transaction_id,
        message: message.to_string(),
    }
}

fn send_stats_event(services: &UdpServices, event: statistics::event::Event) {
    if let Some(sender) = services.stats_event_sender.as_ref() {
        drop(sender.send_event(event));
    }
}
