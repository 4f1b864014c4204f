//! Handlers for the HTTP tracker endpoints.
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{ConnectInfo, RawQuery, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use shoal_tracker_clock::clock::Time;
use shoal_tracker_core::announce_handler::{AnnounceHandler, PeersWanted};
use shoal_tracker_core::scrape_handler::ScrapeHandler;
use shoal_tracker_core::statistics;
use shoal_tracker_primitives::peer::Peer;

use super::query::Query;
use super::requests;
use super::responses;
use crate::CurrentClock;

/// The shared services one HTTP tracker instance dispatches into.
pub struct HttpServices {
    pub announce_handler: Arc<AnnounceHandler>,
    pub scrape_handler: Arc<ScrapeHandler>,
    pub stats_event_sender: Arc<Option<Box<dyn statistics::event::EventSender>>>,
}

/// `GET /announce`
pub async fn handle_announce(
    State(services): State<Arc<HttpServices>>,
    ConnectInfo(client): ConnectInfo<SocketAddr>,
    RawQuery(raw_query): RawQuery,
) -> Response {
    let query = Query::parse(raw_query.as_deref().unwrap_or(""));

    let request = match requests::announce::Announce::try_from(&query) {
        Ok(request) => request,
        Err(error) => return bencoded_error(&error.to_string()),
    };

    let mut peer = Peer {
        peer_id: request.peer_id,
        peer_addr: SocketAddr::new(client.ip(), request.port),
        updated: CurrentClock::now(),
        uploaded: request.uploaded,
        downloaded: request.downloaded,
        left: request.left,
        event: request.event,
    };

    let peers_wanted = request.numwant.map_or(PeersWanted::AsManyAsPossible, PeersWanted::from);

    let announce_data = services
        .announce_handler
        .announce(&request.info_hash, &mut peer, &client.ip(), &peers_wanted);

    send_stats_event(
        &services,
        if client.is_ipv4() {
            statistics::event::Event::Tcp4Announce
        } else {
            statistics::event::Event::Tcp6Announce
        },
    );

    tracing::debug!(info_hash = %request.info_hash, outcome = ?announce_data.outcome, "http announce");

    let response = responses::announce::Announce::from_data(&announce_data, request.compact);

    bencoded(response.body())
}

/// `GET /scrape`
pub async fn handle_scrape(
    State(services): State<Arc<HttpServices>>,
    ConnectInfo(client): ConnectInfo<SocketAddr>,
    RawQuery(raw_query): RawQuery,
) -> Response {
    let query = Query::parse(raw_query.as_deref().unwrap_or(""));

    let request = match requests::scrape::Scrape::try_from(&query) {
        Ok(request) => request,
        Err(error) => return bencoded_error(&error.to_string()),
    };

    let scrape_data = if request.info_hashes.is_empty() {
        match services.scrape_handler.scrape_all() {
            Ok(scrape_data) => scrape_data,
            Err(error) => return bencoded_error(&error.to_string()),
        }
    } else {
        services.scrape_handler.scrape(&request.info_hashes)
    };

    send_stats_event(
        &services,
        if client.is_ipv4() {
            statistics::event::Event::Tcp4Scrape
        } else {
            statistics::event::Event::Tcp6Scrape
        },
    );

    let response: responses::scrape::Scrape = scrape_data.into();

    bencoded(response.body())
}

fn bencoded(body: Vec<u8>) -> Response {
    ([(header::CONTENT_TYPE, "text/plain")], body).into_response()
}

/// Tracker convention: errors are protocol-level, not transport-level, so
/// the status is still `200 OK`.
fn bencoded_error(failure_reason: &str) -> Response {
    bencoded(responses::error::Error::new(failure_reason).body())
}

fn send_stats_event(services: &HttpServices, event: statistics::event::Event) {
    if let Some(sender) = services.stats_event_sender.as_ref() {
        drop(sender.send_event(event));
    }
}
