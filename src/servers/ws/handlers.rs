//! Handlers for the WebSocket tracker sessions.
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{ConnectInfo, State};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use serde::Serialize;
use shoal_tracker_clock::clock::Time;
use shoal_tracker_configuration::WsTracker;
use shoal_tracker_core::announce_handler::{AnnounceHandler, PeersWanted};
use shoal_tracker_core::scrape_handler::ScrapeHandler;
use shoal_tracker_core::statistics;
use shoal_tracker_primitives::announce_event::AnnounceEvent;
use shoal_tracker_primitives::info_hash::InfoHash;
use shoal_tracker_primitives::peer::{self, Peer};
use shoal_tracker_primitives::NumberOfBytes;
use tokio::sync::mpsc;

use super::messages;
use super::registry::{SessionId, SessionRegistry};
use super::session::RateLimiter;
use crate::CurrentClock;

/// The shared services one WebSocket tracker instance dispatches into.
pub struct WsServices {
    pub announce_handler: Arc<AnnounceHandler>,
    pub scrape_handler: Arc<ScrapeHandler>,
    pub stats_event_sender: Arc<Option<Box<dyn statistics::event::EventSender>>>,
    pub registry: Arc<SessionRegistry>,
    pub config: WsTracker,
    /// Upper bound for the offer fan-out, shared with the peer lists.
    pub max_peer_list_length: usize,
}

/// `GET /` upgrading to a peer session.
pub async fn handle_ws(
    State(services): State<Arc<WsServices>>,
    ConnectInfo(client): ConnectInfo<SocketAddr>,
    ws: WebSocketUpgrade,
) -> Response {
    ws.on_upgrade(move |socket| peer_session(socket, client, services))
}

/// Runs one peer session until the socket closes, then performs the
/// implicit `stopped` announce for every swarm it joined.
async fn peer_session(socket: WebSocket, client: SocketAddr, services: Arc<WsServices>) {
    let (mut sink, mut stream) = socket.split();

    let (sender, mut outbound) = mpsc::unbounded_channel::<String>();
    let session_id = services.registry.register(sender);

    // Frames queued for this session (including relayed offers from other
    // sessions) are written by this task only, so relays never block the
    // announcing peer.
    let writer = tokio::spawn(async move {
        while let Some(frame) = outbound.recv().await {
            if sink.send(Message::Text(frame.into())).await.is_err() {
                break;
            }
        }
    });

    let mut limiter = RateLimiter::new(services.config.announce_burst, services.config.max_announces_per_second);

    while let Some(message) = stream.next().await {
        match message {
            Ok(Message::Text(frame)) => {
                handle_frame(frame.as_str(), session_id, client, &services, &mut limiter);
            }
            Ok(Message::Close(_)) | Err(_) => break,
            Ok(_) => {}
        }
    }

    // Connection close is an implicit "stopped" event for this peer in
    // every swarm it announced to.
    for (info_hash, peer_id) in services.registry.deregister(session_id) {
        let mut peer = ws_peer(peer_id, client, AnnounceEvent::Stopped, NumberOfBytes::new(0));

        let _announce_data =
            services
                .announce_handler
                .announce(&info_hash, &mut peer, &client.ip(), &PeersWanted::AsManyAsPossible);
    }

    // Deregistering dropped the channel, which ends the writer.
    drop(writer.await);

    tracing::debug!(%client, "ws session closed");
}

fn handle_frame(frame: &str, session_id: SessionId, client: SocketAddr, services: &WsServices, limiter: &mut RateLimiter) {
    match serde_json::from_str::<messages::Inbound>(frame) {
        Ok(messages::Inbound::Announce(message)) => {
            handle_announce_message(&message, session_id, client, services, limiter);
        }
        Ok(messages::Inbound::Scrape(message)) => {
            handle_scrape_message(&message, session_id, client, services);
        }
        Err(error) => {
            tracing::debug!(%client, %error, "invalid ws frame");
            send_json(services, session_id, &messages::Failure::new("invalid message"));
        }
    }
}

fn handle_announce_message(
    message: &messages::AnnounceMessage,
    session_id: SessionId,
    client: SocketAddr,
    services: &WsServices,
    limiter: &mut RateLimiter,
) {
    let Ok(info_hash) = InfoHash::from_str(&message.info_hash) else {
        send_json(services, session_id, &messages::Failure::new("invalid info_hash"));
        return;
    };

    let Ok(peer_id) = peer::Id::from_str(&message.peer_id) else {
        send_json(services, session_id, &messages::Failure::new("invalid peer_id"));
        return;
    };

    // An announce frame carrying an answer is pure signaling relay.
    if let Some(answer) = &message.answer {
        relay_answer(message, &peer_id, answer, services, session_id);
        return;
    }

    if !limiter.allow() {
        tracing::debug!(%client, "ws announce rate exceeded");
        send_json(services, session_id, &messages::Warning::new("announce rate exceeded"));
        return;
    }

    let event = match message.event.as_deref() {
        None => AnnounceEvent::None,
        Some(value) => match AnnounceEvent::from_str(value) {
            Ok(event) => event,
            Err(_) => {
                send_json(services, session_id, &messages::Failure::new("invalid event"));
                return;
            }
        },
    };

    // Unknown remaining bytes count as "still downloading".
    let left = NumberOfBytes::new(message.left.unwrap_or(i64::MAX));

    let mut peer = ws_peer(peer_id, client, event, left);
    peer.uploaded = NumberOfBytes::new(message.uploaded.unwrap_or(0));
    peer.downloaded = NumberOfBytes::new(message.downloaded.unwrap_or(0));

    let peers_wanted = message.numwant.map_or(PeersWanted::AsManyAsPossible, PeersWanted::from);

    let announce_data = services
        .announce_handler
        .announce(&info_hash, &mut peer, &client.ip(), &peers_wanted);

    send_stats_event(
        services,
        if client.is_ipv4() {
            statistics::event::Event::Ws4Announce
        } else {
            statistics::event::Event::Ws6Announce
        },
    );

    tracing::debug!(%info_hash, outcome = ?announce_data.outcome, "ws announce");

    if event == AnnounceEvent::Stopped {
        return;
    }

    services.registry.record_announce(session_id, info_hash, peer_id);

    send_json(
        services,
        session_id,
        &messages::AnnounceResponse {
            action: "announce",
            info_hash: message.info_hash.clone(),
            interval: announce_data.policy.interval,
            complete: announce_data.stats.complete,
            incomplete: announce_data.stats.incomplete,
        },
    );

    if let Some(offers) = &message.offers {
        fan_out_offers(message, offers, &info_hash, &peer_id, services);
    }
}

/// Pushes each offer to a distinct uniformly-sampled member of the swarm.
/// Which subset of the swarm receives an offer is the tracker's choice; a
/// uniform draw keeps any single browser from becoming everyone's first
/// WebRTC hop.
fn fan_out_offers(
    message: &messages::AnnounceMessage,
    offers: &[messages::OfferEntry],
    info_hash: &InfoHash,
    offerer: &peer::Id,
    services: &WsServices,
) {
    let wanted = message.numwant.map_or(offers.len(), |numwant| numwant as usize);
    let amount = wanted.min(offers.len()).min(services.max_peer_list_length);

    let targets = services.registry.sample_swarm_sessions(info_hash, offerer, amount);

    for (offer, (_target_peer_id, target_session)) in offers.iter().zip(targets) {
        send_json(
            services,
            target_session,
            &messages::OfferRelay {
                action: "announce",
                info_hash: message.info_hash.clone(),
                peer_id: message.peer_id.clone(),
                offer: offer.offer.clone(),
                offer_id: offer.offer_id.clone(),
            },
        );
    }
}

fn relay_answer(
    message: &messages::AnnounceMessage,
    answering_peer: &peer::Id,
    answer: &serde_json::Value,
    services: &WsServices,
    session_id: SessionId,
) {
    let Some(to_peer_id) = message
        .to_peer_id
        .as_deref()
        .and_then(|hex| peer::Id::from_str(hex).ok())
    else {
        send_json(services, session_id, &messages::Failure::new("invalid to_peer_id"));
        return;
    };

    let Ok(info_hash) = InfoHash::from_str(&message.info_hash) else {
        send_json(services, session_id, &messages::Failure::new("invalid info_hash"));
        return;
    };

    let Some(target_session) = services.registry.lookup(&info_hash, &to_peer_id) else {
        // The offering peer is gone; nothing to corrupt, nothing to do.
        tracing::debug!(%info_hash, "answer relay target disappeared");
        return;
    };

    send_json(
        services,
        target_session,
        &messages::AnswerRelay {
            action: "announce",
            info_hash: message.info_hash.clone(),
            peer_id: answering_peer.to_hex(),
            answer: answer.clone(),
            offer_id: message.offer_id.clone(),
        },
    );
}

fn handle_scrape_message(
    message: &messages::ScrapeMessage,
    session_id: SessionId,
    client: SocketAddr,
    services: &WsServices,
) {
    let scrape_data = match &message.info_hash {
        None => match services.scrape_handler.scrape_all() {
            Ok(scrape_data) => scrape_data,
            Err(error) => {
                send_json(services, session_id, &messages::Failure::new(&error.to_string()));
                return;
            }
        },
        Some(arg) => {
            let mut info_hashes = Vec::new();

            for hex in arg.to_vec() {
                match InfoHash::from_str(&hex) {
                    Ok(info_hash) => info_hashes.push(info_hash),
                    Err(_) => {
                        send_json(services, session_id, &messages::Failure::new("invalid info_hash"));
                        return;
                    }
                }
            }

            services.scrape_handler.scrape(&info_hashes)
        }
    };

    send_stats_event(
        services,
        if client.is_ipv4() {
            statistics::event::Event::Ws4Scrape
        } else {
            statistics::event::Event::Ws6Scrape
        },
    );

    let files = scrape_data
        .files
        .iter()
        .map(|(info_hash, metadata)| {
            (
                info_hash.to_string(),
                messages::ScrapeFile {
                    complete: metadata.complete,
                    incomplete: metadata.incomplete,
                    downloaded: metadata.downloaded,
                },
            )
        })
        .collect();

    send_json(
        services,
        session_id,
        &messages::ScrapeResponse {
            action: "scrape",
            files,
        },
    );
}

/// A browser peer as stored in the swarms: the session's remote IP with
/// port 0, the explicit not-contactable signal. It will never be handed to
/// UDP/HTTP clients in peer lists.
fn ws_peer(peer_id: peer::Id, client: SocketAddr, event: AnnounceEvent, left: NumberOfBytes) -> Peer {
    Peer {
        peer_id,
        peer_addr: SocketAddr::new(client.ip(), 0),
        updated: CurrentClock::now(),
        uploaded: NumberOfBytes::new(0),
        downloaded: NumberOfBytes::new(0),
        left,
        event,
    }
}

fn send_json<T: Serialize>(services: &WsServices, session_id: SessionId, value: &T) {
    match serde_json::to_string(value) {
        Ok(frame) => {
            let _delivered = services.registry.send_to(session_id, frame);
        }
        Err(error) => {
            tracing::error!(%error, "failed to serialize ws frame");
        }
    }
}

fn send_stats_event(services: &WsServices, event: statistics::event::Event) {
    if let Some(sender) = services.stats_event_sender.as_ref() {
        drop(sender.send_event(event));
    }
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr, SocketAddr};
    use std::sync::Arc;

    use shoal_tracker_configuration::Configuration;
    use shoal_tracker_core::announce_handler::AnnounceHandler;
    use shoal_tracker_core::scrape_handler::ScrapeHandler;
    use shoal_tracker_core::swarm::repository::in_memory::InMemorySwarmRepository;
    use tokio::sync::mpsc;

    use crate::servers::ws::handlers::{handle_frame, WsServices};
    use crate::servers::ws::registry::SessionRegistry;
    use crate::servers::ws::session::RateLimiter;

    const INFO_HASH_HEX: &str = "3b245504cf5f11bbdbe1201cea6a6bf45aee1bc0";
    const PEER_ONE_HEX: &str = "2d71423030303030303030303030303030303031";
    const PEER_TWO_HEX: &str = "2d71423030303030303030303030303030303032";

    fn initialize_services() -> (WsServices, Arc<InMemorySwarmRepository>) {
        let config = Configuration::default();
        let in_memory_swarm_repository = Arc::new(InMemorySwarmRepository::default());

        let services = WsServices {
            announce_handler: Arc::new(AnnounceHandler::new(&config.core, &in_memory_swarm_repository)),
            scrape_handler: Arc::new(ScrapeHandler::new(&config.core, &in_memory_swarm_repository)),
            stats_event_sender: Arc::new(None),
            registry: Arc::new(SessionRegistry::default()),
            config: config.ws_tracker,
            max_peer_list_length: config.core.max_peer_list_length,
        };

        (services, in_memory_swarm_repository)
    }

    fn client() -> SocketAddr {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::new(126, 0, 0, 1)), 52000)
    }

    fn announce_frame(peer_id_hex: &str, offers: &str) -> String {
        format!(
            r#"{{"action":"announce","info_hash":"{INFO_HASH_HEX}","peer_id":"{peer_id_hex}","left":0{offers}}}"#
        )
    }

    #[tokio::test]
    async fn it_should_register_the_announced_peer_and_reply_with_the_swarm_stats() {
        let (services, repository) = initialize_services();

        let (sender, mut receiver) = mpsc::unbounded_channel();
        let session_id = services.registry.register(sender);
        let mut limiter = RateLimiter::new(10, 10);

        handle_frame(&announce_frame(PEER_ONE_HEX, ""), session_id, client(), &services, &mut limiter);

        let frame = receiver.try_recv().unwrap();
        let response: serde_json::Value = serde_json::from_str(&frame).unwrap();

        assert_eq!(response["action"], "announce");
        assert_eq!(response["info_hash"], INFO_HASH_HEX);
        assert_eq!(response["complete"], 1);

        // The browser peer is stored with port 0: tracked, never dialable.
        let info_hash = INFO_HASH_HEX.parse().unwrap();
        let peers = repository.get_swarm_peers(&info_hash, None);
        assert_eq!(peers.len(), 1);
        assert_eq!(peers[0].peer_addr.port(), 0);
    }

    #[tokio::test]
    async fn it_should_relay_offers_to_another_member_of_the_swarm() {
        let (services, _repository) = initialize_services();
        let mut limiter = RateLimiter::new(10, 10);

        // First peer joins and stays connected.
        let (sender_one, mut receiver_one) = mpsc::unbounded_channel();
        let session_one = services.registry.register(sender_one);
        handle_frame(&announce_frame(PEER_ONE_HEX, ""), session_one, client(), &services, &mut limiter);
        let _own_response = receiver_one.try_recv().unwrap();

        // Second peer announces with an offer.
        let (sender_two, mut receiver_two) = mpsc::unbounded_channel();
        let session_two = services.registry.register(sender_two);
        let offers = r#","offers":[{"offer":{"type":"offer","sdp":"v=0"},"offer_id":"abcd"}],"numwant":5"#;
        handle_frame(&announce_frame(PEER_TWO_HEX, offers), session_two, client(), &services, &mut limiter);
        let _own_response = receiver_two.try_recv().unwrap();

        // The offer lands on the first peer's socket.
        let relayed: serde_json::Value = serde_json::from_str(&receiver_one.try_recv().unwrap()).unwrap();

        assert_eq!(relayed["action"], "announce");
        assert_eq!(relayed["peer_id"], PEER_TWO_HEX);
        assert_eq!(relayed["offer_id"], "abcd");
        assert_eq!(relayed["offer"]["sdp"], "v=0");
    }

    #[tokio::test]
    async fn it_should_relay_an_answer_back_to_the_offering_peer() {
        let (services, _repository) = initialize_services();
        let mut limiter = RateLimiter::new(10, 10);

        let (sender_one, mut receiver_one) = mpsc::unbounded_channel();
        let session_one = services.registry.register(sender_one);
        handle_frame(&announce_frame(PEER_ONE_HEX, ""), session_one, client(), &services, &mut limiter);
        let _own_response = receiver_one.try_recv().unwrap();

        let (sender_two, _receiver_two) = mpsc::unbounded_channel();
        let session_two = services.registry.register(sender_two);

        let answer_frame = format!(
            r#"{{"action":"announce","info_hash":"{INFO_HASH_HEX}","peer_id":"{PEER_TWO_HEX}",
               "to_peer_id":"{PEER_ONE_HEX}","answer":{{"type":"answer","sdp":"v=0"}},"offer_id":"abcd"}}"#
        );
        handle_frame(&answer_frame, session_two, client(), &services, &mut limiter);

        let relayed: serde_json::Value = serde_json::from_str(&receiver_one.try_recv().unwrap()).unwrap();

        assert_eq!(relayed["action"], "announce");
        assert_eq!(relayed["peer_id"], PEER_TWO_HEX);
        assert_eq!(relayed["answer"]["type"], "answer");
        assert_eq!(relayed["offer_id"], "abcd");
    }

    #[tokio::test]
    async fn it_should_warn_and_drop_announces_over_the_rate_limit() {
        let (services, repository) = initialize_services();

        let (sender, mut receiver) = mpsc::unbounded_channel();
        let session_id = services.registry.register(sender);

        // A bucket with a single token: the second announce is over the
        // limit.
        let mut limiter = RateLimiter::new(1, 1);

        handle_frame(&announce_frame(PEER_ONE_HEX, ""), session_id, client(), &services, &mut limiter);
        let _own_response = receiver.try_recv().unwrap();

        handle_frame(&announce_frame(PEER_TWO_HEX, ""), session_id, client(), &services, &mut limiter);

        let warning: serde_json::Value = serde_json::from_str(&receiver.try_recv().unwrap()).unwrap();
        assert_eq!(warning["action"], "warning");

        // The dropped announce never reached the swarm.
        let info_hash = INFO_HASH_HEX.parse().unwrap();
        assert_eq!(repository.get_swarm_peers(&info_hash, None).len(), 1);
    }

    #[tokio::test]
    async fn it_should_answer_a_scrape_over_the_socket() {
        let (services, _repository) = initialize_services();
        let mut limiter = RateLimiter::new(10, 10);

        let (sender, mut receiver) = mpsc::unbounded_channel();
        let session_id = services.registry.register(sender);

        handle_frame(&announce_frame(PEER_ONE_HEX, ""), session_id, client(), &services, &mut limiter);
        let _own_response = receiver.try_recv().unwrap();

        let scrape_frame = format!(r#"{{"action":"scrape","info_hash":"{INFO_HASH_HEX}"}}"#);
        handle_frame(&scrape_frame, session_id, client(), &services, &mut limiter);

        let response: serde_json::Value = serde_json::from_str(&receiver.try_recv().unwrap()).unwrap();

        assert_eq!(response["action"], "scrape");
        assert_eq!(response["files"][INFO_HASH_HEX]["complete"], 1);
    }

    #[tokio::test]
    async fn it_should_reject_an_invalid_frame_with_a_failure_reason() {
        let (services, _repository) = initialize_services();
        let mut limiter = RateLimiter::new(10, 10);

        let (sender, mut receiver) = mpsc::unbounded_channel();
        let session_id = services.registry.register(sender);

        handle_frame("not json", session_id, client(), &services, &mut limiter);

        let response: serde_json::Value = serde_json::from_str(&receiver.try_recv().unwrap()).unwrap();

        assert_eq!(response["failure reason"], "invalid message");
    }
}
