//! WebSocket tracker for browser peers, speaking the WebTorrent signaling
//! protocol.
//!
//! Browser peers cannot open TCP/UDP sockets, so a swarm of browsers works
//! over WebRTC data channels. WebRTC needs an out-of-band rendezvous to
//! exchange session descriptions (SDP offers and answers); the tracker is
//! that rendezvous. It never relays torrent data, only signaling.
//!
//! Each WebSocket connection is one peer session. Messages are JSON text
//! frames. A browser announces together with a batch of WebRTC offers:
//!
//! ```json
//! {
//!   "action": "announce",
//!   "info_hash": "3b245504cf5f11bbdbe1201cea6a6bf45aee1bc0",
//!   "peer_id": "2d7142303030303030303030303030303030303031",
//!   "numwant": 10,
//!   "left": 0,
//!   "offers": [{"offer": {"type": "offer", "sdp": "..."}, "offer_id": "abcd"}]
//! }
//! ```
//!
//! The tracker registers the peer in the swarm, answers with the swarm
//! stats, and pushes each offer to a distinct randomly chosen member of the
//! swarm. A member that wants to connect back sends its answer with the
//! offerer's id in `to_peer_id`, and the tracker relays it to the offering
//! session. Closing the socket is an implicit `stopped` announce for every
//! swarm the session joined.
//!
//! WebSocket peers are stored in the swarms with port `0`: they are not
//! dialable and must never appear in the compact peer lists served to
//! UDP/HTTP clients.
//!
//! A per-session token bucket bounds the announce rate; announces over the
//! limit are dropped with a `{"action": "warning"}` frame instead of
//! killing the session.
pub mod handlers;
pub mod messages;
pub mod registry;
pub mod server;
pub mod session;
