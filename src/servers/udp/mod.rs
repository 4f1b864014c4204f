//! UDP tracker, implementing the UDP tracker protocol from
//! [BEP 15](https://www.bittorrent.org/beps/bep_0015.html).
//!
//! UDP is the cheapest way to talk to a tracker: no connection setup, no
//! HTTP framing, fixed binary packets. Because UDP source addresses can be
//! spoofed, the protocol starts with a `connect` handshake that hands the
//! client an unguessable connection ID bound to its source address; the
//! client must echo it in every `announce` and `scrape` request.
//!
//! All integer fields are fixed-width big-endian.
//!
//! ## Connect
//!
//! ```text
//! Request:            |  Response:
//! 0  protocol_id i64  |  0  action    i32 (0)
//! 8  action      i32  |  4  transaction_id i32
//! 12 transaction i32  |  8  connection_id  i64
//! ```
//!
//! `protocol_id` is the magic constant `0x0417_2710_1980`.
//!
//! ## Announce
//!
//! ```text
//! Request:                  |  Response:
//! 0  connection_id  i64     |  0  action     i32 (1)
//! 8  action         i32     |  4  transaction_id i32
//! 12 transaction_id i32     |  8  interval   i32
//! 16 info_hash      20B     |  12 leechers   i32
//! 36 peer_id        20B     |  16 seeders    i32
//! 56 downloaded     i64     |  20 peers: 6 bytes each (IPv4)
//! 64 left           i64     |            18 bytes each (IPv6)
//! 72 uploaded       i64     |
//! 80 event          i32     |
//! 84 ip_address     u32     |
//! 88 key            u32     |
//! 92 num_want       i32     |
//! 96 port           u16     |
//! ```
//!
//! ## Scrape
//!
//! ```text
//! Request:                  |  Response:
//! 0  connection_id  i64     |  0  action     i32 (2)
//! 8  action         i32     |  4  transaction_id i32
//! 12 transaction_id i32     |  8  per requested infohash:
//! 16 info_hashes    N×20B   |     seeders i32, completed i32, leechers i32
//! ```
//!
//! ## Error
//!
//! ```text
//! 0  action         i32 (3)
//! 4  transaction_id i32
//! 8  message        ASCII
//! ```
//!
//! Per the BEP 15 anti-amplification guidance, packets that are too short
//! for their declared action, carry an unknown action, or exceed the largest
//! legal request are dropped without a reply.
pub mod connection_cookie;
pub mod handlers;
pub mod request;
pub mod response;
pub mod server;

/// The biggest legal request: a scrape for
/// [`MAX_SCRAPE_TORRENTS`](shoal_tracker_configuration::MAX_SCRAPE_TORRENTS)
/// torrents. Anything longer is dropped unread.
pub const MAX_REQUEST_SIZE: usize = 16 + shoal_tracker_configuration::MAX_SCRAPE_TORRENTS * 20;
