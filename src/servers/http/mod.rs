//! HTTP tracker, implementing the announce/scrape conventions from
//! [BEP 3](https://www.bittorrent.org/beps/bep_0003.html),
//! [BEP 7](https://www.bittorrent.org/beps/bep_0007.html),
//! [BEP 23](https://www.bittorrent.org/beps/bep_0023.html) and
//! [BEP 48](https://www.bittorrent.org/beps/bep_0048.html).
//!
//! Two `GET` endpoints:
//!
//! ```text
//! /announce?info_hash=...&peer_id=...&port=6881&uploaded=0&downloaded=0&left=0&event=started&compact=1&numwant=50
//! /scrape?info_hash=...&info_hash=...
//! ```
//!
//! The classic tracker HTTP quirk: `info_hash` and `peer_id` are
//! percent-encoded **raw bytes**, not text. The query string is therefore
//! parsed from the raw bytes of the request target, never through a generic
//! UTF-8 form decoder (see [`query`]).
//!
//! Responses are bencoded with `Content-Type: text/plain`. Protocol errors
//! are bencoded too and travel with HTTP status `200`: for tracker clients
//! the transport worked fine, the request was just wrong:
//!
//! ```text
//! d14:failure reason17:invalid info_hashe
//! ```
pub mod handlers;
pub mod query;
pub mod requests;
pub mod responses;
pub mod server;
