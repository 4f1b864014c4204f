//! Swarm data structures.
//!
//! This module defines the primary data structures used to store and manage
//! swarm data within the tracker. In `BitTorrent` terminology, a "swarm" is
//! the collection of peers that are sharing or downloading a given torrent.
//!
//! There are two main types of data stored:
//!
//! - **Swarm Entry** ([`entry::SwarmEntry`]): everything the tracker stores
//!   for a single torrent, including the list of peers currently in the
//!   swarm. This data is crucial for peers to locate each other and initiate
//!   downloads.
//!
//! - **Swarm Metadata** (`SwarmMetadata`): aggregate data derived from a
//!   swarm entry: the number of active seeders, the number of active
//!   leechers, and the historical number of completed downloads.
//!
//! We can represent the data stored in memory internally by the tracker with
//! this JSON object:
//!
//! ```json
//! {
//!     "c1277613db1d28709b034a017ab2cae4be07ae10": {
//!         "downloaded": 0,
//!         "peers": {
//!             "-qB00000000000000001@2.137.87.41:1754": {
//!                 "peer_id": "-qB00000000000000001",
//!                 "peer_addr": "2.137.87.41:1754",
//!                 "updated": 1672419840,
//!                 "uploaded": 120,
//!                 "downloaded": 60,
//!                 "left": 60,
//!                 "event": "started"
//!             }
//!         }
//!     }
//! }
//! ```
//!
//! That JSON object does not exist, it's only a representation of the
//! repository contents. Peers are keyed by the pair (peer id, address) so
//! identity is always scoped to one client endpoint within one swarm.
//!
//! > **NOTICE**: `complete` or `completed` peers are the peers that have
//! > completed downloading, but only the active ones are considered
//! > "seeders".
//!
//! Swarm state is soft by design: nothing is persisted, and a restarted
//! tracker rebuilds the swarms from the re-announces of the peers.
pub mod entry;
pub mod manager;
pub mod repository;
