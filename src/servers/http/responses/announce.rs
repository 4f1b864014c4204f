//! The bencoded `announce` response.
use std::net::{SocketAddrV4, SocketAddrV6};

use shoal_tracker_primitives::core::AnnounceData;
use shoal_tracker_primitives::peer;

use super::super::requests::announce::Compact;
use super::{write_bytes, write_int};

/// The announce response body.
///
/// Compact form ([BEP 23](https://www.bittorrent.org/beps/bep_0023.html)):
/// `peers` is a byte string of 6-byte entries; IPv6 peers go into the
/// separate `peers6` key as 18-byte entries
/// ([BEP 7](https://www.bittorrent.org/beps/bep_0007.html)).
///
/// Verbose form (`compact=0`, [BEP 3](https://www.bittorrent.org/beps/bep_0003.html)):
/// `peers` is a list of `{ip, peer id, port}` dictionaries for both
/// families.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Announce {
    pub interval: u32,
    pub interval_min: u32,
    pub complete: u32,
    pub incomplete: u32,
    pub peers: Peers,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Peers {
    Compact {
        v4: Vec<SocketAddrV4>,
        v6: Vec<SocketAddrV6>,
    },
    Verbose(Vec<(peer::Id, std::net::SocketAddr)>),
}

impl Announce {
    #[must_use]
    pub fn from_data(data: &AnnounceData, compact: Compact) -> Self {
        let peers = match compact {
            Compact::Accepted => {
                let mut v4 = Vec::new();
                let mut v6 = Vec::new();

                for peer in &data.peers {
                    match peer.peer_addr {
                        std::net::SocketAddr::V4(addr) => v4.push(addr),
                        std::net::SocketAddr::V6(addr) => v6.push(addr),
                    }
                }

                Peers::Compact { v4, v6 }
            }
            Compact::NotAccepted => {
                Peers::Verbose(data.peers.iter().map(|peer| (peer.peer_id, peer.peer_addr)).collect())
            }
        };

        Self {
            interval: data.policy.interval,
            interval_min: data.policy.interval_min,
            complete: data.stats.complete,
            incomplete: data.stats.incomplete,
            peers,
        }
    }

    /// The bencoded body. Keys in sorted order: `complete`, `incomplete`,
    /// `interval`, `min interval`, `peers` (and `peers6`).
    #[must_use]
    pub fn body(&self) -> Vec<u8> {
        let mut output = Vec::new();

        output.push(b'd');

        write_bytes(&mut output, b"complete");
        write_int(&mut output, i64::from(self.complete));

        write_bytes(&mut output, b"incomplete");
        write_int(&mut output, i64::from(self.incomplete));

        write_bytes(&mut output, b"interval");
        write_int(&mut output, i64::from(self.interval));

        write_bytes(&mut output, b"min interval");
        write_int(&mut output, i64::from(self.interval_min));

        match &self.peers {
            Peers::Compact { v4, v6 } => {
                let mut compact_v4 = Vec::with_capacity(v4.len() * 6);
                for addr in v4 {
                    compact_v4.extend_from_slice(&addr.ip().octets());
                    compact_v4.extend_from_slice(&addr.port().to_be_bytes());
                }

                write_bytes(&mut output, b"peers");
                write_bytes(&mut output, &compact_v4);

                if !v6.is_empty() {
                    let mut compact_v6 = Vec::with_capacity(v6.len() * 18);
                    for addr in v6 {
                        compact_v6.extend_from_slice(&addr.ip().octets());
                        compact_v6.extend_from_slice(&addr.port().to_be_bytes());
                    }

                    write_bytes(&mut output, b"peers6");
                    write_bytes(&mut output, &compact_v6);
                }
            }
            Peers::Verbose(peers) => {
                write_bytes(&mut output, b"peers");
                output.push(b'l');

                for (peer_id, peer_addr) in peers {
                    output.push(b'd');

                    write_bytes(&mut output, b"ip");
                    write_bytes(&mut output, peer_addr.ip().to_string().as_bytes());

                    write_bytes(&mut output, b"peer id");
                    write_bytes(&mut output, &peer_id.0);

                    write_bytes(&mut output, b"port");
                    write_int(&mut output, i64::from(peer_addr.port()));

                    output.push(b'e');
                }

                output.push(b'e');
            }
        }

        output.push(b'e');

        output
    }
}

#[cfg(test)]
mod tests {

    mod the_announce_response {
        use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};

        use shoal_tracker_primitives::peer;

        use crate::servers::http::responses::announce::{Announce, Peers};

        fn sample_response(peers: Peers) -> Announce {
            Announce {
                interval: 120,
                interval_min: 120,
                complete: 1,
                incomplete: 0,
                peers,
            }
        }

        #[test]
        fn it_should_bencode_the_compact_form() {
            let response = sample_response(Peers::Compact {
                v4: vec![SocketAddrV4::new(Ipv4Addr::new(126, 0, 0, 1), 0x1b39)],
                v6: vec![],
            });

            let mut expected: Vec<u8> =
                b"d8:completei1e10:incompletei0e8:intervali120e12:min intervali120e5:peers6:".to_vec();
            expected.extend_from_slice(&[126, 0, 0, 1, 0x1b, 0x39]);
            expected.push(b'e');

            assert_eq!(response.body(), expected);
        }

        #[test]
        fn it_should_omit_the_peers6_key_when_there_are_no_ipv6_peers() {
            let response = sample_response(Peers::Compact { v4: vec![], v6: vec![] });

            let body = response.body();

            assert!(!String::from_utf8_lossy(&body).contains("peers6"));
        }

        #[test]
        fn it_should_bencode_the_verbose_form() {
            let response = sample_response(Peers::Verbose(vec![(
                peer::Id(*b"-qB00000000000000001"),
                SocketAddr::new(Ipv4Addr::new(126, 0, 0, 1).into(), 6969),
            )]));

            let expected = b"d8:completei1e10:incompletei0e8:intervali120e12:min intervali120e\
                5:peersld2:ip9:126.0.0.17:peer id20:-qB000000000000000014:porti6969eee"
                .to_vec();

            assert_eq!(response.body(), expected);
        }
    }
}
