//! Encoding of the BEP 15 response packets.
use std::net::{IpAddr, SocketAddr};

const ACTION_CONNECT: u32 = 0;
const ACTION_ANNOUNCE: u32 = 1;
const ACTION_SCRAPE: u32 = 2;
const ACTION_ERROR: u32 = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Connect {
        transaction_id: u32,
        connection_id: u64,
    },
    Announce(AnnounceResponse),
    Scrape(ScrapeResponse),
    Error {
        transaction_id: u32,
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnounceResponse {
    pub transaction_id: u32,
    pub interval: u32,
    pub leechers: u32,
    pub seeders: u32,
    /// Encoded as 6-byte entries for IPv4 addresses and 18-byte entries for
    /// IPv6 ones. The handler only puts addresses of the requester's family
    /// here, so one response never mixes entry sizes.
    pub peers: Vec<SocketAddr>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeResponse {
    pub transaction_id: u32,
    /// One entry per requested infohash, in request order.
    pub entries: Vec<ScrapeEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrapeEntry {
    pub seeders: u32,
    pub completed: u32,
    pub leechers: u32,
}

impl Response {
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut packet = Vec::new();

        match self {
            Response::Connect {
                transaction_id,
                connection_id,
            } => {
                packet.extend_from_slice(&ACTION_CONNECT.to_be_bytes());
                packet.extend_from_slice(&transaction_id.to_be_bytes());
                packet.extend_from_slice(&connection_id.to_be_bytes());
            }
            Response::Announce(response) => {
                packet.extend_from_slice(&ACTION_ANNOUNCE.to_be_bytes());
                packet.extend_from_slice(&response.transaction_id.to_be_bytes());
                packet.extend_from_slice(&response.interval.to_be_bytes());
                packet.extend_from_slice(&response.leechers.to_be_bytes());
                packet.extend_from_slice(&response.seeders.to_be_bytes());

                for peer_addr in &response.peers {
                    match peer_addr.ip() {
                        IpAddr::V4(ip) => packet.extend_from_slice(&ip.octets()),
                        IpAddr::V6(ip) => packet.extend_from_slice(&ip.octets()),
                    }
                    packet.extend_from_slice(&peer_addr.port().to_be_bytes());
                }
            }
            Response::Scrape(response) => {
                packet.extend_from_slice(&ACTION_SCRAPE.to_be_bytes());
                packet.extend_from_slice(&response.transaction_id.to_be_bytes());

                for entry in &response.entries {
                    packet.extend_from_slice(&entry.seeders.to_be_bytes());
                    packet.extend_from_slice(&entry.completed.to_be_bytes());
                    packet.extend_from_slice(&entry.leechers.to_be_bytes());
                }
            }
            Response::Error {
                transaction_id,
                message,
            } => {
                packet.extend_from_slice(&ACTION_ERROR.to_be_bytes());
                packet.extend_from_slice(&transaction_id.to_be_bytes());
                packet.extend_from_slice(message.as_bytes());
            }
        }

        packet
    }
}

#[cfg(test)]
mod tests {

    mod encoding_a_response {
        use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

        use crate::servers::udp::response::{AnnounceResponse, Response, ScrapeEntry, ScrapeResponse};

        #[test]
        fn it_should_encode_a_connect_response_in_16_bytes() {
            let bytes = Response::Connect {
                transaction_id: 42,
                connection_id: 0xdead_beef,
            }
            .to_bytes();

            assert_eq!(bytes.len(), 16);
            assert_eq!(&bytes[0..4], &0u32.to_be_bytes());
            assert_eq!(&bytes[4..8], &42u32.to_be_bytes());
            assert_eq!(&bytes[8..16], &0xdead_beef_u64.to_be_bytes());
        }

        #[test]
        fn it_should_encode_ipv4_peers_as_6_byte_entries() {
            let response = Response::Announce(AnnounceResponse {
                transaction_id: 1,
                interval: 120,
                leechers: 1,
                seeders: 2,
                peers: vec![SocketAddr::new(IpAddr::V4(Ipv4Addr::new(126, 0, 0, 1)), 6881)],
            });

            let bytes = response.to_bytes();

            assert_eq!(bytes.len(), 20 + 6);
            assert_eq!(&bytes[20..24], &[126, 0, 0, 1]);
            assert_eq!(&bytes[24..26], &6881u16.to_be_bytes());
        }

        #[test]
        fn it_should_encode_ipv6_peers_as_18_byte_entries() {
            let response = Response::Announce(AnnounceResponse {
                transaction_id: 1,
                interval: 120,
                leechers: 0,
                seeders: 1,
                peers: vec![SocketAddr::new(IpAddr::V6(Ipv6Addr::LOCALHOST), 6881)],
            });

            assert_eq!(response.to_bytes().len(), 20 + 18);
        }

        #[test]
        fn it_should_encode_12_bytes_per_scraped_torrent() {
            let response = Response::Scrape(ScrapeResponse {
                transaction_id: 5,
                entries: vec![
                    ScrapeEntry {
                        seeders: 1,
                        completed: 2,
                        leechers: 3,
                    },
                    ScrapeEntry {
                        seeders: 0,
                        completed: 0,
                        leechers: 0,
                    },
                ],
            });

            let bytes = response.to_bytes();

            assert_eq!(bytes.len(), 8 + 2 * 12);
            assert_eq!(&bytes[8..12], &1u32.to_be_bytes());
            assert_eq!(&bytes[12..16], &2u32.to_be_bytes());
            assert_eq!(&bytes[16..20], &3u32.to_be_bytes());
        }

        #[test]
        fn it_should_encode_an_error_response_with_the_message_after_the_header() {
            let bytes = Response::Error {
                transaction_id: 9,
                message: "Connection ID mismatch.".to_string(),
            }
            .to_bytes();

            assert_eq!(&bytes[0..4], &3u32.to_be_bytes());
            assert_eq!(&bytes[4..8], &9u32.to_be_bytes());
            assert_eq!(&bytes[8..], b"Connection ID mismatch.");
        }
    }
}
