//! Decoding of the BEP 15 request packets.
use shoal_tracker_configuration::MAX_SCRAPE_TORRENTS;
use shoal_tracker_primitives::announce_event::AnnounceEvent;
use shoal_tracker_primitives::info_hash::InfoHash;
use shoal_tracker_primitives::peer;
use shoal_tracker_primitives::NumberOfBytes;

/// The magic protocol identifier every `connect` request must carry.
pub const PROTOCOL_ID: u64 = 0x0417_2710_1980;

const ACTION_CONNECT: u32 = 0;
const ACTION_ANNOUNCE: u32 = 1;
const ACTION_SCRAPE: u32 = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Connect(ConnectRequest),
    Announce(AnnounceRequest),
    Scrape(ScrapeRequest),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectRequest {
    pub transaction_id: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnnounceRequest {
    pub connection_id: u64,
    pub transaction_id: u32,
    pub info_hash: InfoHash,
    pub peer_id: peer::Id,
    pub downloaded: NumberOfBytes,
    pub left: NumberOfBytes,
    pub uploaded: NumberOfBytes,
    pub event: AnnounceEvent,
    /// The IP the client claims; `0` means "use the source address". The
    /// tracker always uses the source address, like most trackers do, so
    /// the field is decoded but never trusted.
    pub ip_address: u32,
    /// Client-chosen key for address-change detection. Unused.
    pub key: u32,
    pub num_want: i32,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeRequest {
    pub connection_id: u64,
    pub transaction_id: u32,
    pub info_hashes: Vec<InfoHash>,
}

/// Why a packet could not be decoded. Every variant is handled the same
/// way: the packet is dropped without a reply.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseRequestError {
    #[error("packet too short: {len} bytes")]
    TooShort { len: usize },

    #[error("unknown action: {action}")]
    UnknownAction { action: u32 },

    #[error("connect request with a bad protocol id")]
    BadProtocolId,

    #[error("scrape body is not a whole number of infohashes")]
    BadScrapeBody,

    #[error("scrape request with more than {MAX_SCRAPE_TORRENTS} infohashes")]
    TooManyInfoHashes,
}

impl Request {
    /// Decodes one datagram.
    ///
    /// # Errors
    ///
    /// Will return an error for any packet that is not a well-formed BEP 15
    /// request. Callers drop such packets silently.
    pub fn parse(data: &[u8]) -> Result<Request, ParseRequestError> {
        if data.len() < 16 {
            return Err(ParseRequestError::TooShort { len: data.len() });
        }

        let action = read_u32(data, 8);

        match action {
            ACTION_CONNECT => {
                if read_u64(data, 0) != PROTOCOL_ID {
                    return Err(ParseRequestError::BadProtocolId);
                }

                Ok(Request::Connect(ConnectRequest {
                    transaction_id: read_u32(data, 12),
                }))
            }
            ACTION_ANNOUNCE => {
                if data.len() < 98 {
                    return Err(ParseRequestError::TooShort { len: data.len() });
                }

                Ok(Request::Announce(AnnounceRequest {
                    connection_id: read_u64(data, 0),
                    transaction_id: read_u32(data, 12),
                    info_hash: read_info_hash(data, 16),
                    peer_id: read_peer_id(data, 36),
                    downloaded: read_number_of_bytes(data, 56),
                    left: read_number_of_bytes(data, 64),
                    uploaded: read_number_of_bytes(data, 72),
                    event: AnnounceEvent::from_udp_id(read_u32(data, 80)),
                    ip_address: read_u32(data, 84),
                    key: read_u32(data, 88),
                    num_want: read_i32(data, 92),
                    port: read_u16(data, 96),
                }))
            }
            ACTION_SCRAPE => {
                let body = &data[16..];

                if body.is_empty() {
                    return Err(ParseRequestError::TooShort { len: data.len() });
                }

                if body.len() % InfoHash::LENGTH != 0 {
                    return Err(ParseRequestError::BadScrapeBody);
                }

                if body.len() / InfoHash::LENGTH > MAX_SCRAPE_TORRENTS {
                    return Err(ParseRequestError::TooManyInfoHashes);
                }

                let info_hashes = body
                    .chunks_exact(InfoHash::LENGTH)
                    .map(|chunk| read_info_hash(chunk, 0))
                    .collect();

                Ok(Request::Scrape(ScrapeRequest {
                    connection_id: read_u64(data, 0),
                    transaction_id: read_u32(data, 12),
                    info_hashes,
                }))
            }
            action => Err(ParseRequestError::UnknownAction { action }),
        }
    }
}

fn read_u16(data: &[u8], offset: usize) -> u16 {
    u16::from_be_bytes([data[offset], data[offset + 1]])
}

fn read_u32(data: &[u8], offset: usize) -> u32 {
    u32::from_be_bytes([data[offset], data[offset + 1], data[offset + 2], data[offset + 3]])
}

#[allow(clippy::cast_possible_wrap)]
fn read_i32(data: &[u8], offset: usize) -> i32 {
    read_u32(data, offset) as i32
}

fn read_u64(data: &[u8], offset: usize) -> u64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&data[offset..offset + 8]);
    u64::from_be_bytes(bytes)
}

#[allow(clippy::cast_possible_wrap)]
fn read_number_of_bytes(data: &[u8], offset: usize) -> NumberOfBytes {
    NumberOfBytes::new(read_u64(data, offset) as i64)
}

fn read_info_hash(data: &[u8], offset: usize) -> InfoHash {
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&data[offset..offset + 20]);
    InfoHash::from_bytes(&bytes)
}

fn read_peer_id(data: &[u8], offset: usize) -> peer::Id {
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&data[offset..offset + 20]);
    peer::Id(bytes)
}
