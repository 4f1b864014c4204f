//! The `announce` request, validated out of the raw query.
use std::str::FromStr;

use shoal_tracker_primitives::announce_event::AnnounceEvent;
use shoal_tracker_primitives::info_hash::InfoHash;
use shoal_tracker_primitives::peer;
use shoal_tracker_primitives::NumberOfBytes;

use super::super::query::Query;

/// A validated announce request. Invalid fields are rejected here, before
/// anything reaches the announce handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Announce {
    pub info_hash: InfoHash,
    pub peer_id: peer::Id,
    /// `0` is allowed: it is the peer's explicit signal that it cannot be
    /// contacted directly. Such peers are tracked but never handed out.
    pub port: u16,
    pub uploaded: NumberOfBytes,
    pub downloaded: NumberOfBytes,
    pub left: NumberOfBytes,
    pub event: AnnounceEvent,
    pub compact: Compact,
    pub numwant: Option<u32>,
}

/// Whether the client accepts the compact peer list encoding (BEP 23).
/// Compact is the default; `compact=0` asks for the verbose dictionary
/// list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compact {
    #[default]
    Accepted,
    NotAccepted,
}

/// The reason an announce query was rejected. The message is sent to the
/// client as a bencoded `failure reason`.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseAnnounceError {
    #[error("missing param {name}")]
    MissingParam { name: &'static str },

    #[error("invalid param {name}")]
    InvalidParam { name: &'static str },
}

impl TryFrom<&Query> for Announce {
    type Error = ParseAnnounceError;

    fn try_from(query: &Query) -> Result<Self, Self::Error> {
        let info_hash = query
            .first("info_hash")
            .ok_or(ParseAnnounceError::MissingParam { name: "info_hash" })
            .and_then(|bytes| {
                InfoHash::try_from(bytes).map_err(|_| ParseAnnounceError::InvalidParam { name: "info_hash" })
            })?;

        let peer_id = query
            .first("peer_id")
            .ok_or(ParseAnnounceError::MissingParam { name: "peer_id" })
            .and_then(|bytes| peer::Id::try_from(bytes).map_err(|_| ParseAnnounceError::InvalidParam { name: "peer_id" }))?;

        let port = query
            .first_utf8("port")
            .ok_or(ParseAnnounceError::MissingParam { name: "port" })?
            .parse::<u16>()
            .map_err(|_| ParseAnnounceError::InvalidParam { name: "port" })?;

        let uploaded = parse_bytes_param(query, "uploaded")?;
        let downloaded = parse_bytes_param(query, "downloaded")?;
        let left = parse_bytes_param(query, "left")?;

        let event = match query.first_utf8("event") {
            None => AnnounceEvent::None,
            Some(value) => {
                AnnounceEvent::from_str(value).map_err(|_| ParseAnnounceError::InvalidParam { name: "event" })?
            }
        };

        let compact = match query.first_utf8("compact") {
            None | Some("1") => Compact::Accepted,
            Some("0") => Compact::NotAccepted,
            Some(_) => return Err(ParseAnnounceError::InvalidParam { name: "compact" }),
        };

        let numwant = match query.first_utf8("numwant") {
            None => None,
            Some(value) => Some(
                value
                    .parse::<u32>()
                    .map_err(|_| ParseAnnounceError::InvalidParam { name: "numwant" })?,
            ),
        };

        Ok(Self {
            info_hash,
            peer_id,
            port,
            uploaded,
            downloaded,
            left,
            event,
            compact,
            numwant,
        })
    }
}

fn parse_bytes_param(query: &Query, name: &'static str) -> Result<NumberOfBytes, ParseAnnounceError> {
    match query.first_utf8(name) {
        // Missing byte counters are tolerated; plenty of clients omit them
        // on the first announce.
        None => Ok(NumberOfBytes::new(0)),
        Some(value) => value
            .parse::<i64>()
            .map(NumberOfBytes::new)
            .map_err(|_| ParseAnnounceError::InvalidParam { name }),
    }
}
