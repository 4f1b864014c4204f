//! The JSON frames exchanged with browser peers.
//!
//! `info_hash` and `peer_id` travel as 40-character hex strings: JSON text
//! frames cannot carry raw bytes losslessly. SDP payloads and offer ids are
//! relayed verbatim as opaque JSON values.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A message received from a peer session.
#[derive(Debug, Deserialize)]
#[serde(tag = "action")]
pub enum Inbound {
    #[serde(rename = "announce")]
    Announce(Box<AnnounceMessage>),

    #[serde(rename = "scrape")]
    Scrape(ScrapeMessage),
}

/// An announce frame. The same action carries three different intents:
/// a plain announce, an announce with WebRTC offers to fan out, and an
/// answer relay (when `answer` and `to_peer_id` are present).
#[derive(Debug, Deserialize)]
pub struct AnnounceMessage {
    pub info_hash: String,
    pub peer_id: String,

    #[serde(default)]
    pub numwant: Option<u32>,

    #[serde(default)]
    pub uploaded: Option<i64>,

    #[serde(default)]
    pub downloaded: Option<i64>,

    #[serde(default)]
    pub left: Option<i64>,

    #[serde(default)]
    pub event: Option<String>,

    #[serde(default)]
    pub offers: Option<Vec<OfferEntry>>,

    #[serde(default)]
    pub answer: Option<serde_json::Value>,

    #[serde(default)]
    pub to_peer_id: Option<String>,

    #[serde(default)]
    pub offer_id: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct OfferEntry {
    pub offer: serde_json::Value,
    pub offer_id: serde_json::Value,
}

/// A scrape frame. `info_hash` may be one hash, a list, or absent (absent
/// means "every swarm", subject to the full-scrape setting).
#[derive(Debug, Deserialize)]
pub struct ScrapeMessage {
    #[serde(default)]
    pub info_hash: Option<InfoHashArg>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum InfoHashArg {
    One(String),
    Many(Vec<String>),
}

impl InfoHashArg {
    #[must_use]
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            InfoHashArg::One(hash) => vec![hash.clone()],
            InfoHashArg::Many(hashes) => hashes.clone(),
        }
    }
}

/// The reply to an announce frame.
#[derive(Debug, Serialize)]
pub struct AnnounceResponse {
    pub action: &'static str,
    pub info_hash: String,
    pub interval: u32,
    pub complete: u32,
    pub incomplete: u32,
}

/// An offer pushed to a selected swarm member.
#[derive(Debug, Serialize)]
pub struct OfferRelay {
    pub action: &'static str,
    pub info_hash: String,
    /// The peer the offer comes from.
    pub peer_id: String,
    pub offer: serde_json::Value,
    pub offer_id: serde_json::Value,
}

/// An answer relayed back to the offering peer.
#[derive(Debug, Serialize)]
pub struct AnswerRelay {
    pub action: &'static str,
    pub info_hash: String,
    /// The peer the answer comes from.
    pub peer_id: String,
    pub answer: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offer_id: Option<serde_json::Value>,
}

/// The reply to a scrape frame.
#[derive(Debug, Serialize)]
pub struct ScrapeResponse {
    pub action: &'static str,
    pub files: BTreeMap<String, ScrapeFile>,
}

#[derive(Debug, Serialize)]
pub struct ScrapeFile {
    pub complete: u32,
    pub incomplete: u32,
    pub downloaded: u32,
}

/// A non-fatal complaint; the session stays open.
#[derive(Debug, Serialize)]
pub struct Warning {
    pub action: &'static str,
    pub message: String,
}

impl Warning {
    #[must_use]
    pub fn new(message: &str) -> Self {
        Self {
            action: "warning",
            message: message.to_string(),
        }
    }
}

/// A fatal complaint about one frame, in the tracker's classic shape.
#[derive(Debug, Serialize)]
pub struct Failure {
    #[serde(rename = "failure reason")]
    pub failure_reason: String,
}

impl Failure {
    #[must_use]
    pub fn new(failure_reason: &str) -> Self {
        Self {
            failure_reason: failure_reason.to_string(),
        }
    }
}
