//! The `scrape` request, validated out of the raw query.
use shoal_tracker_configuration::MAX_SCRAPE_TORRENTS;
use shoal_tracker_primitives::info_hash::InfoHash;

use super::super::query::Query;

/// A validated scrape request. The `info_hash` param is repeatable; no
/// param at all means "every swarm" (served only when full scrapes are
/// enabled).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scrape {
    pub info_hashes: Vec<InfoHash>,
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseScrapeError {
    #[error("invalid param info_hash")]
    InvalidInfoHash,

    #[error("too many info_hash params")]
    TooManyInfoHashes,
}

impl TryFrom<&Query> for Scrape {
    type Error = ParseScrapeError;

    fn try_from(query: &Query) -> Result<Self, Self::Error> {
        let raw_info_hashes = query.all("info_hash");

        if raw_info_hashes.len() > MAX_SCRAPE_TORRENTS {
            return Err(ParseScrapeError::TooManyInfoHashes);
        }

        let info_hashes = raw_info_hashes
            .iter()
            .map(|bytes| InfoHash::try_from(bytes.as_slice()).map_err(|_| ParseScrapeError::InvalidInfoHash))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { info_hashes })
    }
}
