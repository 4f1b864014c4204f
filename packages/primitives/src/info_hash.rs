//! The identifier of the content/swarm being tracked.
use std::fmt;
use std::str::FromStr;

/// `BitTorrent` infohash. The 20-byte identifier of a torrent, used by the
/// tracker as the key of the swarm the torrent belongs to.
///
/// The tracker only ever treats it as an opaque byte array; whether it is a
/// SHA-1 of a v1 `info` dictionary or the truncated v2 hash makes no
/// difference to swarm bookkeeping.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InfoHash(pub [u8; 20]);

impl InfoHash {
    /// The number of bytes of an infohash.
    pub const LENGTH: usize = 20;

    #[must_use]
    pub fn from_bytes(bytes: &[u8; 20]) -> Self {
        Self(*bytes)
    }

    #[must_use]
    pub fn bytes(&self) -> [u8; 20] {
        self.0
    }
}

impl fmt::Display for InfoHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for InfoHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InfoHash({self})")
    }
}

impl From<[u8; 20]> for InfoHash {
    fn from(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }
}

impl TryFrom<&[u8]> for InfoHash {
    type Error = InvalidInfoHash;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let bytes: [u8; 20] = bytes.try_into().map_err(|_| InvalidInfoHash::InvalidLength(bytes.len()))?;
        Ok(Self(bytes))
    }
}

impl FromStr for InfoHash {
    type Err = InvalidInfoHash;

    /// Parses the 40-character lowercase or uppercase hex representation.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != Self::LENGTH * 2 {
            return Err(InvalidInfoHash::InvalidLength(s.len() / 2));
        }

        let mut bytes = [0u8; 20];
        for (idx, chunk) in s.as_bytes().chunks_exact(2).enumerate() {
            let hex = std::str::from_utf8(chunk).map_err(|_| InvalidInfoHash::InvalidHexDigit)?;
            bytes[idx] = u8::from_str_radix(hex, 16).map_err(|_| InvalidInfoHash::InvalidHexDigit)?;
        }

        Ok(Self(bytes))
    }
}

impl serde::Serialize for InfoHash {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for InfoHash {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex: String = serde::Deserialize::deserialize(deserializer)?;
        hex.parse().map_err(serde::de::Error::custom)
    }
}

/// Error returned when the bytes or string being converted do not represent
/// a valid infohash.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidInfoHash {
    #[error("invalid infohash length: {0} bytes, expected 20")]
    InvalidLength(usize),

    #[error("invalid hex digit in infohash")]
    InvalidHexDigit,
}

pub mod fixture {
    use super::InfoHash;

    /// Deterministically generates an infohash from a seed. Only useful to
    /// produce many distinct swarms in tests and benchmarks.
    #[must_use]
    pub fn gen_seeded_infohash(seed: &u64) -> InfoHash {
        let mut bytes = [0u8; 20];
        for (idx, byte) in seed.to_be_bytes().iter().enumerate() {
            bytes[idx] = *byte;
            bytes[idx + 8] = byte.wrapping_mul(31);
        }
        InfoHash(bytes)
    }
}

#[cfg(test)]
mod tests {

    mod the_info_hash {
        use std::str::FromStr;

        use crate::info_hash::{InfoHash, InvalidInfoHash};

        #[test]
        fn it_should_be_parsed_from_a_40_char_hex_string() {
            let info_hash = InfoHash::from_str("3b245504cf5f11bbdbe1201cea6a6bf45aee1bc0").unwrap();

            assert_eq!(info_hash.bytes()[0], 0x3b);
            assert_eq!(info_hash.bytes()[19], 0xc0);
        }

        #[test]
        fn it_should_be_displayed_as_a_lowercase_hex_string() {
            let info_hash: InfoHash = [255u8; 20].into();

            assert_eq!(
                info_hash,
                InfoHash::from_str("FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF").unwrap()
            );
            assert_eq!(info_hash.to_string(), "ffffffffffffffffffffffffffffffffffffffff");
        }

        #[test]
        fn it_should_reject_strings_with_the_wrong_length() {
            assert_eq!(
                "3b2455".parse::<InfoHash>().unwrap_err(),
                InvalidInfoHash::InvalidLength(3)
            );
        }

        #[test]
        fn it_should_reject_byte_slices_that_are_not_20_bytes_long() {
            let err = InfoHash::try_from(&[0u8; 19][..]).unwrap_err();

            assert_eq!(err, InvalidInfoHash::InvalidLength(19));
        }

        #[test]
        fn it_should_generate_distinct_seeded_fixtures() {
            use crate::info_hash::fixture::gen_seeded_infohash;

            assert_ne!(gen_seeded_infohash(&0), gen_seeded_infohash(&1));
        }
    }
}
