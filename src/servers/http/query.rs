//! Raw-byte query string parsing.
//!
//! `info_hash` and `peer_id` are arbitrary bytes percent-encoded into the
//! URL, so query values must stay `Vec<u8>` after decoding; forcing them
//! through `String` corrupts them. Parameter names are plain ASCII.
use multimap::MultiMap;
use percent_encoding::percent_decode_str;

/// A parsed query string: parameter name to one or more raw-byte values.
#[derive(Debug, Default)]
pub struct Query {
    params: MultiMap<String, Vec<u8>>,
}

impl Query {
    #[must_use]
    pub fn parse(raw_query: &str) -> Self {
        let mut params = MultiMap::new();

        for pair in raw_query.split('&').filter(|pair| !pair.is_empty()) {
            let (name, value) = pair.split_once('=').unwrap_or((pair, ""));

            let name = percent_decode_str(name).decode_utf8_lossy().to_string();
            let value: Vec<u8> = percent_decode_str(value).collect();

            params.insert(name, value);
        }

        Self { params }
    }

    /// The first value for a param, as raw bytes.
    #[must_use]
    pub fn first(&self, name: &str) -> Option<&[u8]> {
        self.params.get(name).map(Vec::as_slice)
    }

    /// The first value for a param, when it is valid UTF-8.
    #[must_use]
    pub fn first_utf8(&self, name: &str) -> Option<&str> {
        self.first(name).and_then(|value| std::str::from_utf8(value).ok())
    }

    /// All the values for a repeatable param, in request order.
    #[must_use]
    pub fn all(&self, name: &str) -> &[Vec<u8>] {
        self.params.get_vec(name).map_or(&[], Vec::as_slice)
    }
}
