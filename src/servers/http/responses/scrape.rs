//! The bencoded `scrape` response.
use std::collections::BTreeMap;

use shoal_tracker_primitives::core::ScrapeData;
use shoal_tracker_primitives::info_hash::InfoHash;
use shoal_tracker_primitives::swarm_metadata::SwarmMetadata;

use super::{write_bytes, write_int};

/// The scrape response body:
///
/// ```text
/// d5:filesd20:<infohash>d8:completei..e10:downloadedi..e10:incompletei..ee..ee
/// ```
///
/// Infohashes are the raw 20 bytes, used directly as dictionary keys; the
/// files dictionary is sorted by those bytes as bencoding requires.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Scrape {
    pub files: BTreeMap<InfoHash, SwarmMetadata>,
}

impl From<ScrapeData> for Scrape {
    fn from(scrape_data: ScrapeData) -> Self {
        Self {
            files: scrape_data.files.into_iter().collect(),
        }
    }
}

impl Scrape {
    #[must_use]
    pub fn body(&self) -> Vec<u8> {
        let mut output = Vec::new();

        output.extend_from_slice(b"d5:filesd");

        for (info_hash, metadata) in &self.files {
            write_bytes(&mut output, &info_hash.bytes());

            output.push(b'd');

            write_bytes(&mut output, b"complete");
            write_int(&mut output, i64::from(metadata.complete));

            write_bytes(&mut output, b"downloaded");
            write_int(&mut output, i64::from(metadata.downloaded));

            write_bytes(&mut output, b"incomplete");
            write_int(&mut output, i64::from(metadata.incomplete));

            output.push(b'e');
        }

        output.extend_from_slice(b"ee");

        output
    }
}

#[cfg(test)]
mod tests {

    mod the_scrape_response {
        use shoal_tracker_primitives::core::ScrapeData;
        use shoal_tracker_primitives::info_hash::InfoHash;
        use shoal_tracker_primitives::swarm_metadata::SwarmMetadata;

        use crate::servers::http::responses::scrape::Scrape;

        #[test]
        fn it_should_bencode_one_file_per_infohash() {
            let info_hash: InfoHash = [0x3b; 20].into();

            let mut scrape_data = ScrapeData::empty();
            scrape_data.add_file(
                &info_hash,
                SwarmMetadata {
                    complete: 1,
                    downloaded: 2,
                    incomplete: 3,
                },
            );

            let response: Scrape = scrape_data.into();

            let mut expected: Vec<u8> = b"d5:filesd20:".to_vec();
            expected.extend_from_slice(&[0x3b; 20]);
            expected.extend_from_slice(b"d8:completei1e10:downloadedi2e10:incompletei3eeee");

            assert_eq!(response.body(), expected);
        }

        #[test]
        fn it_should_bencode_an_empty_files_dictionary_for_an_empty_scrape() {
            let response: Scrape = ScrapeData::empty().into();

            assert_eq!(response.body(), b"d5:filesdeee".to_vec());
        }

        #[test]
        fn it_should_sort_the_files_by_infohash_bytes() {
            let mut scrape_data = ScrapeData::empty();
            scrape_data.add_file_with_zeroed_metadata(&[0xbb; 20].into());
            scrape_data.add_file_with_zeroed_metadata(&[0xaa; 20].into());

            let response: Scrape = scrape_data.into();
            let body = response.body();

            let first = body.windows(20).position(|window| window == [0xaa; 20]).unwrap();
            let second = body.windows(20).position(|window| window == [0xbb; 20]).unwrap();

            assert!(first < second);
        }
    }
}
