//! Topping: joins the sections produced by a data codec into one
//! transport-safe string, and splits it back.
//!
//! ```text
//! base64url(section0) "!" base64url(section1) "!" ... base64url(sectionN)
//! ```
//!
//! `!` never occurs in base64url output, so each section can be decoded on its
//! own. The number of sections is not checked here; data codecs enforce their
//! own arity.

use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;

use crate::error::{CryptoError, CryptoResult};

/// Section separator (`!`)
pub const SEPARATOR: u8 = 0x21;

pub trait Topping: Send + Sync {
    /// Encode the sections into a single string. Never fails.
    fn encode(&self, sections: &[Vec<u8>]) -> String;

    /// Split and decode. One output section per separator-delimited part.
    fn decode(&self, data: &[u8]) -> CryptoResult<Vec<Vec<u8>>>;
}

/// Padded base64url per section, `!`-separated.
#[derive(Debug, Clone, Copy, Default)]
pub struct Base64Topping;

impl Topping for Base64Topping {
    fn encode(&self, sections: &[Vec<u8>]) -> String {
        let mut encoded = String::with_capacity(
            sections.iter().map(|s| s.len().div_ceil(3) * 4 + 1).sum(),
        );
        for (i, section) in sections.iter().enumerate() {
            if i > 0 {
                encoded.push(SEPARATOR as char);
            }
            URL_SAFE.encode_string(section, &mut encoded);
        }
        encoded
    }

    fn decode(&self, data: &[u8]) -> CryptoResult<Vec<Vec<u8>>> {
        data.split(|b| *b == SEPARATOR)
            .map(|part| URL_SAFE.decode(part).map_err(CryptoError::from))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sections(parts: &[&str]) -> Vec<Vec<u8>> {
        parts.iter().map(|p| p.as_bytes().to_vec()).collect()
    }

    #[test]
    fn test_encode_single_section() {
        let topping = Base64Topping;
        assert_eq!(topping.encode(&sections(&["AAAA"])), "QUFBQQ==");
        assert_eq!(topping.encode(&sections(&["achbdbhe"])), "YWNoYmRiaGU=");
        assert_eq!(topping.encode(&sections(&["12asj!+_./"])), "MTJhc2ohK18uLw==");
    }

    #[test]
    fn test_decode_single_section() {
        let topping = Base64Topping;
        let decoded = topping.decode(b"MTJhc2ohK18uLw==").unwrap();
        assert_eq!(decoded, sections(&["12asj!+_./"]));
    }

    #[test]
    fn test_multiple_sections() {
        let topping = Base64Topping;
        let cases: [(&str, &[&str]); 2] = [
            ("YWNoYmRiaGU=!Njc2XiomKQ==", &["achbdbhe", "676^*&)"]),
            (
                "MTJhc2ohK18uLw==!aGVsbG8hIQ==!d29vbyQl",
                &["12asj!+_./", "hello!!", "wooo$%"],
            ),
        ];

        for (encoded, parts) in cases {
            let expected = sections(parts);
            assert_eq!(topping.encode(&expected), encoded);
            assert_eq!(topping.decode(encoded.as_bytes()).unwrap(), expected);
        }
    }

    #[test]
    fn test_url_safe_alphabet() {
        // 0xfb 0xff encodes to "-_8=" in base64url, "+/8=" in standard base64
        let topping = Base64Topping;
        let encoded = topping.encode(&[vec![0xfb, 0xff]]);
        assert_eq!(encoded, "-_8=");
        assert!(topping.decode(b"+/8=").is_err());
    }

    #[test]
    fn test_empty_sections_survive() {
        let topping = Base64Topping;
        let input = vec![vec![], b"x".to_vec(), vec![]];
        let encoded = topping.encode(&input);
        assert_eq!(encoded, "!eA==!");
        assert_eq!(topping.decode(encoded.as_bytes()).unwrap(), input);
    }

    #[test]
    fn test_invalid_base64_part() {
        let topping = Base64Topping;
        let result = topping.decode(b"QUFBQQ==!not*base64");
        assert!(matches!(result, Err(CryptoError::Base64(_))));
    }

    #[test]
    fn test_part_count_follows_separators() {
        let topping = Base64Topping;
        assert_eq!(topping.decode(b"QUFBQQ==").unwrap().len(), 1);
        assert_eq!(topping.decode(b"QUFBQQ==!QUFBQQ==").unwrap().len(), 2);
        assert_eq!(topping.decode(b"QUFBQQ==!!QUFBQQ==").unwrap().len(), 3);
    }
}

#[cfg(test)]
mod proptest_suite {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn roundtrip_preserves_sections(
            input in proptest::collection::vec(
                proptest::collection::vec(any::<u8>(), 0..=256),
                1..=8,
            )
        ) {
            let topping = Base64Topping;
            let encoded = topping.encode(&input);
            let decoded = topping.decode(encoded.as_bytes()).unwrap();
            prop_assert_eq!(decoded.len(), input.len());
            prop_assert_eq!(decoded, input);
        }
    }
}
