//! Decoding of the `host` parameter from Shopify install callbacks.
//!
//! Shopify sends the embedded-app host as base64 with the trailing `=`
//! padding stripped. The decoded value is the admin host plus path
//! (e.g., `admin.shopify.com/store/foo` or `foo.myshopify.com/admin`).

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use thiserror::Error;

/// Errors from decoding the `host` token.
#[derive(Debug, Error)]
pub enum HostDecodeError {
    #[error("malformed base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("decoded host is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Decodes a padding-stripped base64 `host` token into the admin host string.
///
/// # Errors
///
/// Returns `HostDecodeError` on malformed base64 or invalid UTF-8. Never
/// panics; the caller degrades to a generic request failure.
pub fn decode_host(host: &str) -> Result<String, HostDecodeError> {
    let padding = (4 - host.len() % 4) % 4;
    let mut padded = String::with_capacity(host.len() + padding);
    padded.push_str(host);
    for _ in 0..padding {
        padded.push('=');
    }

    let bytes = BASE64.decode(padded)?;
    Ok(String::from_utf8(bytes)?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// Standard base64 with the trailing padding stripped, as Shopify sends it.
    fn encode_without_padding(input: &str) -> String {
        let encoded = BASE64.encode(input);
        encoded.trim_end_matches('=').to_string()
    }

    #[test]
    fn test_round_trip_without_padding() {
        for input in [
            "foo.example.com/admin",
            "admin.shopify.com/store/foo",
            "a",
            "ab",
            "abc",
            "abcd",
            "ünïcødé/path",
        ] {
            let decoded = decode_host(&encode_without_padding(input)).unwrap();
            assert_eq!(decoded, input);
        }
    }

    #[test]
    fn test_already_padded_input_decodes() {
        let encoded = BASE64.encode("foo.example.com/admin");
        assert_eq!(decode_host(&encoded).unwrap(), "foo.example.com/admin");
    }

    #[test]
    fn test_malformed_base64_is_an_error() {
        assert!(matches!(
            decode_host("!!not-base64!!"),
            Err(HostDecodeError::Base64(_))
        ));
    }

    #[test]
    fn test_invalid_utf8_is_an_error() {
        // 0xff 0xfe is not valid UTF-8
        let encoded = encode_without_padding_bytes(&[0xff, 0xfe, 0x01]);
        assert!(matches!(
            decode_host(&encoded),
            Err(HostDecodeError::Utf8(_))
        ));
    }

    fn encode_without_padding_bytes(input: &[u8]) -> String {
        BASE64.encode(input).trim_end_matches('=').to_string()
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(decode_host("").unwrap(), "");
    }
}
