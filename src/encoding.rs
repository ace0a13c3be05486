//! Base64 helpers shared by the feed decoder and the descriptor parser.
//!
//! Subscription feeds are nominally unpadded standard base64, but real feeds mix padded and
//! unpadded output and wrap long payloads. Decoding therefore strips ASCII whitespace and
//! accepts padding either way; encoding always emits the unpadded form.

use crate::error::Result;
use base64::Engine;
use base64::alphabet;
use base64::engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE_NO_PAD};
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};

const STANDARD_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Decodes standard-alphabet base64, padded or not.
pub(crate) fn decode_standard(input: &str) -> Result<Vec<u8>> {
    let compact: String = input.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    Ok(STANDARD_LENIENT.decode(compact.as_bytes())?)
}

/// Decodes URL-safe base64 by mapping `_` and `-` back to the standard alphabet.
pub(crate) fn decode_url_safe(input: &str) -> Result<Vec<u8>> {
    let standard: String = input
        .chars()
        .map(|c| match c {
            '_' => '/',
            '-' => '+',
            other => other,
        })
        .collect();
    decode_standard(&standard)
}

pub(crate) fn encode_standard(bytes: &[u8]) -> String {
    STANDARD_NO_PAD.encode(bytes)
}

pub(crate) fn encode_url_safe(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}
