//! Charset fallback chain for MIME part payloads
//!
//! Turning a part into text must never fail. The chain is an ordered list of
//! encodings tried with replacement characters; an attempt only fails when its
//! label is not a known encoding, and the chain ends in a byte-to-codepoint
//! Latin-1 mapping that cannot fail.

use encoding_rs::Encoding;
use mailparse::ParsedMail;
use mailparse::body::Body;
use tracing::debug;

/// Encodings tried after the declared charset, in order
const FALLBACK_CHARSETS: &[&str] = &["utf-8", "windows-1252"];

/// Declared charsets that carry no information
const PLACEHOLDER_CHARSETS: &[&str] = &[
    "",
    "default",
    "default_charset",
    "unknown",
    "unknown-8bit",
    "x-unknown",
    "none",
];

/// Decode a MIME part's body to text
///
/// Uses the part's own charset-aware decode when the declared charset is a
/// known label, and the fallback chain otherwise. When the transfer encoding
/// cannot be undone, the still-encoded payload goes through the chain.
#[must_use]
pub fn decode_part(part: &ParsedMail<'_>) -> String {
    let charset = part.ctype.charset.as_str();

    if Encoding::for_label(charset.trim().as_bytes()).is_some() {
        match part.get_body() {
            Ok(text) => return text,
            Err(e) => debug!("Part decode failed for charset {charset}: {e}"),
        }
    }

    decode_bytes(&payload_bytes(part), charset)
}

/// Transfer-decoded payload bytes, or the raw payload when decoding fails
#[must_use]
pub fn payload_bytes(part: &ParsedMail<'_>) -> Vec<u8> {
    part.get_body_raw().unwrap_or_else(|e| {
        debug!("Transfer decoding failed, using raw payload: {e}");
        match part.get_body_encoded() {
            Body::Base64(body) | Body::QuotedPrintable(body) => body.get_raw().to_vec(),
            Body::SevenBit(body) | Body::EightBit(body) => body.get_raw().to_vec(),
            Body::Binary(body) => body.get_raw().to_vec(),
        }
    })
}

/// Decode bytes using the declared charset, falling back until one succeeds
#[must_use]
pub fn decode_bytes(bytes: &[u8], declared_charset: &str) -> String {
    let declared = sanitize_charset(declared_charset);

    std::iter::once(declared.as_str())
        .chain(FALLBACK_CHARSETS.iter().copied())
        .find_map(|label| decode_with(bytes, label))
        .unwrap_or_else(|| latin1(bytes))
}

/// Normalize a declared charset label, mapping placeholders to UTF-8
#[must_use]
pub fn sanitize_charset(declared: &str) -> String {
    let label = declared.trim().trim_matches(|c| c == '"' || c == '\'').to_lowercase();
    if PLACEHOLDER_CHARSETS.contains(&label.as_str()) {
        "utf-8".to_string()
    } else {
        label
    }
}

fn decode_with(bytes: &[u8], label: &str) -> Option<String> {
    let encoding = Encoding::for_label(label.as_bytes())?;
    let (text, had_errors) = encoding.decode_without_bom_handling(bytes);
    if had_errors {
        debug!("Replacement characters used decoding as {}", encoding.name());
    }
    Some(text.into_owned())
}

/// Map every byte to the code point of the same value
fn latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}
