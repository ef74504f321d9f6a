//! Base64 strategies for rendering token segments as text.
//!
//! Tokens always carry unpadded segments; decoding restores the stripped
//! padding first, so both padded and unpadded input are accepted.

use std::borrow::Cow;

use base64ct::{Base64, Base64Unpadded, Base64Url, Base64UrlUnpadded, Encoding as _};

/// The segment text was not valid base64 for the strategy's alphabet.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("invalid base64 data")]
pub struct DecodeError;

/// A base64 alphabet used to frame token segments.
///
/// Implemented by the zero-sized [`Standard`] and [`UrlSafe`] strategies and
/// selected as a type parameter of the signers; both carry identical signing
/// logic and differ only in this trait.
pub trait Encoding {
    /// Encode `data`, stripping the trailing padding.
    fn encode(data: &[u8]) -> String;

    /// Decode `text`, restoring any stripped padding first.
    fn decode(text: &str) -> Result<Vec<u8>, DecodeError>;

    /// Whether `c` belongs to this alphabet or is the padding character.
    fn is_reserved(c: char) -> bool;

    /// Decode `text` and interpret the bytes as UTF-8.
    fn decode_text(text: &str) -> Result<String, DecodeError> {
        String::from_utf8(Self::decode(text)?).map_err(|_| DecodeError)
    }

    /// True if any character of `text` collides with this alphabet.
    ///
    /// Used to validate separators: a separator sharing characters with the
    /// alphabet could split a token in the middle of a segment.
    fn contains_reserved_chars(text: &str) -> bool {
        text.chars().any(Self::is_reserved)
    }
}

/// Restore the padding stripped from a base64 string.
///
/// `len % 4 == 1` is left alone; no amount of padding makes it valid, and the
/// decoder will reject it.
fn repad(text: &str) -> Cow<'_, str> {
    match text.len() % 4 {
        2 => Cow::Owned(format!("{text}==")),
        3 => Cow::Owned(format!("{text}=")),
        _ => Cow::Borrowed(text),
    }
}

/// The RFC 4648 standard alphabet (`A-Z a-z 0-9 + /`).
#[derive(Debug, Default, Clone, Copy)]
pub struct Standard;

impl Encoding for Standard {
    fn encode(data: &[u8]) -> String {
        Base64Unpadded::encode_string(data)
    }

    fn decode(text: &str) -> Result<Vec<u8>, DecodeError> {
        Base64::decode_vec(&repad(text)).map_err(|_| DecodeError)
    }

    fn is_reserved(c: char) -> bool {
        c.is_alphanumeric() || matches!(c, '+' | '/' | '=')
    }
}

/// The RFC 4648 URL-safe alphabet (`A-Z a-z 0-9 - _`), for tokens embedded in
/// URLs or cookies.
#[derive(Debug, Default, Clone, Copy)]
pub struct UrlSafe;

impl Encoding for UrlSafe {
    fn encode(data: &[u8]) -> String {
        Base64UrlUnpadded::encode_string(data)
    }

    fn decode(text: &str) -> Result<Vec<u8>, DecodeError> {
        Base64Url::decode_vec(&repad(text)).map_err(|_| DecodeError)
    }

    fn is_reserved(c: char) -> bool {
        c.is_alphanumeric() || matches!(c, '-' | '_' | '=')
    }
}
