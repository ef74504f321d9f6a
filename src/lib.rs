//! Compact, tamper-evident HMAC tokens.
//!
//! A payload is base64-framed, bound to a keyed MAC, and handed out as text;
//! verification re-derives the signing key, recomputes the MAC and compares it
//! in constant time, so any alteration of payload, timestamp or signature is
//! detected without the server storing anything per token. Typical uses are
//! session cookies, password-reset links and other data round-tripped through
//! untrusted hands.
//!
//! The signing key is never the caller's secret directly: every call stretches
//! the secret through HKDF (RFC 5869) with a salt and optional context info,
//! to the HMAC block size of the chosen hash.
//!
//! # Tokens
//!
//! ```text
//! untimed:  <base64(payload)> . <base64(mac)>
//! timed:    <base64(payload)> . <base64(timestamp)> . <base64(mac)>
//! ```
//!
//! Both exist with the standard and the URL-safe base64 alphabet; the variant
//! is a construction-time choice the signer and verifier agree on out of band,
//! it is not recorded in the token.
//!
//! # Signing and verifying
//!
//! ```
//! use macaron_tokens::Signer;
//!
//! let signer = Signer::new("super secret signing key")?
//!     .with_salt("sessions-v2")
//!     .with_info("login-service");
//!
//! let token = signer.sign("user-4028");
//! assert_eq!(signer.verify_text(&token)?, "user-4028");
//! # Ok::<_, Box<dyn std::error::Error>>(())
//! ```
//!
//! Tokens that should stop working on their own use the timed codec:
//!
//! ```
//! use macaron_tokens::{BadToken, TimedSigner};
//! use time::OffsetDateTime;
//!
//! let signer = TimedSigner::new_url_safe("super secret signing key", 3600)?;
//! let issued = OffsetDateTime::from_unix_timestamp(1_706_745_600)?;
//!
//! let token = signer.sign_at("password-reset-4028", issued);
//! assert!(signer.verify_text_at(&token, issued).is_ok());
//!
//! let an_hour_and_a_second_later = issued + time::Duration::seconds(3601);
//! assert_eq!(
//!     signer.verify_at(&token, an_hour_and_a_second_later),
//!     Err(BadToken::Expired),
//! );
//! # Ok::<_, Box<dyn std::error::Error>>(())
//! ```
//!
//! Structured payloads go through serde, and come back as a [`JsonPayload`]
//! with lenient typed lookups:
//!
//! ```
//! use macaron_tokens::Signer;
//!
//! let signer = Signer::new("super secret signing key")?;
//! let token = signer.sign_json(&serde_json::json!({
//!     "user": "ferris",
//!     "admin": false,
//! }))?;
//!
//! let payload = signer.verify_json(&token)?;
//! assert_eq!(payload.get::<String>("user").as_deref(), Some("ferris"));
//! assert_eq!(payload.get_or("theme", "light".to_owned()), "light");
//! # Ok::<_, Box<dyn std::error::Error>>(())
//! ```
//!
//! # What verification tells an attacker
//!
//! Every tamper outcome is the single [`BadToken::SignatureMismatch`] kind;
//! the error does not say whether the payload, the timestamp or the signature
//! was altered, and the digest comparison runs in constant time. The timed
//! codec checks the MAC before it even decodes the timestamp, so the expiry
//! logic cannot be probed with unsigned data.

pub mod algorithm;
pub mod encoding;
pub mod hkdf;
mod payload;
mod signer;
mod timed;

pub use crate::algorithm::{constant_time_eq, Algorithm};
pub use crate::encoding::{Encoding, Standard, UrlSafe};
pub use crate::hkdf::KdfError;
pub use crate::payload::JsonPayload;
pub use crate::signer::{Signer, UrlSafeSigner, DEFAULT_SALT, DEFAULT_SEPARATOR};
pub use crate::timed::{ExpiryBoundary, TimedSigner, UrlSafeTimedSigner};

/// Why a token failed verification.
///
/// One family for every rejection; the message is human-readable and carries
/// no structured detail about where the token went wrong.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum BadToken {
    /// Wrong segment count, or a segment that is not valid base64.
    #[error("invalid token format")]
    Malformed,
    /// The recomputed MAC does not match the token's signature.
    #[error("data has been tampered or signature does not match")]
    SignatureMismatch,
    /// The token is older than the configured maximum age.
    #[error("signature has expired")]
    Expired,
    /// The verified payload bytes are not valid UTF-8/JSON for the typed
    /// accessor that was used. The raw bytes remain available via `verify`.
    #[error("payload could not be decoded")]
    InvalidPayload,
}

/// Invalid signer configuration, reported at construction.
///
/// A signer that would produce ambiguous or unverifiable tokens is never
/// handed out.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The signing key was empty.
    #[error("signing key must not be empty")]
    EmptyKey,
    /// The separator was empty.
    #[error("separator must not be empty")]
    EmptySeparator,
    /// The separator contains characters of the base64 alphabet, which would
    /// make tokens ambiguous to split.
    #[error("separator must not contain characters from the encoding alphabet")]
    ReservedSeparator,
}
