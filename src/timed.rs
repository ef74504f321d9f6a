//! The timed token codec: `payload.timestamp.signature`.

use std::fmt;

use serde::Serialize;
use time::OffsetDateTime;

use crate::algorithm::{constant_time_eq, Algorithm};
use crate::encoding::{Encoding, Standard, UrlSafe};
use crate::payload::JsonPayload;
use crate::signer::Signer;
use crate::{BadToken, ConfigError};

/// Whether a token whose age exactly equals the limit is still valid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExpiryBoundary {
    /// The limit itself is still valid: expired only when `age > max_age`.
    #[default]
    Inclusive,
    /// The limit is already too late: expired when `age >= max_age`.
    Exclusive,
}

/// Signs tokens that carry their issue time and are rejected once older than
/// `max_age` seconds.
///
/// The timestamp rides between payload and signature as the base64 encoding of
/// the decimal Unix-epoch second count, and is covered by the MAC together
/// with the payload segment and the separator, so neither segment can be
/// swapped or replayed against the other.
///
/// ```
/// use macaron_tokens::TimedSigner;
///
/// let signer = TimedSigner::new("super secret signing key", 3600)?;
///
/// let token = signer.sign("password-reset-4028");
/// assert_eq!(signer.verify_text(&token)?, "password-reset-4028");
/// # Ok::<_, Box<dyn std::error::Error>>(())
/// ```
///
/// The `*_at` methods take an explicit time for deterministic tests; the plain
/// methods use the current UTC time.
#[derive(Clone)]
pub struct TimedSigner<E = Standard> {
    signer: Signer<E>,
    max_age: u64,
    boundary: ExpiryBoundary,
}

/// A [`TimedSigner`] using the URL-safe base64 alphabet.
pub type UrlSafeTimedSigner = TimedSigner<UrlSafe>;

impl TimedSigner<Standard> {
    /// Create a timed signer accepting tokens up to `max_age` seconds old.
    ///
    /// Defaults match [`Signer::new`].
    pub fn new(key: impl Into<Vec<u8>>, max_age: u64) -> Result<Self, ConfigError> {
        Self::with_encoding(key, max_age)
    }
}

impl TimedSigner<UrlSafe> {
    /// Create a timed signer using the URL-safe base64 alphabet; otherwise as
    /// [`TimedSigner::new`].
    pub fn new_url_safe(key: impl Into<Vec<u8>>, max_age: u64) -> Result<Self, ConfigError> {
        Self::with_encoding(key, max_age)
    }
}

impl<E: Encoding> TimedSigner<E> {
    /// Create a timed signer with an explicit encoding strategy, for callers
    /// that bring their own [`Encoding`].
    pub fn with_encoding(key: impl Into<Vec<u8>>, max_age: u64) -> Result<Self, ConfigError> {
        Ok(Self {
            signer: Signer::with_encoding(key)?,
            max_age,
            boundary: ExpiryBoundary::default(),
        })
    }

    /// Replace the key-derivation salt.
    pub fn with_salt(mut self, salt: impl Into<Vec<u8>>) -> Self {
        self.signer = self.signer.with_salt(salt);
        self
    }

    /// Bind the derived key to application-specific context bytes.
    pub fn with_info(mut self, info: impl Into<Vec<u8>>) -> Self {
        self.signer = self.signer.with_info(info);
        self
    }

    /// Select the hash algorithm.
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.signer = self.signer.with_algorithm(algorithm);
        self
    }

    /// Replace the segment separator; same rules as [`Signer::with_separator`].
    pub fn with_separator(mut self, sep: impl Into<String>) -> Result<Self, ConfigError> {
        self.signer = self.signer.with_separator(sep)?;
        Ok(self)
    }

    /// Choose how a token aged exactly `max_age` is treated.
    pub fn with_expiry_boundary(mut self, boundary: ExpiryBoundary) -> Self {
        self.boundary = boundary;
        self
    }

    /// The configured maximum token age in seconds.
    pub fn max_age(&self) -> u64 {
        self.max_age
    }

    /// Sign a text payload, stamped with the current time.
    pub fn sign(&self, payload: &str) -> String {
        self.sign_at(payload, OffsetDateTime::now_utc())
    }

    /// Sign a text payload, stamped with `issued_at`.
    pub fn sign_at(&self, payload: &str, issued_at: OffsetDateTime) -> String {
        self.sign_bytes_at(payload.as_bytes(), issued_at)
    }

    /// Sign raw payload bytes, stamped with the current time.
    pub fn sign_bytes(&self, payload: &[u8]) -> String {
        self.sign_bytes_at(payload, OffsetDateTime::now_utc())
    }

    /// Sign raw payload bytes, stamped with `issued_at`.
    pub fn sign_bytes_at(&self, payload: &[u8], issued_at: OffsetDateTime) -> String {
        let encoded = E::encode(payload);
        let timestamp = E::encode(issued_at.unix_timestamp().to_string().as_bytes());
        let sep = &self.signer.sep;
        let signed_part = format!("{encoded}{sep}{timestamp}");
        let signature = E::encode(&self.signer.signature_of(signed_part.as_bytes()));
        format!("{signed_part}{sep}{signature}")
    }

    /// Serialize `payload` as JSON and sign the bytes, stamped with the
    /// current time.
    pub fn sign_json<T: Serialize>(&self, payload: &T) -> Result<String, serde_json::Error> {
        self.sign_json_at(payload, OffsetDateTime::now_utc())
    }

    /// Serialize `payload` as JSON and sign the bytes, stamped with
    /// `issued_at`.
    pub fn sign_json_at<T: Serialize>(
        &self,
        payload: &T,
        issued_at: OffsetDateTime,
    ) -> Result<String, serde_json::Error> {
        Ok(self.sign_bytes_at(&serde_json::to_vec(payload)?, issued_at))
    }

    /// Verify a token against the current time and return the payload bytes.
    pub fn verify(&self, token: &str) -> Result<Vec<u8>, BadToken> {
        self.verify_at(token, OffsetDateTime::now_utc())
    }

    /// Verify a token as of `now` and return the payload bytes.
    ///
    /// The MAC covers `payload SEP timestamp`, so it is checked before the
    /// timestamp is even decoded; an attacker cannot probe the expiry logic
    /// with unsigned data.
    pub fn verify_at(&self, token: &str, now: OffsetDateTime) -> Result<Vec<u8>, BadToken> {
        let (encoded, timestamp, signature) = self.split(token)?;
        let sep = &self.signer.sep;
        let signed_part = format!("{encoded}{sep}{timestamp}");
        let mac = self.signer.signature_of(signed_part.as_bytes());
        if !constant_time_eq(&mac, &signature) {
            return Err(BadToken::SignatureMismatch);
        }

        let issued_at = decode_timestamp::<E>(timestamp)?;
        let age = now.unix_timestamp().saturating_sub(issued_at);
        if self.expired(age) {
            return Err(BadToken::Expired);
        }

        E::decode(encoded).map_err(|_| BadToken::Malformed)
    }

    /// Verify a token against the current time and return the payload as text.
    pub fn verify_text(&self, token: &str) -> Result<String, BadToken> {
        self.verify_text_at(token, OffsetDateTime::now_utc())
    }

    /// Verify a token as of `now` and return the payload as text.
    pub fn verify_text_at(&self, token: &str, now: OffsetDateTime) -> Result<String, BadToken> {
        String::from_utf8(self.verify_at(token, now)?).map_err(|_| BadToken::InvalidPayload)
    }

    /// Verify a token against the current time and parse the payload as JSON.
    pub fn verify_json(&self, token: &str) -> Result<JsonPayload, BadToken> {
        self.verify_json_at(token, OffsetDateTime::now_utc())
    }

    /// Verify a token as of `now` and parse the payload as JSON.
    pub fn verify_json_at(
        &self,
        token: &str,
        now: OffsetDateTime,
    ) -> Result<JsonPayload, BadToken> {
        let bytes = self.verify_at(token, now)?;
        let value = serde_json::from_slice(&bytes).map_err(|_| BadToken::InvalidPayload)?;
        Ok(JsonPayload::new(value))
    }

    fn expired(&self, age: i64) -> bool {
        // a token from the future has not aged at all
        let Ok(age) = u64::try_from(age) else {
            return false;
        };
        match self.boundary {
            ExpiryBoundary::Inclusive => age > self.max_age,
            ExpiryBoundary::Exclusive => age >= self.max_age,
        }
    }

    fn split<'t>(&self, token: &'t str) -> Result<(&'t str, &'t str, Vec<u8>), BadToken> {
        let mut segments = token.split(self.signer.sep.as_str());
        let (Some(encoded), Some(timestamp), Some(signature), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Err(BadToken::Malformed);
        };
        let signature = E::decode(signature).map_err(|_| BadToken::Malformed)?;
        Ok((encoded, timestamp, signature))
    }
}

fn decode_timestamp<E: Encoding>(segment: &str) -> Result<i64, BadToken> {
    let text = E::decode_text(segment).map_err(|_| BadToken::Malformed)?;
    text.parse().map_err(|_| BadToken::Malformed)
}

impl<E> fmt::Debug for TimedSigner<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimedSigner")
            .field("signer", &self.signer)
            .field("max_age", &self.max_age)
            .field("boundary", &self.boundary)
            .finish()
    }
}
